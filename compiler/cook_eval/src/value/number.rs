//! Number formatting and parsing with JavaScript semantics.

/// JavaScript `Number::toString` with radix 10.
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", number_to_string(-value));
    }

    // Shortest round-tripping digits: value = 0.digits * 10^n
    let formatted = format!("{value:e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let n = exponent.parse::<i32>().unwrap_or(0) + 1;

    if k <= n && n <= 21 {
        let mut out = digits;
        out.extend(std::iter::repeat('0').take((n - k) as usize));
        out
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let sign = if n - 1 >= 0 { '+' } else { '-' };
        let exp = (n - 1).abs();
        if k == 1 {
            format!("{digits}e{sign}{exp}")
        } else {
            let (first, rest) = digits.split_at(1);
            format!("{first}.{rest}e{sign}{exp}")
        }
    }
}

const RADIX_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn next_up(value: f64) -> f64 {
    if value.is_nan() || value == f64::INFINITY {
        return value;
    }
    if value == 0.0 {
        return f64::from_bits(1);
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// `Number::toString(radix)` for radix 2..=36.
pub fn number_to_radix_string(value: f64, radix: u32) -> String {
    if radix == 10 || !value.is_finite() {
        return number_to_string(value);
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let negative = value < 0.0;
    let value = value.abs();
    let radix_f = f64::from(radix);

    let mut integer = value.floor();
    let mut fraction = value - integer;
    let mut delta = (0.5 * (next_up(value) - value)).max(next_up(0.0));

    let mut frac_digits: Vec<u8> = Vec::new();
    if fraction >= delta {
        loop {
            fraction *= radix_f;
            delta *= radix_f;
            let digit = fraction as usize;
            frac_digits.push(RADIX_DIGITS[digit]);
            fraction -= digit as f64;
            if (fraction > 0.5 || (fraction == 0.5 && digit & 1 == 1)) && fraction + delta > 1.0 {
                // Round up, propagating carries into the integer part.
                loop {
                    let Some(last) = frac_digits.pop() else {
                        integer += 1.0;
                        break;
                    };
                    let digit = RADIX_DIGITS.iter().position(|&c| c == last).unwrap_or(0);
                    if digit + 1 < radix as usize {
                        frac_digits.push(RADIX_DIGITS[digit + 1]);
                        break;
                    }
                }
                break;
            }
            if fraction < delta {
                break;
            }
        }
    }

    let mut int_digits: Vec<u8> = Vec::new();
    while integer / radix_f >= 9_007_199_254_740_992.0 {
        integer /= radix_f;
        int_digits.push(b'0');
    }
    loop {
        let remainder = integer % radix_f;
        int_digits.push(RADIX_DIGITS[remainder as usize]);
        integer = (integer - remainder) / radix_f;
        if integer <= 0.0 {
            break;
        }
    }
    int_digits.reverse();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&String::from_utf8_lossy(&int_digits));
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(&frac_digits));
    }
    out
}

/// Add one unit in the last place of a string of decimal digits.
fn increment_decimal(digits: &str) -> String {
    let mut bytes: Vec<u8> = digits.bytes().collect();
    let mut i = bytes.len();
    loop {
        if i == 0 {
            bytes.insert(0, b'1');
            break;
        }
        i -= 1;
        match bytes[i] {
            b'.' => {}
            b'9' => bytes[i] = b'0',
            d => {
                bytes[i] = d + 1;
                break;
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `Number.prototype.toFixed`. Exact ties round away from zero.
pub fn number_to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return number_to_string(value);
    }
    let negative = value < 0.0;
    let magnitude = value.abs();
    let exact = format!("{magnitude:.prec$}", prec = digits + 30);
    let (kept, rest) = exact.split_at(exact.len() - 30);
    let is_tie = rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0');
    let body = if is_tie {
        let kept = kept.strip_suffix('.').unwrap_or(kept);
        increment_decimal(kept)
    } else {
        format!("{magnitude:.digits$}")
    };
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// `Number.prototype.toExponential` with an explicit digit count.
pub fn number_to_exponential(value: f64, digits: Option<usize>) -> String {
    if !value.is_finite() {
        return number_to_string(value);
    }
    let formatted = match digits {
        Some(digits) => format!("{value:.digits$e}"),
        None => format!("{value:e}"),
    };
    match formatted.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => formatted,
    }
}

/// `Number.prototype.toPrecision`.
pub fn number_to_precision(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return number_to_string(value);
    }
    if value == 0.0 {
        return if precision > 1 {
            format!("0.{}", "0".repeat(precision - 1))
        } else {
            "0".to_string()
        };
    }
    let formatted = format!("{:.prec$e}", value.abs(), prec = precision - 1);
    let (mantissa, exp) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let e: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if value < 0.0 { "-" } else { "" };
    let p = precision as i32;
    if e < -6 || e >= p {
        let exp_sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        let dot = if rest.is_empty() { "" } else { "." };
        return format!("{sign}{first}{dot}{rest}e{exp_sign}{}", e.abs());
    }
    if e >= 0 {
        let (int, frac) = digits.split_at((e + 1) as usize);
        if frac.is_empty() {
            format!("{sign}{int}")
        } else {
            format!("{sign}{int}.{frac}")
        }
    } else {
        format!("{sign}0.{}{digits}", "0".repeat((-e - 1) as usize))
    }
}

/// Whitespace and line terminators stripped by `Number()` and friends.
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{a}' | '\u{b}' | '\u{c}' | '\u{d}' | ' ' | '\u{a0}' | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}' | '\u{2029}' | '\u{202f}' | '\u{205f}' | '\u{3000}' | '\u{feff}'
    )
}

/// Length of the longest prefix of `s` that is a decimal literal, without
/// sign or `Infinity`.
fn decimal_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut int_digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        int_digits += 1;
    }
    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
            frac_digits += 1;
        }
        if int_digits > 0 || frac_digits > 0 {
            i = j;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > start {
            i = j;
        }
    }
    i
}

fn parse_signed_decimal_prefix(s: &str) -> Option<(f64, usize)> {
    let (sign, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let sign_len = s.len() - unsigned.len();
    if unsigned.starts_with("Infinity") {
        return Some((sign * f64::INFINITY, sign_len + "Infinity".len()));
    }
    let len = decimal_prefix_len(unsigned);
    if len == 0 {
        return None;
    }
    let literal = &unsigned[..len];
    let parsed = literal.parse::<f64>().ok()?;
    Some((sign * parsed, sign_len + len))
}

/// `ToNumber` applied to a string.
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut result = 0.0;
        for c in digits.chars() {
            match c.to_digit(radix) {
                Some(d) => result = result * f64::from(radix) + f64::from(d),
                None => return f64::NAN,
            }
        }
        return result;
    }
    match parse_signed_decimal_prefix(trimmed) {
        Some((value, len)) if len == trimmed.len() => value,
        _ => f64::NAN,
    }
}

/// Global `parseFloat`.
pub fn parse_float(s: &str) -> f64 {
    let trimmed = s.trim_start_matches(is_js_whitespace);
    parse_signed_decimal_prefix(trimmed).map_or(f64::NAN, |(value, _)| value)
}

/// Global `parseInt`. `radix` 0 means "detect".
pub fn parse_int(s: &str, radix: u32) -> f64 {
    let mut rest = s.trim_start_matches(is_js_whitespace);
    let mut sign = 1.0;
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = -1.0;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }
    let mut radix = radix;
    let has_hex_prefix = rest.starts_with("0x") || rest.starts_with("0X");
    if (radix == 0 || radix == 16) && has_hex_prefix {
        rest = &rest[2..];
        radix = 16;
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let digits: Vec<u32> = rest.chars().map_while(|c| c.to_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    if radix == 10 {
        let text: String = rest.chars().take(digits.len()).collect();
        return sign * text.parse::<f64>().unwrap_or(f64::NAN);
    }
    let value = digits
        .iter()
        .fold(0.0, |acc, &d| acc * f64::from(radix) + f64::from(d));
    sign * value
}

/// `ToIntegerOrInfinity`.
pub fn to_integer_or_infinity(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value.is_infinite() {
        value
    } else {
        value.trunc() + 0.0
    }
}

/// `ToInt32`.
pub fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    let int = value.trunc().rem_euclid(4_294_967_296.0);
    if int >= 2_147_483_648.0 {
        (int - 4_294_967_296.0) as i32
    } else {
        int as i32
    }
}

/// Resolve a relative index (negative counts from the end) into `0..=len`.
pub fn relative_index(value: f64, len: usize) -> usize {
    let int = to_integer_or_infinity(value);
    let len_f = len as f64;
    if int < 0.0 {
        (len_f + int).max(0.0) as usize
    } else {
        int.min(len_f) as usize
    }
}

/// Canonical array index form of a property key, if it is one.
pub fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: u64 = key.parse().ok()?;
    (index < u64::from(u32::MAX)).then_some(index as usize)
}

#[cfg(test)]
mod tests;
