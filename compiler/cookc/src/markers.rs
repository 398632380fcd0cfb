//! `<% ... %>` evaluation markers.
//!
//! Configuration values that should be evaluated are written as
//! `<% expression %>`. The opener may carry a tracking sigil: `<%~ %>`
//! tracks context changes and `<%= %>` tracks state changes. Leading and
//! trailing whitespace around the marker is allowed; whitespace right after
//! the opener and right before the closer is required.

/// What an evaluation asks its host to re-run it on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tracking {
    /// `<%~ ... %>`
    Context,
    /// `<%= ... %>`
    State,
}

/// A raw marker split into its parts.
///
/// `prefix + source + suffix` is the original string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvaluationSource<'a> {
    pub prefix: &'a str,
    /// The expression between the markers, handed to the parser.
    pub source: &'a str,
    pub suffix: &'a str,
    pub track: Option<Tracking>,
}

/// True when `raw` is a complete evaluation marker.
pub fn is_evaluable(raw: &str) -> bool {
    split_evaluation(raw).is_some()
}

/// Split `raw` into opener, expression source and closer.
pub fn split_evaluation(raw: &str) -> Option<EvaluationSource<'_>> {
    let body = raw.trim_start();
    let mut prefix_len = raw.len() - body.len();
    let rest = body.strip_prefix("<%")?;
    prefix_len += 2;

    let track = match rest.chars().next() {
        Some('~') => Some(Tracking::Context),
        Some('=') => Some(Tracking::State),
        _ => None,
    };
    if track.is_some() {
        prefix_len += 1;
    }
    let gap = raw[prefix_len..].chars().next().filter(|c| c.is_whitespace())?;
    prefix_len += gap.len_utf8();

    let trimmed = raw.trim_end();
    let closer = trimmed.strip_suffix("%>")?;
    let gap = closer.chars().next_back().filter(|c| c.is_whitespace())?;
    let suffix_start = closer.len() - gap.len_utf8();

    if suffix_start < prefix_len {
        return None;
    }
    Some(EvaluationSource {
        prefix: &raw[..prefix_len],
        source: &raw[prefix_len..suffix_start],
        suffix: &raw[suffix_start..],
        track,
    })
}

#[cfg(test)]
mod tests;
