//! Reading ESTree JSON.

use serde::de::DeserializeOwned;

use crate::stack::with_deserialize_stack;

/// Deserialize a tree (or any node) from the external parser's JSON.
///
/// Unlike `serde_json::from_str` this has no nesting limit: long operator
/// chains such as `a + b + c + ...` nest one level per operand.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, serde_json::Error> {
    with_deserialize_stack(|| {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let value = T::deserialize(&mut de)?;
        de.end()?;
        Ok(value)
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::{BinaryOperator, Expression};

    #[test]
    fn test_deeply_nested_binary_chain() {
        let mut json = r#"{"type":"Identifier","name":"a"}"#.to_string();
        for _ in 0..500 {
            json = format!(
                r#"{{"type":"BinaryExpression","operator":"+","left":{json},"right":{{"type":"Literal","value":1}}}}"#
            );
        }
        let expr: Expression = from_json(&json).expect("deep chain should deserialize");
        let Expression::Binary(bin) = expr else {
            panic!("expected binary");
        };
        assert_eq!(bin.operator, BinaryOperator::Add);
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        let result: Result<Expression, _> = from_json(r#"{"type":"Identifier","name":"a"} x"#);
        assert!(result.is_err());
    }
}
