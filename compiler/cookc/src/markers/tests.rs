#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_plain_marker() {
    assert_eq!(
        split_evaluation("<% DATA.a %>"),
        Some(EvaluationSource {
            prefix: "<% ",
            source: "DATA.a",
            suffix: " %>",
            track: None,
        })
    );
}

#[test]
fn test_tracking_sigils() {
    let context = split_evaluation("<%~ CTX.x %>").unwrap();
    assert_eq!(context.track, Some(Tracking::Context));
    assert_eq!(context.prefix, "<%~ ");
    assert_eq!(context.source, "CTX.x");

    let state = split_evaluation("<%= STATE.y %>").unwrap();
    assert_eq!(state.track, Some(Tracking::State));
    assert_eq!(state.source, "STATE.y");
}

#[test]
fn test_surrounding_whitespace_goes_to_prefix_and_suffix() {
    let split = split_evaluation("\n  <%  a + b\n%>  ").unwrap();
    assert_eq!(split.prefix, "\n  <% ");
    assert_eq!(split.source, " a + b");
    assert_eq!(split.suffix, "\n%>  ");
    assert_eq!(
        format!("{}{}{}", split.prefix, split.source, split.suffix),
        "\n  <%  a + b\n%>  "
    );
}

#[test]
fn test_rejects_non_markers() {
    for raw in [
        "plain text",
        "<%a %>",
        "<% a%>",
        "<%~a %>",
        "<% a %> tail",
        "head <% a %>",
        "<% %>",
        "<%",
        "",
    ] {
        assert!(!is_evaluable(raw), "{raw:?} should not be evaluable");
    }
}

#[test]
fn test_empty_expression_between_markers() {
    let split = split_evaluation("<%  %>").unwrap();
    assert_eq!(split.source, "");
}
