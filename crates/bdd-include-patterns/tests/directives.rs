//! Behavioural tests for the public directive and binding API.
#![expect(clippy::expect_used, reason = "tests assert parse success explicitly")]

use bdd_include_patterns::{
    DirectiveError, count_matches, is_include_tag, parse_include_directive, split_tags, substitute,
};

#[test]
fn parsed_bindings_drive_substitution() {
    let directive = parse_include_directive(
        "@include(feature: clock.feature, scenario: Compare, params: [time1:9, time2:8])",
    )
    .expect("directive should parse");
    let line = substitute(
        "Given that <time1> is not equal to <time2> into a step",
        &directive.bindings,
    );
    assert_eq!(line, "Given that 9 is not equal to 8 into a step");
    assert!(count_matches("| time1 | time2 |", &directive.bindings));
}

#[test]
fn directive_without_params_leaves_lines_unchanged() {
    let directive = parse_include_directive("@include(feature: a.feature, scenario: Plain)")
        .expect("directive should parse");
    let line = "Given <anything> stays put";
    assert_eq!(substitute(line, &directive.bindings), line);
}

#[test]
fn include_tag_is_found_among_siblings() {
    let line = "  @smoke @include(feature: a.feature, scenario: Log in, params: [u:bob]) @fast";
    let tags = split_tags(line);
    let include = tags
        .iter()
        .find(|tag| is_include_tag(tag))
        .expect("include tag present");
    let directive = parse_include_directive(include).expect("directive should parse");
    assert_eq!(directive.scenario, "Log in");
    assert_eq!(directive.bindings.get("u"), Some("bob"));
}

#[test]
fn missing_required_fields_are_reported() {
    let Err(err) = parse_include_directive("@include(testCheckParams)") else {
        panic!("expected malformed directive");
    };
    assert!(matches!(err, DirectiveError::MalformedField(_)));
}
