//! Torture tests for the journal normalizer and renderer
//!
//! The normalizer and renderer are total by contract: any input string
//! produces a valid Journal, any Journal produces a DisplayTree. These
//! tests throw the hostile inputs at them - broken JSON, wrong field
//! types, unknown kinds, deep nesting - and assert the contract holds
//! and the synthesized structures say what they should.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use tracer_core::{
    count_events, normalize_journal, normalize_value, render_journal, EventKind, JournalEvent,
};

// =============================================================================
// Parse failures
// =============================================================================

/// Inputs that are not JSON at all must come back as a journal with one
/// error event carrying the original text verbatim.
#[test]
fn test_non_json_inputs_never_panic_and_keep_raw_text() {
    let hostile = [
        "",
        "   ",
        "not json at all",
        "Traceback (most recent call last):\n  File \"x.py\", line 1",
        "{truncated",
        "{\"events\": [",
        "}{",
        "\u{0}\u{1}\u{2}",
        "null null",
        "[1, 2,",
    ];

    for input in hostile {
        let journal = normalize_journal(input);
        assert_eq!(journal.metadata.error, Some(true), "input: {input:?}");
        assert_eq!(journal.metadata.total_events, 1);

        let wrapper = &journal.events[0];
        assert_eq!(wrapper.kind, EventKind::Executing);

        let error = &wrapper.children[0];
        assert_eq!(error.kind, EventKind::Error, "input: {input:?}");
        assert_eq!(
            error.fields.get("raw"),
            Some(&Value::from(input)),
            "raw text must survive verbatim"
        );
        // The error event renders, parse garbage and all.
        let tree = render_journal(&journal);
        assert!(tree.error);
        assert!(tree.to_text().contains("Error: Could not parse JSON"));
    }
}

#[test]
fn test_diagnostic_prefix_before_json_is_tolerated() {
    let journal = normalize_journal(
        "warning: slow path taken {\"events\": [{\"type\": \"PRINT\", \"value\": 7}]}",
    );
    assert_eq!(journal.metadata.error, None);
    assert_eq!(render_journal(&journal).to_text(), "Print: 7\n");
}

// =============================================================================
// Canonical pass-through
// =============================================================================

#[test]
fn test_canonical_journal_is_identity_on_events() {
    let raw = json!({
        "events": [
            {"type": "EXECUTING", "name": "main", "children": [
                {"type": "FOR", "condition": "i in range(2)", "iteration_count": 2, "children": [
                    {"type": "FOR_ITERATION", "iterator": "0"},
                    {"type": "FOR_ITERATION", "iterator": "1"}
                ]},
                {"type": "RETURN", "value": null}
            ]}
        ],
        "metadata": {"totalEvents": 5, "maxDepthReached": true, "maxLengthReached": false}
    });
    let journal = normalize_journal(&raw.to_string());

    // Metadata preserved verbatim, including the truncation flag.
    assert_eq!(journal.metadata.total_events, 5);
    assert!(journal.metadata.max_depth_reached);

    // Events re-export to exactly the input events.
    let reexported: Vec<Value> = journal.events.iter().map(JournalEvent::to_value).collect();
    assert_eq!(Value::Array(reexported), raw["events"]);
}

#[test]
fn test_canonical_without_metadata_defaults() {
    // The service's serializer emits {"events": ...} with no metadata.
    let journal = normalize_journal(r#"{"events": [{"type": "PRINT", "value": 1}]}"#);
    assert_eq!(journal.metadata.total_events, 0);
    assert!(!journal.metadata.max_depth_reached);
    assert_eq!(journal.metadata.error, None);
}

// =============================================================================
// totalEvents
// =============================================================================

/// The count must equal the node count of the built tree for arbitrarily
/// deep nesting across all three child-bearing keys.
#[test]
fn test_total_events_matches_tree_at_depth() {
    // Alternate children/steps/operations on the way down, 30 levels.
    let keys = ["children", "steps", "operations"];
    let mut node = json!({"value": 0});
    for depth in 1..30 {
        node = json!({"condition": format!("level {depth}"), keys[depth % 3]: [node]});
    }
    let journal = normalize_value(&json!({"name": "deep", "operations": [node]}));

    assert_eq!(journal.metadata.total_events, 30);
    assert_eq!(count_events(&journal.events[0].children), 30);
    // And the whole thing renders without blowing up.
    let text = render_journal(&journal).to_text();
    assert!(text.contains("Return: 0"));
}

#[test]
fn test_total_events_wide_tree() {
    let ops: Vec<Value> = (0..100).map(|i| json!({"value": i})).collect();
    let journal = normalize_value(&Value::Array(ops));
    assert_eq!(journal.metadata.total_events, 100);
    assert_eq!(render_journal(&journal).nodes[0].children.len(), 100);
}

// =============================================================================
// Unknown and hostile events
// =============================================================================

#[test]
fn test_unknown_kind_renders_structural_dump() {
    let journal = normalize_journal(
        r#"{"events": [{"type": "FOO", "mystery": 9, "data": {"a": [1]}}]}"#,
    );
    assert_eq!(
        journal.events[0].kind,
        EventKind::Other("FOO".to_string())
    );
    let text = render_journal(&journal).to_text();
    assert!(text.contains("FOO"));
    assert!(text.contains("mystery: 9"));
    assert!(text.contains("data: {\"a\":[1]}"));
}

#[test]
fn test_scope_end_tags_survive_to_the_dump() {
    // The interpreter also emits end markers; they are not in the render
    // table but must never be dropped.
    let journal = normalize_journal(
        r#"{"events": [
            {"type": "IfEndEvent"},
            {"type": "ForIterationEndEvent"},
            {"type": "FunctionCallEndEvent", "children": [{"type": "PRINT", "value": 3}]}
        ]}"#,
    );
    assert_eq!(journal.events.len(), 3);
    for event in &journal.events {
        assert!(matches!(event.kind, EventKind::Other(_)));
    }
    let text = render_journal(&journal).to_text();
    assert!(text.contains("IfEndEvent"));
    // Unknown kinds still recurse into their children.
    assert!(text.contains("Print: 3"));
}

#[test]
fn test_known_kinds_with_wrong_field_types_render() {
    let journal = normalize_journal(
        r#"{"events": [
            {"type": "SWAP", "var_names": 5, "values": "nope"},
            {"type": "VARIABLE_ASSIGNMENT", "varName": {"x": 1}, "after": [1, 2]},
            {"type": "FUNCTION_CALL", "name": 9, "params": "zap", "return_value": false},
            {"type": "ARRAY_MODIFICATION", "index": [0], "arr_before": null},
            {"type": "FOR", "condition": 17, "iteration_count": "many"},
            {"type": "ERROR"}
        ]}"#,
    );
    let tree = render_journal(&journal);
    assert_eq!(tree.nodes.len(), 6);
    let text = tree.to_text();
    assert!(text.contains("Swap:"));
    assert!(text.contains("for 17 (many iterations)"));
    assert!(text.contains("Error: "));
}

#[test]
fn test_events_that_are_not_objects_render_as_values() {
    let journal = normalize_journal(r#"{"events": [42, "loose text", [1, 2], null]}"#);
    assert_eq!(journal.events.len(), 4);
    for event in &journal.events {
        assert_eq!(event.kind, EventKind::Opaque);
    }
    let text = render_journal(&journal).to_text();
    assert!(text.contains("42"));
    assert!(text.contains("\"loose text\""));
    assert!(text.contains("[1,2]"));
}

// =============================================================================
// Legacy shapes through the full pipeline
// =============================================================================

#[test]
fn test_legacy_swap_era_trace_renders() {
    let journal = normalize_journal(
        r#"{
            "algorithm": "Bubble Sort",
            "steps": [
                {"condition": "arr[j] > arr[j+1]", "hit": true, "steps": [
                    {"variable": "arr[j]", "before": 5, "after": 2, "displayValue": "2"}
                ]},
                {"loop": "j < n - 1"},
                {"return": "[2, 5]"}
            ]
        }"#,
    );
    assert_eq!(journal.metadata.total_events, 4);

    let text = render_journal(&journal).to_text();
    assert!(text.contains("Bubble Sort"));
    assert!(text.contains("If arr[j] > arr[j+1]: True ✓"));
    assert!(text.contains("arr[j] = 2 (was: 5)"));
    assert!(text.contains("while j < n - 1"));
    assert!(text.contains("Return: \"[2, 5]\""));
}

#[test]
fn test_variable_before_null_vs_real_value() {
    let with_null = normalize_value(&json!([{"variable": "x", "value": 1, "before": null}]));
    let text = render_journal(&with_null).to_text();
    assert!(text.contains("x = 1"));
    assert!(!text.contains("was:"), "null before must omit the suffix");

    let with_before = normalize_value(&json!([{"variable": "x", "value": 1, "before": 3}]));
    let text = render_journal(&with_before).to_text();
    assert!(text.contains("x = 1 (was: 3)"));
}

#[test]
fn test_falsy_values_are_present() {
    // JS truthiness would have dropped these to their fallbacks; presence
    // semantics keeps them.
    let journal = normalize_value(&json!([
        {"condition": "done", "result": false, "hit": true},
        {"variable": "count", "value": 0}
    ]));
    let children = &journal.events[0].children;
    assert_eq!(children[0].fields.get("result"), Some(&json!(false)));
    assert_eq!(children[1].fields.get("after"), Some(&json!(0)));

    let text = render_journal(&journal).to_text();
    assert!(text.contains("If done: False ✗"));
    assert!(text.contains("count = 0"));
}

#[test]
fn test_opaque_wrap_keeps_unrecognized_object_whole() {
    let journal = normalize_journal(r#"{"status": "weird", "payload": {"k": [true]}}"#);
    assert_eq!(journal.metadata.total_events, 1);

    let wrapper = &journal.events[0];
    assert_eq!(
        wrapper.fields.get("name"),
        Some(&json!("Execution Trace"))
    );
    let child = &wrapper.children[0];
    assert_eq!(child.fields.get("status"), Some(&json!("weird")));
    assert_eq!(child.fields.get("payload"), Some(&json!({"k": [true]})));

    let text = render_journal(&journal).to_text();
    assert!(text.contains("status: \"weird\""));
}
