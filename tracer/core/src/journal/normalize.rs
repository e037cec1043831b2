//! Journal Normalization
//!
//! Coerces an arbitrary raw result payload into one canonical [`Journal`].
//! The service's completed responses have carried several shapes over
//! time - canonical journals, legacy algorithm traces with `operations`
//! or `steps` arrays, bare arrays, and occasionally plain text mixed with
//! diagnostics - and this module absorbs all of them.
//!
//! # Input Variants
//!
//! Classification runs in priority order:
//!
//! 1. **Canonical** - an object whose `events` key holds an array: passed
//!    through as-is, provided metadata preserved.
//! 2. **Legacy trace** - an object with `algorithm`, `name`, or
//!    `type == "EXECUTING"`: wrapped in one `EXECUTING` event whose
//!    children are the adapted operations.
//! 3. **Raw array** - wrapped the same way under the name `"Algorithm"`.
//! 4. **Opaque** - anything else: wrapped under `"Execution Trace"` with
//!    the raw value as the single child.
//!
//! [`normalize_journal`] never fails. Text that does not parse as JSON
//! becomes a journal with a single synthetic error event carrying the
//! parser message and the original input verbatim.
//!
//! Throughout this module "present" means the key exists with a non-null
//! value; real falsy values (`false`, `0`, `""`) count as present.

use chrono::Utc;
use serde_json::{Map, Value};

use super::events::{count_events, EventKind, Journal, JournalEvent, JournalMetadata};

/// Coerce a raw string payload into a canonical journal
///
/// Total function: any input produces a valid [`Journal`]. Leading
/// non-JSON text before the first `{` is tolerated (the service's debug
/// handler sometimes prefixes diagnostics).
#[must_use]
pub fn normalize_journal(raw: &str) -> Journal {
    let cleaned = strip_leading_noise(raw);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => normalize_value(&value),
        Err(err) => {
            tracing::warn!(error = %err, "journal payload was not JSON");
            parse_failure_journal(raw, &err)
        }
    }
}

/// Coerce an already-parsed JSON value into a canonical journal
///
/// The classification half of [`normalize_journal`], exposed for callers
/// that hold the result payload as a [`Value`] straight off the wire.
#[must_use]
pub fn normalize_value(value: &Value) -> Journal {
    // Already in canonical shape: pass through, metadata verbatim.
    if let Some(journal) = Journal::from_value(value) {
        tracing::debug!(events = journal.events.len(), "payload already canonical");
        return journal;
    }

    // Legacy algorithm trace: one wrapper event, adapted operations.
    if let Some(obj) = value.as_object() {
        let is_trace = present(obj, "algorithm").is_some()
            || present(obj, "name").is_some()
            || obj.get("type").and_then(Value::as_str) == Some("EXECUTING");
        if is_trace {
            let name = present(obj, "algorithm")
                .or_else(|| present(obj, "name"))
                .and_then(Value::as_str)
                .unwrap_or("Algorithm");
            let children = trace_operations(obj);
            let total_events = count_events(&children);
            tracing::debug!(name, total_events, "adapted legacy trace");
            return wrapped(name, children, total_events);
        }
    }

    // Bare array: assume a list of operations.
    if let Some(items) = value.as_array() {
        let children: Vec<JournalEvent> = items.iter().map(adapt_operation).collect();
        let total_events = count_events(&children);
        tracing::debug!(total_events, "wrapped bare operation array");
        return wrapped("Algorithm", children, total_events);
    }

    // Anything else: carry the value through unmodified.
    tracing::debug!("wrapped unrecognized payload");
    wrapped("Execution Trace", vec![JournalEvent::from_value(value)], 1)
}

/// Drop diagnostic text before the first `{`
///
/// Applies only when the trimmed input does not already start with `{` or
/// `[`; inputs with no `{` at all pass through untouched.
fn strip_leading_noise(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return raw;
    }
    match raw.find('{') {
        Some(pos) => &raw[pos..],
        None => raw,
    }
}

/// Journal synthesized when the payload is not JSON
///
/// One `EXECUTING` wrapper named for the failure, whose single child is an
/// `ERROR` event carrying the parser message and the input verbatim.
fn parse_failure_journal(raw: &str, err: &serde_json::Error) -> Journal {
    let mut error_fields = Map::new();
    error_fields.insert("type".to_string(), Value::from("ERROR"));
    error_fields.insert(
        "message".to_string(),
        Value::from(format!("Could not parse JSON: {err}")),
    );
    error_fields.insert("raw".to_string(), Value::from(raw));
    error_fields.insert("timestamp".to_string(), now_ms());
    let child = JournalEvent {
        kind: EventKind::Error,
        fields: error_fields,
        children: Vec::new(),
    };

    Journal {
        events: vec![executing_event("Error parsing execution trace", vec![child])],
        metadata: JournalMetadata {
            total_events: 1,
            error: Some(true),
            ..JournalMetadata::default()
        },
    }
}

/// Look up a key that is present with a non-null value
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match obj.get(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    }
}

/// Current wall-clock time in milliseconds since the epoch
fn now_ms() -> Value {
    Value::from(Utc::now().timestamp_millis())
}

/// Synthesized top-level wrapper event
fn executing_event(name: &str, children: Vec<JournalEvent>) -> JournalEvent {
    let mut fields = Map::new();
    fields.insert("type".to_string(), Value::from("EXECUTING"));
    fields.insert("name".to_string(), Value::from(name));
    fields.insert("timestamp".to_string(), now_ms());
    JournalEvent {
        kind: EventKind::Executing,
        fields,
        children,
    }
}

/// Journal with one wrapper event
///
/// `total_events` is the node count of the built children subtree, wrapper
/// excluded - counted on the output tree so the count and the rendered
/// tree can never diverge.
fn wrapped(name: &str, children: Vec<JournalEvent>, total_events: u64) -> Journal {
    Journal {
        events: vec![executing_event(name, children)],
        metadata: JournalMetadata {
            total_events,
            ..JournalMetadata::default()
        },
    }
}

/// Operations of a legacy trace object
///
/// First of `operations`/`steps`/`children` that holds an array; a present
/// but non-array value is skipped. Note the key order differs from the
/// per-operation recursion below, matching the historical payloads each
/// position saw.
fn trace_operations(obj: &Map<String, Value>) -> Vec<JournalEvent> {
    for key in ["operations", "steps", "children"] {
        if let Some(Value::Array(items)) = obj.get(key) {
            return items.iter().map(adapt_operation).collect();
        }
    }
    Vec::new()
}

/// Child events of one adapted operation
///
/// First of `children`/`steps`/`operations` that holds an array.
fn operation_children(obj: &Map<String, Value>) -> Vec<JournalEvent> {
    for key in ["children", "steps", "operations"] {
        if let Some(Value::Array(items)) = obj.get(key) {
            return items.iter().map(adapt_operation).collect();
        }
    }
    Vec::new()
}

/// Map one heterogeneous legacy operation onto the canonical field set
///
/// Branches are checked in order; the first matching shape wins. Adapted
/// nodes carry only the canonical fields (plus `type` and `timestamp`) -
/// unrecognized input fields do not survive this adapter, unlike the
/// opaque wrap path which keeps everything.
fn adapt_operation(op: &Value) -> JournalEvent {
    let Some(obj) = op.as_object() else {
        // Bare scalars inside an operation list carry no shape to adapt.
        return JournalEvent::from_value(op);
    };

    let input_tag = obj.get("type").and_then(Value::as_str);
    let mut fields = Map::new();
    fields.insert(
        "timestamp".to_string(),
        present(obj, "timestamp").cloned().unwrap_or_else(now_ms),
    );

    let kind = if let Some(var) = present(obj, "variable").or_else(|| present(obj, "varName")) {
        fields.insert("type".to_string(), Value::from("VARIABLE_ASSIGNMENT"));
        fields.insert("varName".to_string(), var.clone());
        fields.insert(
            "before".to_string(),
            present(obj, "before").cloned().unwrap_or(Value::Null),
        );
        if let Some(after) = present(obj, "after").or_else(|| present(obj, "value")) {
            fields.insert("after".to_string(), after.clone());
        }
        if let Some(value) = present(obj, "displayValue").or_else(|| present(obj, "value")) {
            fields.insert("value".to_string(), value.clone());
        }
        EventKind::VariableAssignment
    } else if let Some(condition) = present(obj, "condition") {
        let tag = input_tag.unwrap_or("CONDITION");
        fields.insert("type".to_string(), Value::from(tag));
        fields.insert("condition".to_string(), condition.clone());
        if let Some(result) = present(obj, "result").or_else(|| present(obj, "hit")) {
            fields.insert("result".to_string(), result.clone());
        }
        EventKind::parse(tag)
    } else if let Some(loop_condition) = present(obj, "loop") {
        fields.insert("type".to_string(), Value::from("WHILE_START"));
        fields.insert("condition".to_string(), loop_condition.clone());
        EventKind::WhileStart
    } else if present(obj, "return").is_some() || present(obj, "value").is_some() {
        fields.insert("type".to_string(), Value::from("RETURN"));
        if let Some(value) = present(obj, "return").or_else(|| present(obj, "value")) {
            fields.insert("value".to_string(), value.clone());
        }
        if let Some(returned) = present(obj, "returnedValue")
            .or_else(|| present(obj, "actualValue"))
            .or_else(|| present(obj, "value"))
        {
            fields.insert("returnedValue".to_string(), returned.clone());
        }
        EventKind::Return
    } else {
        let tag = input_tag.unwrap_or("STEP");
        fields.insert("type".to_string(), Value::from(tag));
        EventKind::parse(tag)
    };

    JournalEvent {
        kind,
        fields,
        children: operation_children(obj),
    }
}
