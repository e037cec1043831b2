//! Journal Rendering
//!
//! Pure mapping from a canonical [`Journal`] to a [`DisplayTree`] - a
//! UI-neutral nested structure of text lines any surface can draw. No
//! network, no mutation, and no way to fail: every kind in the closed
//! table has a text format, and everything else goes through a structural
//! dump that renders any field set.
//!
//! Two stringification registers, matching the historical display:
//! fields the formats JSON-stringify keep JSON syntax (strings quoted),
//! fields they interpolate raw show bare string content. Condition
//! results coerce to a boolean with JS truthiness, so `0`, `""`, `null`,
//! and a missing result all read as `False`.

use serde_json::Value;

use super::events::{EventKind, Journal, JournalEvent};

/// Rendered journal: nested display nodes plus surfaced metadata
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayTree {
    /// Top-level nodes, one per top-level journal event
    pub nodes: Vec<DisplayNode>,
    /// Total event count reported by the journal's metadata
    pub total_events: u64,
    /// The service truncated the trace (depth or length limit)
    pub truncated: bool,
    /// The journal records a failure
    pub error: bool,
}

/// One rendered node
///
/// `text` is the node's display line; dump-fallback nodes are multi-line.
/// `expanded` is a display toggle only - collapsing hides children from
/// the text projection, it never discards them.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayNode {
    /// Kind of the event this node renders
    pub kind: EventKind,
    /// Display text
    pub text: String,
    /// Rendered children, empty for leaf kinds
    pub children: Vec<DisplayNode>,
    /// Whether children are shown (default true)
    pub expanded: bool,
}

impl DisplayNode {
    /// Flip the expand/collapse toggle
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Nodes in this subtree, this node included
    #[must_use]
    pub fn subtree_size(&self) -> u64 {
        1 + self.children.iter().map(Self::subtree_size).sum::<u64>()
    }

    fn write_text(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for line in self.text.lines() {
            out.push_str(&indent);
            out.push_str(line);
            out.push('\n');
        }
        if self.children.is_empty() {
            return;
        }
        if self.expanded {
            for child in &self.children {
                child.write_text(out, depth + 1);
            }
        } else {
            out.push_str(&indent);
            out.push_str(&format!("  … ({} collapsed)\n", self.children.len()));
        }
    }
}

impl DisplayTree {
    /// Textual projection of the tree
    ///
    /// Two-space indentation per depth, one line per node (dump nodes are
    /// multi-line); collapsed nodes show a marker in place of their
    /// children. Used by tests and debug surfaces.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_text(&mut out, 0);
        }
        out
    }
}

/// Render a journal to a display tree
///
/// Total function: any journal - hostile field shapes and unknown kinds
/// included - produces a tree.
#[must_use]
pub fn render_journal(journal: &Journal) -> DisplayTree {
    DisplayTree {
        nodes: journal.events.iter().map(render_event).collect(),
        total_events: journal.metadata.total_events,
        truncated: journal.metadata.max_depth_reached || journal.metadata.max_length_reached,
        error: journal.metadata.error.unwrap_or(false),
    }
}

fn render_event(event: &JournalEvent) -> DisplayNode {
    let children = if event.kind.renders_children() {
        event.children.iter().map(render_event).collect()
    } else {
        Vec::new()
    };
    // Empty-string fields (e.g. a nameless wrapper) must not produce a
    // blank display line.
    let mut text = event_text(event);
    if text.is_empty() {
        text = event.kind.label().to_string();
    }
    DisplayNode {
        kind: event.kind.clone(),
        text,
        children,
        expanded: true,
    }
}

/// JSON stringification: strings keep their quotes
fn json(value: &Value) -> String {
    value.to_string()
}

/// Raw interpolation: strings show bare content
fn raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JS truthiness, used for condition results
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Elements of an array field, or empty when absent/not an array
fn array_field<'a>(event: &'a JournalEvent, name: &str) -> &'a [Value] {
    match event.field(name) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn join_json(values: &[Value]) -> String {
    values.iter().map(json).collect::<Vec<_>>().join(", ")
}

fn event_text(event: &JournalEvent) -> String {
    match &event.kind {
        EventKind::Executing | EventKind::Step => {
            let mut text = event
                .field("name")
                .map(raw)
                .unwrap_or_else(|| event.kind.label().to_string());
            if event.field("params").is_some() {
                text.push_str(&format!("({})", join_json(array_field(event, "params"))));
            }
            text
        }

        EventKind::FunctionCall => {
            let name = event.field("name").map(raw).unwrap_or_default();
            let mut text = format!("{name}({})", join_json(array_field(event, "params")));
            if let Some(ret) = event.field("return_value") {
                text.push_str(&format!(" → {}", json(ret)));
            }
            text
        }

        EventKind::VariableAssignment => {
            let var = event
                .field("varName")
                .or_else(|| event.field("var_name"))
                .map(raw)
                .unwrap_or_default();
            let after = event
                .field("after")
                .map_or_else(|| "null".to_string(), json);
            let mut text = format!("{var} = {after}");
            if let Some(before) = event.field("before") {
                text.push_str(&format!(" (was: {})", json(before)));
            }
            text
        }

        EventKind::Condition | EventKind::If => {
            let result = truthy(event.field("result").or_else(|| event.field("hit")));
            let outcome = if result { "True ✓" } else { "False ✗" };
            match event.field("condition") {
                Some(condition) => format!("If {}: {outcome}", raw(condition)),
                None => format!("If: {outcome}"),
            }
        }

        EventKind::Else => "Else block".to_string(),

        EventKind::WhileStart | EventKind::ForStart => {
            let keyword = if event.kind == EventKind::ForStart {
                "for"
            } else {
                "while"
            };
            let condition = event.field("condition").map(raw).unwrap_or_default();
            let mut text = format!("{keyword} {condition}");
            if let Some(count) = event.field("iteration_count") {
                text.push_str(&format!(" ({} iterations)", raw(count)));
            }
            text
        }

        EventKind::ForIteration => {
            let iterator = event
                .field("iterator")
                .map_or_else(|| "null".to_string(), json);
            format!("Iteration: {iterator}")
        }

        EventKind::WhileIteration => "While Iteration".to_string(),

        EventKind::ForEnd => match event
            .field("iterations")
            .or_else(|| event.field("iteration_count"))
        {
            Some(count) => format!("End of loop ({} iterations)", raw(count)),
            None => "End of loop".to_string(),
        },

        EventKind::Return => {
            let value = event
                .field("value")
                .or_else(|| event.field("returnedValue"))
                .map_or_else(|| "null".to_string(), json);
            format!("Return: {value}")
        }

        EventKind::Print => {
            let value = event
                .field("value")
                .map_or_else(|| "null".to_string(), json);
            format!("Print: {value}")
        }

        EventKind::Error => {
            let info = event
                .field("info")
                .or_else(|| event.field("message"))
                .map(raw)
                .unwrap_or_default();
            format!("Error: {info}")
        }

        EventKind::Swap => {
            let names = array_field(event, "var_names");
            let values = array_field(event, "values");
            let name = |i: usize| names.get(i).map(raw).unwrap_or_default();
            let value = |i: usize| {
                values
                    .get(i)
                    .map_or_else(|| "null".to_string(), json)
            };
            format!(
                "Swap: {} ↔ {} ({} ↔ {})",
                name(0),
                name(1),
                value(0),
                value(1)
            )
        }

        EventKind::ArrayModification => {
            let index = event.field("index").map(raw).unwrap_or_default();
            let before = event
                .field("arr_before")
                .map_or_else(|| "null".to_string(), json);
            let after = event
                .field("arr_after")
                .map_or_else(|| "null".to_string(), json);
            format!("Array[{index}] modified from {before} to {after}")
        }

        EventKind::Other(_) | EventKind::Opaque => dump_text(event),
    }
}

/// Structural dump for unrecognized kinds
///
/// Tag line first, then every field except the tag as `key: value`, one
/// per line, sorted by key. An opaque wrapper holding nothing but the raw
/// value shows just the value.
fn dump_text(event: &JournalEvent) -> String {
    if event.kind == EventKind::Opaque && event.fields.len() == 1 {
        if let Some(raw_value) = event.fields.get("raw") {
            return json(raw_value);
        }
    }

    let mut text = event.kind.label().to_string();
    for (key, value) in &event.fields {
        if key == "type" {
            continue;
        }
        text.push_str(&format!("\n  {key}: {}", json(value)));
    }
    text
}
