//! Canonical Journal Event Model
//!
//! One executed program produces one journal: an ordered tree of events.
//! The execution service has emitted several event vocabularies over time
//! (Python class names like `PrintEvent`, then SCREAMING_CASE tags like
//! `PRINT`); this module defines the single vocabulary the rest of the
//! crate speaks.
//!
//! # Design Philosophy
//!
//! Events keep every raw field they arrived with. The kind tag is parsed
//! up front so rendering can dispatch on a closed set, but the field map
//! stays the source of truth: unknown kinds and unknown fields survive
//! normalization untouched and come out through the structural-dump
//! fallback instead of being dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Event Kinds
// ============================================================================

/// Closed set of event kinds the renderer dispatches on
///
/// Anything the parser does not recognize lands in [`EventKind::Other`]
/// (unknown tag string, kept verbatim) or [`EventKind::Opaque`] (no string
/// tag at all). Both render through the structural-dump fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Top-level execution wrapper
    Executing,
    /// Generic step with no recognized shape
    Step,
    /// Function call with name and parameters
    FunctionCall,
    /// A variable took a new value
    VariableAssignment,
    /// Condition evaluation (legacy trace shape)
    Condition,
    /// If branch with a hit/miss outcome
    If,
    /// Else branch
    Else,
    /// While loop header
    WhileStart,
    /// For loop header
    ForStart,
    /// One for-loop iteration
    ForIteration,
    /// One while-loop iteration
    WhileIteration,
    /// For loop finished
    ForEnd,
    /// Return from a function
    Return,
    /// Printed output
    Print,
    /// Execution error reported inside the trace
    Error,
    /// Two variables swapped values
    Swap,
    /// An array element changed
    ArrayModification,
    /// A tag this client does not recognize, kept verbatim
    Other(String),
    /// No string tag at all (raw payloads wrapped by the normalizer)
    Opaque,
}

impl EventKind {
    /// Parse a wire tag
    ///
    /// Accepts both vocabularies the service has used: the interpreter's
    /// Python class names and the newer SCREAMING_CASE tags. Matching is
    /// exact; unknown tags are preserved in `Other`.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "EXECUTING" => Self::Executing,
            "STEP" => Self::Step,
            "FUNCTION_CALL" | "FunctionCallEvent" => Self::FunctionCall,
            "VARIABLE_ASSIGNMENT" | "VariableAssignmentEvent" => Self::VariableAssignment,
            "CONDITION" => Self::Condition,
            "IF" | "IfStartEvent" => Self::If,
            "ELSE" | "ElseStartEvent" => Self::Else,
            "WHILE_START" | "WHILE" => Self::WhileStart,
            "FOR_START" | "FOR" | "ForStartEvent" => Self::ForStart,
            "FOR_ITERATION" | "ForIterationStartEvent" => Self::ForIteration,
            "WHILE_ITERATION" => Self::WhileIteration,
            "FOR_END" | "ForEndEvent" => Self::ForEnd,
            "RETURN" | "ReturnEvent" => Self::Return,
            "PRINT" | "PrintEvent" => Self::Print,
            "ERROR" | "ErrorEvent" => Self::Error,
            "SWAP" | "SwapEvent" => Self::Swap,
            "ARRAY_MODIFICATION" | "ArrayModificationEvent" => Self::ArrayModification,
            _ => Self::Other(tag.to_string()),
        }
    }

    /// Kind from a raw `type` field value
    ///
    /// Non-string and missing tags become `Opaque`.
    #[must_use]
    pub fn from_tag(tag: Option<&Value>) -> Self {
        match tag {
            Some(Value::String(s)) => Self::parse(s),
            _ => Self::Opaque,
        }
    }

    /// The canonical SCREAMING_CASE wire tag, if this kind has one
    #[must_use]
    pub fn canonical_tag(&self) -> Option<&str> {
        match self {
            Self::Executing => Some("EXECUTING"),
            Self::Step => Some("STEP"),
            Self::FunctionCall => Some("FUNCTION_CALL"),
            Self::VariableAssignment => Some("VARIABLE_ASSIGNMENT"),
            Self::Condition => Some("CONDITION"),
            Self::If => Some("IF"),
            Self::Else => Some("ELSE"),
            Self::WhileStart => Some("WHILE_START"),
            Self::ForStart => Some("FOR_START"),
            Self::ForIteration => Some("FOR_ITERATION"),
            Self::WhileIteration => Some("WHILE_ITERATION"),
            Self::ForEnd => Some("FOR_END"),
            Self::Return => Some("RETURN"),
            Self::Print => Some("PRINT"),
            Self::Error => Some("ERROR"),
            Self::Swap => Some("SWAP"),
            Self::ArrayModification => Some("ARRAY_MODIFICATION"),
            Self::Other(s) => Some(s),
            Self::Opaque => None,
        }
    }

    /// Human-readable label for UI headers
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Executing => "Executing",
            Self::Step => "Step",
            Self::FunctionCall => "Function call",
            Self::VariableAssignment => "Assignment",
            Self::Condition => "Condition",
            Self::If => "If",
            Self::Else => "Else",
            Self::WhileStart => "While",
            Self::ForStart => "For",
            Self::ForIteration => "Iteration",
            Self::WhileIteration => "Iteration",
            Self::ForEnd => "Loop end",
            Self::Return => "Return",
            Self::Print => "Print",
            Self::Error => "Error",
            Self::Swap => "Swap",
            Self::ArrayModification => "Array change",
            Self::Other(s) => s,
            Self::Opaque => "Event",
        }
    }

    /// Whether the display tree descends into this kind's children
    ///
    /// Leaf kinds still keep their children in the data model; the
    /// renderer just never shows them.
    #[must_use]
    pub fn renders_children(&self) -> bool {
        match self {
            Self::Executing
            | Self::Step
            | Self::FunctionCall
            | Self::Condition
            | Self::If
            | Self::Else
            | Self::WhileStart
            | Self::ForStart
            | Self::ForIteration
            | Self::WhileIteration
            | Self::Other(_)
            | Self::Opaque => true,
            Self::VariableAssignment
            | Self::ForEnd
            | Self::Return
            | Self::Print
            | Self::Error
            | Self::Swap
            | Self::ArrayModification => false,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Events
// ============================================================================

/// One node in the canonical journal tree
///
/// `fields` carries every raw field the event arrived with (the `type` tag
/// included, so the structural dump can show it); the child-bearing key is
/// lifted out into `children`. Children order is execution order and is
/// preserved exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct JournalEvent {
    /// Parsed kind tag
    pub kind: EventKind,
    /// Raw fields, minus the child-bearing one
    pub fields: Map<String, Value>,
    /// Nested events in execution order
    pub children: Vec<JournalEvent>,
}

impl JournalEvent {
    /// Convert a raw JSON value into a canonical event, losing nothing
    ///
    /// Objects keep all their fields; a `children` array (and only a literal
    /// `children` array — the legacy `steps`/`operations` selection belongs
    /// to the trace adapter, not to raw wrapping) is converted recursively.
    /// A non-array `children` value stays in the field map untouched.
    /// Non-object values become an `Opaque` node holding the value under
    /// `raw`, the same key the parse-failure event uses.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(obj) => {
                let kind = EventKind::from_tag(obj.get("type"));
                let mut fields = Map::new();
                let mut children = Vec::new();
                for (key, val) in obj {
                    if key == "children" {
                        if let Value::Array(items) = val {
                            children = items.iter().map(Self::from_value).collect();
                            continue;
                        }
                    }
                    fields.insert(key.clone(), val.clone());
                }
                Self {
                    kind,
                    fields,
                    children,
                }
            }
            other => {
                let mut fields = Map::new();
                fields.insert("raw".to_string(), other.clone());
                Self {
                    kind: EventKind::Opaque,
                    fields,
                    children: Vec::new(),
                }
            }
        }
    }

    /// Look up a field that is present with a non-null value
    ///
    /// This is the crate-wide presence rule: an explicit JSON `null` counts
    /// as absent, but real falsy values (`false`, `0`, `""`) do not.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Re-export this event as a raw JSON value
    ///
    /// The inverse of [`JournalEvent::from_value`] up to empty-children
    /// elision: a node without children emits no `children` key.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut obj = self.fields.clone();
        if !self.children.is_empty() {
            obj.insert(
                "children".to_string(),
                Value::Array(self.children.iter().map(Self::to_value).collect()),
            );
        }
        Value::Object(obj)
    }

    /// Number of nodes in this subtree, this node included
    #[must_use]
    pub fn subtree_size(&self) -> u64 {
        1 + self.children.iter().map(Self::subtree_size).sum::<u64>()
    }
}

/// Total node count of an event forest
#[must_use]
pub fn count_events(events: &[JournalEvent]) -> u64 {
    events.iter().map(JournalEvent::subtree_size).sum()
}

// ============================================================================
// Journal
// ============================================================================

/// Tree-wide bookkeeping attached to a journal
///
/// Wire names are camelCase. The service's journal serializer emits
/// `{"events": ...}` with no metadata at all, so every field defaults.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JournalMetadata {
    /// Total event nodes in the tree
    pub total_events: u64,
    /// The service truncated the trace at its depth limit
    pub max_depth_reached: bool,
    /// The service truncated the trace at its length limit
    pub max_length_reached: bool,
    /// Set when the journal records a failure (parse fallback included)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
}

/// The canonical recorded execution trace for one completed task
///
/// Created fresh per completed task, never mutated after construction, and
/// discarded when the next run supersedes it.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Journal {
    /// Top-level events; insertion order is chronological
    pub events: Vec<JournalEvent>,
    /// Tree-wide bookkeeping
    pub metadata: JournalMetadata,
}

impl Journal {
    /// Interpret a raw JSON value already in canonical shape
    ///
    /// Returns `Some` only for an object whose `events` key holds an array.
    /// Provided metadata is preserved verbatim; missing or malformed
    /// metadata falls back to defaults rather than failing.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let events = obj.get("events")?.as_array()?;
        let metadata = obj
            .get("metadata")
            .and_then(|m| serde_json::from_value(m.clone()).ok())
            .unwrap_or_default();
        Some(Self {
            events: events.iter().map(JournalEvent::from_value).collect(),
            metadata,
        })
    }

    /// Re-export the journal as a raw JSON value (for raw-view UIs)
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(
            "events".to_string(),
            Value::Array(self.events.iter().map(JournalEvent::to_value).collect()),
        );
        obj.insert(
            "metadata".to_string(),
            serde_json::to_value(&self.metadata).unwrap_or_default(),
        );
        Value::Object(obj)
    }

    /// Total number of event nodes in the tree
    #[must_use]
    pub fn event_count(&self) -> u64 {
        count_events(&self.events)
    }
}
