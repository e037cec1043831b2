//! Journal Data Model, Normalization, and Rendering
//!
//! One completed task produces one journal: a recursive tree of execution
//! events. The service has emitted several shapes for it over time, so the
//! pipeline here is deliberately defensive:
//!
//! 1. [`normalize_journal`] coerces any raw payload - canonical journals,
//!    legacy algorithm traces, bare arrays, arbitrary JSON, or text that
//!    is not JSON at all - into one canonical [`Journal`]. Total function.
//! 2. [`render_journal`] maps the canonical tree to a [`DisplayTree`],
//!    dispatching on a closed kind table with a structural-dump fallback
//!    for anything it does not recognize. Also total.
//!
//! Nothing between a raw result payload and the screen can fail.

pub mod events;
pub mod normalize;
pub mod render;

pub use events::{count_events, EventKind, Journal, JournalEvent, JournalMetadata};
pub use normalize::{normalize_journal, normalize_value};
pub use render::{render_journal, DisplayNode, DisplayTree};
