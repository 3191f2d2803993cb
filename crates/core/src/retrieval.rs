//! Explicit outcome of an optional evidence source.
//!
//! Retrieval never fails a chat turn. Instead of swallowing errors, sources
//! report one of these variants and the assembler decides what to include.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Retrieval<T> {
    /// The source returned at least one item.
    Found(Vec<T>),
    /// The source answered, with nothing usable.
    Empty,
    /// The source was not requested or is not configured.
    Skipped,
    /// The source failed or timed out; the reason is kept for diagnostics.
    Degraded(String),
}

impl<T> Retrieval<T> {
    /// Wrap a list, mapping an empty one to `Empty`.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Found(items)
        }
    }

    /// The retrieved items; empty for every non-`Found` variant.
    pub fn items(&self) -> &[T] {
        match self {
            Self::Found(items) => items,
            _ => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}
