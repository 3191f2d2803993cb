//! The outcome of one chat turn, as handed to a front end.

use serde::{Deserialize, Serialize};

use crate::context::AssemblyMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Answer text, or the error text shown in its place.
    pub text: String,
    pub is_error: bool,
    /// Present whenever a prompt was assembled for this turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AssemblyMetadata>,
}

impl Reply {
    pub fn answer(text: impl Into<String>, metadata: AssemblyMetadata) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            metadata: Some(metadata),
        }
    }

    pub fn error(text: impl Into<String>, metadata: Option<AssemblyMetadata>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            metadata,
        }
    }

    /// Word-sized pieces for progressive rendering.
    ///
    /// Each piece keeps its trailing whitespace, so concatenating them
    /// yields `text` exactly.
    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.text.split_inclusive(char::is_whitespace)
    }
}
