//! Prompt assembly for a single chat turn.
//!
//! | Part | Source | Bound |
//! |------|--------|-------|
//! | System | Session settings | Fixed |
//! | History | Conversation memory | Last `history_limit` messages |
//! | Knowledge | Knowledge index | `top_k` chunks |
//! | Web | Web search (optional) | `search_max_results` snippets of `snippet_chars` |

pub mod assembler;

pub use assembler::{
    AssembledPrompt, AssemblyError, AssemblyMetadata, AssemblySettings, ContextAssembler,
};
