//! The chat turn pipeline for Stellar.
//!
//! Each turn follows **Retrieve → Assemble → Generate → Record**:
//!
//! 1. **Retrieve** knowledge chunks and, on request, web snippets
//! 2. **Assemble** the system instruction, recent history and the
//!    context-augmented question into one prompt
//! 3. **Generate** the answer with a single bounded model call
//! 4. **Record** the exchange in conversation memory
//!
//! Evidence sources degrade instead of failing: a broken web search or
//! knowledge lookup removes that block from the prompt and nothing else.
//! A failed model call produces an error reply and leaves memory as it was.

pub mod context;
pub mod generator;
pub mod reply;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{
    AssembledPrompt, AssemblyError, AssemblyMetadata, AssemblySettings, ContextAssembler,
};
pub use generator::{GenerationError, ResponseGenerator};
pub use reply::Reply;
pub use session::{ChatSession, ChatSessionBuilder, SessionError};
