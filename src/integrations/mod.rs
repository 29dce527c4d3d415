//! External integrations module.
//!
//! Provides integration with image hosting (ImgBB) and LLM tracing
//! (LangFuse).

pub mod imgbb;
pub mod langfuse;

pub use imgbb::{ImgbbClient, ImgbbError};
pub use langfuse::{Generation, LangfuseClient, LangfuseError};
