//! Shared types for the tinyTalk runtime.
//!
//! This crate defines the syntax tree handed to the runtime by the parser,
//! source spans, and the [`Value`] model shared by the runtime, the standard
//! library and the command-line front end.

mod span;
mod value;
pub mod ast;

pub use span::Span;
pub use value::Value;
