//! Rewrite selected text (shorten, simplify, fix grammar) through a
//! text-completion API.

pub mod cli;
pub mod completion;
pub mod config;
pub mod dispatcher;
pub mod host;
pub mod logging;

pub use completion::{CompletionService, OpenAiClient, RequestResult, TextIntent};
pub use dispatcher::Dispatcher;
