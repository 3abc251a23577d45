// Article Annotation Pipeline - Server Core
//
// Three webhook stages (summary, action items, flashcards) that read an
// article from the store, generate an annotation with an LLM, post it back
// as a note highlight, and hand off to the next stage over HTTP.

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
