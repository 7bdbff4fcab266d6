//! Template rendering
//!
//! Substitutes resolved bindings into the textual tokens of an XML
//! template and writes the populated document.

pub mod renderer;

pub use renderer::{substitute_tokens, TemplateRenderer};
