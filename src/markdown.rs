//! Markdown parsing and rendering.
//!
//! A document is split into its [`front_matter`] and body, fields are pulled
//! out of the body by the [`extract`] pipeline, and the resulting
//! [`DocumentModel`](crate::DocumentModel) is rendered back by [`assemble`].

pub mod assemble;
pub mod extract;
pub mod front_matter;

pub use front_matter::{FrontMatter, Value};
