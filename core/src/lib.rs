//! Root of the `quill-core` library: the reference-token grammar, label
//! resolution, the token-aware text buffer and the overlay segmenter.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the front end or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod buffer;
pub mod catalog;
pub mod catalog_search;
pub mod config;
pub mod error;
pub mod grammar;
pub mod resolver;
pub mod segment;

pub use buffer::CaretMove;
pub use buffer::TokenBuffer;
pub use grammar::ReferenceToken;
pub use grammar::decode;
pub use grammar::encode;
pub use segment::Segment;
pub use segment::segment;

pub use quill_protocol::ChapterVariant;
pub use quill_protocol::EntityCatalog;
pub use quill_protocol::RefKind;
pub use quill_protocol::Reference;
