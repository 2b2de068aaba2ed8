//! Document and code chunker adapters (C4).

mod code;
mod document;
mod splitter;

pub use code::RegexCodeChunker;
pub use document::HeadingAwareDocumentChunker;
