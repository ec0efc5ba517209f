//! Boundary-aware hashing and polyglot symbol extraction

pub mod body;
pub mod ctags;
pub mod extractor;
pub mod hasher;
pub mod languages;
pub mod native;
pub mod polyglot;
pub mod walker;

#[cfg(test)]
pub mod tests;

pub use body::get_symbol_body;
pub use ctags::CtagsParser;
pub use extractor::{LanguageExtractor, SymbolExtractor};
pub use hasher::{ALGORITHM, ContentHasher, DirDigest};
pub use native::NativeParser;
pub use polyglot::PolyglotParser;
pub use walker::{ScopedFile, collect_scoped_files};
