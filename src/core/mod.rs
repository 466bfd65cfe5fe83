//! Core extraction engine.
//!
//! The scan pipeline runs in two layers per file: a raw-text pass that finds
//! translation function calls with a token-balancing matcher, and a
//! syntax-tree pass that finds translated-markup components and translation
//! results flowing through variables. Both feed the same entry sink.

pub mod entry;
pub mod file_scanner;
pub mod invocation;
pub mod key;
pub mod markup;
pub mod parsers;
pub mod pattern;
pub mod scan;

pub use entry::{EntrySink, ScanCollector, TranslationEntry};
pub use key::{KeyRegistry, base_key, hash_key};
pub use scan::{ScanRun, scan_sources};
