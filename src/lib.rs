//! Sickle - i18n entry harvester and translation project reconciler
//!
//! Sickle scans a JS/TS/JSX/TSX source tree for translation-marker calls and
//! translated-markup components, derives stable content-addressed keys, and
//! reconciles the result against a persisted multi-language translation
//! project. It emits per-language resource files, a translation-effort
//! statistics artifact, and advisory reports for unmarked native text.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands, reporting, exit codes)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (key derivation, raw-text and AST scanners)
//! - `findings`: Finding types and the per-run collector
//! - `lint`: Advisory linter for unmarked native-script text
//! - `reconcile`: Scan-vs-project reconciliation and artifact writing
//! - `store`: The durable translation project store
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod findings;
pub mod lint;
pub mod reconcile;
pub mod store;
pub mod utils;
