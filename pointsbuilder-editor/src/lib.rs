//! PointsBuilder Editor - everything around the node-tree engine
//!
//! This crate provides:
//! - Project files (JSON) with lenient, normalizing loading
//! - Bounded undo/redo history of tree snapshots
//! - An editing session that re-evaluates and re-emits after every edit
//! - Export of the emitted program as a complete Kotlin source file
//! - A verifier that replays emitted Kotlin and compares it to evaluation
//! - A runner binary for headless evaluation, export and simulation

pub mod code_export;
pub mod history;
pub mod kotlin_validate;
pub mod project;
pub mod session;

pub use code_export::{generate_code, ExportOptions};
pub use history::{History, HistoryConfig, HistoryError};
pub use kotlin_validate::{verify_commands, verify_geometry, VerifyError};
pub use project::{ProjectError, ProjectFile, Tool};
pub use session::Session;
