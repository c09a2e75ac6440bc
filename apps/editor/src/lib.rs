//! Headless resume-editor engine: a multi-step builder over a remote
//! persistence API, with per-section dirty tracking, a save/reset protocol,
//! and a measurement-driven pagination model for the live preview.
//!
//! The engine is UI-agnostic. A frontend owns an [`session::EditorSession`],
//! feeds user edits into the document slices, and drives saves, step
//! navigation and preview measurement through session methods.

pub mod config;
pub mod editing;
pub mod errors;
pub mod import;
pub mod models;
pub mod preview;
pub mod session;
pub mod store;
pub mod wizard;

pub use config::{Config, SessionContext};
pub use errors::EditorError;
pub use models::{LocalId, ResumeDocument, ServerId};
pub use session::EditorSession;
