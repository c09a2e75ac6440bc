pub mod document;
pub mod ids;

pub use document::ResumeDocument;
pub use ids::{LocalId, ServerId};
