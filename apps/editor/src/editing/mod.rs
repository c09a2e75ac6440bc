pub mod feedback;
pub mod save;
pub mod tracker;
pub mod validation;

pub use feedback::{Feedback, FeedbackBoard, FeedbackKind};
pub use save::{BulkSaveReport, DeletionQueue, EditingState, SaveOutcome, SectionSaver};
pub use tracker::{FieldMap, SnapshotStore, Tracked};
pub use validation::{FieldError, ValidationErrors};
