pub mod generation;
pub mod scheduler;
pub mod timetable_store;

pub use generation::{GenerationReport, GenerationService, SkippedCandidate};
pub use scheduler::GenerationScheduler;
pub use timetable_store::TimetableStore;
