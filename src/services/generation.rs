use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::conflict::Conflict;
use crate::db::repository;
use crate::error::AppError;
use crate::generator::{GenerateRequest, GenerateResponse, TimetableGenerator};
use crate::models::{NewEntryRequest, TimetableEntry, TimetableEntryView};
use crate::services::timetable_store::TimetableStore;

#[derive(Clone)]
pub struct GenerationService {
    store: TimetableStore,
    generator: Arc<dyn TimetableGenerator>,
}

#[derive(Debug, Serialize)]
pub struct SkippedCandidate {
    pub candidate: NewEntryRequest,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<Conflict>,
}

#[derive(Debug, Serialize)]
pub struct GenerationReport {
    pub admitted: Vec<TimetableEntry>,
    pub skipped: Vec<SkippedCandidate>,
    /// The full timetable re-read after all submissions.
    pub timetable: Vec<TimetableEntryView>,
}

impl GenerationService {
    pub fn new(store: TimetableStore, generator: Arc<dyn TimetableGenerator>) -> Self {
        Self { store, generator }
    }

    /// Asks the generator to fill gaps around the current entries and admits
    /// each candidate through the normal create path. A candidate that fails
    /// for any reason is skipped and the rest still proceed; a failed or
    /// unsuccessful generator call stores nothing.
    pub async fn run(&self) -> Result<GenerationReport, AppError> {
        let _generation = self.store.try_begin_generation()?;

        info!("Step 1: Building generator snapshot");
        let request = self.snapshot().await?;

        info!("Step 2: Requesting candidates for {} existing entries", request.existing_entries.len());
        let candidates = match self.generator.generate(&request).await? {
            GenerateResponse::Success { schedule } => schedule,
            GenerateResponse::Error { message } => {
                let message = message.unwrap_or_else(|| "AI generator failed.".to_string());
                warn!("Generator reported failure: {}", message);
                return Err(AppError::Generator(message));
            }
        };

        info!("Step 3: Submitting {} candidates", candidates.len());
        let mut admitted = Vec::new();
        let mut skipped = Vec::new();
        for candidate in candidates {
            match self.store.create_entry(&candidate, false).await {
                Ok(entry) => admitted.push(entry),
                Err(AppError::Conflict(conflict)) => {
                    warn!("Skipping candidate in slot {}: {}", candidate.time_slot_id, conflict);
                    skipped.push(SkippedCandidate {
                        reason: conflict.to_string(),
                        conflict: Some(conflict),
                        candidate,
                    });
                }
                Err(AppError::Validation(reason)) => {
                    warn!("Skipping invalid candidate: {}", reason);
                    skipped.push(SkippedCandidate {
                        candidate,
                        reason,
                        conflict: None,
                    });
                }
                Err(e) => {
                    warn!("Candidate in slot {} failed: {}", candidate.time_slot_id, e);
                    skipped.push(SkippedCandidate {
                        candidate,
                        reason: e.to_string(),
                        conflict: None,
                    });
                }
            }
        }

        info!("Step 4: Re-reading timetable");
        let timetable = self.store.entry_views().await?;

        info!(
            "Generation completed - admitted: {}, skipped: {}, total entries: {}",
            admitted.len(),
            skipped.len(),
            timetable.len()
        );
        Ok(GenerationReport {
            admitted,
            skipped,
            timetable,
        })
    }

    async fn snapshot(&self) -> Result<GenerateRequest, AppError> {
        let db = self.store.db();
        Ok(GenerateRequest {
            time_slots: repository::fetch_time_slots(db).await?,
            courses: repository::fetch_courses(db).await?,
            faculty: repository::fetch_faculty(db)
                .await?
                .into_iter()
                .filter(|f| f.teaches())
                .collect(),
            classrooms: repository::fetch_classrooms(db).await?,
            student_groups: repository::fetch_student_groups(db).await?,
            existing_entries: repository::fetch_entries(db).await?,
        })
    }
}
