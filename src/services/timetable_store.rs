use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::conflict::{self, Conflict, ConflictKind};
use crate::db::repository;
use crate::directory::ResourceDirectory;
use crate::error::AppError;
use crate::models::{NewEntryRequest, TimetableEntry, TimetableEntryView};

/// The authoritative entry store. Every admission is validate, check and
/// insert inside one transaction, with at most one writer at a time.
#[derive(Clone)]
pub struct TimetableStore {
    db: SqlitePool,
    write_lock: Arc<Mutex<()>>,
    generation_lock: Arc<Mutex<()>>,
}

impl TimetableStore {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
            generation_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub async fn directory(&self) -> Result<ResourceDirectory, AppError> {
        ResourceDirectory::load(&self.db).await
    }

    pub async fn entries(&self) -> Result<Vec<TimetableEntry>, AppError> {
        Ok(repository::fetch_entries(&self.db).await?)
    }

    pub async fn entry_views(&self) -> Result<Vec<TimetableEntryView>, AppError> {
        Ok(repository::fetch_entry_views(&self.db).await?)
    }

    pub async fn entry_views_for_group(
        &self,
        student_group_id: &str,
    ) -> Result<Vec<TimetableEntryView>, AppError> {
        Ok(repository::fetch_entry_views_for_group(&self.db, student_group_id).await?)
    }

    /// Claims the single generation run; `Busy` while another one holds it.
    pub fn try_begin_generation(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.generation_lock
            .try_lock()
            .map_err(|_| AppError::Busy("timetable generation already in progress".to_string()))
    }

    pub async fn create_entry(
        &self,
        req: &NewEntryRequest,
        is_locked: bool,
    ) -> Result<TimetableEntry, AppError> {
        let directory = self.directory().await?;
        directory.validate(req)?;

        let _writer = self.write_lock.lock().await;
        let mut tx = self.db.begin().await?;

        let booked = repository::fetch_entries_in_slot(&mut *tx, &req.time_slot_id).await?;
        conflict::check(req, &booked)?;

        let inserted = repository::insert_entry(&mut *tx, req, is_locked).await;
        let entry = match inserted {
            Ok(entry) => entry,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let message = db_err.message().to_string();
                drop(tx);
                return Err(self.conflict_after_race(req, &message).await);
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        info!(
            "Stored entry {} (slot {}, locked: {})",
            entry.id, entry.time_slot_id, entry.is_locked
        );
        Ok(entry)
    }

    pub async fn delete_entry(&self, id: &str) -> Result<(), AppError> {
        let _writer = self.write_lock.lock().await;
        if repository::delete_entry(&self.db, id).await? {
            info!("Deleted entry {}", id);
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    /// Turns a unique-index rejection back into a structured conflict.
    async fn conflict_after_race(&self, req: &NewEntryRequest, db_message: &str) -> AppError {
        warn!("Unique index rejected entry for slot {}: {}", req.time_slot_id, db_message);

        let booked = match self.db.acquire().await {
            Ok(mut conn) => repository::fetch_entries_in_slot(&mut *conn, &req.time_slot_id)
                .await
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        if let Err(conflict) = conflict::check(req, &booked) {
            return AppError::Conflict(conflict);
        }

        let kind = if db_message.contains("faculty_id") {
            ConflictKind::Faculty
        } else if db_message.contains("classroom_id") {
            ConflictKind::Classroom
        } else {
            ConflictKind::Group
        };
        AppError::Conflict(Conflict {
            kind,
            with_entry_id: None,
        })
    }
}
