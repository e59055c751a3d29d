mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use timetable_backend::conflict::{self, ConflictKind};
use timetable_backend::error::AppError;
use timetable_backend::generator::{GenerateRequest, GenerateResponse, TimetableGenerator};
use timetable_backend::services::{GenerationService, TimetableStore};

/// Returns a fixed answer and counts how often it was asked.
struct ScriptedGenerator {
    response: Result<GenerateResponse, String>,
    calls: AtomicUsize,
    last_existing: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(response: Result<GenerateResponse, String>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: AtomicUsize::new(0),
            last_existing: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TimetableGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_existing
            .store(request.existing_entries.len(), Ordering::SeqCst);
        self.response.clone().map_err(AppError::Network)
    }
}

#[tokio::test]
async fn test_conflicting_candidate_is_skipped_and_rest_admitted() {
    let pool = common::setup_test_db().await;
    let seed = common::seed(&pool).await;
    let store = TimetableStore::new(pool);

    let locked = store
        .create_entry(&seed.entry(&seed.mon_9, 0, 0, 0), true)
        .await
        .expect("Failed to create locked entry");

    let generator = ScriptedGenerator::new(Ok(GenerateResponse::Success {
        schedule: vec![
            seed.entry(&seed.mon_9, 1, 1, 1),
            seed.entry(&seed.mon_10, 0, 0, 0),
            seed.entry(&seed.mon_9, 2, 0, 2),
        ],
    }));
    let service = GenerationService::new(store.clone(), generator.clone());

    let report = service.run().await.expect("Generation failed");

    assert_eq!(generator.last_existing.load(Ordering::SeqCst), 1);
    assert_eq!(report.admitted.len(), 2);
    assert!(report.admitted.iter().all(|e| !e.is_locked));
    assert_eq!(report.skipped.len(), 1);
    let skipped = report.skipped[0].conflict.as_ref().expect("conflict detail");
    assert_eq!(skipped.kind, ConflictKind::Classroom);
    assert_eq!(skipped.with_entry_id.as_deref(), Some(locked.id.as_str()));

    assert_eq!(report.timetable.len(), 3);
    assert!(report.timetable.iter().any(|e| e.id == locked.id && e.is_locked));

    let stored = store.entries().await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(conflict::find_violations(&stored).is_empty());
}

#[tokio::test]
async fn test_generator_error_status_submits_nothing() {
    let pool = common::setup_test_db().await;
    let seed = common::seed(&pool).await;
    let store = TimetableStore::new(pool);
    store.create_entry(&seed.entry(&seed.mon_9, 0, 0, 0), true).await.unwrap();

    let generator = ScriptedGenerator::new(Ok(GenerateResponse::Error {
        message: Some("no feasible assignment".to_string()),
    }));
    let service = GenerationService::new(store.clone(), generator);

    let err = service.run().await.unwrap_err();
    assert!(matches!(err, AppError::Generator(ref msg) if msg == "no feasible assignment"));
    assert_eq!(store.entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_generator_network_failure_submits_nothing() {
    let pool = common::setup_test_db().await;
    let _seed = common::seed(&pool).await;
    let store = TimetableStore::new(pool);

    let generator = ScriptedGenerator::new(Err("connection refused".to_string()));
    let service = GenerationService::new(store.clone(), generator.clone());

    assert!(matches!(service.run().await, Err(AppError::Network(_))));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert!(store.entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicates_within_one_batch_keep_the_first() {
    let pool = common::setup_test_db().await;
    let seed = common::seed(&pool).await;
    let store = TimetableStore::new(pool);

    let candidate = seed.entry(&seed.mon_10, 2, 2, 2);
    let generator = ScriptedGenerator::new(Ok(GenerateResponse::Success {
        schedule: vec![candidate.clone(), candidate],
    }));
    let report = GenerationService::new(store.clone(), generator)
        .run()
        .await
        .unwrap();

    assert_eq!(report.admitted.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].conflict.as_ref().map(|c| c.kind),
        Some(ConflictKind::Faculty)
    );
}

#[tokio::test]
async fn test_unknown_references_are_skipped_not_fatal() {
    let pool = common::setup_test_db().await;
    let seed = common::seed(&pool).await;
    let store = TimetableStore::new(pool);

    let mut bogus = seed.entry(&seed.mon_9, 0, 0, 0);
    bogus.classroom_id = "room-that-does-not-exist".to_string();
    let generator = ScriptedGenerator::new(Ok(GenerateResponse::Success {
        schedule: vec![bogus, seed.entry(&seed.mon_9, 1, 1, 1)],
    }));
    let report = GenerationService::new(store, generator).run().await.unwrap();

    assert_eq!(report.admitted.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].conflict.is_none());
}

#[tokio::test]
async fn test_store_failure_on_one_candidate_does_not_abort_batch() {
    let pool = common::setup_test_db().await;
    let seed = common::seed(&pool).await;

    sqlx::query(&format!(
        "CREATE TRIGGER room_closed BEFORE INSERT ON timetable_entries \
         WHEN NEW.classroom_id = '{}' BEGIN SELECT RAISE(ABORT, 'room closed'); END",
        seed.rooms[1]
    ))
    .execute(&pool)
    .await
    .expect("Failed to create trigger");

    let store = TimetableStore::new(pool);
    let generator = ScriptedGenerator::new(Ok(GenerateResponse::Success {
        schedule: vec![
            seed.entry(&seed.mon_9, 0, 0, 0),
            seed.entry(&seed.mon_9, 1, 1, 1),
            seed.entry(&seed.mon_10, 2, 2, 2),
        ],
    }));
    let service = GenerationService::new(store.clone(), generator);

    let report = service.run().await.expect("Generation failed");

    assert_eq!(report.admitted.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].candidate.classroom_id, seed.rooms[1]);
    assert!(report.skipped[0].reason.contains("room closed"));
    assert!(report.skipped[0].conflict.is_none());
    assert_eq!(report.timetable.len(), 2);
    assert_eq!(store.entries().await.unwrap().len(), 2);
}
