use std::sync::Arc;

use crate::generator::TimetableGenerator;
use crate::services::{GenerationService, TimetableStore};

#[derive(Clone)]
pub struct AppState {
    pub store: TimetableStore,
    pub generator: Arc<dyn TimetableGenerator>,
}

impl AppState {
    pub fn new(store: TimetableStore, generator: Arc<dyn TimetableGenerator>) -> Self {
        Self { store, generator }
    }

    pub fn generation(&self) -> GenerationService {
        GenerationService::new(self.store.clone(), self.generator.clone())
    }
}
