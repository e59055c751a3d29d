use std::time::Duration;

use tracing::{info, warn};

use crate::error::AppError;
use crate::services::generation::GenerationService;

/// Runs the generation workflow on a fixed interval.
pub struct GenerationScheduler {
    service: GenerationService,
    interval: Duration,
}

impl GenerationScheduler {
    pub fn new(service: GenerationService, interval_secs: u64) -> Self {
        Self {
            service,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Loops forever; the first run happens after one interval.
    pub async fn start(self) {
        info!("Starting auto-generate scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match self.service.run().await {
                Ok(report) => {
                    info!(
                        "Auto-generate completed - admitted: {}, skipped: {}",
                        report.admitted.len(),
                        report.skipped.len()
                    );
                }
                Err(AppError::Busy(msg)) => {
                    info!("Auto-generate skipped: {}", msg);
                }
                Err(e) => {
                    warn!("Auto-generate failed: {:?}", e);
                }
            }
        }
    }
}
