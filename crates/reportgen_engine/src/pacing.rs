use std::time::Duration;

/// Timing of the progress display around one request.
#[derive(Debug, Clone)]
pub struct PacingSettings {
    /// How long each intermediate stage is shown while the service works.
    pub stage_interval: Duration,
    /// Pause on the final stage before the result is revealed.
    pub reveal_delay: Duration,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            stage_interval: Duration::from_secs(4),
            reveal_delay: Duration::from_millis(500),
        }
    }
}

impl PacingSettings {
    pub fn immediate() -> Self {
        Self {
            stage_interval: Duration::ZERO,
            reveal_delay: Duration::ZERO,
        }
    }
}

/// Source of waiting, swappable so tests never sleep for real.
#[async_trait::async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait::async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
