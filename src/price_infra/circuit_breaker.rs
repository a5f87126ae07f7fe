use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Trips when the upstream reports its request quota exhausted, and stays
/// active for `cooldown`. While active, lookups fail fast as rate-limited
/// without spending another request.
pub struct QuotaBreaker {
    cooldown: Duration,
    tripped_at: Mutex<Option<Instant>>,
}

impl QuotaBreaker {
    pub fn new(cooldown: Duration) -> Self {
        QuotaBreaker {
            cooldown,
            tripped_at: Mutex::new(None),
        }
    }

    pub fn trigger(&self) {
        if self.cooldown.is_zero() {
            return;
        }
        *self.tripped_at.lock() = Some(Instant::now());
        tracing::warn!("Price quota breaker triggered for {:?}", self.cooldown);
    }

    pub fn is_active(&self) -> bool {
        let mut tripped_at = self.tripped_at.lock();
        match *tripped_at {
            Some(at) if at.elapsed() < self.cooldown => true,
            Some(_) => {
                *tripped_at = None;
                tracing::info!("Price quota breaker reset");
                false
            }
            None => false,
        }
    }

    pub fn reset(&self) {
        *self.tripped_at.lock() = None;
        tracing::info!("Price quota breaker reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn breaker_clears_after_cooldown() {
        let breaker = QuotaBreaker::new(Duration::from_secs(60));
        assert!(!breaker.is_active());

        breaker.trigger();
        assert!(breaker.is_active());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(breaker.is_active());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!breaker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_cooldown_never_trips() {
        let breaker = QuotaBreaker::new(Duration::ZERO);
        breaker.trigger();
        assert!(!breaker.is_active());
    }
}
