use std::future::Future;
use std::time::Duration;

use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::warn;

use crate::jobs::JobError;

const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Runs `job` every `period`, starting one period from now. A failing run is
/// logged and followed by a growing pause; the loop never exits on its own.
pub async fn run_interval<F, Fut>(
    name: &'static str,
    period: Duration,
    mut job: F,
) -> Result<(), JobError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), JobError>>,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures: u32 = 0;
    loop {
        ticker.tick().await;
        match job().await {
            Ok(()) => failures = 0,
            Err(err) => {
                failures = failures.saturating_add(1);
                warn!(error = %err, job = name, failures, "job execution failed");
                sleep(backoff(period, failures)).await;
            }
        }
    }
}

fn backoff(period: Duration, failures: u32) -> Duration {
    period.saturating_mul(failures).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::{backoff, run_interval, MAX_BACKOFF};

    #[test]
    fn backoff_grows_then_caps() {
        let period = Duration::from_secs(60);
        assert_eq!(backoff(period, 1), Duration::from_secs(60));
        assert_eq!(backoff(period, 3), Duration::from_secs(180));
        assert_eq!(backoff(period, 50), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn job_runs_repeatedly_after_first_period() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let job = run_interval("test", Duration::from_millis(10), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        let result = tokio::time::timeout(Duration::from_millis(200), job).await;
        assert!(result.is_err());
        assert!(runs.load(Ordering::SeqCst) >= 2);
    }
}
