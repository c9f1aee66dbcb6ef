use relay_store::ConversationStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const MIN_PERIOD: Duration = Duration::from_secs(1);
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Background task that periodically drops idle conversations
///
/// The first sweep runs one full period after spawning. Stop it with
/// [`Sweeper::shutdown`].
pub struct Sweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub fn spawn(store: Arc<ConversationStore>, every: Duration, max_age_hours: u32) -> Self {
        // tokio intervals reject a zero period and deadlines must stay representable
        let every = every.clamp(MIN_PERIOD, MAX_PERIOD);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tracing::info!(
            every_secs = every.as_secs(),
            max_age_hours,
            "Starting conversation sweeper"
        );

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = store.sweep(max_age_hours);
                        tracing::debug!(removed, active = store.size(), "Conversation sweep finished");
                    }
                }
            }

            tracing::info!("Conversation sweeper stopped");
        });

        Self { cancel, handle }
    }

    /// Cancel the task and wait for it to exit
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!("Conversation sweeper panicked: {}", e);
        }
    }
}
