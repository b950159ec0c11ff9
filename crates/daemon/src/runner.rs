//! Fixed-interval loop around [`PostScheduler`] with graceful shutdown.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use moonpost_notify::{Notification, Notifier};

use crate::scheduler::PostScheduler;

/// Echoes operational messages to the chat without sound.
#[derive(Clone)]
pub struct Reporter {
    notifier: Arc<dyn Notifier>,
}

impl Reporter {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Send `text` as a silent report. Delivery failures are only logged.
    pub async fn report(&self, text: &str) {
        if let Err(e) = self.notifier.send(&Notification::report(text)).await {
            warn!(
                channel = self.notifier.channel_name(),
                error = %e,
                "failed to deliver report"
            );
        }
    }
}

/// Run ticks until `shutdown` is notified, then hand the scheduler back.
///
/// Each iteration runs one tick and sleeps for what is left of the
/// configured interval. Tick errors are logged and reported but never stop
/// the loop. Shutdown is observed between ticks, so a notification that
/// arrives mid-tick takes effect once that tick has finished.
pub async fn run(
    mut scheduler: PostScheduler,
    reporter: Option<Reporter>,
    shutdown: Arc<Notify>,
) -> PostScheduler {
    info!(interval = ?scheduler.interval(), "post loop started");

    loop {
        let started = Instant::now();

        match scheduler.post_moon_phase().await {
            Ok(outcome) if scheduler.config().debug => info!(?outcome, "tick finished"),
            Ok(outcome) => debug!(?outcome, "tick finished"),
            Err(e) => {
                error!(error = %e, "PostMoonPhase failed");
                if let Some(reporter) = &reporter {
                    reporter.report(&format!("ERROR PostMoonPhase {e}")).await;
                }
            }
        }

        let remaining = scheduler.interval().saturating_sub(started.elapsed());
        // Shutdown wins over an already elapsed sleep.
        tokio::select! {
            biased;
            _ = shutdown.notified() => {
                info!("post loop shutting down");
                break;
            }
            _ = tokio::time::sleep(remaining) => {}
        }
    }

    scheduler
}

/// Wait for SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to register SIGTERM handler");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
    }
}
