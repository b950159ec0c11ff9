//! [`PostScheduler`]: the per-tick gate, post and persist sequence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use tracing::{debug, info, warn};

use moonpost_core::config::MARKER_FORMAT;
use moonpost_core::{Clock, MoonConfig, MoonPhase, PhaseCalculator};
use moonpost_notify::{Notification, Notifier};
use moonpost_store::ConfigStore;

use super::outcome::{PostError, TickOutcome};

/// Posts the moon phase at most once per UTC day.
///
/// The scheduler is the only writer of its [`MoonConfig`]. The
/// `MoonPhaseLast` marker only moves after a delivery succeeded or when
/// there was nothing to deliver, so a failed delivery is retried on the
/// next tick of the same day.
pub struct PostScheduler {
    config: MoonConfig,
    calculator: PhaseCalculator,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn ConfigStore>,
    refetch: bool,
}

impl PostScheduler {
    /// Create a scheduler over an already validated configuration.
    pub fn new(
        config: MoonConfig,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn ConfigStore>,
    ) -> Self {
        Self {
            config,
            calculator: PhaseCalculator::default(),
            clock,
            notifier,
            store,
            refetch: false,
        }
    }

    /// Use a calculator calibrated from other reference new moons.
    pub fn with_calculator(mut self, calculator: PhaseCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Reload the document from the store before the marker check on
    /// every tick instead of trusting the in-memory copy.
    pub fn with_refetch(mut self, refetch: bool) -> Self {
        self.refetch = refetch;
        self
    }

    pub fn config(&self) -> &MoonConfig {
        &self.config
    }

    /// Loop cadence from the current configuration.
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Run one tick.
    ///
    /// 1. Before `PostingStartHour` (UTC): no-op.
    /// 2. Today already recorded in `MoonPhaseLast`: no-op.
    /// 3. Classify the moon phase; post the message if there is one.
    ///    A failed delivery returns early with the marker untouched.
    /// 4. Record today and write the whole document back.
    pub async fn post_moon_phase(&mut self) -> Result<TickOutcome, PostError> {
        let now = self.clock.now();

        if i64::from(now.hour()) < self.config.posting_start_hour {
            debug!(
                hour = now.hour(),
                start_hour = self.config.posting_start_hour,
                "before posting start hour"
            );
            return Ok(TickOutcome::BeforeStartHour);
        }

        if self.refetch {
            self.reload().await?;
        }

        let today = now.format(MARKER_FORMAT).to_string();
        if today == self.config.moon_phase_last {
            debug!(%today, "already notified today");
            return Ok(TickOutcome::AlreadyNotified);
        }

        let phase = self.calculator.classify(now);
        let outcome = match phase.message() {
            Some(message) => {
                self.notifier.send(&Notification::post(&message)).await?;
                info!(phase = phase.kind(), %message, "moon phase posted");
                TickOutcome::Posted(phase)
            }
            None => {
                debug_assert_eq!(phase, MoonPhase::None);
                debug!(%today, "no moon phase event today");
                TickOutcome::NothingToPost
            }
        };

        self.config.moon_phase_last = today;
        self.store
            .replace(&self.config)
            .await
            .map_err(PostError::Persist)?;

        Ok(outcome)
    }

    /// Replace the in-memory document with the stored one.
    async fn reload(&mut self) -> Result<(), PostError> {
        let fresh = self.store.fetch().await.map_err(PostError::Refetch)?;
        fresh.validate()?;
        if fresh.moon_phase_last != self.config.moon_phase_last {
            warn!(
                stored = %fresh.moon_phase_last,
                in_memory = %self.config.moon_phase_last,
                "stored marker differs from in-memory copy"
            );
        }
        self.config = fresh;
        Ok(())
    }
}
