//! Recording collaborators shared by the scheduler and runner tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use moonpost_core::{Clock, MoonConfig};
use moonpost_notify::{Notification, Notifier, NotifyError};
use moonpost_store::{ConfigStore, StoreError};

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn config(start_hour: i64, last: &str) -> MoonConfig {
    let mut config = MoonConfig::from_yaml(
        "Interval: 1m\nTgToken: \"123:ABC\"\nTgChatId: \"-100123\"\nPostingStartHour: 0\nMoonPhaseLast: \"\"\nOwner: someone\n",
    )
    .unwrap();
    config.posting_start_hour = start_hour;
    config.moon_phase_last = last.to_string();
    config
}

/// Clock reporting whatever instant it was last set to.
pub struct MockClock(Mutex<DateTime<Utc>>);

impl MockClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Notifier that records every message and can be told to fail.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: AtomicBool,
}

impl MockNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Api("400 Bad Request: chat not found".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "mock"
    }
}

fn unavailable() -> StoreError {
    StoreError::BadStatus {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// In-memory document store counting every call.
pub struct MockStore {
    document: Mutex<MoonConfig>,
    replaced: Mutex<Vec<MoonConfig>>,
    fetches: AtomicUsize,
    fail: AtomicBool,
}

impl MockStore {
    pub fn new(document: MoonConfig) -> Self {
        Self {
            document: Mutex::new(document),
            replaced: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn replaced(&self) -> Vec<MoonConfig> {
        self.replaced.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn document(&self) -> MoonConfig {
        self.document.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigStore for MockStore {
    async fn fetch(&self) -> Result<MoonConfig, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.document())
    }

    async fn replace(&self, config: &MoonConfig) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.replaced.lock().unwrap().push(config.clone());
        *self.document.lock().unwrap() = config.clone();
        Ok(())
    }
}
