// src/scheduler/time_interface.rs - Wall-clock abstraction the RTC samples
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, NaiveDateTime, TimeZone};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("host wall clock unavailable: {0}")]
    Unavailable(String),
}

/// Source of local calendar time, whole-second precision.
pub trait TimeInterface: Send + Sync {
    fn now_wallclock(&self) -> Result<NaiveDateTime, ClockError>;
}

impl<T: TimeInterface + ?Sized> TimeInterface for Arc<T> {
    fn now_wallclock(&self) -> Result<NaiveDateTime, ClockError> {
        (**self).now_wallclock()
    }
}

/// Host wall clock in the local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostClock;

impl TimeInterface for HostClock {
    fn now_wallclock(&self) -> Result<NaiveDateTime, ClockError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ClockError::Unavailable(format!("system time before epoch: {e}")))?;
        let secs = i64::try_from(since_epoch.as_secs())
            .map_err(|_| ClockError::Unavailable("system time out of range".to_string()))?;
        Local
            .timestamp_opt(secs, 0)
            .single()
            .map(|t| t.naive_local())
            .ok_or_else(|| ClockError::Unavailable(format!("no unique local time for {secs}")))
    }
}

/// Manually driven clock for tests and replay.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Mutex<Option<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(Some(now)) }
    }

    /// A clock that reports itself unavailable until `set` is called.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.lock() = Some(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.lock();
        if let Some(t) = now.as_mut() {
            *t += by;
        }
    }

    pub fn fail(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<NaiveDateTime>> {
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TimeInterface for FixedClock {
    fn now_wallclock(&self) -> Result<NaiveDateTime, ClockError> {
        let now = *self.lock();
        now.ok_or_else(|| ClockError::Unavailable("clock not set".to_string()))
    }
}
