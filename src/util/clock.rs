use chrono::Utc;

/// Source of wall-clock time, swappable in tests.
pub trait Clock: Send + Sync {
    fn now_unix_secs(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> i64 {
        Utc::now().timestamp()
    }
}
