use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU64, Ordering};
use heapless::String as HString;

pub const FREQUENCY_HZ: u64 = 100;

const MAX_CLOCK_HOURS: u64 = 99;

static TICKS: AtomicU64 = AtomicU64::new(0);

/// Advances the tick counter; called from the PIT interrupt.
pub fn tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

pub fn ticks() -> u64 {
    TICKS.load(Ordering::Relaxed)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Uptime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Uptime {
    pub fn from_ticks(ticks: u64) -> Self {
        let total = ticks / FREQUENCY_HZ;
        Self {
            hours: total / 3600,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }

    /// `HH:MM:SS` for the topbar, hours saturating at 99.
    pub fn clock(&self) -> HString<8> {
        let mut out = HString::new();
        let hours = self.hours.min(MAX_CLOCK_HOURS);
        let _ = write!(out, "{:02}:{:02}:{:02}", hours, self.minutes, self.seconds);
        out
    }
}

// "1h 2m 3s", hour field omitted when zero.
impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{}h ", self.hours)?;
        }
        write!(f, "{}m {}s", self.minutes, self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn uptime_splits_ticks() {
        let up = Uptime::from_ticks((3600 + 2 * 60 + 3) * FREQUENCY_HZ + 42);
        assert_eq!(up, Uptime { hours: 1, minutes: 2, seconds: 3 });
        assert_eq!(up.to_string(), "1h 2m 3s");
    }

    #[test]
    fn uptime_omits_zero_hours() {
        assert_eq!(Uptime::from_ticks(65 * FREQUENCY_HZ).to_string(), "1m 5s");
        assert_eq!(Uptime::from_ticks(0).to_string(), "0m 0s");
    }

    #[test]
    fn clock_caps_hours() {
        assert_eq!(Uptime::from_ticks(59 * FREQUENCY_HZ).clock().as_str(), "00:00:59");
        let long = Uptime::from_ticks(150 * 3600 * FREQUENCY_HZ + 61 * FREQUENCY_HZ);
        assert_eq!(long.clock().as_str(), "99:01:01");
    }
}
