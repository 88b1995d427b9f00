use crate::config::{EventCallback, SupervisorConfig};
use std::time::{Duration, Instant};

/// Detects a hung simulation worker by watching `heartbeatW1`.
///
/// Driven externally: the bridge calls [`Supervisor::poll`] once per tick
/// (or on a timer in Modes A/B) with the freshly observed heartbeat value.
/// `poll` is a no-op until `check_interval` has elapsed since the last
/// comparison.
pub struct Supervisor {
    config: SupervisorConfig,
    last_checked_at: Instant,
    last_observed_heartbeat: Option<u32>,
    consecutive_misses: u32,
    fired: bool,
    on_timeout: Option<EventCallback>,
}

impl Supervisor {
    #[must_use]
    pub fn new(config: SupervisorConfig, on_timeout: Option<EventCallback>) -> Self {
        Self {
            config,
            last_checked_at: Instant::now(),
            last_observed_heartbeat: None,
            consecutive_misses: 0,
            fired: false,
            on_timeout,
        }
    }

    /// Compares `current_heartbeat` against the last observed value if
    /// `check_interval` has elapsed since the previous comparison. Returns
    /// `true` exactly once per timeout event (when `onTimeout` fires),
    /// `false` otherwise (including on every call before the interval
    /// elapses or once suppressed).
    ///
    /// There is no heartbeat to compare against on the very first call, so
    /// it counts as a miss rather than as an advance: a worker that never
    /// ticks at all must still trip the supervisor.
    pub fn poll(&mut self, current_heartbeat: u32, now: Instant) -> bool {
        if now.duration_since(self.last_checked_at) < self.config.check_interval {
            return false;
        }
        self.last_checked_at = now;

        let unchanged = self.last_observed_heartbeat.map_or(true, |prev| prev == current_heartbeat);
        if unchanged {
            self.consecutive_misses += 1;
        } else {
            self.consecutive_misses = 0;
            self.fired = false;
        }
        self.last_observed_heartbeat = Some(current_heartbeat);

        if self.consecutive_misses >= self.config.miss_threshold && !self.fired {
            self.fired = true;
            if let Some(callback) = &self.on_timeout {
                callback();
            }
            return true;
        }
        false
    }

    /// Clears the miss counter and timeout-fired flag, re-arming the
    /// supervisor until `reset()` is called or the heartbeat advances.
    pub fn reset(&mut self) {
        self.consecutive_misses = 0;
        self.fired = false;
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    #[must_use]
    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn config_with_interval(interval: Duration, miss_threshold: u32) -> SupervisorConfig {
        SupervisorConfig { check_interval: interval, miss_threshold }
    }

    #[test]
    fn fires_exactly_once_after_miss_threshold() {
        let fire_count = Arc::new(AtomicUsize::new(0));
        let fire_count_clone = Arc::clone(&fire_count);
        let config = config_with_interval(Duration::from_millis(1), 3);
        let mut supervisor = Supervisor::new(
            config,
            Some(Arc::new(move || {
                fire_count_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        let start = Instant::now();
        let t1 = start + Duration::from_millis(2);
        let t2 = start + Duration::from_millis(4);
        let t3 = start + Duration::from_millis(6);
        let t4 = start + Duration::from_millis(8);

        supervisor.poll(5, t1);
        assert_eq!(supervisor.consecutive_misses(), 1);
        supervisor.poll(5, t2);
        assert_eq!(supervisor.consecutive_misses(), 2);
        let fired = supervisor.poll(5, t3);
        assert!(fired);
        assert_eq!(fire_count.load(Ordering::SeqCst), 1);

        // Still stuck: no further callback invocations until reset/advance.
        let fired_again = supervisor.poll(5, t4);
        assert!(!fired_again);
        assert_eq!(fire_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn heartbeat_advance_resets_miss_counter() {
        let config = config_with_interval(Duration::from_millis(1), 2);
        let mut supervisor = Supervisor::new(config, None);
        let start = Instant::now();

        supervisor.poll(1, start + Duration::from_millis(2));
        assert_eq!(supervisor.consecutive_misses(), 1);
        supervisor.poll(2, start + Duration::from_millis(4));
        assert_eq!(supervisor.consecutive_misses(), 0);
    }

    #[test]
    fn reset_clears_fired_flag() {
        let config = config_with_interval(Duration::from_millis(1), 1);
        let mut supervisor = Supervisor::new(config, None);
        let start = Instant::now();

        supervisor.poll(1, start + Duration::from_millis(2));
        assert!(supervisor.has_fired());
        supervisor.reset();
        assert!(!supervisor.has_fired());
    }

    #[test]
    fn poll_before_interval_elapses_is_a_no_op() {
        let config = config_with_interval(Duration::from_millis(100), 1);
        let mut supervisor = Supervisor::new(config, None);
        let start = Instant::now();
        assert!(!supervisor.poll(1, start + Duration::from_millis(1)));
        assert_eq!(supervisor.consecutive_misses(), 0);
    }
}
