//! Fixed-interval sample scheduling.
//!
//! The first cycle runs as soon as the scheduler starts. After that, cycles
//! fire on a grid anchored at the start time (`start + k * interval`), checked
//! by polling at a coarse resolution. A cycle's outcome never touches the
//! grid: slow or failing cycles do not shift later ticks.

use log::{debug, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time for the scheduler
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;

    /// Block for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock where sleeping advances time instantly.
///
/// Clones share the same time, so a job can observe or advance the clock
/// the scheduler is polling.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `duration`
    #[allow(clippy::cast_possible_truncation)] // u64 nanoseconds cover centuries
    pub fn advance(&self, duration: Duration) {
        self.nanos.fetch_add(duration.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Whether a cycle is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// Waiting for the next tick
    Idle,
    /// A cycle is executing
    Running,
}

/// Time of the next scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    next_fire: Duration,
    interval: Duration,
}

impl ScheduleState {
    /// Schedule anchored at `start`, first periodic tick one interval later
    #[must_use]
    pub fn new(start: Duration, interval: Duration) -> Self {
        Self {
            next_fire: start + interval,
            interval,
        }
    }

    #[must_use]
    pub fn next_fire(&self) -> Duration {
        self.next_fire
    }

    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next_fire
    }

    /// Move the next tick to the first grid point after `now`.
    ///
    /// Ticks missed while the process was stalled collapse into one firing.
    pub fn advance(&mut self, now: Duration) {
        if self.interval.is_zero() {
            self.next_fire = now;
            return;
        }
        while self.next_fire <= now {
            self.next_fire += self.interval;
        }
    }
}

/// Runs a job immediately and then once per interval
pub struct Scheduler<C: Clock> {
    clock: C,
    interval: Duration,
    poll_interval: Duration,
    state: Option<ScheduleState>,
    phase: SchedulerPhase,
    cycles_run: u64,
}

impl<C: Clock> Scheduler<C> {
    #[must_use]
    pub fn new(clock: C, interval: Duration, poll_interval: Duration) -> Self {
        Self {
            clock,
            interval,
            poll_interval,
            state: None,
            phase: SchedulerPhase::Idle,
            cycles_run: 0,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Schedule state, available once the scheduler has started
    #[must_use]
    pub fn state(&self) -> Option<&ScheduleState> {
        self.state.as_ref()
    }

    /// Number of cycles fired so far
    #[must_use]
    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    /// Run `job` now and on every tick while `keep_running` returns true.
    ///
    /// `keep_running` receives the number of cycles fired so far and is
    /// checked once per poll.
    pub fn run<J, K>(&mut self, mut job: J, mut keep_running: K)
    where
        J: FnMut(),
        K: FnMut(u64) -> bool,
    {
        let start = self.clock.now();
        self.state = Some(ScheduleState::new(start, self.interval));
        info!("Scheduler started, sampling every {:?}", self.interval);

        self.fire(&mut job);

        while keep_running(self.cycles_run) {
            let now = self.clock.now();
            let due = match self.state.as_mut() {
                Some(state) if state.is_due(now) => {
                    state.advance(now);
                    debug!("Tick due at {:?}, next at {:?}", now, state.next_fire());
                    true
                }
                _ => false,
            };

            if due {
                self.fire(&mut job);
            } else {
                self.clock.sleep(self.poll_interval);
            }
        }
    }

    /// Run until `cycles` cycles have fired, including the immediate one
    pub fn run_cycles<J: FnMut()>(&mut self, job: J, cycles: u64) {
        self.run(job, |done| done < cycles);
    }

    /// Run until the process is terminated
    pub fn run_forever<J: FnMut()>(&mut self, job: J) {
        self.run(job, |_| true);
    }

    fn fire<J: FnMut()>(&mut self, job: &mut J) {
        self.phase = SchedulerPhase::Running;
        job();
        self.cycles_run += 1;
        self.phase = SchedulerPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_state_advance_keeps_grid() {
        let mut state = ScheduleState::new(Duration::ZERO, 40 * MINUTE);
        assert!(!state.is_due(39 * MINUTE));
        assert!(state.is_due(40 * MINUTE));

        state.advance(40 * MINUTE + Duration::from_secs(3));
        assert_eq!(state.next_fire(), 80 * MINUTE);
    }

    #[test]
    fn test_state_advance_coalesces_missed_ticks() {
        let mut state = ScheduleState::new(Duration::ZERO, 40 * MINUTE);
        state.advance(130 * MINUTE);
        assert_eq!(state.next_fire(), 160 * MINUTE);
    }

    #[test]
    fn test_first_cycle_runs_immediately() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new(clock.clone(), 40 * MINUTE, Duration::from_secs(1));

        let mut fired_at = Vec::new();
        scheduler.run_cycles(|| fired_at.push(clock.now()), 1);

        assert_eq!(fired_at, vec![Duration::ZERO]);
        assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        other.sleep(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::from_millis(5));
    }
}
