//! # Luma Poll Scheduling (`commands::deploy::schedule`)
//!
//! File: cli/src/commands/deploy/schedule.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Time handling for the deployment monitor, kept apart from the polling logic
//! so it can be driven by a manual clock in tests.
//!
//! - **`Clock`**: "what time is it" plus "wait this long". `TokioClock` is the
//!   real implementation.
//! - **`PollScheduler`**: given a start instant, a timeout and a poll interval,
//!   answers whether the budget is spent and how long to wait before the next
//!   poll. Waits are clipped to the deadline, so the monitor never sleeps past it.
//!   `remaining` bounds a single status request the same way.
//!
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Monotonic time source and sleeper.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// `Clock` backed by the Tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// # Poll Scheduler (`PollScheduler`)
///
/// Deadline arithmetic for one monitoring session.
#[derive(Debug, Clone, Copy)]
pub struct PollScheduler {
    started: Instant,
    deadline: Instant,
    interval: Duration,
}

impl PollScheduler {
    pub fn new(started: Instant, timeout: Duration, interval: Duration) -> Self {
        Self {
            started,
            deadline: started + timeout,
            interval,
        }
    }

    /// True once `now` has reached the deadline.
    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Time to wait before the next poll: the interval, or whatever is left
    /// until the deadline if that is shorter.
    pub fn next_delay(&self, now: Instant) -> Duration {
        self.interval.min(self.remaining(now))
    }

    /// Time left until the deadline; zero once it has passed.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }
}
