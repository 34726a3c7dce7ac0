// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firing-time accumulator for one match scouting session.

use std::time::Instant;

/// Game phase a firing interval is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Auto,
    Teleop,
}

/// Accumulates seconds spent firing per phase across any number of
/// press/release cycles. Totals only grow until [`reset`](Self::reset).
#[derive(Debug, Clone, Default)]
pub struct FiringTimer {
    auto_seconds: f64,
    teleop_seconds: f64,
    active: Option<(Phase, Instant)>,
}

impl FiringTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_seconds(&self) -> f64 {
        self.auto_seconds
    }

    pub fn teleop_seconds(&self) -> f64 {
        self.teleop_seconds
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, phase: Phase) {
        self.start_at(phase, Instant::now());
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    /// Begin an interval. Ignored while one is already running.
    pub fn start_at(&mut self, phase: Phase, at: Instant) {
        if self.active.is_none() {
            self.active = Some((phase, at));
        }
    }

    /// End the running interval and credit its phase, rounded to
    /// hundredths. Ignored when nothing is running.
    pub fn stop_at(&mut self, at: Instant) {
        let Some((phase, started)) = self.active.take() else {
            return;
        };

        let elapsed = at.saturating_duration_since(started).as_secs_f64();
        let total = match phase {
            Phase::Auto => &mut self.auto_seconds,
            Phase::Teleop => &mut self.teleop_seconds,
        };
        *total = round_hundredths(*total + elapsed);
    }

    /// Zero both totals and drop any running interval.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cycles_accumulate() {
        let t0 = Instant::now();
        let mut timer = FiringTimer::new();

        timer.start_at(Phase::Teleop, t0);
        timer.stop_at(t0 + Duration::from_millis(1200));
        timer.start_at(Phase::Teleop, t0 + Duration::from_secs(5));
        timer.stop_at(t0 + Duration::from_millis(5900));

        assert_eq!(timer.teleop_seconds(), 2.1);
        assert_eq!(timer.auto_seconds(), 0.0);
    }

    #[test]
    fn test_phases_are_separate() {
        let t0 = Instant::now();
        let mut timer = FiringTimer::new();

        timer.start_at(Phase::Auto, t0);
        timer.stop_at(t0 + Duration::from_millis(750));
        timer.start_at(Phase::Teleop, t0 + Duration::from_secs(20));
        timer.stop_at(t0 + Duration::from_millis(21_500));

        assert_eq!(timer.auto_seconds(), 0.75);
        assert_eq!(timer.teleop_seconds(), 1.5);
    }

    #[test]
    fn test_second_start_does_not_restart_interval() {
        let t0 = Instant::now();
        let mut timer = FiringTimer::new();

        timer.start_at(Phase::Auto, t0);
        timer.start_at(Phase::Teleop, t0 + Duration::from_secs(1));
        timer.stop_at(t0 + Duration::from_secs(2));

        assert_eq!(timer.auto_seconds(), 2.0);
        assert_eq!(timer.teleop_seconds(), 0.0);
    }

    #[test]
    fn test_stop_without_start_is_ignored() {
        let mut timer = FiringTimer::new();
        timer.stop();
        assert!(!timer.is_active());
        assert_eq!(timer.auto_seconds(), 0.0);
    }

    #[test]
    fn test_reset() {
        let t0 = Instant::now();
        let mut timer = FiringTimer::new();
        timer.start_at(Phase::Auto, t0);
        timer.stop_at(t0 + Duration::from_secs(3));
        timer.start_at(Phase::Teleop, t0 + Duration::from_secs(4));

        timer.reset();
        assert_eq!(timer.auto_seconds(), 0.0);
        assert!(!timer.is_active());
    }
}
