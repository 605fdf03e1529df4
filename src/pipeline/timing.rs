//! Timing wrapper - Bounded runs with cycle statistics.
//!
//! [`TimingEngine`] runs an [`EngineLoop`] for a fixed number of cycles and
//! records how long each took. The wrapped loop's state machine is untouched:
//! a stop command still ends the run early, and a second run still fails.

use std::fmt;
use std::time::Duration;

use super::backend::Backend;
use super::engine::{CycleObserver, Engine, EngineLoop};
use crate::engine::Component;
use crate::error::BackendError;

/// Min / max / average / total over the cycles of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimingReport {
    pub cycles: u64,
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
}

impl TimingReport {
    pub fn average(&self) -> Duration {
        match u32::try_from(self.cycles) {
            Ok(0) => Duration::ZERO,
            Ok(cycles) => self.total / cycles,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.cycles as f64),
        }
    }

    fn record(&mut self, elapsed: Duration) {
        if self.cycles == 0 {
            self.min = elapsed;
            self.max = elapsed;
        } else {
            self.min = self.min.min(elapsed);
            self.max = self.max.max(elapsed);
        }
        self.cycles += 1;
        self.total += elapsed;
    }
}

impl CycleObserver for TimingReport {
    fn cycle_finished(&mut self, _cycle: u64, elapsed: Duration) {
        self.record(elapsed);
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cycles: min {:?}, max {:?}, avg {:?}, total {:?}",
            self.cycles,
            self.min,
            self.max,
            self.average(),
            self.total
        )
    }
}

/// An [`EngineLoop`] capped at `cycles` cycles that reports its timings.
pub struct TimingEngine<B: Backend> {
    inner: EngineLoop<B>,
    report: Option<TimingReport>,
}

impl<B: Backend> TimingEngine<B> {
    pub fn new(mut inner: EngineLoop<B>, cycles: u64) -> Self {
        inner.config_mut().max_cycles = Some(cycles);
        Self {
            inner,
            report: None,
        }
    }

    /// Timings of the last run, including a run that ended in an error.
    pub fn report(&self) -> Option<&TimingReport> {
        self.report.as_ref()
    }

    pub fn inner(&self) -> &EngineLoop<B> {
        &self.inner
    }

    pub fn into_inner(self) -> EngineLoop<B> {
        self.inner
    }
}

impl<B: Backend> Engine for TimingEngine<B> {
    fn run(&mut self, root: Box<dyn Component>) -> Result<(), BackendError> {
        let mut report = TimingReport::default();
        let result = self.inner.run_observed(root, &mut report);
        tracing::info!(
            cycles = report.cycles,
            min_us = report.min.as_micros() as u64,
            max_us = report.max.as_micros() as u64,
            avg_us = report.average().as_micros() as u64,
            total_us = report.total.as_micros() as u64,
            "timing report"
        );
        self.report = Some(report);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Context;
    use crate::error::BuildError;
    use crate::input::KeyboardEvent;
    use crate::pipeline::{EngineConfig, EngineState, TestBackend};
    use crate::renderer::View;

    fn engine(backend: TestBackend, cycles: u64) -> TimingEngine<TestBackend> {
        let config = EngineConfig::default()
            .frame_interval(Duration::ZERO)
            .input_poll_timeout(Duration::ZERO);
        TimingEngine::new(EngineLoop::new(backend, config), cycles)
    }

    fn root() -> Box<dyn Component> {
        Box::new(|cx: &Context| -> Result<View, BuildError> {
            cx.on::<KeyboardEvent>(|_, cx| cx.stop());
            Ok(View::text("t"))
        })
    }

    #[test]
    fn test_report_covers_every_cycle() {
        let mut timing = engine(TestBackend::new(2, 1), 4);
        timing.run(root()).unwrap();

        let report = timing.report().unwrap();
        assert_eq!(report.cycles, 4);
        assert!(report.min <= report.average());
        assert!(report.average() <= report.max);
        assert!(report.max <= report.total);
        assert_eq!(timing.inner().state(), EngineState::Stopped);
    }

    #[test]
    fn test_stop_still_ends_early() {
        let backend = TestBackend::new(2, 1).with_input(KeyboardEvent::new("x"));
        let mut timing = engine(backend, 10);
        timing.run(root()).unwrap();
        assert_eq!(timing.report().unwrap().cycles, 1);
    }

    #[test]
    fn test_second_run_fails() {
        let mut timing = engine(TestBackend::new(2, 1), 1);
        timing.run(root()).unwrap();
        assert!(matches!(timing.run(root()), Err(BackendError::Stopped)));
        assert_eq!(timing.report().unwrap().cycles, 0);
    }

    #[test]
    fn test_average_and_display() {
        let mut report = TimingReport::default();
        report.record(Duration::from_millis(2));
        report.record(Duration::from_millis(4));

        assert_eq!(report.min, Duration::from_millis(2));
        assert_eq!(report.max, Duration::from_millis(4));
        assert_eq!(report.average(), Duration::from_millis(3));
        assert!(report.to_string().starts_with("2 cycles:"));
    }
}
