use crate::dtype::DType;
use crate::math::sum;
use crate::train::{EpochObserver, EpochReport};
use std::collections::VecDeque;
use tracing::warn;

const DEFAULT_WINDOW: usize = 10;
const VANISHING_THRESHOLD: f64 = 1e-7;
const EXPLODING_THRESHOLD: f64 = 1e7;

/// Watches the most recent training losses for divergence or stalls.
#[derive(Clone, Debug)]
pub struct LossMonitor<F: DType> {
    window: usize,
    recent: VecDeque<F>,
    vanishing_threshold: F,
    exploding_threshold: F,
}

impl<F: DType> Default for LossMonitor<F> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl<F: DType> LossMonitor<F> {
    /// A window of zero is treated as one.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        LossMonitor {
            window,
            recent: VecDeque::with_capacity(window),
            vanishing_threshold: F::from_f64(VANISHING_THRESHOLD),
            exploding_threshold: F::from_f64(EXPLODING_THRESHOLD),
        }
    }

    pub fn with_thresholds(mut self, vanishing: F, exploding: F) -> Self {
        self.vanishing_threshold = vanishing;
        self.exploding_threshold = exploding;
        self
    }

    pub fn record(&mut self, loss: F) {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(loss);
    }

    fn first_and_last(&self) -> Option<(F, F)> {
        if self.recent.len() < 2 {
            return None;
        }
        Some((*self.recent.front()?, *self.recent.back()?))
    }

    /// The newest loss is below the oldest one in the window.
    pub fn is_converging(&self) -> bool {
        self.first_and_last().is_some_and(|(first, last)| last < first)
    }

    /// The window is full and its endpoints differ by less than `threshold`.
    pub fn has_stalled(&self, threshold: F) -> bool {
        if self.recent.len() < self.window {
            return false;
        }
        self.first_and_last()
            .is_some_and(|(first, last)| (first - last).abs() < threshold)
    }

    pub fn has_vanishing_loss(&self) -> bool {
        self.recent.back().is_some_and(|&loss| loss < self.vanishing_threshold)
    }

    pub fn has_exploding_loss(&self) -> bool {
        self.recent
            .back()
            .is_some_and(|&loss| !loss.is_finite() || loss > self.exploding_threshold)
    }

    /// Mean of the window, zero when empty.
    pub fn average_loss(&self) -> F {
        if self.recent.is_empty() {
            return F::ZERO;
        }
        let (front, back) = self.recent.as_slices();
        (sum(front) + sum(back)) / F::from_usize(self.recent.len())
    }

    /// Newest minus oldest loss in the window. Negative while improving.
    pub fn loss_trend(&self) -> F {
        self.first_and_last().map_or(F::ZERO, |(first, last)| last - first)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn reset(&mut self) {
        self.recent.clear();
    }
}

impl<F: DType> EpochObserver<F> for LossMonitor<F> {
    fn on_epoch_end(&mut self, report: &EpochReport<F>) {
        self.record(report.training_loss);
        if self.has_exploding_loss() {
            warn!(epoch = report.epoch, loss = %report.training_loss, "training loss is exploding");
        } else if self.has_vanishing_loss() {
            warn!(epoch = report.epoch, loss = %report.training_loss, "training loss is vanishing");
        }
    }
}

#[cfg(test)]
mod test {
    use super::LossMonitor;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_window_slides() {
        let mut monitor = LossMonitor::new(3);
        for loss in [4.0, 3.0, 2.0, 1.0] {
            monitor.record(loss);
        }
        assert_eq!(monitor.len(), 3);
        assert_abs_diff_eq!(monitor.average_loss(), 2.0);
        assert_abs_diff_eq!(monitor.loss_trend(), -2.0);
        assert!(monitor.is_converging());
    }

    #[test]
    fn test_needs_two_losses() {
        let mut monitor = LossMonitor::<f64>::default();
        assert_eq!(monitor.average_loss(), 0.0);
        monitor.record(1.0);
        assert!(!monitor.is_converging());
        assert_eq!(monitor.loss_trend(), 0.0);
    }

    #[test]
    fn test_stalled() {
        let mut monitor = LossMonitor::new(4);
        for loss in [0.5, 0.4999, 0.5001, 0.5] {
            assert!(!monitor.has_stalled(0.001));
            monitor.record(loss);
        }
        assert!(monitor.has_stalled(0.001));
        assert!(!monitor.is_converging());
        monitor.record(0.1);
        assert!(!monitor.has_stalled(0.001));
    }

    #[test]
    fn test_vanishing_and_exploding() {
        let mut monitor = LossMonitor::<f32>::default();
        monitor.record(1e-9);
        assert!(monitor.has_vanishing_loss());
        assert!(!monitor.has_exploding_loss());
        monitor.record(1e8);
        assert!(monitor.has_exploding_loss());
        monitor.record(f32::NAN);
        assert!(monitor.has_exploding_loss());
        monitor.record(f32::INFINITY);
        assert!(monitor.has_exploding_loss());
        monitor.record(0.3);
        assert!(!monitor.has_exploding_loss());
        assert!(!monitor.has_vanishing_loss());
        monitor.reset();
        assert!(monitor.is_empty());
    }
}
