use crate::dtype::DType;

/// Patience counter over validation losses. A loss only counts as an
/// improvement when it beats the best so far by more than `min_delta`.
#[derive(Clone, Debug, PartialEq)]
pub struct EarlyStopping<F: DType> {
    patience: usize,
    min_delta: F,
    best: F,
    counter: usize,
}

impl<F: DType> EarlyStopping<F> {
    pub fn new(patience: usize, min_delta: F) -> Self {
        EarlyStopping {
            patience,
            min_delta,
            best: F::infinity(),
            counter: 0,
        }
    }

    /// Returns true once `patience` consecutive updates failed to improve.
    pub fn update(&mut self, validation_loss: F) -> bool {
        if validation_loss < self.best - self.min_delta {
            self.best = validation_loss;
            self.counter = 0;
        } else {
            self.counter += 1;
        }
        self.counter >= self.patience
    }

    #[inline]
    pub fn best(&self) -> F {
        self.best
    }

    #[inline]
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn reset(&mut self) {
        self.best = F::infinity();
        self.counter = 0;
    }
}

#[cfg(test)]
mod test {
    use super::EarlyStopping;

    #[test]
    fn test_stops_after_patience() {
        let mut es = EarlyStopping::new(3, 0.0);
        assert!(!es.update(1.0));
        assert!(!es.update(0.5));
        assert!(!es.update(0.6));
        assert!(!es.update(0.5));
        assert!(es.update(0.55));
        assert_eq!(es.best(), 0.5);
        assert_eq!(es.counter(), 3);
    }

    #[test]
    fn test_improvement_resets_counter() {
        let mut es = EarlyStopping::new(2, 0.0);
        assert!(!es.update(1.0));
        assert!(!es.update(1.0));
        assert!(!es.update(0.9));
        assert_eq!(es.counter(), 0);
        assert!(!es.update(0.95));
        assert!(es.update(0.95));
    }

    #[test]
    fn test_min_delta() {
        let mut es = EarlyStopping::new(2, 0.1);
        assert!(!es.update(1.0));
        // not enough of an improvement
        assert!(!es.update(0.95));
        assert!(es.update(0.91));
        es.reset();
        assert_eq!(es.counter(), 0);
        assert!(!es.update(0.91));
    }

    #[test]
    fn test_nan_never_improves() {
        let mut es = EarlyStopping::new(1, 0.0);
        assert!(es.update(f64::NAN));
    }
}
