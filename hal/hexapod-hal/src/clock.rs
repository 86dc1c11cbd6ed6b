//! Monotonic time source
//!
//! Used by byte-level transports to bound how long they wait for input.

/// Monotonic microsecond clock
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin; never goes backwards
    fn now_micros(&self) -> u64;

    /// Microseconds elapsed since an earlier `now_micros` reading
    fn elapsed_micros(&self, since: u64) -> u64 {
        self.now_micros().saturating_sub(since)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct StepClock(Cell<u64>);

    impl Clock for StepClock {
        fn now_micros(&self) -> u64 {
            let now = self.0.get();
            self.0.set(now + 10);
            now
        }
    }

    #[test]
    fn test_elapsed_micros() {
        let clock = StepClock(Cell::new(100));
        let start = clock.now_micros();
        assert_eq!(clock.elapsed_micros(start), 10);
    }

    #[test]
    fn test_elapsed_saturates() {
        let clock = StepClock(Cell::new(0));
        assert_eq!(clock.elapsed_micros(u64::MAX), 0);
    }
}
