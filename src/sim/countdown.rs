//! Whole-second countdown timer
//!
//! Fires once per elapsed second with the seconds remaining, and completes
//! when the count reaches zero. Driven by frame deltas or by an interval
//! timer calling [`Countdown::tick_second`].

/// One firing of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownStep {
    /// Seconds left after this firing
    pub remaining: i64,
    /// This firing completed the countdown
    pub finished: bool,
}

/// Countdown state
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    remaining: i64,
    carry_ms: f64,
    done: bool,
}

impl Countdown {
    pub fn new(seconds: i64) -> Self {
        Self {
            remaining: seconds,
            carry_ms: 0.0,
            done: false,
        }
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Finished or cancelled
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Stop without completing; no further steps fire
    pub fn cancel(&mut self) {
        self.done = true;
    }

    /// One second has passed
    pub fn tick_second(&mut self) -> Option<CountdownStep> {
        if self.done {
            return None;
        }
        self.remaining -= 1;
        let finished = self.remaining <= 0;
        if finished {
            self.done = true;
        }
        Some(CountdownStep {
            remaining: self.remaining,
            finished,
        })
    }

    /// Feed `delta_ms` of elapsed time, returning every second that fired
    pub fn advance(&mut self, delta_ms: f64) -> Vec<CountdownStep> {
        let mut steps = Vec::new();
        if self.done {
            return steps;
        }

        self.carry_ms += delta_ms.max(0.0);
        while self.carry_ms >= 1000.0 {
            self.carry_ms -= 1000.0;
            match self.tick_second() {
                Some(step) => steps.push(step),
                None => break,
            }
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_to_completion() {
        let mut countdown = Countdown::new(3);
        assert_eq!(
            countdown.tick_second(),
            Some(CountdownStep {
                remaining: 2,
                finished: false
            })
        );
        countdown.tick_second();
        let last = countdown.tick_second().unwrap();
        assert_eq!(last.remaining, 0);
        assert!(last.finished);
        assert!(countdown.is_done());
        assert_eq!(countdown.tick_second(), None);
    }

    #[test]
    fn test_advance_accumulates_partial_seconds() {
        let mut countdown = Countdown::new(5);
        assert!(countdown.advance(600.0).is_empty());
        let steps = countdown.advance(600.0);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].remaining, 4);

        let steps = countdown.advance(2500.0);
        assert_eq!(steps.iter().map(|s| s.remaining).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn test_advance_stops_at_finish() {
        let mut countdown = Countdown::new(2);
        let steps = countdown.advance(10_000.0);
        assert_eq!(steps.len(), 2);
        assert!(steps[1].finished);
        assert!(countdown.advance(5_000.0).is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut countdown = Countdown::new(10);
        countdown.cancel();
        assert!(countdown.tick_second().is_none());
        assert_eq!(countdown.remaining(), 10);
    }
}
