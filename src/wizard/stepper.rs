use super::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(usize),
    Blocked(ValidationError),
    AtLastStep,
}

/// 1-based step pointer bounded to `[1, total]`. Steps are never skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stepper {
    current: usize,
    total: usize,
}

impl Stepper {
    pub fn new(total: usize) -> Self {
        Self {
            current: 1,
            total: total.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    /// Advances by one step when `check` passed.
    pub fn next(&mut self, check: Result<(), ValidationError>) -> StepOutcome {
        if self.is_last() {
            return StepOutcome::AtLastStep;
        }
        match check {
            Ok(()) => {
                self.current += 1;
                StepOutcome::Advanced(self.current)
            }
            Err(err) => StepOutcome::Blocked(err),
        }
    }

    /// Returns false (and stays put) on step 1.
    pub fn back(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::StepCheck;

    #[test]
    fn stepper_is_bounded_on_both_ends() {
        let mut stepper = Stepper::new(3);
        assert!(!stepper.back());
        assert_eq!(stepper.current(), 1);
        assert_eq!(stepper.next(Ok(())), StepOutcome::Advanced(2));
        assert_eq!(stepper.next(Ok(())), StepOutcome::Advanced(3));
        assert_eq!(stepper.next(Ok(())), StepOutcome::AtLastStep);
        assert_eq!(stepper.current(), 3);
        assert!(stepper.back());
        assert_eq!(stepper.current(), 2);
    }

    #[test]
    fn blocked_step_keeps_position() {
        let mut stepper = Stepper::new(2);
        let check = StepCheck::new(1).require("name", "").finish();
        assert!(matches!(stepper.next(check), StepOutcome::Blocked(_)));
        assert_eq!(stepper.current(), 1);
    }

    #[test]
    fn zero_steps_is_treated_as_one() {
        let stepper = Stepper::new(0);
        assert!(stepper.is_first() && stepper.is_last());
    }
}
