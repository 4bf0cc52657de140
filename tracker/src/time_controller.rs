use tracing::debug;

use crate::units::{Time, Timestamp};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TimeCommand {
    Advance,
    Rewind,
    Reset,
}

/// Signed offset of the simulated clock from the wall clock
#[derive(Clone, Debug)]
pub struct TimeController {
    offset: Time,
    step: Time,
}

impl TimeController {
    pub fn new(step: Time) -> Self {
        Self {
            offset: Time::ZERO,
            step,
        }
    }

    pub fn offset(&self) -> Time {
        self.offset
    }

    pub fn step(&self) -> Time {
        self.step
    }

    pub fn advance(&mut self) {
        self.offset += self.step;
    }

    pub fn rewind(&mut self) {
        self.offset -= self.step;
    }

    pub fn reset(&mut self) {
        self.offset = Time::ZERO;
    }

    pub fn apply(&mut self, cmd: TimeCommand) {
        match cmd {
            TimeCommand::Advance => self.advance(),
            TimeCommand::Rewind => self.rewind(),
            TimeCommand::Reset => self.reset(),
        }
        debug!(?cmd, offset = %self.offset, "Time offset changed");
    }

    pub fn simulated_now(&self, real_now: Timestamp) -> Timestamp {
        real_now + self.offset
    }
}

impl Default for TimeController {
    fn default() -> Self {
        Self::new(Time::from_minutes(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_rewind_are_inverse() {
        let mut tc = TimeController::new(Time::from_secs(37.3));
        let now = Timestamp::now();
        for _ in 0..5 {
            tc.advance();
        }
        tc.rewind();
        tc.advance();
        for _ in 0..5 {
            tc.rewind();
        }
        assert_eq!(tc.offset(), Time::ZERO);
        assert_eq!(tc.simulated_now(now), now);
    }

    #[test]
    fn reset_zeroes_offset() {
        let mut tc = TimeController::default();
        tc.apply(TimeCommand::Rewind);
        tc.apply(TimeCommand::Rewind);
        assert_eq!(tc.offset(), Time::from_minutes(-2.0));
        tc.apply(TimeCommand::Reset);
        assert_eq!(tc.offset(), Time::ZERO);
    }

    #[test]
    fn simulated_now_follows_offset() {
        let mut tc = TimeController::default();
        let now = Timestamp::now();
        tc.apply(TimeCommand::Advance);
        assert_eq!(tc.simulated_now(now) - now, Time::from_minutes(1.0));
    }
}
