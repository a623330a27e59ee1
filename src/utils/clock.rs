use chrono::{DateTime, Local, NaiveDate, Utc};

/// Represents an entity responsible for providing dates across application. This allows commands
/// to be tested against a fixed "today".
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn time(&self) -> DateTime<Local>;
}

/// Helpers every command needs, derived from [Clock::time].
pub trait ClockExt: Clock {
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }

    fn utc(&self) -> DateTime<Utc> {
        self.time().to_utc()
    }
}

impl<C: Clock + ?Sized> ClockExt for C {}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at `time`.
#[cfg(test)]
pub fn fixed_clock(time: DateTime<Local>) -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_time().return_const(time);
    clock
}
