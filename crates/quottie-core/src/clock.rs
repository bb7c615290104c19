use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now" for anything that depends on the calendar date
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date of `at` in the local time zone
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct Fixed(DateTime<Utc>);

    impl Clock for Fixed {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_today_matches_local_date_of_now() {
        let now = Utc::now();
        let clock = Fixed(now);
        assert_eq!(clock.today(), now.with_timezone(&Local).date_naive());
    }

    #[test]
    fn test_two_days_apart_are_different_dates() {
        let now = Utc::now();
        let clock = Fixed(now);
        assert_ne!(clock.local_date(now), clock.local_date(now - Duration::days(2)));
    }
}
