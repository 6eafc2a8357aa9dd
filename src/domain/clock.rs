use chrono::{DateTime, NaiveDate, Utc};
use std::sync::RwLock;

/// Source of "now" for issuance, expiry and redemption timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Midnight UTC of the given day.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|p| p.into_inner());
        *guard = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_returns_current_time() {
        let before = Utc::now();
        let result = SystemClock.now();
        let after = Utc::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clock_only_moves_on_set() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);

        let later = Utc.with_ymd_and_hms(2027, 3, 2, 0, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2027, 3, 2).unwrap());
    }

    #[test]
    fn test_fixed_clock_at_date_is_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let clock = FixedClock::at_date(date);
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    }
}
