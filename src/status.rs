/// Status assignment for freshly generated slots.
///
/// Generated calendars do not know about real bookings, so each slot's
/// status comes from a `SlotStatusSource`. The default is a seedable
/// pseudo-random mix; tests and callers with real booking data use the
/// deterministic sources.

use crate::models::SlotStatus;
use crate::time::ClockTime;
use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

pub const DEFAULT_AVAILABLE_RATIO: f64 = 0.7;

pub trait SlotStatusSource: Send {
    fn status_for(&mut self, date: NaiveDate, start_time: ClockTime) -> SlotStatus;
}

/// Random mix: `available_ratio` of slots are available, the rest split
/// evenly between booked and blocked.
#[derive(Debug, Clone)]
pub struct RandomStatus {
    rng: ChaCha8Rng,
    available_ratio: f64,
}

impl RandomStatus {
    pub fn new(seed: Option<u64>, available_ratio: f64) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        RandomStatus {
            rng,
            available_ratio: available_ratio.clamp(0.0, 1.0),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed), DEFAULT_AVAILABLE_RATIO)
    }
}

impl Default for RandomStatus {
    fn default() -> Self {
        Self::new(None, DEFAULT_AVAILABLE_RATIO)
    }
}

impl SlotStatusSource for RandomStatus {
    fn status_for(&mut self, _date: NaiveDate, _start_time: ClockTime) -> SlotStatus {
        let roll: f64 = self.rng.gen();
        let booked_cutoff = self.available_ratio + (1.0 - self.available_ratio) / 2.0;

        if roll < self.available_ratio {
            SlotStatus::Available
        } else if roll < booked_cutoff {
            SlotStatus::Booked
        } else {
            SlotStatus::Blocked
        }
    }
}

/// Every slot is open.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllAvailable;

impl SlotStatusSource for AllAvailable {
    fn status_for(&mut self, _date: NaiveDate, _start_time: ClockTime) -> SlotStatus {
        SlotStatus::Available
    }
}

/// Status taken from known bookings and holds; anything else is available.
#[derive(Debug, Clone, Default)]
pub struct KnownBookings {
    booked: HashSet<(NaiveDate, ClockTime)>,
    blocked: HashSet<(NaiveDate, ClockTime)>,
}

impl KnownBookings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&mut self, date: NaiveDate, start_time: ClockTime) -> &mut Self {
        self.blocked.remove(&(date, start_time));
        self.booked.insert((date, start_time));
        self
    }

    pub fn block(&mut self, date: NaiveDate, start_time: ClockTime) -> &mut Self {
        self.booked.remove(&(date, start_time));
        self.blocked.insert((date, start_time));
        self
    }
}

impl SlotStatusSource for KnownBookings {
    fn status_for(&mut self, date: NaiveDate, start_time: ClockTime) -> SlotStatus {
        let key = (date, start_time);
        if self.booked.contains(&key) {
            SlotStatus::Booked
        } else if self.blocked.contains(&key) {
            SlotStatus::Blocked
        } else {
            SlotStatus::Available
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let mut a = RandomStatus::seeded(7);
        let mut b = RandomStatus::seeded(7);
        let nine = ClockTime::hm(9, 0).unwrap();
        let left: Vec<_> = (0..50).map(|_| a.status_for(monday(), nine)).collect();
        let right: Vec<_> = (0..50).map(|_| b.status_for(monday(), nine)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_random_ratio_roughly_holds() {
        let mut source = RandomStatus::seeded(42);
        let nine = ClockTime::hm(9, 0).unwrap();
        let total = 10_000;
        let available = (0..total)
            .filter(|_| source.status_for(monday(), nine) == SlotStatus::Available)
            .count();
        let share = available as f64 / total as f64;
        assert!((0.65..0.75).contains(&share), "available share was {}", share);
    }

    #[test]
    fn test_ratio_extremes() {
        let nine = ClockTime::hm(9, 0).unwrap();
        let mut never = RandomStatus::new(Some(1), 0.0);
        let mut always = RandomStatus::new(Some(1), 1.0);
        for _ in 0..100 {
            assert_ne!(never.status_for(monday(), nine), SlotStatus::Available);
            assert_eq!(always.status_for(monday(), nine), SlotStatus::Available);
        }
    }

    #[test]
    fn test_known_bookings() {
        let nine = ClockTime::hm(9, 0).unwrap();
        let ten = ClockTime::hm(10, 0).unwrap();
        let eleven = ClockTime::hm(11, 0).unwrap();
        let mut known = KnownBookings::new();
        known.book(monday(), nine).block(monday(), ten);

        assert_eq!(known.status_for(monday(), nine), SlotStatus::Booked);
        assert_eq!(known.status_for(monday(), ten), SlotStatus::Blocked);
        assert_eq!(known.status_for(monday(), eleven), SlotStatus::Available);
    }
}
