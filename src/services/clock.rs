//! Calendar date source.

use chrono::{NaiveDate, Utc};
use std::sync::{Mutex, PoisonError};

/// Supplies "today" to the guard
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current UTC date
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock pinned to a settable date
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().unwrap_or_else(PoisonError::into_inner) = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
