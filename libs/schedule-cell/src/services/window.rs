use chrono::NaiveDate;
use serde::Serialize;

use crate::services::format::format_day_label;

pub const DATE_WINDOW_SIZE: usize = 3;

/// Sliding view over the materialized list of bookable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    offset: usize,
    size: usize,
}

impl Default for DateWindow {
    fn default() -> Self {
        Self::new(DATE_WINDOW_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateOption {
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePage {
    pub dates: Vec<DateOption>,
    pub offset: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl DateWindow {
    pub fn new(size: usize) -> Self {
        Self {
            offset: 0,
            size: size.max(1),
        }
    }

    pub fn at(offset: usize, size: usize) -> Self {
        Self {
            offset,
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn visible<'a>(&self, dates: &'a [NaiveDate]) -> &'a [NaiveDate] {
        let start = self.clamped_offset(dates.len());
        let end = (start + self.size).min(dates.len());
        &dates[start..end]
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.clamped_offset(total) + self.size < total
    }

    pub fn next(&mut self, total: usize) {
        if self.has_next(total) {
            self.offset = self.clamped_offset(total) + 1;
        }
    }

    pub fn previous(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn page(&self, dates: &[NaiveDate]) -> DatePage {
        DatePage {
            dates: self
                .visible(dates)
                .iter()
                .map(|d| DateOption {
                    date: *d,
                    label: format_day_label(*d),
                })
                .collect(),
            offset: self.clamped_offset(dates.len()),
            total: dates.len(),
            has_previous: self.clamped_offset(dates.len()) > 0,
            has_next: self.has_next(dates.len()),
        }
    }

    fn clamped_offset(&self, total: usize) -> usize {
        self.offset.min(total.saturating_sub(self.size))
    }
}
