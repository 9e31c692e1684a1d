//! Fetch window builders and date arithmetic
//!
//! Windows are anchored at local midnight. Day expansion is inclusive of
//! both endpoints; chunking walks forward in fixed strides and truncates
//! the final chunk at the window's end date.

use chrono::{Days, Local, NaiveDate};

use crate::models::FetchWindow;

impl FetchWindow {
    /// Expand the window into one date per calendar day, inclusive of
    /// both endpoints.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = self.start_date;
        while current <= self.end_date {
            dates.push(current);
            current = current + Days::new(1);
        }
        dates
    }

    /// Split into consecutive sub-windows of `chunk_days` days each.
    ///
    /// Walks in `chunk_days` strides from the start while strictly before
    /// the end date; each chunk's end is truncated to the window's end.
    /// A 30-day window with 3-day chunks yields exactly 10 chunks.
    pub fn chunks(&self, chunk_days: u32) -> Vec<FetchWindow> {
        let mut chunks = Vec::new();
        let mut current = self.start_date;

        while current < self.end_date {
            let chunk_end = current + Days::new(u64::from(chunk_days) - 1);
            chunks.push(FetchWindow {
                start_date: current,
                end_date: chunk_end.min(self.end_date),
            });
            current = current + Days::new(u64::from(chunk_days));
        }

        chunks
    }
}

/// Window for today: local midnight to the next midnight.
pub fn today_window() -> FetchWindow {
    let today = Local::now().date_naive();
    FetchWindow {
        start_date: today,
        end_date: today + Days::new(1),
    }
}

/// Window for the next 7 days.
pub fn week_window() -> FetchWindow {
    let today = Local::now().date_naive();
    FetchWindow {
        start_date: today,
        end_date: today + Days::new(7),
    }
}

/// Window for the next 30 days.
pub fn month_window() -> FetchWindow {
    let today = Local::now().date_naive();
    FetchWindow {
        start_date: today,
        end_date: today + Days::new(30),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> FetchWindow {
        FetchWindow {
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn test_days_is_inclusive_of_both_endpoints() {
        let w = window((2026, 9, 1), (2026, 9, 3));
        let days = w.days();

        assert_eq!(days.len(), 3);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2026, 9, 1).unwrap());
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2026, 9, 3).unwrap());
    }

    #[test]
    fn test_single_day_window() {
        let w = window((2026, 9, 1), (2026, 9, 1));
        assert_eq!(w.days().len(), 1);
    }

    #[test]
    fn test_thirty_day_window_yields_ten_chunks() {
        let start = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let w = FetchWindow {
            start_date: start,
            end_date: start + Days::new(30),
        };

        let chunks = w.chunks(3);
        assert_eq!(chunks.len(), 10);

        // Chunks are consecutive 3-day ranges
        assert_eq!(chunks[0].start_date, start);
        assert_eq!(chunks[0].end_date, start + Days::new(2));
        assert_eq!(chunks[9].start_date, start + Days::new(27));
        assert_eq!(chunks[9].end_date, start + Days::new(29));
    }

    #[test]
    fn test_last_chunk_truncated_to_window_end() {
        let start = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        let w = FetchWindow {
            start_date: start,
            end_date: start + Days::new(7),
        };

        let chunks = w.chunks(3);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].start_date, start + Days::new(6));
        assert_eq!(chunks[2].end_date, start + Days::new(7));
    }

    #[test]
    fn test_window_builders_are_midnight_anchored() {
        let today = Local::now().date_naive();

        let t = today_window();
        assert_eq!(t.start_date, today);
        assert_eq!(t.end_date, today + Days::new(1));

        let w = week_window();
        assert_eq!(w.end_date, today + Days::new(7));

        let m = month_window();
        assert_eq!(m.end_date, today + Days::new(30));
    }
}
