use crate::domain::models::{DateRange, FeedbackRecord};
use chrono::NaiveDate;

fn start_of_day_millis(date: NaiveDate) -> i64 {
    date.and_hms_milli_opt(0, 0, 0, 0).unwrap().and_utc().timestamp_millis()
}

fn end_of_day_millis(date: NaiveDate) -> i64 {
    date.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc().timestamp_millis()
}

/// Inclusive on both ends: the start bound opens at 00:00:00.000 of its
/// calendar date and the end bound closes at 23:59:59.999, both UTC.
pub fn within(range: &DateRange, timestamp: i64) -> bool {
    if let Some(start) = range.start {
        if timestamp < start_of_day_millis(start) {
            return false;
        }
    }
    if let Some(end) = range.end {
        if timestamp > end_of_day_millis(end) {
            return false;
        }
    }
    true
}

/// Order-preserving date filter over the full record sequence.
pub fn filtered_view(all: &[FeedbackRecord], range: &DateRange) -> Vec<FeedbackRecord> {
    all.iter()
        .filter(|r| within(range, r.timestamp))
        .cloned()
        .collect()
}

/// Pending vs applied range: editing the date inputs only touches `pending`;
/// the view recomputes from `applied`, which changes on an explicit apply or
/// clear action.
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterState {
    pub pending: DateRange,
    pub applied: DateRange,
}

impl FilterState {
    pub fn set_pending(&mut self, range: DateRange) {
        self.pending = range;
    }

    pub fn apply(&mut self) {
        self.applied = self.pending;
    }

    pub fn clear(&mut self) {
        self.pending = DateRange::unbounded();
        self.applied = DateRange::unbounded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RatingLevel;
    use std::collections::BTreeMap;

    fn record(ts: i64) -> FeedbackRecord {
        FeedbackRecord {
            overall: RatingLevel::Satisfied,
            categories: BTreeMap::new(),
            comments: String::new(),
            apartment_number: "101".to_string(),
            timestamp: ts,
            guest_name: None,
            guest_email: None,
            guest_phone: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_bound_includes_the_last_millisecond_of_the_day() {
        let range = DateRange { start: None, end: Some(date(2024, 3, 10)) };
        let last_milli = end_of_day_millis(date(2024, 3, 10));
        assert!(within(&range, last_milli));
        assert!(!within(&range, last_milli + 1));
    }

    #[test]
    fn start_bound_includes_midnight_exactly() {
        let range = DateRange { start: Some(date(2024, 3, 10)), end: None };
        let midnight = start_of_day_millis(date(2024, 3, 10));
        assert!(within(&range, midnight));
        assert!(!within(&range, midnight - 1));
    }

    #[test]
    fn unbounded_range_matches_everything() {
        assert!(within(&DateRange::unbounded(), 0));
        assert!(within(&DateRange::unbounded(), i64::MAX));
    }

    #[test]
    fn filtered_view_preserves_order() {
        let day = date(2024, 3, 10);
        let inside = start_of_day_millis(day);
        let all = vec![record(inside + 10), record(inside - 1), record(inside + 5)];
        let range = DateRange { start: Some(day), end: Some(day) };
        let view = filtered_view(&all, &range);
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].timestamp, inside + 10);
        assert_eq!(view[1].timestamp, inside + 5);
    }

    #[test]
    fn pending_edits_do_not_filter_until_applied() {
        let mut filter = FilterState::default();
        filter.set_pending(DateRange { start: Some(date(2024, 1, 1)), end: None });
        assert!(filter.applied.is_unbounded());

        filter.apply();
        assert_eq!(filter.applied.start, Some(date(2024, 1, 1)));

        filter.clear();
        assert!(filter.pending.is_unbounded());
        assert!(filter.applied.is_unbounded());
    }
}
