use crate::domain::models::{FeedbackRecord, CATEGORIES};
use serde::Serialize;
use std::collections::BTreeMap;

/// Arithmetic mean rounded to one decimal place, half away from zero.
/// Empty input is 0, not an error.
pub fn average_of(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: u32 = values.iter().map(|&v| v as u32).sum();
    let mean = sum as f64 / values.len() as f64;
    (mean * 10.0).round() / 10.0
}

pub fn overall_average(view: &[FeedbackRecord]) -> f64 {
    let values: Vec<u8> = view.iter().map(|r| r.overall.value()).collect();
    average_of(&values)
}

/// Records without a rating for `category_id` contribute nothing.
pub fn category_average(view: &[FeedbackRecord], category_id: &str) -> f64 {
    let values: Vec<u8> = view
        .iter()
        .filter_map(|r| r.categories.get(category_id).map(|l| l.value()))
        .collect();
    average_of(&values)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub average_overall: f64,
    pub category_averages: BTreeMap<String, f64>,
    pub total_feedbacks: usize,
    pub recent_comments: Vec<String>,
}

/// Pure derivation from the filtered view; recomputed on demand, never
/// cached across data or filter changes.
pub fn dashboard_stats(view: &[FeedbackRecord]) -> DashboardStats {
    let category_averages = CATEGORIES
        .iter()
        .map(|c| (c.id.to_string(), category_average(view, c.id)))
        .collect();

    let recent_comments = view
        .iter()
        .rev()
        .filter(|r| !r.comments.trim().is_empty())
        .map(|r| r.comments.clone())
        .take(10)
        .collect();

    DashboardStats {
        average_overall: overall_average(view),
        category_averages,
        total_feedbacks: view.len(),
        recent_comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RatingLevel;

    fn record(overall: RatingLevel, wifi: Option<RatingLevel>, comment: &str) -> FeedbackRecord {
        let mut categories = BTreeMap::new();
        if let Some(level) = wifi {
            categories.insert("wifi".to_string(), level);
        }
        FeedbackRecord {
            overall,
            categories,
            comments: comment.to_string(),
            apartment_number: "101".to_string(),
            timestamp: 0,
            guest_name: None,
            guest_email: None,
            guest_phone: None,
        }
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average_of(&[]), 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal_half_away_from_zero() {
        assert_eq!(average_of(&[2, 4]), 3.0);
        assert_eq!(average_of(&[5, 5, 4]), 4.7);
        assert_eq!(average_of(&[1, 2]), 1.5);
    }

    #[test]
    fn category_average_skips_records_without_that_category() {
        let view = vec![
            record(RatingLevel::Excellent, Some(RatingLevel::Unsatisfied), ""),
            record(RatingLevel::Excellent, None, ""),
            record(RatingLevel::Excellent, Some(RatingLevel::Satisfied), ""),
        ];
        // (2 + 4) / 2, not (2 + 0 + 4) / 3.
        assert_eq!(category_average(&view, "wifi"), 3.0);
        assert_eq!(category_average(&view, "staff"), 0.0);
    }

    #[test]
    fn stats_cover_every_fixed_category_and_newest_comments_first() {
        let view = vec![
            record(RatingLevel::Satisfied, None, "older comment"),
            record(RatingLevel::Excellent, None, "   "),
            record(RatingLevel::Excellent, None, "newer comment"),
        ];
        let stats = dashboard_stats(&view);
        assert_eq!(stats.total_feedbacks, 3);
        assert_eq!(stats.average_overall, 4.7);
        assert_eq!(stats.category_averages.len(), CATEGORIES.len());
        assert_eq!(stats.recent_comments, vec!["newer comment", "older comment"]);
    }
}
