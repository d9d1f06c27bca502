//! Prorated subscription totals over a month-granularity window.
//!
//! A subscription is billed its full price for every calendar month in which
//! it is active inside the window; partial months count as full months.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Subscription, ValidationError};

/// Parses an `MM-YYYY` month into its first instant (day 1, 00:00:00 UTC).
pub fn parse_month(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let invalid = || ValidationError::InvalidMonth {
        field,
        value: value.to_string(),
    };

    let (month, year) = value.trim().split_once('-').ok_or_else(invalid)?;
    if month.len() != 2 || year.len() != 4 {
        return Err(invalid());
    }
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(invalid)
}

/// Inclusive billing window `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl BillingWindow {
    /// Creates a window, validating that `from <= to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ValidationError> {
        if from > to {
            return Err(ValidationError::InvertedWindow);
        }
        Ok(Self { from, to })
    }

    /// Builds a window from two `MM-YYYY` strings.
    pub fn from_months(from: &str, to: &str) -> Result<Self, ValidationError> {
        Self::new(parse_month("from", from)?, parse_month("to", to)?)
    }

    /// Returns true if an active period `[start, end?]` intersects the window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        start <= self.to && end.is_none_or(|end| end >= self.from)
    }
}

/// Which subscriptions a total is computed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingFilter {
    pub window: BillingWindow,
    pub user_id: Option<Uuid>,
    /// Matched by exact, case-sensitive equality.
    pub service_name: Option<String>,
}

impl BillingFilter {
    pub fn new(window: BillingWindow) -> Self {
        Self {
            window,
            user_id: None,
            service_name: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    /// Pre-filter applied before aggregation.
    pub fn admits(&self, subscription: &Subscription, service_name: &str) -> bool {
        self.window
            .overlaps(subscription.start_date, subscription.end_date)
            && self.user_id.is_none_or(|id| subscription.user_id == id)
            && self
                .service_name
                .as_deref()
                .is_none_or(|name| name == service_name)
    }
}

/// Projection of a subscription fetched for billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRow {
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub price: i64,
    pub service_name: String,
}

impl SubscriptionRow {
    pub fn new(subscription: &Subscription, service_name: impl Into<String>) -> Self {
        Self {
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            price: subscription.price,
            service_name: service_name.into(),
        }
    }
}

/// Number of calendar months an active period is billed for inside a window.
///
/// Both ends are clamped to the window and counted inclusively; a period
/// that does not intersect the window bills zero months.
pub fn billed_months(
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    window: &BillingWindow,
) -> i64 {
    let start = start_date.max(window.from);
    let end = match end_date {
        Some(end) if end < window.to => end,
        _ => window.to,
    };

    if start > end {
        return 0;
    }

    let years = i64::from(end.year() - start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months + 1
}

/// Amount a single row contributes to the total, or `None` on overflow.
pub fn contribution(row: &SubscriptionRow, window: &BillingWindow) -> Option<i64> {
    billed_months(row.start_date, row.end_date, window).checked_mul(row.price)
}

/// Sums the contributions of every row.
///
/// Prices are only bounded below, so a large enough price or window can
/// exceed `i64`; that is reported instead of wrapping.
pub fn calculate_total(
    rows: &[SubscriptionRow],
    window: &BillingWindow,
) -> Result<i64, ValidationError> {
    rows.iter().try_fold(0i64, |total, row| {
        contribution(row, window)
            .and_then(|amount| total.checked_add(amount))
            .ok_or(ValidationError::TotalOverflow)
    })
}

/// Response body of the total endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingTotal {
    pub total_price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn q1_2024() -> BillingWindow {
        BillingWindow::new(date(2024, 1, 1), date(2024, 3, 1)).unwrap()
    }

    fn row(start: DateTime<Utc>, end: Option<DateTime<Utc>>, price: i64) -> SubscriptionRow {
        SubscriptionRow {
            start_date: start,
            end_date: end,
            price,
            service_name: "Netflix".to_string(),
        }
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("from", "01-2024").unwrap(), date(2024, 1, 1));
        assert_eq!(parse_month("to", "12-1999").unwrap(), date(1999, 12, 1));
    }

    #[test]
    fn test_parse_month_rejects_malformed_values() {
        for value in ["2024-01", "13-2024", "00-2024", "1-2024", "01/2024", "", "ab-cdef"] {
            assert!(
                matches!(
                    parse_month("from", value),
                    Err(ValidationError::InvalidMonth { field: "from", .. })
                ),
                "expected {value:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        assert_eq!(
            BillingWindow::from_months("03-2024", "01-2024"),
            Err(ValidationError::InvertedWindow)
        );
    }

    #[test]
    fn test_open_ended_subscription_mid_month_start() {
        let row = row(date(2024, 1, 15), None, 100);
        assert_eq!(billed_months(row.start_date, row.end_date, &q1_2024()), 3);
        assert_eq!(contribution(&row, &q1_2024()), Some(300));
    }

    #[test]
    fn test_subscription_ending_inside_window() {
        let row = row(date(2024, 2, 1), Some(date(2024, 2, 20)), 50);
        assert_eq!(contribution(&row, &q1_2024()), Some(50));
    }

    #[test]
    fn test_subscription_ending_before_window() {
        let window = q1_2024();
        let row = row(date(2023, 6, 1), Some(date(2023, 12, 31)), 80);

        assert!(!window.overlaps(row.start_date, row.end_date));
        assert_eq!(contribution(&row, &window), Some(0));
    }

    #[test]
    fn test_subscription_starting_after_window() {
        let row = row(date(2024, 4, 1), None, 80);
        assert_eq!(contribution(&row, &q1_2024()), Some(0));
    }

    #[test]
    fn test_month_count_across_year_boundary() {
        let window = BillingWindow::new(date(2023, 11, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(billed_months(date(2023, 1, 1), None, &window), 4);
    }

    #[test]
    fn test_calculate_total_sums_rows() {
        let rows = vec![
            row(date(2024, 1, 15), None, 100),
            row(date(2024, 2, 1), Some(date(2024, 2, 20)), 50),
            row(date(2023, 1, 1), Some(date(2023, 2, 1)), 999),
        ];
        assert_eq!(calculate_total(&rows, &q1_2024()), Ok(350));
    }

    #[test]
    fn test_large_price_over_several_months_is_rejected() {
        let row = row(date(2024, 1, 1), None, i64::MAX / 2);

        assert_eq!(contribution(&row, &q1_2024()), None);
        assert_eq!(
            calculate_total(&[row], &q1_2024()),
            Err(ValidationError::TotalOverflow)
        );
    }

    #[test]
    fn test_sum_overflow_is_rejected() {
        let single_month = BillingWindow::from_months("01-2024", "01-2024").unwrap();
        let rows = vec![
            row(date(2024, 1, 1), None, i64::MAX - 10),
            row(date(2024, 1, 1), None, 11),
        ];

        assert_eq!(contribution(&rows[0], &single_month), Some(i64::MAX - 10));
        assert_eq!(
            calculate_total(&rows, &single_month),
            Err(ValidationError::TotalOverflow)
        );
    }

    #[test]
    fn test_filter_admits_by_window_user_and_service() {
        let user_id = Uuid::new_v4();
        let sub = Subscription::new(user_id, Uuid::new_v4(), date(2024, 1, 15), 100);
        let filter = BillingFilter::new(q1_2024());

        assert!(filter.admits(&sub, "Netflix"));
        assert!(filter.clone().with_user(user_id).admits(&sub, "Netflix"));
        assert!(!filter
            .clone()
            .with_user(Uuid::new_v4())
            .admits(&sub, "Netflix"));
        assert!(filter
            .clone()
            .with_service_name("Netflix")
            .admits(&sub, "Netflix"));
        assert!(!filter.with_service_name("netflix").admits(&sub, "Netflix"));
    }

    #[test]
    fn test_filter_excludes_subscription_ended_before_window() {
        let sub = Subscription::new(Uuid::new_v4(), Uuid::new_v4(), date(2023, 1, 1), 100)
            .with_end_date(date(2023, 12, 1));
        assert!(!BillingFilter::new(q1_2024()).admits(&sub, "Netflix"));
    }

    #[test]
    fn test_total_serializes_as_total_price() {
        let json = serde_json::to_string(&BillingTotal { total_price: 350 }).unwrap();
        assert_eq!(json, r#"{"total_price":350}"#);
    }
}
