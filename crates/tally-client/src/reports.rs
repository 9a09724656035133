//! # Reports
//!
//! Dashboard figures and the monthly sales listing.
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────┐
//! │ This week    │ Two weeks    │ This month   │ Last month   │   SalesSummary
//! │ revenue/count│ revenue/count│ revenue/count│ revenue/count│
//! └──────────────┴──────────────┴──────────────┴──────────────┘
//!   ▁▂▃▅▂▇▆▃▂▅▆▇   daily totals                                    ChartSeries
//!
//!   invoice # | customer | phone | email | date | total          SaleRecord page
//! ```

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::{Money, ProductId};

use crate::backend::push_contains;

// =============================================================================
// Summary Cards
// =============================================================================

/// Figures for one reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub total_revenue: Money,
    pub total_sales: Money,
    pub total_discount: Money,
    /// Number of invoices.
    pub count: u64,
}

impl PeriodSummary {
    /// Revenue per invoice, or zero when there were none.
    pub fn average_ticket(&self) -> Money {
        if self.count == 0 {
            return Money::zero();
        }
        Money::from_cents(self.total_revenue.cents() / self.count as i64)
    }
}

/// The four dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesSummary {
    pub week: PeriodSummary,
    #[serde(rename = "two-weeks")]
    pub two_weeks: PeriodSummary,
    pub month: PeriodSummary,
    #[serde(rename = "last-month")]
    pub last_month: PeriodSummary,
}

// =============================================================================
// Chart
// =============================================================================

/// Sales total for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub total: Money,
}

/// Daily totals in date order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(mut points: Vec<ChartPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        ChartSeries { points }
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    /// Points within the last `days` days up to and including `today`.
    ///
    /// A window reaching past the earliest representable date keeps
    /// everything up to `today`.
    pub fn trailing(&self, today: NaiveDate, days: i64) -> ChartSeries {
        let back = Days::new(days.max(1).unsigned_abs() - 1);
        let from = today.checked_sub_days(back).unwrap_or(NaiveDate::MIN);
        ChartSeries {
            points: self
                .points
                .iter()
                .filter(|p| p.date >= from && p.date <= today)
                .copied()
                .collect(),
        }
    }

    pub fn total(&self) -> Money {
        self.points.iter().map(|p| p.total).sum()
    }
}

// =============================================================================
// Monthly Listing
// =============================================================================

/// `[first instant of the month, first instant of the next month)` in UTC.
///
/// `None` only at the far end of the calendar.
pub fn month_bounds(date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?;
    let end = start.checked_add_months(Months::new(1))?;
    Some((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}

/// Column filters of the sales report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilter {
    /// Exact match, case-insensitive.
    pub invoice_number: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    /// Inclusive lower bound.
    pub date_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub date_to: Option<DateTime<Utc>>,
}

impl SalesFilter {
    /// Filter restricted to the calendar month containing `today`.
    pub fn current_month(today: NaiveDate) -> Self {
        let (date_from, date_to) = match month_bounds(today) {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };
        SalesFilter {
            date_from,
            date_to,
            ..SalesFilter::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(number) = self
            .invoice_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            pairs.push((
                "filters[invoice_number][$eqi]".to_string(),
                number.to_string(),
            ));
        }
        push_contains(&mut pairs, "customer_name", &self.customer_name);
        push_contains(&mut pairs, "customer_email", &self.customer_email);
        push_contains(&mut pairs, "customer_phone", &self.customer_phone);

        if let Some(from) = self.date_from {
            pairs.push(("filters[date][$gte]".to_string(), from.to_rfc3339()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("filters[date][$lt]".to_string(), to.to_rfc3339()));
        }
        pairs
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One line of a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecordLine {
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub image: Option<String>,
    pub price: Money,
    pub quantity: i64,
}

impl SaleRecordLine {
    pub fn amount(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// A recorded sale, as listed in reports and printed as an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: String,
    pub document_id: Option<String>,
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub lines: Vec<SaleRecordLine>,
}

impl SaleRecord {
    /// Sum of the line amounts as printed on the invoice.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(SaleRecordLine::amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        let (from, to) = month_bounds(day(2026, 10, 18)).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-10-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2026-11-01T00:00:00+00:00");

        // December rolls into the next year
        let (_, to) = month_bounds(day(2026, 12, 31)).unwrap();
        assert_eq!(to.to_rfc3339(), "2027-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_current_month_filter_pairs() {
        let mut filter = SalesFilter::current_month(day(2026, 2, 14));
        filter.invoice_number = Some("inv-001".to_string());
        filter.customer_name = Some("ada".to_string());

        let pairs = filter.query_pairs();
        assert!(pairs.contains(&("filters[invoice_number][$eqi]".into(), "inv-001".into())));
        assert!(pairs.contains(&("filters[customer_name][$containsi]".into(), "ada".into())));
        assert!(pairs.contains(&(
            "filters[date][$gte]".into(),
            "2026-02-01T00:00:00+00:00".into()
        )));
        assert!(pairs.contains(&(
            "filters[date][$lt]".into(),
            "2026-03-01T00:00:00+00:00".into()
        )));
    }

    #[test]
    fn test_trailing_series() {
        let series = ChartSeries::new(vec![
            ChartPoint { date: day(2026, 10, 18), total: Money::from_cents(300) },
            ChartPoint { date: day(2026, 10, 1), total: Money::from_cents(100) },
            ChartPoint { date: day(2026, 10, 12), total: Money::from_cents(200) },
        ]);
        assert_eq!(series.points()[0].date, day(2026, 10, 1));

        let week = series.trailing(day(2026, 10, 18), 7);
        assert_eq!(week.points().len(), 2);
        assert_eq!(week.total().cents(), 500);
    }

    #[test]
    fn test_trailing_series_with_huge_window() {
        let series = ChartSeries::new(vec![
            ChartPoint { date: day(2026, 10, 18), total: Money::from_cents(300) },
            ChartPoint { date: day(1970, 1, 1), total: Money::from_cents(100) },
            ChartPoint { date: day(2026, 10, 19), total: Money::from_cents(50) },
        ]);

        let all = series.trailing(day(2026, 10, 18), i64::MAX);
        assert_eq!(all.points().len(), 2);
        assert_eq!(all.total().cents(), 400);

        let today_only = series.trailing(day(2026, 10, 18), i64::MIN);
        assert_eq!(today_only.points().len(), 1);
    }

    #[test]
    fn test_summary_field_names() {
        let json = serde_json::to_value(SalesSummary::default()).unwrap();
        assert!(json.get("two-weeks").is_some());
        assert!(json.get("last-month").is_some());
        assert!(json["week"].get("totalRevenue").is_some());
    }

    #[test]
    fn test_average_ticket() {
        let period = PeriodSummary {
            total_revenue: Money::from_cents(10_000),
            count: 4,
            ..PeriodSummary::default()
        };
        assert_eq!(period.average_ticket().cents(), 2500);
        assert!(PeriodSummary::default().average_ticket().is_zero());
    }
}
