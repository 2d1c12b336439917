use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};

use crate::domain::repository::StatsRepository;
use crate::domain::types::{DashboardStats, DateRange};
use crate::error::ApiError;

/// Reporting window named by `?time_range=`. Unknown names fall back to `Month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Day,
    Week,
    #[default]
    Month,
    Year,
    Last7Days,
    Last30Days,
    Last3Months,
    Last6Months,
}

impl TimeRange {
    pub fn parse(s: &str) -> Self {
        match s {
            "day" => Self::Day,
            "week" => Self::Week,
            "year" => Self::Year,
            "last7days" => Self::Last7Days,
            "last30days" => Self::Last30Days,
            "last3months" => Self::Last3Months,
            "last6months" => Self::Last6Months,
            _ => Self::Month,
        }
    }
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Last millisecond of `day`.
fn end_of(day: NaiveDate) -> DateTime<Utc> {
    start_of(day) + Duration::days(1) - Duration::milliseconds(1)
}

/// Resolve a named window around `now`. Weeks start on Sunday.
pub fn resolve_range(range: TimeRange, now: DateTime<Utc>) -> DateRange {
    let today = now.date_naive();
    let first_of_month = today.with_day(1).unwrap_or(today);
    let (first, last) = match range {
        TimeRange::Day => (today, today),
        TimeRange::Week => {
            let first = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
            (first, first + Duration::days(6))
        }
        TimeRange::Month => {
            let next = first_of_month
                .checked_add_months(Months::new(1))
                .unwrap_or(first_of_month);
            (first_of_month, next.pred_opt().unwrap_or(next))
        }
        TimeRange::Year => {
            let first = today.with_ordinal(1).unwrap_or(today);
            let next = first.checked_add_months(Months::new(12)).unwrap_or(first);
            (first, next.pred_opt().unwrap_or(next))
        }
        TimeRange::Last7Days => (today - Duration::days(6), today),
        TimeRange::Last30Days => (today - Duration::days(29), today),
        TimeRange::Last3Months => (
            today.checked_sub_months(Months::new(3)).unwrap_or(today),
            today,
        ),
        TimeRange::Last6Months => (
            today.checked_sub_months(Months::new(6)).unwrap_or(today),
            today,
        ),
    };
    DateRange {
        start: start_of(first),
        end: end_of(last),
    }
}

/// Accept `YYYY-MM-DD` or a full RFC 3339 timestamp and keep the calendar day.
pub fn parse_day(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    let value = value.trim();
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| ApiError::invalid(format!("{field} must be a date (YYYY-MM-DD)")))
}

// ── DashboardStats ───────────────────────────────────────────────────────────

pub struct StatsQuery {
    pub time_range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub struct DashboardStatsUseCase<S: StatsRepository> {
    pub repo: S,
}

impl<S: StatsRepository> DashboardStatsUseCase<S> {
    /// An explicit `start_date`+`end_date` pair wins over `time_range`.
    pub async fn execute(
        &self,
        query: StatsQuery,
    ) -> Result<(DashboardStats, DateRange), ApiError> {
        let now = Utc::now();
        let range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
            (Some(start), Some(end)) => {
                let (start, end) = (parse_day("start_date", start)?, parse_day("end_date", end)?);
                if end < start {
                    return Err(ApiError::invalid("end_date must not be before start_date"));
                }
                DateRange {
                    start: start_of(start),
                    end: end_of(end),
                }
            }
            _ => resolve_range(
                query
                    .time_range
                    .as_deref()
                    .map(TimeRange::parse)
                    .unwrap_or_default(),
                now,
            ),
        };
        let stats = self.repo.dashboard(range, now).await?;
        Ok((stats, range))
    }
}
