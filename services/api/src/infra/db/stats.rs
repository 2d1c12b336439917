use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, Statement,
};

use marquee_api_schema::{events, tickets, users};
use marquee_domain::event::EventStatus;
use marquee_domain::ticket::TicketStatus;

use crate::domain::repository::StatsRepository;
use crate::domain::types::{DashboardStats, DateRange};
use crate::error::ApiError;

/// Net revenue: completed payments plus whatever a refunded payment kept.
const REVENUE_SQL: &str = r#"
    SELECT COALESCE(SUM(amount - COALESCE(refund_amount, 0)), 0)::BIGINT AS revenue
    FROM payments
    WHERE status IN ('completed', 'refunded')
"#;

const PERIOD_REVENUE_SQL: &str = r#"
    SELECT COALESCE(SUM(amount - COALESCE(refund_amount, 0)), 0)::BIGINT AS revenue
    FROM payments
    WHERE status IN ('completed', 'refunded')
      AND transaction_date >= $1 AND transaction_date <= $2
"#;

const TICKETS_BY_STATUS_SQL: &str = r#"
    SELECT status, COUNT(*)::BIGINT AS count
    FROM tickets
    GROUP BY status
    ORDER BY status
"#;

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    revenue: i64,
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: String,
    count: i64,
}

#[derive(Clone)]
pub struct DbStatsRepository {
    pub db: DatabaseConnection,
}

impl DbStatsRepository {
    async fn revenue(&self, stmt: Statement) -> Result<i64, ApiError> {
        let row = RevenueRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .context("sum revenue")?;
        Ok(row.map(|r| r.revenue).unwrap_or(0))
    }
}

impl StatsRepository for DbStatsRepository {
    async fn dashboard(
        &self,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, ApiError> {
        let backend = self.db.get_database_backend();

        let total_users = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        let new_users = users::Entity::find()
            .filter(users::Column::CreatedAt.between(range.start, range.end))
            .count(&self.db)
            .await
            .context("count new users")?;

        let total_events = events::Entity::find()
            .count(&self.db)
            .await
            .context("count events")?;
        let upcoming_events = events::Entity::find()
            .filter(events::Column::Status.eq(EventStatus::Published.as_str()))
            .filter(events::Column::StartDate.gt(now))
            .count(&self.db)
            .await
            .context("count upcoming events")?;

        let total_tickets = tickets::Entity::find()
            .count(&self.db)
            .await
            .context("count tickets")?;
        let active_tickets = tickets::Entity::find()
            .filter(tickets::Column::Status.eq(TicketStatus::Active.as_str()))
            .count(&self.db)
            .await
            .context("count active tickets")?;
        let tickets_by_status = StatusCountRow::find_by_statement(Statement::from_string(
            backend,
            TICKETS_BY_STATUS_SQL,
        ))
        .all(&self.db)
        .await
        .context("group tickets by status")?
        .into_iter()
        .map(|row| (row.status, u64::try_from(row.count).unwrap_or(0)))
        .collect();

        let total_revenue = self
            .revenue(Statement::from_string(backend, REVENUE_SQL))
            .await?;
        let period_revenue = self
            .revenue(Statement::from_sql_and_values(
                backend,
                PERIOD_REVENUE_SQL,
                [range.start.into(), range.end.into()],
            ))
            .await?;

        Ok(DashboardStats {
            total_users,
            new_users,
            total_events,
            upcoming_events,
            total_tickets,
            active_tickets,
            tickets_by_status,
            total_revenue,
            period_revenue,
        })
    }
}
