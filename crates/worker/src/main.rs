use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use timesheet_core::freeze_window::days_in_month;
use timesheet_engine::{EngineConfig, TimesheetService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timesheet_worker=debug,timesheet_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env().context("Invalid timesheet configuration")?;

    let pool = timesheet_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    timesheet_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    timesheet_db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let service = TimesheetService::new(pool, Arc::new(config.policy));
    let policy = service.policy();

    // UTC stands in for the caller's day here; requests bring their own.
    let today = Utc::now().date_naive();
    let window = service.freeze_window(today);

    tracing::info!(
        freeze_day_of_month = policy.freeze_day_of_month,
        daily_efforts_limit = policy.daily_efforts_limit,
        weekly_efforts_limit = policy.weekly_efforts_limit,
        max_connections = config.max_connections,
        "Timesheet engine ready",
    );
    tracing::info!(
        today = %today,
        earliest_editable = %window.earliest_editable(),
        days_in_month = days_in_month(today),
        "Editable window",
    );

    Ok(())
}
