mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pact_core::{AppError, Config, ConfigError};
use pact_ui::render::{render_month, render_table};
use pact_ui::{AppServices, CalendarUpdate, CalendarView, TableUpdate, TableView};

const LOAD_TIMEOUT: Duration = Duration::from_secs(15);

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    pact_core::init()?;

    let (config, _) = Config::load_validated().map_err(config_failure)?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let services = AppServices::new(&config)?;
    let ctx = services.context();
    let mut calendar = CalendarView::mount(&ctx, cli.month.map(|m| m.first_day()));
    let mut table = TableView::mount(&ctx);

    let (calendar_update, table_update) = services
        .block_on(async {
            tokio::time::timeout(LOAD_TIMEOUT, async {
                (calendar.next_update().await, table.next_update().await)
            })
            .await
        })
        .context("Timed out waiting for the pact server")?;

    if !matches!(calendar_update, Some(CalendarUpdate::Loaded(_))) {
        tracing::warn!("Calendar could not load pacts");
    }

    println!("{}", render_month(calendar.month(), &calendar.cells()));

    match (table_update, table.error()) {
        (Some(TableUpdate::LoadFailed), Some(error)) => eprintln!("Error: {}", error),
        _ => println!("{}", render_table(table.pacts(), &services.settings().zone)),
    }

    drop(table);
    drop(calendar);
    services.shutdown();
    Ok(())
}

/// Phrase config failures for the user; the full error goes to the log.
fn config_failure(e: anyhow::Error) -> anyhow::Error {
    match e.downcast::<ConfigError>() {
        Ok(config_error) => {
            let app = AppError::from(config_error);
            tracing::error!("{}", app);
            anyhow::anyhow!("{} ({})", app.user_message(), app)
        }
        Err(e) => e,
    }
}
