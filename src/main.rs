use clubos::{
    app::AppContext,
    config::{self, database},
    core::transaction,
    errors::Result,
    sheets::{CsvExportSource, SpreadsheetSource},
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    info!(
        "Term starts on {:02}-{:02}",
        app_config.term.start_month, app_config.term.start_day
    );

    // 4. Connect to the transaction store once for the whole process
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;
    info!("{} transactions in store", transaction::count_transactions(&db).await?);

    // 5. Wire the spreadsheet source
    let sheets: Arc<dyn SpreadsheetSource> =
        Arc::new(CsvExportSource::new(app_config.sheets.export_dir.clone()));
    if !sheets.check_connection().await {
        warn!("Spreadsheet exports unavailable; roster ingestion will be empty");
    }

    let ctx = AppContext::new(db, Arc::new(app_config), sheets);

    // 6. Report term statistics and roster size
    let stats = ctx.term_stats(None).await?;
    info!(
        total_balance = stats.total_balance,
        term_income = stats.term_income,
        term_expense = stats.term_expense,
        term_profit = stats.term_profit,
        previous_balance = stats.previous_balance,
        total_transactions = stats.total_transaction_count,
        latest = ?stats.latest_transaction_date,
        "Term statistics"
    );

    let roster = ctx.configured_roster().await;
    info!(
        "Ingested {} roster rows from {} spreadsheet(s)",
        roster.len(),
        ctx.config.sheets.spreadsheet_ids.len()
    );

    Ok(())
}
