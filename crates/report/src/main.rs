//! Print one page of the inventory audit history screen as JSON.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use invtrack_core::memory::InMemoryCatalog;
use invtrack_core::{OrderId, ProductId};
use invtrack_infra::{
    AuditFilter, AuditStore, ConfiguredOrders, ExternalPoLinks, HistoryScreen, InMemoryAuditStore,
    PostgresAuditStore, TrackerConfig, UpdateManager,
};

#[derive(Debug, Parser)]
#[command(name = "invtrack-report")]
#[command(about = "Inventory audit history", long_about = None)]
struct Cli {
    /// Substring of the product SKU
    #[arg(long)]
    sku: Option<String>,

    /// Exact product id
    #[arg(long)]
    product_id: Option<ProductId>,

    /// Exact order or purchase order id
    #[arg(long)]
    order_id: Option<OrderId>,

    /// Only changes on or before this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl Cli {
    fn filter(&self) -> AuditFilter {
        AuditFilter {
            product_id: self.product_id,
            product_sku: self.sku.clone(),
            order_id: self.order_id,
            on_or_before: self.date,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = TrackerConfig::from_env().context("invalid configuration")?;
    invtrack_observability::init_with(&config.log_filter, config.log_format);

    let filter = cli.filter();

    let output = match config.database_url.as_deref() {
        Some(url) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start tokio runtime")?;
            let pool = runtime
                .block_on(
                    PgPoolOptions::new()
                        .max_connections(config.max_connections)
                        .connect(url),
                )
                .context("failed to connect to Postgres")?;

            let store = PostgresAuditStore::new(pool, runtime.handle().clone());
            store.ensure_schema()?;
            render(UpdateManager::new(store).with_page_size(config.page_size), &config, &filter, cli.page)?
        }
        None => {
            tracing::warn!("INVTRACK_DATABASE_URL not set; reporting from an empty in-memory store");
            render(
                UpdateManager::new(InMemoryAuditStore::new()).with_page_size(config.page_size),
                &config,
                &filter,
                cli.page,
            )?
        }
    };

    println!("{output}");
    Ok(())
}

/// Render one history page. The report runs outside the shop, so there is no
/// live catalog and the current-stock rows stay empty.
fn render<S: AuditStore>(
    manager: UpdateManager<S>,
    config: &TrackerConfig,
    filter: &AuditFilter,
    page: u32,
) -> anyhow::Result<String> {
    let orders = ConfiguredOrders::new(config.purchase_order_ids.iter().copied());
    let screen = HistoryScreen::new(orders.clone(), config.admin_url.as_str())
        .with_renderer(ExternalPoLinks::new(orders, config.admin_url.as_str()));

    let report = screen.page(&manager, &InMemoryCatalog::new(), filter, page)?;
    tracing::info!(
        total_count = report.total_count,
        returned = report.rows.len(),
        total_pages = report.total_pages,
        "audit history page loaded"
    );
    Ok(serde_json::to_string_pretty(&report)?)
}
