//! Backend entry-point: wires storage, the notification hub, REST
//! endpoints, the WebSocket entry, and the retention sweep.

use std::env;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use actix_web::web;
use chrono::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use taproom::domain::default_catalog;
use taproom::domain::ports::{CatalogRepository, OrderRepository};
use taproom::inbound::http::health::HealthState;
use taproom::outbound::persistence::{DbPool, DieselCatalogRepository, DieselOrderRepository};
use taproom::server::{ServerConfig, create_server};

/// How often the retention sweep runs.
const PURGE_INTERVAL: StdDuration = StdDuration::from_secs(60 * 60);

/// Default retention for completed orders, overridable via
/// `TAPROOM_RETENTION_HOURS`.
const DEFAULT_RETENTION_HOURS: i64 = 24;

fn retention_from_env() -> Duration {
    let hours = env::var("TAPROOM_RETENTION_HOURS")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|hours| *hours > 0)
        .unwrap_or(DEFAULT_RETENTION_HOURS);
    Duration::hours(hours)
}

/// Periodically delete completed orders older than the retention window.
/// Rows only; in-flight transactions are never touched.
fn spawn_retention_sweep(orders: Arc<DieselOrderRepository>, retention: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PURGE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match orders.purge_completed_older_than(retention).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "purged completed orders"),
                Err(error) => warn!(error = %error, "retention sweep failed"),
            }
        }
    });
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let bind_addr = env::var("TAPROOM_BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
        .parse()
        .map_err(std::io::Error::other)?;

    let db_pool = match env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = DbPool::connect(&url)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            Some(pool)
        }
        Err(_) => {
            warn!("DATABASE_URL not set; serving with fixture ports");
            None
        }
    };

    if let Some(pool) = &db_pool {
        DieselCatalogRepository::new(pool.clone())
            .seed(&default_catalog())
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        spawn_retention_sweep(
            Arc::new(DieselOrderRepository::new(pool.clone())),
            retention_from_env(),
        );
    }

    let mut config = ServerConfig::new(bind_addr);
    if let Some(pool) = db_pool {
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(config, health_state.clone())?;

    health_state.mark_ready();
    info!(%bind_addr, "taproom backend listening");
    server.await
}
