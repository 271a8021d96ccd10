//! Server construction and wiring.
//!
//! Builds the port implementations from configuration (database-backed
//! when a pool is present, fixtures otherwise), hands the notification
//! hub to both the WebSocket entry and the order service, and assembles
//! the actix application.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};

use crate::domain::ports::{
    CatalogRepository, FixtureCatalogRepository, FixtureOrderRepository, OrderCommand,
    OrderEventPublisher, OrderQuery, OrderRepository,
};
use crate::domain::{OrderCommandService, OrderQueryService};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::orders::{complete_order, list_pending_orders, submit_order};
use crate::inbound::http::state::HttpState;
use crate::inbound::ws::{WsHub, ws_entry};
use crate::outbound::persistence::{DieselCatalogRepository, DieselOrderRepository};

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Build the order ports from configuration.
///
/// Uses database-backed repositories when a pool is available, fixtures
/// otherwise. The hub doubles as the event publisher either way.
fn build_order_ports(
    config: &ServerConfig,
    publisher: Arc<dyn OrderEventPublisher>,
) -> (Arc<dyn OrderCommand>, Arc<dyn OrderQuery>) {
    let (catalog, orders): (Arc<dyn CatalogRepository>, Arc<dyn OrderRepository>) =
        match &config.db_pool {
            Some(pool) => (
                Arc::new(DieselCatalogRepository::new(pool.clone())),
                Arc::new(DieselOrderRepository::new(pool.clone())),
            ),
            None => (
                Arc::new(FixtureCatalogRepository),
                Arc::new(FixtureOrderRepository),
            ),
        };

    let command = OrderCommandService::new(catalog, Arc::clone(&orders), publisher);
    let query = OrderQueryService::new(orders);
    (Arc::new(command), Arc::new(query))
}

/// Create the HTTP server without starting it.
///
/// The caller owns `health_state` so it can flip readiness once the
/// server is accepting traffic.
pub fn create_server(
    config: ServerConfig,
    health_state: web::Data<HealthState>,
) -> std::io::Result<Server> {
    let hub = web::Data::new(WsHub::new());
    let publisher: Arc<dyn OrderEventPublisher> = hub.clone().into_inner();
    let (command, query) = build_order_ports(&config, publisher);
    let http_state = web::Data::new(HttpState::new(command, query));

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(health_state.clone())
            .app_data(http_state.clone())
            .app_data(hub.clone())
            .service(submit_order)
            .service(list_pending_orders)
            .service(complete_order)
            .service(ws_entry)
            .service(live)
            .service(ready);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?
    .run();

    Ok(server)
}
