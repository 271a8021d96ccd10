//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST surface: order submission, the pending listing, completion,
//! and the health probes. Swagger UI serves the document in debug builds.

use utoipa::OpenApi;

use crate::domain::error::{Error, ErrorCode};
use crate::inbound::http::orders::{
    CompleteOrderAckBody, OrderBody, OrderLineBody, SubmitOrderBody,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taproom API",
        description = "HTTP interface for submitting drink orders, listing pending orders, and marking them completed. Live status updates are pushed over the /ws channel."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::orders::submit_order,
        crate::inbound::http::orders::list_pending_orders,
        crate::inbound::http::orders::complete_order,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        SubmitOrderBody,
        OrderBody,
        OrderLineBody,
        CompleteOrderAckBody,
        Error,
        ErrorCode
    )),
    tags(
        (name = "orders", description = "Order lifecycle operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
