//! Order HTTP handlers.
//!
//! ```text
//! POST  /orders
//! GET   /orders
//! PATCH /orders/{order_id}
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    CompleteOrderRequest, ListPendingOrdersRequest, OrderLinePayload, OrderPayload,
    SubmitOrderRequest,
};
use crate::domain::{Error, ItemId, OrderId, OwnerRef};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::state::HttpState;

/// Request payload for submitting an order.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderBody {
    /// Owner identity supplied by the auth collaborator; omitted requests
    /// are attributed to the anonymous owner.
    pub owner: Option<String>,
    /// Item id → quantity.
    pub items: BTreeMap<String, u32>,
}

/// One order line with captured price and computed total.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineBody {
    /// Catalog item id.
    pub item_id: String,
    /// Display name captured at order time.
    pub name: String,
    /// Ordered quantity.
    pub quantity: u32,
    /// Unit price captured at order time.
    #[schema(value_type = String, example = "2.70")]
    pub unit_price: Decimal,
    /// Quantity × unit price.
    #[schema(value_type = String, example = "5.40")]
    pub line_total: Decimal,
}

impl From<OrderLinePayload> for OrderLineBody {
    fn from(line: OrderLinePayload) -> Self {
        Self {
            item_id: line.item_id,
            name: line.name,
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
        }
    }
}

/// An order with per-line breakdown and grand total.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    /// ULID order identifier.
    pub id: String,
    /// Attributed owner.
    pub owner: String,
    /// Submission timestamp.
    #[schema(value_type = String, format = "date-time")]
    pub placed_at: DateTime<Utc>,
    /// Lifecycle state (`pending` or `completed`).
    #[schema(example = "pending")]
    pub status: String,
    /// Ordered lines.
    pub lines: Vec<OrderLineBody>,
    /// Grand total.
    #[schema(value_type = String, example = "9.40")]
    pub total: Decimal,
}

impl From<OrderPayload> for OrderBody {
    fn from(order: OrderPayload) -> Self {
        Self {
            id: order.id.to_string(),
            owner: order.owner.to_string(),
            placed_at: order.placed_at,
            status: order.status.to_string(),
            lines: order.lines.into_iter().map(OrderLineBody::from).collect(),
            total: order.total,
        }
    }
}

/// Acknowledgement returned by the completion endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOrderAckBody {
    /// The transitioned order.
    pub id: String,
    /// Resulting state, always `completed`.
    #[schema(example = "completed")]
    pub status: String,
}

/// Submit a new order.
#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body = SubmitOrderBody,
    responses(
        (status = 201, description = "Order created as pending", body = OrderBody),
        (status = 400, description = "Empty items, unknown ids, or zero quantities", body = Error),
        (status = 503, description = "Order storage unavailable", body = Error)
    )
)]
#[post("/orders")]
pub async fn submit_order(
    state: web::Data<HttpState>,
    body: web::Json<SubmitOrderBody>,
) -> ApiResult<HttpResponse> {
    let SubmitOrderBody { owner, items } = body.into_inner();
    let request = SubmitOrderRequest {
        owner: owner.map(OwnerRef::new),
        items: items
            .into_iter()
            .map(|(id, quantity)| (ItemId::new(id), quantity))
            .collect(),
    };

    let response = state.orders.submit_order(request).await?;
    Ok(HttpResponse::Created().json(OrderBody::from(response.order)))
}

/// Query parameters accepted by the pending-order listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPendingOrdersParams {
    /// Restrict the listing to one owner.
    pub owner: Option<String>,
}

/// List pending orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    params(ListPendingOrdersParams),
    responses(
        (status = 200, description = "Pending orders, possibly empty", body = [OrderBody]),
        (status = 503, description = "Order storage unavailable", body = Error)
    )
)]
#[get("/orders")]
pub async fn list_pending_orders(
    state: web::Data<HttpState>,
    query: web::Query<ListPendingOrdersParams>,
) -> ApiResult<HttpResponse> {
    let request = ListPendingOrdersRequest {
        owner: query.into_inner().owner.map(OwnerRef::new),
    };

    let response = state.orders_query.list_pending(request).await?;
    let bodies: Vec<OrderBody> = response.orders.into_iter().map(OrderBody::from).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

/// Mark an order as completed.
#[utoipa::path(
    patch,
    path = "/orders/{order_id}",
    tag = "orders",
    params(("order_id" = String, Path, description = "ULID of the order")),
    responses(
        (status = 200, description = "Order completed (idempotent)", body = CompleteOrderAckBody),
        (status = 400, description = "Malformed order id", body = Error),
        (status = 404, description = "Unknown order id", body = Error)
    )
)]
#[patch("/orders/{order_id}")]
pub async fn complete_order(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let order_id = raw.parse::<OrderId>().map_err(|_| {
        Error::invalid_request("order id must be a ULID").with_details(json!({
            "field": "orderId",
            "value": raw.as_str(),
        }))
    })?;

    let response = state
        .orders
        .complete_order(CompleteOrderRequest { order_id })
        .await?;
    Ok(HttpResponse::Ok().json(CompleteOrderAckBody {
        id: response.order_id.to_string(),
        status: response.status.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    use super::*;
    use crate::domain::ports::{
        CompleteOrderResponse, ListPendingOrdersResponse, MockOrderCommand, MockOrderQuery,
        SubmitOrderResponse,
    };
    use crate::domain::{
        Order, OrderDraft, OrderLine, OrderStatus,
    };

    fn sample_payload(owner: &str) -> OrderPayload {
        let order = Order::new(OrderDraft {
            id: OrderId::generate(),
            owner: OwnerRef::new(owner),
            placed_at: Utc::now(),
            status: OrderStatus::Pending,
            lines: vec![
                OrderLine::new(ItemId::new("small_beer"), "Small Beer", 2, Decimal::new(270, 2))
                    .expect("valid line"),
                OrderLine::new(ItemId::new("wine"), "Wine", 1, Decimal::new(400, 2))
                    .expect("valid line"),
            ],
        })
        .expect("valid order");
        OrderPayload::from(&order)
    }

    fn state(command: MockOrderCommand, query: MockOrderQuery) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(Arc::new(command), Arc::new(query)))
    }

    #[actix_web::test]
    async fn submit_returns_created_with_totals() {
        let mut command = MockOrderCommand::new();
        command.expect_submit_order().returning(|_| {
            Ok(SubmitOrderResponse {
                order: sample_payload("tab-7"),
            })
        });

        let app = test::init_service(
            App::new()
                .app_data(state(command, MockOrderQuery::new()))
                .service(submit_order),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/orders")
            .set_json(serde_json::json!({
                "owner": "tab-7",
                "items": { "small_beer": 2, "wine": 1 }
            }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["total"], "9.40");
        assert_eq!(body["lines"][0]["unitPrice"], "2.70");
    }

    #[actix_web::test]
    async fn submit_maps_validation_failures_to_bad_request() {
        let mut command = MockOrderCommand::new();
        command.expect_submit_order().returning(|_| {
            Err(Error::invalid_request("unknown item ids")
                .with_details(serde_json::json!({ "unknownItemIds": ["mead"] })))
        });

        let app = test::init_service(
            App::new()
                .app_data(state(command, MockOrderQuery::new()))
                .service(submit_order),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/orders")
            .set_json(serde_json::json!({ "items": { "mead": 1 } }))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["unknownItemIds"][0], "mead");
    }

    #[actix_web::test]
    async fn listing_returns_empty_array_when_nothing_is_pending() {
        let mut query = MockOrderQuery::new();
        query
            .expect_list_pending()
            .returning(|_| Ok(ListPendingOrdersResponse { orders: Vec::new() }));

        let app = test::init_service(
            App::new()
                .app_data(state(MockOrderCommand::new(), query))
                .service(list_pending_orders),
        )
        .await;

        let request = test::TestRequest::get().uri("/orders").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body, serde_json::json!([]));
    }

    #[actix_web::test]
    async fn completion_acknowledges_with_the_resulting_state() {
        let mut command = MockOrderCommand::new();
        command.expect_complete_order().returning(|request| {
            Ok(CompleteOrderResponse {
                order_id: request.order_id,
                status: OrderStatus::Completed,
            })
        });

        let order_id = OrderId::generate();
        let app = test::init_service(
            App::new()
                .app_data(state(command, MockOrderQuery::new()))
                .service(complete_order),
        )
        .await;

        let request = test::TestRequest::patch()
            .uri(&format!("/orders/{order_id}"))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["id"], order_id.to_string());
        assert_eq!(body["status"], "completed");
    }

    #[actix_web::test]
    async fn completing_an_unknown_order_returns_not_found() {
        let mut command = MockOrderCommand::new();
        command
            .expect_complete_order()
            .returning(|request| Err(Error::not_found(format!("order {} not found", request.order_id))));

        let app = test::init_service(
            App::new()
                .app_data(state(command, MockOrderQuery::new()))
                .service(complete_order),
        )
        .await;

        let request = test::TestRequest::patch()
            .uri(&format!("/orders/{}", OrderId::generate()))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["code"], "not_found");
    }

    #[actix_web::test]
    async fn malformed_order_ids_never_reach_the_service() {
        let mut command = MockOrderCommand::new();
        command.expect_complete_order().never();

        let app = test::init_service(
            App::new()
                .app_data(state(command, MockOrderQuery::new()))
                .service(complete_order),
        )
        .await;

        let request = test::TestRequest::patch()
            .uri("/orders/not-a-ulid")
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
