use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::payment::PaymentStatus;
use crate::errors::AppError;
use crate::services::orders::{
    self, CreateOrderInput, OrderItemInput, OrderWithItems, UpdateOrderInput,
};

use super::{client_addr, parse_money};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: String,
    pub payment_method: String,
    pub payment_status: Option<PaymentStatus>,
    /// Pre-validated discount as a decimal string, e.g. "50.00"
    pub discount_amount: Option<String>,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status_id: Uuid,
    pub payment_status: String,
    pub total: String,
    pub discount: String,
    pub coupon_code: Option<String>,
    pub shipping_address: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(value: OrderWithItems) -> Self {
        let OrderWithItems { order, items } = value;
        OrderResponse {
            id: order.id,
            order_number: order.order_number,
            customer_id: order.customer_id,
            status_id: order.status_id,
            payment_status: order.payment_status,
            total: order.total.to_string(),
            discount: order.discount.to_string(),
            coupon_code: order.coupon_code,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            notes: order.notes,
            assigned_to: order.assigned_to,
            created_at: order.created_at.to_rfc3339(),
            items: items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price.to_string(),
                    line_total: i.line_total.to_string(),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Creates an order from a cart: resolves the customer, prices every line
/// from product data, applies the discount, and records the coupon
/// redemption, all in one database transaction. Stock is not touched here.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 404, description = "Unknown customer or product"),
        (status = 422, description = "Coupon could not be redeemed"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let discount_amount = body
        .discount_amount
        .as_deref()
        .map(|raw| parse_money("discount_amount", raw))
        .transpose()?;
    let input = CreateOrderInput {
        customer_id: body.customer_id,
        items: body
            .items
            .iter()
            .map(|i| OrderItemInput {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect(),
        shipping_address: body.shipping_address,
        payment_method: body.payment_method,
        payment_status: body.payment_status,
        discount_amount,
        coupon_code: body.coupon_code,
        notes: body.notes,
        client_addr: client_addr(&req),
    };

    let created = web::block(move || {
        let mut conn = pool.get()?;
        orders::create_order(&mut conn, input).map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(created)))
}

/// GET /orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let found = web::block(move || {
        let mut conn = pool.get()?;
        orders::get_order(&mut conn, order_id).map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(found)))
}

/// GET /orders
///
/// Returns a paginated list of orders, newest first, without their items.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    pool: web::Data<DbPool>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);

    let result = web::block(move || {
        let mut conn = pool.get()?;
        orders::list_orders(&mut conn, page, limit).map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<OrderResponse> = result
        .orders
        .into_iter()
        .map(|order| {
            OrderResponse::from(OrderWithItems {
                order,
                items: vec![],
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items,
        total: result.total,
        page,
        limit,
    }))
}

/// PATCH /orders/{id}
///
/// Updates workflow status, payment status, notes, and assignee. A change
/// of payment status into "PAID" reconciles stock: every item is checked
/// and decremented behind a per-row guard, with one ledger entry per item;
/// if any item lacks stock the whole update is rejected and nothing is
/// applied.
#[utoipa::path(
    patch,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Insufficient stock for an item"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let input = UpdateOrderInput {
        status_id: body.status_id,
        payment_status: body.payment_status,
        notes: body.notes,
        assigned_to: body.assigned_to,
    };

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        orders::update_order(&mut conn, order_id, input).map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(updated)))
}

/// DELETE /orders/{id}
///
/// Cancels an order. If the order had been paid, every item's quantity goes
/// back into stock with compensating ledger entries before the order is
/// removed.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let removed = web::block(move || {
        let mut conn = pool.get()?;
        orders::delete_order(&mut conn, order_id).map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Order {} cancelled", removed.order_number)
    })))
}
