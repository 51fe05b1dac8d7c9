use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::discount::DiscountType;
use crate::errors::AppError;
use crate::models::coupon::{Coupon, CouponChanges, NewCoupon};
use crate::schema::coupons;
use crate::services::coupons as coupon_service;

use super::{client_addr, parse_money};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateCouponRequest {
    pub code: String,
    /// Cart subtotal as a decimal string, e.g. "300.00"
    pub cart_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateCouponResponse {
    pub success: bool,
    pub code: String,
    pub discount_amount: String,
    pub message: String,
    pub coupon_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: String,
    pub max_discount: Option<String>,
    pub min_order_amount: Option<String>,
    pub usage_limit: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCouponRequest {
    pub discount_value: Option<String>,
    pub max_discount: Option<String>,
    pub min_order_amount: Option<String>,
    pub usage_limit: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CouponResponse {
    pub id: Uuid,
    pub code: String,
    pub discount_type: String,
    pub discount_value: String,
    pub max_discount: Option<String>,
    pub min_order_amount: Option<String>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub expires_at: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Coupon> for CouponResponse {
    fn from(c: Coupon) -> Self {
        CouponResponse {
            id: c.id,
            code: c.code,
            discount_type: c.discount_type,
            discount_value: c.discount_value.to_string(),
            max_discount: c.max_discount.map(|d| d.to_string()),
            min_order_amount: c.min_order_amount.map(|d| d.to_string()),
            usage_limit: c.usage_limit,
            used_count: c.used_count,
            expires_at: c.expires_at.map(|t| t.to_rfc3339()),
            is_active: c.is_active,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /coupons/validate
///
/// Quotes the discount a coupon would grant against a cart subtotal.
/// Read-only: the redemption itself is recorded when an order carrying the
/// code is created.
#[utoipa::path(
    post,
    path = "/coupons/validate",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Coupon accepted", body = ValidateCouponResponse),
        (status = 404, description = "Unknown coupon code"),
        (status = 422, description = "Coupon exists but cannot be applied"),
    ),
    tag = "coupons"
)]
pub async fn validate_coupon(
    pool: web::Data<DbPool>,
    req: HttpRequest,
    body: web::Json<ValidateCouponRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let cart_total = parse_money("cart_total", &body.cart_total)?;
    let addr = client_addr(&req);

    let quote = web::block(move || {
        let mut conn = pool.get()?;
        coupon_service::validate_coupon(&mut conn, &body.code, &cart_total, &addr)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ValidateCouponResponse {
        success: true,
        code: quote.code,
        discount_amount: quote.discount_amount.to_string(),
        message: quote.message,
        coupon_id: quote.coupon_id,
    }))
}

/// GET /coupons
#[utoipa::path(
    get,
    path = "/coupons",
    responses((status = 200, description = "All coupons", body = [CouponResponse])),
    tag = "coupons"
)]
pub async fn list_coupons(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        coupons::table
            .order(coupons::created_at.desc())
            .select(Coupon::as_select())
            .load(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<CouponResponse> = rows.into_iter().map(CouponResponse::from).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// POST /coupons
#[utoipa::path(
    post,
    path = "/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = CouponResponse),
        (status = 409, description = "Code already exists"),
    ),
    tag = "coupons"
)]
pub async fn create_coupon(
    pool: web::Data<DbPool>,
    body: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let code = body.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::BadRequest("code must not be empty".to_string()));
    }
    let row = NewCoupon {
        id: Uuid::new_v4(),
        code,
        discount_type: body.discount_type.as_str().to_string(),
        discount_value: parse_money("discount_value", &body.discount_value)?,
        max_discount: body
            .max_discount
            .as_deref()
            .map(|raw| parse_money("max_discount", raw))
            .transpose()?,
        min_order_amount: body
            .min_order_amount
            .as_deref()
            .map(|raw| parse_money("min_order_amount", raw))
            .transpose()?,
        usage_limit: body.usage_limit,
        expires_at: body.expires_at,
        is_active: body.is_active.unwrap_or(true),
    };

    let created: Coupon = web::block(move || {
        let mut conn = pool.get()?;
        diesel::insert_into(coupons::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CouponResponse::from(created)))
}

/// PATCH /coupons/{id}
#[utoipa::path(
    patch,
    path = "/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon UUID")),
    request_body = UpdateCouponRequest,
    responses(
        (status = 200, description = "Coupon updated", body = CouponResponse),
        (status = 404, description = "Coupon not found"),
    ),
    tag = "coupons"
)]
pub async fn update_coupon(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCouponRequest>,
) -> Result<HttpResponse, AppError> {
    let coupon_id = path.into_inner();
    let body = body.into_inner();
    if body.discount_value.is_none()
        && body.max_discount.is_none()
        && body.min_order_amount.is_none()
        && body.usage_limit.is_none()
        && body.expires_at.is_none()
        && body.is_active.is_none()
    {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }
    let changes = CouponChanges {
        discount_value: body
            .discount_value
            .as_deref()
            .map(|raw| parse_money("discount_value", raw))
            .transpose()?,
        max_discount: body
            .max_discount
            .as_deref()
            .map(|raw| parse_money("max_discount", raw).map(Some))
            .transpose()?,
        min_order_amount: body
            .min_order_amount
            .as_deref()
            .map(|raw| parse_money("min_order_amount", raw).map(Some))
            .transpose()?,
        usage_limit: body.usage_limit.map(Some),
        expires_at: body.expires_at.map(Some),
        is_active: body.is_active,
    };

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        diesel::update(coupons::table.find(coupon_id))
            .set(&changes)
            .get_result::<Coupon>(&mut conn)
            .optional()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Coupon {coupon_id} not found")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(CouponResponse::from(updated)))
}

/// DELETE /coupons/{id}
#[utoipa::path(
    delete,
    path = "/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon UUID")),
    responses(
        (status = 200, description = "Coupon deleted"),
        (status = 404, description = "Coupon not found"),
    ),
    tag = "coupons"
)]
pub async fn delete_coupon(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let coupon_id = path.into_inner();
    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        diesel::delete(coupons::table.find(coupon_id))
            .execute(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("Coupon {coupon_id} not found")));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Coupon deleted" })))
}
