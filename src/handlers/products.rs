use actix_web::{web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::inventory_log::InventoryLog;
use crate::models::product::{NewProduct, Product, ProductChanges};
use crate::models::user::SYSTEM_ACTOR_ID;
use crate::schema::products;
use crate::services::inventory;

use super::parse_money;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub sale_price: Option<String>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub sale_price: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed stock delta; positive restocks, negative corrects downwards.
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub sale_price: Option<String>,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            sku: p.sku,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            sale_price: p.sale_price.map(|d| d.to_string()),
            stock: p.stock,
            category_id: p.category_id,
            is_active: p.is_active,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Active products only; deactivated ones stay queryable by id.
#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "Active products", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows = web::block(move || {
        let mut conn = pool.get()?;
        products::table
            .filter(products::is_active.eq(true))
            .order(products::name.asc())
            .select(Product::as_select())
            .load(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = rows.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let found = web::block(move || {
        let mut conn = pool.get()?;
        products::table
            .find(product_id)
            .select(Product::as_select())
            .first(&mut conn)
            .optional()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Product {product_id} not found")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(found)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 409, description = "SKU already exists"),
    ),
    tag = "products"
)]
pub async fn create_product(
    pool: web::Data<DbPool>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.sku.trim().is_empty() || body.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "sku and name must not be empty".to_string(),
        ));
    }
    let stock = body.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".to_string()));
    }
    let row = NewProduct {
        id: Uuid::new_v4(),
        sku: body.sku.trim().to_string(),
        name: body.name,
        description: body.description,
        price: parse_money("price", &body.price)?,
        sale_price: body
            .sale_price
            .as_deref()
            .map(|raw| parse_money("sale_price", raw))
            .transpose()?,
        stock,
        category_id: body.category_id,
    };

    let created: Product = web::block(move || {
        let mut conn = pool.get()?;
        diesel::insert_into(products::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// PATCH /products/{id}
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();
    let changes = ProductChanges {
        name: body.name,
        description: body.description,
        price: body
            .price
            .as_deref()
            .map(|raw| parse_money("price", raw))
            .transpose()?,
        sale_price: body
            .sale_price
            .as_deref()
            .map(|raw| parse_money("sale_price", raw).map(Some))
            .transpose()?,
        category_id: body.category_id.map(Some),
        is_active: body.is_active,
        updated_at: Some(Utc::now()),
    };

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        diesel::update(products::table.find(product_id))
            .set(&changes)
            .get_result::<Product>(&mut conn)
            .optional()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Product {product_id} not found")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(updated)))
}

/// DELETE /products/{id}
///
/// Soft delete: ledger entries and order items keep referencing the row, so
/// products are deactivated rather than removed.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product deactivated"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let updated = web::block(move || {
        let mut conn = pool.get()?;
        diesel::update(products::table.find(product_id))
            .set((
                products::is_active.eq(false),
                products::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if updated == 0 {
        return Err(AppError::NotFound(format!("Product {product_id} not found")));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Product deactivated" })))
}

/// POST /products/{id}/stock
///
/// Manual stock adjustment. Writes a `New_Stock` ledger entry in the same
/// transaction as the stock change; negative deltas cannot overdraw.
#[utoipa::path(
    post,
    path = "/products/{id}/stock",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Adjustment would overdraw stock"),
    ),
    tag = "products"
)]
pub async fn adjust_stock(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<AdjustStockRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let delta = body.into_inner().quantity;

    let updated = web::block(move || {
        let mut conn = pool.get()?;
        inventory::adjust_stock(&mut conn, product_id, delta, SYSTEM_ACTOR_ID)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(updated)))
}

/// GET /products/{id}/inventory
///
/// The product's ledger history, newest first.
#[utoipa::path(
    get,
    path = "/products/{id}/inventory",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Ledger entries", body = [InventoryLog]),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn product_inventory(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let entries = web::block(move || {
        let mut conn = pool.get()?;
        inventory::history(&mut conn, product_id).map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(entries))
}
