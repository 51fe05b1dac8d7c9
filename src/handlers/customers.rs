use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::customer::Customer;
use crate::schema::customers;

/// GET /customers
///
/// Customers are never created here; checkout materialises them from
/// accounts as needed.
#[utoipa::path(
    get,
    path = "/customers",
    responses((status = 200, description = "All customers", body = [Customer])),
    tag = "customers"
)]
pub async fn list_customers(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows: Vec<Customer> = web::block(move || {
        let mut conn = pool.get()?;
        customers::table
            .order(customers::created_at.desc())
            .select(Customer::as_select())
            .load(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(rows))
}

/// GET /customers/{id}
#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    responses(
        (status = 200, description = "Customer found", body = Customer),
        (status = 404, description = "Customer not found"),
    ),
    tag = "customers"
)]
pub async fn get_customer(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let customer_id = path.into_inner();
    let found: Customer = web::block(move || {
        let mut conn = pool.get()?;
        customers::table
            .find(customer_id)
            .select(Customer::as_select())
            .first(&mut conn)
            .optional()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Customer {customer_id} not found")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(found))
}
