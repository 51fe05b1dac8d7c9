use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::category::{Category, CategoryChanges, NewCategory};
use crate::schema::categories;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// GET /categories
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "All categories", body = [Category])),
    tag = "categories"
)]
pub async fn list_categories(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let rows: Vec<Category> = web::block(move || {
        let mut conn = pool.get()?;
        categories::table
            .order(categories::name.asc())
            .select(Category::as_select())
            .load(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(rows))
}

/// GET /categories/{id}
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 404, description = "Category not found"),
    ),
    tag = "categories"
)]
pub async fn get_category(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let found: Category = web::block(move || {
        let mut conn = pool.get()?;
        categories::table
            .find(category_id)
            .select(Category::as_select())
            .first(&mut conn)
            .optional()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Category {category_id} not found")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(found))
}

/// POST /categories
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses((status = 201, description = "Category created", body = Category)),
    tag = "categories"
)]
pub async fn create_category(
    pool: web::Data<DbPool>,
    body: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    let row = NewCategory {
        id: Uuid::new_v4(),
        name: body.name,
        description: body.description,
    };

    let created: Category = web::block(move || {
        let mut conn = pool.get()?;
        diesel::insert_into(categories::table)
            .values(&row)
            .get_result(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(created))
}

/// PATCH /categories/{id}
#[utoipa::path(
    patch,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found"),
    ),
    tag = "categories"
)]
pub async fn update_category(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let body = body.into_inner();
    if body.name.is_none() && body.description.is_none() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }
    let changes = CategoryChanges {
        name: body.name,
        description: body.description,
    };

    let updated: Category = web::block(move || {
        let mut conn = pool.get()?;
        diesel::update(categories::table.find(category_id))
            .set(&changes)
            .get_result::<Category>(&mut conn)
            .optional()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Category {category_id} not found")))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /categories/{id}
///
/// Products in the category are left in place with their category cleared.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(("id" = Uuid, Path, description = "Category UUID")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found"),
    ),
    tag = "categories"
)]
pub async fn delete_category(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let deleted = web::block(move || {
        let mut conn = pool.get()?;
        diesel::delete(categories::table.find(category_id))
            .execute(&mut conn)
            .map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    if deleted == 0 {
        return Err(AppError::NotFound(format!("Category {category_id} not found")));
    }
    Ok(HttpResponse::Ok().json(json!({ "message": "Category deleted" })))
}
