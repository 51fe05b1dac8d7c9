use actix_web::HttpResponse;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::NotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::CouponRejected(_) | DomainError::InsufficientStock { .. } => {
                AppError::UnprocessableEntity(e.to_string())
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

// Handlers run plain diesel queries for the thin CRUD surfaces, so the
// infrastructure errors convert here as well.

impl From<diesel::result::Error> for AppError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => AppError::NotFound("Resource not found".to_string()),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                AppError::Conflict(info.message().to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = |msg: &str| serde_json::json!({ "error": msg });
        match self {
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(body(msg)),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(body(msg)),
            AppError::Conflict(msg) => HttpResponse::Conflict().json(body(msg)),
            AppError::UnprocessableEntity(msg) => HttpResponse::UnprocessableEntity().json(body(msg)),
            AppError::Internal(msg) => {
                log::error!("Internal error: {msg}");
                HttpResponse::InternalServerError().json(body("Internal server error"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    use super::*;
    use crate::domain::errors::CouponRejection;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order x not found".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_returns_400() {
        let resp = AppError::BadRequest("missing field".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_returns_409() {
        let resp = AppError::Conflict("duplicate sku".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_error_returns_500() {
        let resp = AppError::Internal("boom".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn domain_validation_maps_to_bad_request() {
        let err: AppError = DomainError::Validation("bad value".to_string()).into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn domain_not_found_maps_to_not_found() {
        let err: AppError = DomainError::NotFound("Coupon 'X'".to_string()).into();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Coupon 'X' not found");
    }

    #[test]
    fn coupon_rejection_maps_to_unprocessable_entity() {
        let err: AppError = DomainError::from(CouponRejection::Expired).into();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        assert_eq!(
            err.error_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn insufficient_stock_names_the_product() {
        let err: AppError = DomainError::InsufficientStock {
            product: "Blue Mug".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Insufficient stock for product 'Blue Mug'");
    }

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        // Diesel's NotFound comes from `.first()` without `.optional()`.
        let err: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
