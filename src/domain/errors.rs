use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    CouponRejected(#[from] CouponRejection),
    #[error("Insufficient stock for product '{product}'")]
    InsufficientStock { product: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Business-rule rejections for a coupon that does exist. A missing code is
/// `DomainError::NotFound` instead, so callers can tell the two apart.
#[derive(Debug, Error)]
pub enum CouponRejection {
    #[error("Coupon is not active")]
    Inactive,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon usage limit has been reached")]
    UsageLimitReached,
    #[error("Order total is below the coupon minimum of {minimum}")]
    BelowMinimum { minimum: BigDecimal },
    #[error("Coupon has already been used from this address")]
    AlreadyUsed,
}
