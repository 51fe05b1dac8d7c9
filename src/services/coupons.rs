use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use crate::domain::discount::{compute_discount, DiscountType};
use crate::domain::errors::{CouponRejection, DomainError};
use crate::models::coupon::Coupon;
use crate::models::coupon_usage::NewCouponUsage;
use crate::schema::{coupon_usages, coupons};

/// Result of a successful validation: what checkout needs to apply the
/// discount and later record the redemption.
#[derive(Debug, Clone)]
pub struct CouponQuote {
    pub coupon_id: Uuid,
    pub code: String,
    pub discount_amount: BigDecimal,
    pub message: String,
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate a coupon code against a cart subtotal.
///
/// Checks run in a fixed order and the first failure wins: unknown code,
/// inactive, expired, usage limit reached, subtotal below minimum, already
/// used from this client address. Pure read: the `used_count` increment and
/// the `CouponUsage` row are written by [`redeem_coupon`] inside the
/// order-creation transaction, never here.
pub fn validate_coupon(
    conn: &mut PgConnection,
    code: &str,
    cart_total: &BigDecimal,
    client_addr: &str,
) -> Result<CouponQuote, DomainError> {
    if cart_total < &BigDecimal::zero() {
        return Err(DomainError::Validation(
            "cart_total must not be negative".to_string(),
        ));
    }
    let normalized = normalize(code);
    if normalized.is_empty() {
        return Err(DomainError::Validation("code must not be empty".to_string()));
    }

    let coupon: Coupon = coupons::table
        .filter(coupons::code.eq(&normalized))
        .select(Coupon::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::NotFound(format!("Coupon '{normalized}'")))?;

    if !coupon.is_active {
        return Err(CouponRejection::Inactive.into());
    }
    if let Some(expires_at) = coupon.expires_at {
        if Utc::now() > expires_at {
            return Err(CouponRejection::Expired.into());
        }
    }
    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return Err(CouponRejection::UsageLimitReached.into());
        }
    }
    if let Some(minimum) = &coupon.min_order_amount {
        if cart_total < minimum {
            return Err(CouponRejection::BelowMinimum {
                minimum: minimum.clone(),
            }
            .into());
        }
    }
    let prior_uses: i64 = coupon_usages::table
        .filter(
            coupon_usages::coupon_id
                .eq(coupon.id)
                .and(coupon_usages::client_addr.eq(client_addr)),
        )
        .count()
        .get_result(conn)?;
    if prior_uses > 0 {
        return Err(CouponRejection::AlreadyUsed.into());
    }

    let discount_type: DiscountType = coupon
        .discount_type
        .parse()
        .map_err(DomainError::Internal)?;
    let discount_amount = compute_discount(
        discount_type,
        &coupon.discount_value,
        coupon.max_discount.as_ref(),
        cart_total,
    );

    Ok(CouponQuote {
        coupon_id: coupon.id,
        message: format!("Coupon {normalized} applied"),
        code: normalized,
        discount_amount,
    })
}

/// Record a redemption inside the caller's transaction.
///
/// The `used_count` increment is guarded by the usage limit in the UPDATE
/// itself, and the `(coupon_id, client_addr)` unique index turns a second
/// redemption from the same client into a rejection, so two concurrent
/// checkouts cannot both redeem.
pub fn redeem_coupon(
    conn: &mut PgConnection,
    code: &str,
    order_id: Uuid,
    client_addr: &str,
) -> Result<(), DomainError> {
    let normalized = normalize(code);
    let coupon_id: Uuid = coupons::table
        .filter(coupons::code.eq(&normalized))
        .select(coupons::id)
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::NotFound(format!("Coupon '{normalized}'")))?;

    let updated = diesel::update(
        coupons::table.filter(coupons::id.eq(coupon_id).and(
            coupons::usage_limit
                .is_null()
                .or(coupons::used_count.lt(coupons::usage_limit.assume_not_null())),
        )),
    )
    .set(coupons::used_count.eq(coupons::used_count + 1))
    .execute(conn)?;
    if updated == 0 {
        return Err(CouponRejection::UsageLimitReached.into());
    }

    let inserted = diesel::insert_into(coupon_usages::table)
        .values(&NewCouponUsage {
            id: Uuid::new_v4(),
            coupon_id,
            order_id,
            client_addr: client_addr.to_string(),
        })
        .execute(conn);
    match inserted {
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(CouponRejection::AlreadyUsed.into())
        }
        Err(e) => Err(e.into()),
        Ok(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use diesel::prelude::*;

    use super::*;
    use crate::services::testsupport::{coupon_row, dec, insert_coupon, setup_db};

    const CLIENT: &str = "203.0.113.7";

    #[tokio::test]
    async fn fixed_coupon_quotes_its_value() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        insert_coupon(&mut conn, coupon_row("SAVE50", "FIXED", "50"));

        let quote =
            validate_coupon(&mut conn, "save50", &dec("300"), CLIENT).expect("validate failed");

        assert_eq!(quote.code, "SAVE50");
        assert_eq!(quote.discount_amount, dec("50"));
    }

    #[tokio::test]
    async fn percent_coupon_respects_max_discount() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let mut row = coupon_row("PROMO10", "PERCENT", "10");
        row.max_discount = Some(dec("20"));
        insert_coupon(&mut conn, row);

        let quote =
            validate_coupon(&mut conn, "PROMO10", &dec("1000"), CLIENT).expect("validate failed");

        assert_eq!(quote.discount_amount, dec("20"));
    }

    #[tokio::test]
    async fn code_is_trimmed_and_case_insensitive() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        insert_coupon(&mut conn, coupon_row("SAVE50", "FIXED", "50"));

        let quote =
            validate_coupon(&mut conn, "  Save50 ", &dec("100"), CLIENT).expect("validate failed");
        assert_eq!(quote.code, "SAVE50");
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");

        let err = validate_coupon(&mut conn, "NOPE", &dec("100"), CLIENT).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn inactive_coupon_is_rejected() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let mut row = coupon_row("OLD", "FIXED", "5");
        row.is_active = false;
        insert_coupon(&mut conn, row);

        let err = validate_coupon(&mut conn, "OLD", &dec("100"), CLIENT).unwrap_err();
        assert!(matches!(
            err,
            DomainError::CouponRejected(CouponRejection::Inactive)
        ));
    }

    #[tokio::test]
    async fn expired_coupon_is_rejected() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let mut row = coupon_row("GONE", "FIXED", "5");
        row.expires_at = Some(Utc::now() - Duration::hours(1));
        insert_coupon(&mut conn, row);

        let err = validate_coupon(&mut conn, "GONE", &dec("100"), CLIENT).unwrap_err();
        assert!(matches!(
            err,
            DomainError::CouponRejected(CouponRejection::Expired)
        ));
    }

    #[tokio::test]
    async fn exhausted_usage_limit_is_rejected() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let mut row = coupon_row("FULL", "FIXED", "5");
        row.usage_limit = Some(2);
        let coupon = insert_coupon(&mut conn, row);
        diesel::update(coupons::table.find(coupon.id))
            .set(coupons::used_count.eq(2))
            .execute(&mut conn)
            .expect("update failed");

        let err = validate_coupon(&mut conn, "FULL", &dec("100"), CLIENT).unwrap_err();
        assert!(matches!(
            err,
            DomainError::CouponRejected(CouponRejection::UsageLimitReached)
        ));
    }

    #[tokio::test]
    async fn subtotal_below_minimum_is_rejected() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let mut row = coupon_row("BIG", "FIXED", "50");
        row.min_order_amount = Some(dec("200"));
        insert_coupon(&mut conn, row);

        let err = validate_coupon(&mut conn, "BIG", &dec("199.99"), CLIENT).unwrap_err();
        assert!(matches!(
            err,
            DomainError::CouponRejected(CouponRejection::BelowMinimum { .. })
        ));
    }

    #[tokio::test]
    async fn prior_redemption_from_same_client_is_rejected() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let coupon = insert_coupon(&mut conn, coupon_row("ONCE", "FIXED", "5"));

        // Simulate an earlier checkout from this client.
        let order_id = crate::services::orders::tests_seed_order(&mut conn);
        redeem_coupon(&mut conn, "ONCE", order_id, CLIENT).expect("redeem failed");

        let err = validate_coupon(&mut conn, "ONCE", &dec("100"), CLIENT).unwrap_err();
        assert!(matches!(
            err,
            DomainError::CouponRejected(CouponRejection::AlreadyUsed)
        ));

        // A different client is still fine.
        validate_coupon(&mut conn, "ONCE", &dec("100"), "198.51.100.2")
            .expect("other client rejected");

        let count: i32 = coupons::table
            .find(coupon.id)
            .select(coupons::used_count)
            .first(&mut conn)
            .expect("count failed");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn validation_does_not_consume_the_coupon() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let coupon = insert_coupon(&mut conn, coupon_row("KEEP", "FIXED", "5"));

        for _ in 0..3 {
            validate_coupon(&mut conn, "KEEP", &dec("100"), CLIENT).expect("validate failed");
        }

        let count: i32 = coupons::table
            .find(coupon.id)
            .select(coupons::used_count)
            .first(&mut conn)
            .expect("count failed");
        assert_eq!(count, 0);
    }
}
