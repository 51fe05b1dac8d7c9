use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::coupons;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_type: String,
    pub discount_value: BigDecimal,
    pub max_discount: Option<BigDecimal>,
    pub min_order_amount: Option<BigDecimal>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = coupons)]
pub struct NewCoupon {
    pub id: Uuid,
    pub code: String,
    pub discount_type: String,
    pub discount_value: BigDecimal,
    pub max_discount: Option<BigDecimal>,
    pub min_order_amount: Option<BigDecimal>,
    pub usage_limit: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = coupons)]
pub struct CouponChanges {
    pub discount_value: Option<BigDecimal>,
    pub max_discount: Option<Option<BigDecimal>>,
    pub min_order_amount: Option<Option<BigDecimal>>,
    pub usage_limit: Option<Option<i32>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}
