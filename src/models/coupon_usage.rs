use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::coupon_usages;

/// One row per (coupon, originating client address); the unique constraint
/// on that pair is what enforces one redemption per client.
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = coupon_usages)]
#[diesel(belongs_to(crate::models::coupon::Coupon))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CouponUsage {
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub order_id: Uuid,
    pub client_addr: String,
    pub used_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = coupon_usages)]
pub struct NewCouponUsage {
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub order_id: Uuid,
    pub client_addr: String,
}
