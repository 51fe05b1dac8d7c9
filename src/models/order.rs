use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::orders;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status_id: Uuid,
    pub payment_status: String,
    pub total: BigDecimal,
    pub discount: BigDecimal,
    pub coupon_code: Option<String>,
    pub shipping_address: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status_id: Uuid,
    pub payment_status: String,
    pub total: BigDecimal,
    pub discount: BigDecimal,
    pub coupon_code: Option<String>,
    pub shipping_address: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// `None` fields are left untouched; `updated_at` is always set so the
/// changeset is never empty.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChanges {
    pub status_id: Option<Uuid>,
    pub payment_status: Option<String>,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}
