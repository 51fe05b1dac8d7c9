use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::inventory_logs;

/// Append-only record of a signed stock change. Rows are never updated or
/// deleted; a product's current stock always equals its initial stock plus
/// the sum of its entries.
#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations, ToSchema,
)]
#[diesel(table_name = inventory_logs)]
#[diesel(belongs_to(crate::models::product::Product))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InventoryLog {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity_change: i32,
    pub reason: String,
    pub direction: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inventory_logs)]
pub struct NewInventoryLog {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity_change: i32,
    pub reason: String,
    pub direction: String,
    pub user_id: Uuid,
}
