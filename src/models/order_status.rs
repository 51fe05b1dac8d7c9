use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::order_statuses;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderStatus {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_statuses)]
pub struct NewOrderStatus {
    pub id: Uuid,
    pub name: String,
    pub sort_order: i32,
}
