use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::products;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub sale_price: Option<BigDecimal>,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Unit price charged at checkout: the sale price when one is set.
    pub fn effective_price(&self) -> &BigDecimal {
        self.sale_price.as_ref().unwrap_or(&self.price)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub sale_price: Option<BigDecimal>,
    pub stock: i32,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub sale_price: Option<Option<BigDecimal>>,
    pub category_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub updated_at: Option<DateTime<Utc>>,
}
