use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inventory::{StockDirection, StockReason};
use crate::models::inventory_log::{InventoryLog, NewInventoryLog};
use crate::models::product::Product;
use crate::schema::{inventory_logs, products};

/// Append one ledger entry. Entries are immutable; together with the stock
/// column they must satisfy `stock == initial + Σ quantity_change`, so every
/// stock mutation in this module writes its entry in the same transaction.
pub fn append_entry(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity_change: i32,
    reason: StockReason,
    direction: StockDirection,
    actor: Uuid,
) -> Result<(), DomainError> {
    diesel::insert_into(inventory_logs::table)
        .values(&NewInventoryLog {
            id: Uuid::new_v4(),
            product_id,
            quantity_change,
            reason: reason.as_str().to_string(),
            direction: direction.as_str().to_string(),
            user_id: actor,
        })
        .execute(conn)?;
    Ok(())
}

/// Take `quantity` out of the product's stock iff enough remains.
///
/// The sufficiency check and the decrement are a single conditional UPDATE,
/// so two payments racing for the same low-stock row cannot both pass.
pub fn decrement_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), DomainError> {
    let updated = diesel::update(
        products::table.filter(products::id.eq(product_id).and(products::stock.ge(quantity))),
    )
    .set((
        products::stock.eq(products::stock - quantity),
        products::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;

    if updated == 0 {
        let name: Option<String> = products::table
            .find(product_id)
            .select(products::name)
            .first(conn)
            .optional()?;
        return Err(match name {
            Some(name) => DomainError::InsufficientStock { product: name },
            None => DomainError::NotFound(format!("Product {product_id}")),
        });
    }
    Ok(())
}

/// Put `quantity` back into the product's stock.
pub fn restore_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), DomainError> {
    let updated = diesel::update(products::table.find(product_id))
        .set((
            products::stock.eq(products::stock + quantity),
            products::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(DomainError::NotFound(format!("Product {product_id}")));
    }
    Ok(())
}

/// Manual back-office stock adjustment (restock or correction).
///
/// Negative deltas go through the same conditional decrement as payment
/// deduction, so an adjustment can never drive stock below zero.
pub fn adjust_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    delta: i32,
    actor: Uuid,
) -> Result<Product, DomainError> {
    if delta == 0 {
        return Err(DomainError::Validation(
            "quantity must not be zero".to_string(),
        ));
    }

    conn.transaction(|conn| {
        let direction = if delta > 0 {
            restore_stock(conn, product_id, delta)?;
            StockDirection::In
        } else {
            decrement_stock(conn, product_id, -delta)?;
            StockDirection::Out
        };
        append_entry(conn, product_id, delta, StockReason::NewStock, direction, actor)?;

        products::table
            .find(product_id)
            .select(Product::as_select())
            .first(conn)
            .map_err(Into::into)
    })
}

/// Ledger rows for one product, newest first. Consumed by the product
/// detail view.
pub fn history(conn: &mut PgConnection, product_id: Uuid) -> Result<Vec<InventoryLog>, DomainError> {
    let exists: i64 = products::table
        .filter(products::id.eq(product_id))
        .count()
        .get_result(conn)?;
    if exists == 0 {
        return Err(DomainError::NotFound(format!("Product {product_id}")));
    }

    inventory_logs::table
        .filter(inventory_logs::product_id.eq(product_id))
        .order(inventory_logs::created_at.desc())
        .select(InventoryLog::as_select())
        .load(conn)
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::SYSTEM_ACTOR_ID;
    use crate::services::testsupport::{assert_stock_invariant, insert_product, setup_db};

    #[tokio::test]
    async fn positive_adjustment_adds_stock_and_ledger_entry() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let product = insert_product(&mut conn, "SKU-1", "10.00", 5);

        let updated =
            adjust_stock(&mut conn, product.id, 7, SYSTEM_ACTOR_ID).expect("adjust failed");

        assert_eq!(updated.stock, 12);
        let entries = history(&mut conn, product.id).expect("history failed");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity_change, 7);
        assert_eq!(entries[0].reason, "New_Stock");
        assert_eq!(entries[0].direction, "IN");
        assert_eq!(entries[0].user_id, SYSTEM_ACTOR_ID);
        assert_stock_invariant(&mut conn, product.id, 5);
    }

    #[tokio::test]
    async fn negative_adjustment_cannot_overdraw_stock() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let product = insert_product(&mut conn, "SKU-1", "10.00", 3);

        let err = adjust_stock(&mut conn, product.id, -5, SYSTEM_ACTOR_ID).unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        // Failed adjustment leaves no ledger entry behind.
        let entries = history(&mut conn, product.id).expect("history failed");
        assert!(entries.is_empty());
        assert_stock_invariant(&mut conn, product.id, 3);
    }

    #[tokio::test]
    async fn zero_adjustment_is_rejected() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");
        let product = insert_product(&mut conn, "SKU-1", "10.00", 3);

        let err = adjust_stock(&mut conn, product.id, 0, SYSTEM_ACTOR_ID).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
