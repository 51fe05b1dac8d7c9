use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::models::product::Product;
use crate::schema::products;

/// Batch-fetch authoritative unit prices for a set of product ids.
///
/// Order creation never trusts client-submitted prices; every line is priced
/// from this lookup. Any id with no matching product fails the whole
/// resolution, naming the offender, so partial orders cannot be created.
pub fn resolve_unit_prices(
    conn: &mut PgConnection,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, BigDecimal>, DomainError> {
    let rows: Vec<Product> = products::table
        .filter(products::id.eq_any(product_ids))
        .select(Product::as_select())
        .load(conn)?;

    let prices: HashMap<Uuid, BigDecimal> = rows
        .into_iter()
        .map(|p| {
            let price = p.effective_price().clone();
            (p.id, price)
        })
        .collect();

    for id in product_ids {
        if !prices.contains_key(id) {
            return Err(DomainError::NotFound(format!("Product {id}")));
        }
    }

    Ok(prices)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::resolve_unit_prices;
    use crate::domain::errors::DomainError;
    use crate::schema::products;
    use crate::services::testsupport::{dec, insert_product, setup_db};
    use diesel::prelude::*;

    #[tokio::test]
    async fn resolves_effective_prices_in_one_batch() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");

        let regular = insert_product(&mut conn, "SKU-1", "19.99", 10);
        let on_sale = insert_product(&mut conn, "SKU-2", "50.00", 10);
        diesel::update(products::table.find(on_sale.id))
            .set(products::sale_price.eq(Some(dec("39.99"))))
            .execute(&mut conn)
            .expect("update failed");

        let prices =
            resolve_unit_prices(&mut conn, &[regular.id, on_sale.id]).expect("resolve failed");

        assert_eq!(prices[&regular.id], dec("19.99"));
        assert_eq!(prices[&on_sale.id], dec("39.99"));
    }

    #[tokio::test]
    async fn unknown_id_fails_the_whole_resolution() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("conn failed");

        let known = insert_product(&mut conn, "SKU-1", "5.00", 1);
        let unknown = Uuid::new_v4();

        let err = resolve_unit_prices(&mut conn, &[known.id, unknown]).unwrap_err();

        match err {
            DomainError::NotFound(msg) => assert!(msg.contains(&unknown.to_string())),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
