use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inventory::{StockDirection, StockReason};
use crate::domain::payment::PaymentStatus;
use crate::models::customer::{Customer, NewCustomer};
use crate::models::order::{NewOrder, Order, OrderChanges};
use crate::models::order_item::{NewOrderItem, OrderItem};
use crate::models::order_status::NewOrderStatus;
use crate::models::user::{User, SYSTEM_ACTOR_ID};
use crate::schema::{customers, order_items, order_statuses, orders, users};
use crate::services::{coupons, inventory, pricing};

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub customer_id: Uuid,
    pub items: Vec<OrderItemInput>,
    pub shipping_address: String,
    pub payment_method: String,
    pub payment_status: Option<PaymentStatus>,
    pub discount_amount: Option<BigDecimal>,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    pub client_addr: String,
}

#[derive(Debug, Default)]
pub struct UpdateOrderInput {
    pub status_id: Option<Uuid>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}

/// Create an order from a cart.
///
/// Customer resolution, authoritative pricing, the order-number allocation,
/// coupon redemption, and the order + item inserts all commit or roll back
/// as one unit. No stock is touched here; stock moves only when the order's
/// payment status becomes Paid.
pub fn create_order(
    conn: &mut PgConnection,
    input: CreateOrderInput,
) -> Result<OrderWithItems, DomainError> {
    if input.items.is_empty() {
        return Err(DomainError::Validation(
            "order must contain at least one item".to_string(),
        ));
    }
    for item in &input.items {
        if item.quantity <= 0 {
            return Err(DomainError::Validation(format!(
                "quantity must be positive for product {}",
                item.product_id
            )));
        }
    }
    if let Some(discount) = &input.discount_amount {
        if discount < &BigDecimal::zero() {
            return Err(DomainError::Validation(
                "discount_amount must not be negative".to_string(),
            ));
        }
    }
    // Creation never touches stock, so an order must not be born Paid: it
    // would carry no deduction batch for the reverser to compensate.
    if input.payment_status == Some(PaymentStatus::Paid) {
        return Err(DomainError::Validation(
            "orders are created unpaid; transition to PAID via an update".to_string(),
        ));
    }

    conn.transaction(|conn| {
        // 1. Resolve the customer, materialising one from a matching account.
        let customer = resolve_customer(conn, input.customer_id)?;

        // 2. Price every line from product data, one batched lookup.
        let product_ids: Vec<Uuid> = input.items.iter().map(|i| i.product_id).collect();
        let prices = pricing::resolve_unit_prices(conn, &product_ids)?;

        // 3. Freeze unit prices and line totals.
        let order_id = Uuid::new_v4();
        let mut subtotal = BigDecimal::zero();
        let mut new_items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let unit_price = prices[&item.product_id].clone();
            let line_total = &unit_price * BigDecimal::from(item.quantity);
            subtotal += &line_total;
            new_items.push(NewOrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price,
                line_total,
            });
        }

        // 4. Apply the discount, clamped so the total never goes negative.
        let mut discount = input.discount_amount.clone().unwrap_or_default();
        if discount > subtotal {
            discount = subtotal.clone();
        }
        let total = &subtotal - &discount;

        // 5. Allocate the order number and the initial workflow status.
        let order_number = next_order_number(conn)?;
        let status_id = pending_status_id(conn)?;

        // 6. Insert the order and its items.
        let payment_status = input.payment_status.unwrap_or(PaymentStatus::Pending);
        let coupon_code = input
            .coupon_code
            .as_deref()
            .map(|c| c.trim().to_uppercase());
        let order: Order = diesel::insert_into(orders::table)
            .values(&NewOrder {
                id: order_id,
                order_number,
                customer_id: customer.id,
                status_id,
                payment_status: payment_status.as_str().to_string(),
                total,
                discount,
                coupon_code: coupon_code.clone(),
                shipping_address: input.shipping_address.clone(),
                payment_method: input.payment_method.clone(),
                notes: input.notes.clone(),
            })
            .get_result(conn)?;
        let items: Vec<OrderItem> = diesel::insert_into(order_items::table)
            .values(&new_items)
            .get_results(conn)?;

        // 7. Record the coupon redemption in this same transaction, so a
        //    failed order never consumes the coupon and a client racing two
        //    checkouts redeems at most once.
        if let Some(code) = &coupon_code {
            coupons::redeem_coupon(conn, code, order_id, &input.client_addr)?;
        }

        Ok(OrderWithItems { order, items })
    })
}

/// Update an order, reconciling stock when the change takes it into Paid.
///
/// Entering Paid decrements stock for every item behind a per-row
/// sufficiency guard and appends one ledger entry per item; any guard
/// failure rolls the whole update back. Every other transition, including
/// Paid → Paid, only writes the fields.
pub fn update_order(
    conn: &mut PgConnection,
    order_id: Uuid,
    input: UpdateOrderInput,
) -> Result<OrderWithItems, DomainError> {
    conn.transaction(|conn| {
        let order: Order = orders::table
            .find(order_id)
            .select(Order::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| DomainError::NotFound(format!("Order {order_id}")))?;
        let current: PaymentStatus = order
            .payment_status
            .parse()
            .map_err(DomainError::Internal)?;

        if let Some(next) = input.payment_status {
            if next == PaymentStatus::Paid && current != PaymentStatus::Paid {
                apply_payment_deduction(conn, order_id)?;
            }
        }

        let updated: Order = diesel::update(orders::table.find(order_id))
            .set(&OrderChanges {
                status_id: input.status_id,
                payment_status: input.payment_status.map(|s| s.as_str().to_string()),
                notes: input.notes,
                assigned_to: input.assigned_to,
                updated_at: Utc::now(),
            })
            .get_result(conn)?;
        let items = load_items(conn, order_id)?;
        Ok(OrderWithItems {
            order: updated,
            items,
        })
    })
}

/// Cancel an order, reversing its stock effect if it had been paid.
///
/// For a paid order every item's quantity goes back into stock with a
/// compensating ledger entry; only then are the items and the order removed.
/// A never-paid order is removed with no stock effect.
pub fn delete_order(conn: &mut PgConnection, order_id: Uuid) -> Result<Order, DomainError> {
    conn.transaction(|conn| {
        let order: Order = orders::table
            .find(order_id)
            .select(Order::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| DomainError::NotFound(format!("Order {order_id}")))?;

        if order.payment_status == PaymentStatus::Paid.as_str() {
            let items = load_items(conn, order_id)?;
            for item in &items {
                inventory::restore_stock(conn, item.product_id, item.quantity)?;
                inventory::append_entry(
                    conn,
                    item.product_id,
                    item.quantity,
                    StockReason::Return,
                    StockDirection::In,
                    SYSTEM_ACTOR_ID,
                )?;
            }
        }

        diesel::delete(order_items::table.filter(order_items::order_id.eq(order_id)))
            .execute(conn)?;
        diesel::delete(orders::table.find(order_id)).execute(conn)?;
        Ok(order)
    })
}

pub fn get_order(conn: &mut PgConnection, order_id: Uuid) -> Result<OrderWithItems, DomainError> {
    let order: Order = orders::table
        .find(order_id)
        .select(Order::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::NotFound(format!("Order {order_id}")))?;
    let items = load_items(conn, order_id)?;
    Ok(OrderWithItems { order, items })
}

pub fn list_orders(
    conn: &mut PgConnection,
    page: i64,
    limit: i64,
) -> Result<OrderPage, DomainError> {
    let offset = (page - 1) * limit;
    let total: i64 = orders::table.count().get_result(conn)?;
    let rows = orders::table
        .select(Order::as_select())
        .order(orders::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load(conn)?;
    Ok(OrderPage {
        orders: rows,
        total,
    })
}

// ── Internals ────────────────────────────────────────────────────────────────

/// Stock side effect of an order entering Paid: one guarded decrement and
/// one ledger entry per item, attributed to the system actor.
fn apply_payment_deduction(conn: &mut PgConnection, order_id: Uuid) -> Result<(), DomainError> {
    let items = load_items(conn, order_id)?;
    for item in &items {
        inventory::decrement_stock(conn, item.product_id, item.quantity)?;
        inventory::append_entry(
            conn,
            item.product_id,
            -item.quantity,
            StockReason::OrderPayment,
            StockDirection::Out,
            SYSTEM_ACTOR_ID,
        )?;
    }
    Ok(())
}

fn load_items(conn: &mut PgConnection, order_id: Uuid) -> Result<Vec<OrderItem>, DomainError> {
    order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select(OrderItem::as_select())
        .load(conn)
        .map_err(Into::into)
}

/// Every order carries a real customer row. The storefront hands out account
/// ids, so an id with no customer record yet is materialised from the
/// matching account on first checkout; an id matching neither is an error.
fn resolve_customer(conn: &mut PgConnection, customer_id: Uuid) -> Result<Customer, DomainError> {
    if let Some(customer) = customers::table
        .find(customer_id)
        .select(Customer::as_select())
        .first(conn)
        .optional()?
    {
        return Ok(customer);
    }

    let Some(account) = users::table
        .find(customer_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
    else {
        return Err(DomainError::NotFound(format!("Customer {customer_id}")));
    };

    diesel::insert_into(customers::table)
        .values(&NewCustomer {
            id: account.id,
            user_id: Some(account.id),
            name: account.name,
            email: account.email,
            phone: None,
        })
        .get_result(conn)
        .map_err(Into::into)
}

/// Allocate `ORD-<year>-<seq>` from the database sequence. A sequence step
/// is atomic; counting rows and formatting is not, and two concurrent
/// checkouts must never compute the same number.
fn next_order_number(conn: &mut PgConnection) -> Result<String, DomainError> {
    use diesel::dsl::sql;
    use diesel::sql_types::BigInt;

    let seq: i64 = diesel::select(sql::<BigInt>("nextval('order_number_seq')")).get_result(conn)?;
    Ok(format!("ORD-{}-{:04}", Utc::now().year(), seq))
}

/// The initial workflow status. The taxonomy is seeded by migration, but an
/// empty table must not make checkout impossible.
fn pending_status_id(conn: &mut PgConnection) -> Result<Uuid, DomainError> {
    if let Some(id) = order_statuses::table
        .filter(order_statuses::name.eq("Pending"))
        .select(order_statuses::id)
        .first(conn)
        .optional()?
    {
        return Ok(id);
    }

    diesel::insert_into(order_statuses::table)
        .values(&NewOrderStatus {
            id: Uuid::new_v4(),
            name: "Pending".to_string(),
            sort_order: 1,
        })
        .on_conflict(order_statuses::name)
        .do_nothing()
        .execute(conn)?;
    order_statuses::table
        .filter(order_statuses::name.eq("Pending"))
        .select(order_statuses::id)
        .first(conn)
        .map_err(Into::into)
}

/// Minimal persisted order for tests in sibling modules that need a real
/// order id to satisfy foreign keys.
#[cfg(test)]
pub(crate) fn tests_seed_order(conn: &mut PgConnection) -> Uuid {
    use crate::services::testsupport::{insert_customer, insert_product};

    let customer = insert_customer(conn, "Seed Customer", "seed@example.com");
    let sku = format!("SEED-{}", &Uuid::new_v4().to_string()[..8]);
    let product = insert_product(conn, &sku, "1.00", 1);
    let created = create_order(
        conn,
        CreateOrderInput {
            customer_id: customer.id,
            items: vec![OrderItemInput {
                product_id: product.id,
                quantity: 1,
            }],
            shipping_address: "1 Test Street".to_string(),
            payment_method: "card".to_string(),
            payment_status: None,
            discount_amount: None,
            coupon_code: None,
            notes: None,
            client_addr: "192.0.2.1".to_string(),
        },
    )
    .expect("seed order failed");
    created.order.id
}
