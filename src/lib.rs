pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::coupons::validate_coupon,
        handlers::coupons::list_coupons,
        handlers::coupons::create_coupon,
        handlers::coupons::update_coupon,
        handlers::coupons::delete_coupon,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::update_order,
        handlers::orders::delete_order,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::adjust_stock,
        handlers::products::product_inventory,
        handlers::categories::list_categories,
        handlers::categories::get_category,
        handlers::categories::create_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
    ),
    components(schemas(
        handlers::coupons::ValidateCouponRequest,
        handlers::coupons::ValidateCouponResponse,
        handlers::coupons::CreateCouponRequest,
        handlers::coupons::UpdateCouponRequest,
        handlers::coupons::CouponResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::OrderItemRequest,
        handlers::orders::UpdateOrderRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderItemResponse,
        handlers::orders::ListOrdersResponse,
        handlers::products::CreateProductRequest,
        handlers::products::UpdateProductRequest,
        handlers::products::AdjustStockRequest,
        handlers::products::ProductResponse,
        handlers::categories::CreateCategoryRequest,
        handlers::categories::UpdateCategoryRequest,
        models::category::Category,
        models::customer::Customer,
        models::inventory_log::InventoryLog,
        domain::payment::PaymentStatus,
        domain::discount::DiscountType,
    ))
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/coupons")
                    .route("/validate", web::post().to(handlers::coupons::validate_coupon))
                    .route("", web::get().to(handlers::coupons::list_coupons))
                    .route("", web::post().to(handlers::coupons::create_coupon))
                    .route("/{id}", web::patch().to(handlers::coupons::update_coupon))
                    .route("/{id}", web::delete().to(handlers::coupons::delete_coupon)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}", web::patch().to(handlers::orders::update_order))
                    .route("/{id}", web::delete().to(handlers::orders::delete_order)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::list_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route("/{id}", web::get().to(handlers::products::get_product))
                    .route("/{id}", web::patch().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product))
                    .route("/{id}/stock", web::post().to(handlers::products::adjust_stock))
                    .route(
                        "/{id}/inventory",
                        web::get().to(handlers::products::product_inventory),
                    ),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(handlers::categories::list_categories))
                    .route("", web::post().to(handlers::categories::create_category))
                    .route("/{id}", web::get().to(handlers::categories::get_category))
                    .route("/{id}", web::patch().to(handlers::categories::update_category))
                    .route("/{id}", web::delete().to(handlers::categories::delete_category)),
            )
            .service(
                web::scope("/customers")
                    .route("", web::get().to(handlers::customers::list_customers))
                    .route("/{id}", web::get().to(handlers::customers::get_customer)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
