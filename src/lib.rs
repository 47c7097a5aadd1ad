pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pricing;
pub mod services;
pub mod validation;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::TokenService;
use crate::config::Config;
use crate::db::Store;
use crate::pricing::DiscountOverlay;
use crate::services::notify::DiscordNotifier;
use crate::services::rates::RateClient;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub overlay: DiscountOverlay,
    pub tokens: TokenService,
    pub notifier: DiscordNotifier,
    pub rates: RateClient,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            overlay: DiscountOverlay::new(),
            tokens: TokenService::new(&config.jwt_secret),
            notifier: DiscordNotifier::new(
                config.discord_webhook_url.clone(),
                config.discord_staff_role_id.clone(),
            ),
            rates: RateClient::new(config.exchange_rate_url.clone()),
            store,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let gated_admin = Router::new()
        .route("/users", get(handlers::admin::list_users))
        .route("/purchases", get(handlers::admin::list_purchases))
        .route("/products", get(handlers::admin::list_products))
        .route("/product-sales", get(handlers::admin::product_sales))
        .route("/verify-purchase", post(handlers::admin::verify_purchase))
        .route("/apply-global-sale", post(handlers::admin::apply_global_sale))
        .route("/remove-global-sale", post(handlers::admin::remove_global_sale))
        .route("/apply-product-sale", post(handlers::admin::apply_product_sale))
        .route("/remove-product-sale", post(handlers::admin::remove_product_sale))
        .route("/clear-database", post(handlers::admin::clear_database))
        .route("/announce", post(handlers::admin::announce))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth,
        ));

    let admin = Router::new()
        .route("/login", post(handlers::admin::login))
        .merge(gated_admin);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/register", post(handlers::auth::register))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/login-alternative", post(handlers::auth::login_alternative))
        .route("/api/products", get(handlers::shop::list_products))
        .route("/api/process-payment", post(handlers::shop::process_payment))
        .route("/api/purchase-history", get(handlers::shop::purchase_history))
        .route("/api/popular-items", get(handlers::shop::popular_items))
        .nest("/api/admin", admin)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
