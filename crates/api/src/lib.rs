//! HTTP API server for the ticket cart and checkout.
//!
//! Stands in for the storefront UI: REST endpoints for the cart, checkout,
//! session and notices, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use cart::{CartStore, StoredSession};
use checkout::{BookingService, CheckoutCoordinator};
use common::NotificationCenter;
use metrics_exporter_prometheus::PrometheusHandle;
use storage::KeyValueStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Key-value store chosen at startup.
pub type DynStorage = Arc<dyn KeyValueStore>;

/// Booking service chosen at startup.
pub type DynBooking = Arc<dyn BookingService>;

/// Shared application state accessible from all handlers.
pub struct AppState<K: KeyValueStore, B: BookingService> {
    pub session: StoredSession<K>,
    pub checkout: CheckoutCoordinator<K, StoredSession<K>, B>,
    pub notices: NotificationCenter,
}

impl<K: KeyValueStore + 'static, B: BookingService + 'static> AppState<K, B> {
    pub fn cart(&self) -> &CartStore<K, StoredSession<K>> {
        self.checkout.cart()
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<K, B>(state: Arc<AppState<K, B>>, metrics_handle: PrometheusHandle) -> Router
where
    K: KeyValueStore + 'static,
    B: BookingService + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/cart",
            get(routes::cart::get::<K, B>).delete(routes::cart::clear::<K, B>),
        )
        .route("/cart/items", post(routes::cart::add::<K, B>))
        .route("/cart/items/{index}", delete(routes::cart::remove::<K, B>))
        .route("/checkout", post(routes::checkout::run::<K, B>))
        .route("/notifications", get(routes::notifications::list::<K, B>))
        .route(
            "/notifications/{id}",
            delete(routes::notifications::dismiss::<K, B>),
        )
        .route(
            "/session",
            get(routes::session::current::<K, B>)
                .put(routes::session::sign_in::<K, B>)
                .delete(routes::session::sign_out::<K, B>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the cart, session and checkout around one key-value store.
///
/// The persisted cart is restored from `storage` here.
pub fn create_state<K, B>(
    storage: K,
    booking: B,
    notices: NotificationCenter,
) -> Arc<AppState<K, B>>
where
    K: KeyValueStore + Clone + 'static,
    B: BookingService + 'static,
{
    let session = StoredSession::new(storage.clone());
    let cart = CartStore::open(storage, session.clone(), notices.clone());
    let checkout = CheckoutCoordinator::new(cart, booking);

    Arc::new(AppState {
        session,
        checkout,
        notices,
    })
}
