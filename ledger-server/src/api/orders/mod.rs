//! Order API Module
//!
//! Every mutation goes through the OrdersManager; handlers only translate
//! HTTP to manager calls and map domain errors to responses.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Capture and reads
        .route("/", post(handler::create).get(handler::list_by_date_range))
        .route("/customer/{customer_id}", get(handler::list_by_customer))
        .route("/settlement", get(handler::list_for_settlement))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::remove),
        )
        // Lifecycle
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/status", post(handler::transition_status))
        .route("/{id}/payment", post(handler::transition_payment))
        .route(
            "/{id}/fulfillment/complete",
            post(handler::complete_fulfillment),
        )
        // Transfer and delivery cost
        .route("/{id}/transfer", post(handler::request_transfer))
        .route("/{id}/transfer/accept", post(handler::accept_transfer))
        .route("/{id}/delivery-cost", post(handler::set_delivery_cost))
}
