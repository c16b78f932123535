//! Booking API 模块
//!
//! 预订创建与生命周期操作。创建接口是幂等的：重复的
//! `idempotency_key` 返回原预订 (200 而非 201)。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/bookings", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/no-show", post(handler::no_show))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/confirm-deposit", post(handler::confirm_deposit))
}
