pub mod error;
pub mod identity;
pub mod routes;

pub use error::*;
pub use identity::*;

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::Marketplace;

pub fn router(state: Marketplace) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
            HeaderName::from_static(USER_NAME_HEADER),
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/projects",
            post(routes::create_project).get(routes::list_projects),
        )
        .route("/projects/available", get(routes::available_projects))
        .route("/projects/history", get(routes::developer_history))
        .route("/projects/assigned", get(routes::assigned_projects))
        .route("/projects/active", get(routes::active_projects))
        .route("/projects/invoices", get(routes::invoice_projects))
        .route(
            "/projects/invoices/find-work",
            get(routes::find_work_invoices),
        )
        .route("/projects/assigned-by-me", get(routes::assigned_by_me))
        .route(
            "/projects/{id}",
            get(routes::get_project)
                .put(routes::update_project)
                .delete(routes::delete_project),
        )
        .route("/projects/{id}/close", post(routes::close_project))
        .route("/projects/{id}/assign", post(routes::assign_project))
        .route("/projects/{id}/history", get(routes::project_history))
        .route(
            "/projects/{id}/bids",
            post(routes::submit_bid).get(routes::project_bids),
        )
        .route(
            "/projects/{id}/payment-status",
            put(routes::update_payment_status),
        )
        .route("/projects/{id}/progress", put(routes::update_progress))
        .route("/projects/{id}/status", put(routes::change_status))
        .route("/projects/{id}/invoice", get(routes::download_invoice))
        .route("/notifications", get(routes::notifications))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
