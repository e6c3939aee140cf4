pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::businesses::handlers as businesses;
use crate::drafts::handlers as drafts;
use crate::recipients::handlers as recipients;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Drafts
        .route("/drafts", post(drafts::handle_create).get(drafts::handle_list))
        .route(
            "/drafts/:id",
            get(drafts::handle_get)
                .patch(drafts::handle_update)
                .delete(drafts::handle_delete),
        )
        .route("/drafts/:id/clone", post(drafts::handle_clone))
        .route("/drafts/:id/preview", get(drafts::handle_preview))
        .route("/drafts/:id/export/pdf", get(drafts::handle_export_pdf))
        .route("/drafts/:id/export/doc", get(drafts::handle_export_doc))
        // Businesses
        .route(
            "/businesses",
            post(businesses::handle_create).get(businesses::handle_list),
        )
        .route(
            "/businesses/:id",
            get(businesses::handle_get)
                .patch(businesses::handle_update)
                .delete(businesses::handle_delete),
        )
        // Recipients
        .route(
            "/recipients",
            post(recipients::handle_create).get(recipients::handle_list),
        )
        .route(
            "/recipients/:id",
            get(recipients::handle_get)
                .patch(recipients::handle_update)
                .delete(recipients::handle_delete),
        )
        .with_state(state)
}
