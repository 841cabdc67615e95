use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    assign_template_to_school, list_school_instances, list_templates, rename_template_subject,
};

pub fn init_templates_router() -> Router<AppState> {
    Router::new()
        .route("/{kind}", get(list_templates))
        .route("/schools/{school_id}/{kind}", get(list_school_instances))
        .route("/classes/{id}/assign", post(assign_template_to_school))
        .route("/subjects/{id}", put(rename_template_subject))
}
