use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{assign_class_admin, get_assignable_classes, get_class_admins};

pub fn init_class_admins_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_class_admins).put(assign_class_admin))
        .route("/assignable-classes", get(get_assignable_classes))
}
