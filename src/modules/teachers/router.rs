use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{assign_subjects, get_subjects};

pub fn init_teachers_router() -> Router<AppState> {
    Router::new().route("/{id}/subjects", get(get_subjects).put(assign_subjects))
}
