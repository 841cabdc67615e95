use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    create_user, deactivate_user, get_children, get_user, get_users, link_student, unlink_student,
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(get_users))
        .route("/{id}", get(get_user).delete(deactivate_user))
        .route("/{id}/children", get(get_children).post(link_student))
        .route("/{id}/children/{student_id}", delete(unlink_student))
}
