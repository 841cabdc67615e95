use axum::{
    Router,
    routing::{delete, get},
};

use crate::state::AppState;

use super::controller::{create_entry, delete_entry, get_entries};

pub fn init_timetable_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_entries).post(create_entry))
        .route("/{id}", delete(delete_entry))
}
