use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{get_attendance, mark_attendance};

pub fn init_attendance_router() -> Router<AppState> {
    Router::new().route("/", get(get_attendance).put(mark_attendance))
}
