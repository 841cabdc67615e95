use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    broadcast_live_class, create_live_class, delete_live_class, get_live_class, get_live_classes,
    update_live_class,
};

pub fn init_live_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_live_class).get(get_live_classes))
        .route("/broadcast", post(broadcast_live_class))
        .route(
            "/{id}",
            get(get_live_class)
                .put(update_live_class)
                .delete(delete_live_class),
        )
}
