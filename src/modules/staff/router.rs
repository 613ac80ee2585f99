use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_staff, delete_staff, get_staff, get_staff_list, update_staff, upload_staff_image,
};

pub fn init_staff_router() -> Router<AppState> {
    Router::new()
        .route("/staff", get(get_staff_list).post(create_staff))
        .route(
            "/staff/{id}",
            get(get_staff)
                .put(update_staff)
                .patch(update_staff)
                .delete(delete_staff),
        )
        .route("/imageUpload/{id}", post(upload_staff_image))
        // Uploads may exceed axum's 2 MB default; the per-endpoint image
        // policies still cap accepted sizes.
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024))
}
