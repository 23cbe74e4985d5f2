use axum::{
    routing::{get, patch, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::reservation::{
    approve_reservation, cancel_reservation, create_reservation, reject_reservation,
    show_busy_blocks, show_my_reservations, show_reservation, show_reservation_list,
    show_reservations_report, update_reservation,
};

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservation_routers = Router::new()
        .route("/", post(create_reservation))
        .route("/", get(show_reservation_list))
        .route("/mine", get(show_my_reservations))
        .route("/busy", get(show_busy_blocks))
        .route("/report", get(show_reservations_report))
        .route("/:reservation_id", get(show_reservation))
        .route("/:reservation_id", patch(update_reservation))
        .route("/:reservation_id/cancel", post(cancel_reservation))
        .route("/:reservation_id/approve", post(approve_reservation))
        .route("/:reservation_id/reject", post(reject_reservation));

    Router::new().nest("/reservations", reservation_routers)
}
