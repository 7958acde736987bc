//! Authorization demo endpoints: one route per guard configuration.

use axum::{Json, Router, routing::get};

use gatehouse_auth::{
    GuardChain, Permission, Role, has_any_role, has_permission, has_role, is_logged_in,
};

use crate::app::dto::MessageResponse;
use crate::authz::RequireGuards;

pub fn router() -> Router {
    Router::new()
        .route("/anonymous", get(access_granted))
        .route("/isLoggedIn", get(access_granted).require(is_logged_in()))
        .route("/hasAnyRole", get(access_granted).require(has_any_role()))
        .route("/hasRole", get(access_granted).require(has_role(Vec::<Role>::new())))
        .route("/hasRole/Admin", get(access_granted).require(has_role(["Admin"])))
        .route("/hasRole/Moderator", get(access_granted).require(has_role(["Moderator"])))
        .route(
            "/hasRole/AdminOrModerator",
            get(access_granted).require(has_role(["Admin", "Moderator"])),
        )
        .route(
            "/hasPermission",
            get(access_granted).require(has_permission(Vec::<Permission>::new())),
        )
        .route(
            "/hasPermission/viewData",
            get(access_granted).require(has_permission(["viewData"])),
        )
        .route("/hasPermission/mod", get(access_granted).require(has_permission(["mod"])))
        .route("/hasPermission/admin", get(access_granted).require(has_permission(["admin"])))
        .route(
            "/hasPermission/adminOrMod",
            get(access_granted).require(has_permission(["admin", "mod"])),
        )
        .route(
            "/hasAnyRole/admin",
            get(access_granted).require(
                GuardChain::new()
                    .then(has_any_role())
                    .then(has_permission(["admin"])),
            ),
        )
}

pub async fn access_granted() -> Json<MessageResponse> {
    Json(MessageResponse::ACCESS_GRANTED)
}
