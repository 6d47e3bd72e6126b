//! Router Module Index
//!
//! Routes are split by who may call them. Access control is attached as a
//! layer on each group in [`api_routes`], never left to the handlers alone.

/// Anonymous access.
pub mod public;

/// Any valid session token.
pub mod authenticated;

/// Editors and admins.
pub mod editorial;

use axum::{Router, middleware};

use crate::{
    AppState,
    auth::{CONTRIBUTORS, STAFF, auth_middleware, require_roles},
};

/// Everything served under `/api`.
///
/// `route_layer` runs bottom-up, so `auth_middleware` resolves the identity
/// before `require_roles` inspects it.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(CONTRIBUTORS, require_roles))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .merge(
            editorial::editorial_routes()
                .route_layer(middleware::from_fn_with_state(STAFF, require_roles))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
}
