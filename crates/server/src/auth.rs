//! Shared-secret auth for the council API surface: a static key comparison
//! implemented as `axum::middleware::from_fn_with_state`, applied only to
//! the routes that require it, leaving health/info public.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use crate::state::AppState;

const HEADER_NAME: &str = "x-council-key";

pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = &state.api_key else {
        return next.run(request).await;
    };

    let provided = request.headers().get(HEADER_NAME).and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected.expose_secret() => next.run(request).await,
        Some(_) => council::Error::Forbidden.into_response(),
        None => council::Error::Unauthorized.into_response(),
    }
}
