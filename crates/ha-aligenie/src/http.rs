//! HTTP view for the home skill
//!
//! The skill service POSTs every directive as JSON to one endpoint and reads
//! the response from the body.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::home_skill::HomeSkill;
use crate::platform::Platform;

/// Endpoint the skill service posts directives to
pub const HOME_SKILL_HTTP_ENDPOINT: &str = "/api/aligenie/home_skill";

/// Shared state of the view
#[derive(Clone)]
pub struct HomeSkillState {
    pub platform: Arc<dyn Platform>,
    pub skill: Arc<HomeSkill>,
}

/// Body of a rejected request
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Router serving the home skill endpoint
pub fn router(platform: Arc<dyn Platform>, skill: Arc<HomeSkill>) -> Router {
    Router::new()
        .route(HOME_SKILL_HTTP_ENDPOINT, post(handle_home_skill))
        .layer(TraceLayer::new_for_http())
        .with_state(HomeSkillState { platform, skill })
}

/// Bind `addr` and serve the home skill until the listener fails
pub async fn start_server(router: Router, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Home skill listening on {}{}", addr, HOME_SKILL_HTTP_ENDPOINT);
    axum::serve(listener, router).await
}

/// POST /api/aligenie/home_skill
async fn handle_home_skill(
    State(state): State<HomeSkillState>,
    body: Bytes,
) -> Response {
    // Parsed regardless of content type
    let message: Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(err) => return bad_request(format!("invalid JSON body: {err}")),
    };
    debug!(%message, "Received home skill request");

    match state
        .skill
        .handle_message(state.platform.as_ref(), &message, None)
        .await
    {
        Ok(response) => {
            let body = response.serialize();
            debug!(response = %body, "Sending home skill response");
            Json(body).into_response()
        }
        Err(err) => bad_request(err.to_string()),
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
}
