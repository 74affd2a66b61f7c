use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use server_api::{actions::ActionInput, view::SubmittedInput, ApiContext};
use shared::{domain::UserId, error::FLASH_SUCCESS_KEY};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use url::Url;

mod app_state;
mod config;
mod dispatch;
mod render;
mod session;

use app_state::AppState;
use config::{load_settings, normalize_database_url};
use render::HtmlShellRenderer;
use session::SessionStore;

#[derive(Debug, Deserialize)]
struct UserQuery {
    user_id: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let public_url = settings
        .server_public_url
        .as_deref()
        .map(Url::parse)
        .transpose()?;

    let state = AppState {
        api: ApiContext::new(storage),
        sessions: SessionStore::with_ttl(Duration::from_secs(settings.pending_state_ttl_secs)),
        renderer: Arc::new(HtmlShellRenderer),
        public_url,
        session_cookie: settings.session_cookie,
    };
    let app = build_router(Arc::new(state), settings.max_form_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_form_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/dashboard", get(http_index_tasks))
        .route("/tasks", post(http_store_task))
        .route("/group-tasks", get(http_index_group_tasks))
        .route("/notifications", get(http_index_notifications))
        .route("/tokens/history", get(http_index_token_history))
        .route("/admin/payments", get(http_index_payment_history))
        .layer(RequestBodyLimitLayer::new(max_form_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Response {
    match state.api.storage.health_check().await {
        Ok(()) => "ok".into_response(),
        Err(err) => {
            error!(error = ?err, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response()
        }
    }
}

async fn http_index_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<UserQuery>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Response {
    let input = ActionInput::new(UserId(q.user_id), SubmittedInput::new(fields));
    let outcome = state.api.index_tasks.invoke(&input).await;
    state
        .respond_with_view(&headers, input.submitted.into_fields(), outcome)
        .await
}

async fn http_index_group_tasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<UserQuery>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Response {
    let input = ActionInput::new(UserId(q.user_id), SubmittedInput::new(fields));
    let outcome = state.api.index_group_tasks.invoke(&input).await;
    state
        .respond_with_view(&headers, input.submitted.into_fields(), outcome)
        .await
}

async fn http_index_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<UserQuery>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Response {
    let input = ActionInput::new(UserId(q.user_id), SubmittedInput::new(fields));
    let outcome = state.api.index_notifications.invoke(&input).await;
    state
        .respond_with_view(&headers, input.submitted.into_fields(), outcome)
        .await
}

async fn http_index_token_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<UserQuery>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Response {
    let input = ActionInput::new(UserId(q.user_id), SubmittedInput::new(fields));
    let outcome = state.api.index_token_history.invoke(&input).await;
    state
        .respond_with_view(&headers, input.submitted.into_fields(), outcome)
        .await
}

async fn http_index_payment_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<UserQuery>,
    Query(fields): Query<Vec<(String, String)>>,
) -> Response {
    let input = ActionInput::new(UserId(q.user_id), SubmittedInput::new(fields));
    let outcome = state.api.index_payment_history.invoke(&input).await;
    state
        .respond_with_view(&headers, input.submitted.into_fields(), outcome)
        .await
}

async fn http_store_task(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<UserQuery>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let input = ActionInput::new(UserId(q.user_id), SubmittedInput::new(fields));
    match state.api.store_task.invoke(&input).await {
        Ok(stored) => {
            let location = format!("/dashboard?user_id={}", q.user_id);
            state
                .redirect_with_flash(&headers, &location, FLASH_SUCCESS_KEY, stored.message())
                .await
        }
        Err(err) => {
            state
                .render_action_error(&headers, input.submitted.into_fields(), err)
                .await
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
