//! AI shopping assistant handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::assistant::build_system_prompt;
use crate::db::products::ProductRepository;
use crate::filters;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::context::PageContext;
use crate::state::AppState;

/// Products quoted to the model in the system prompt.
const PROMPT_PRODUCT_LIMIT: i64 = 20;

/// Assistant chat page template.
#[derive(Template, WebTemplate)]
#[template(path = "assistant/chat.html")]
pub struct AssistantTemplate {
    pub page: PageContext,
    pub enabled: bool,
}

/// Display the assistant chat page.
#[instrument(skip(state, session, user))]
pub async fn chat_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<AssistantTemplate> {
    let page = PageContext::build(&state, &session, Some(user)).await;
    Ok(AssistantTemplate {
        page,
        enabled: state.assistant().is_some(),
    })
}

/// Recommendation form data.
#[derive(Debug, Deserialize)]
pub struct RecommendForm {
    #[serde(default)]
    pub message: String,
}

/// Answer a product question grounded in the current catalog (JSON).
///
/// Any assistant failure collapses into a generic error body; the client
/// only distinguishes success from failure.
#[instrument(skip(state, user, form))]
pub async fn recommend(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RecommendForm>,
) -> Response {
    let question = form.message.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Please enter a question!", "status": "error"})),
        )
            .into_response();
    }

    let Some(client) = state.assistant() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "The assistant is not available.", "status": "error"})),
        )
            .into_response();
    };

    let repo = ProductRepository::new(state.pool());
    let (categories, products) = match (
        repo.list_categories(None).await,
        repo.newest(PROMPT_PRODUCT_LIMIT).await,
    ) {
        (Ok(categories), Ok(products)) => (categories, products),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to load catalog for assistant: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "The assistant is not available.", "status": "error"})),
            )
                .into_response();
        }
    };

    let system = build_system_prompt(&categories, &products);

    match client.recommend(system, question).await {
        Ok(reply) => Json(json!({"reply": reply, "status": "success"})).into_response(),
        Err(e) => {
            tracing::error!(user = %user.id, "Assistant call failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "AI connection error", "status": "error"})),
            )
                .into_response()
        }
    }
}
