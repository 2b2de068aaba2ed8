//! `/query` and `/query/stream`: the C7 question-answering pipeline.

use std::sync::Arc;

use futures::StreamExt;
use rocket::post;
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use ragq_application::{QueryInput, QueryOutput, StreamEvent};
use ragq_domain::value_objects::{Highlight, RetrievedChunk, RewriteStrategy, SearchFilters};
use ragq_infrastructure::AppContext;

use crate::auth::AuthenticatedUser;
use crate::constants::{DEFAULT_RETRIEVAL_K, MAX_RETRIEVAL_K};
use crate::error_response::ApiError;
use crate::session::ConversationSessionStore;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteStrategyBody {
    None,
    MultiQuery,
    Hyde,
}

impl From<RewriteStrategyBody> for RewriteStrategy {
    fn from(value: RewriteStrategyBody) -> Self {
        match value {
            RewriteStrategyBody::None => RewriteStrategy::None,
            RewriteStrategyBody::MultiQuery => RewriteStrategy::MultiQuery,
            RewriteStrategyBody::Hyde => RewriteStrategy::Hyde,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub k: Option<usize>,
    #[serde(default)]
    pub chunk_type: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_score: Option<f32>,
    #[serde(default)]
    pub group_ids: Vec<String>,
    /// Session id carrying conversation history across calls; required
    /// for `use_history` to have any effect.
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub use_history: bool,
    #[serde(default = "default_true")]
    pub use_cache: bool,
    #[serde(default)]
    pub use_reranker: bool,
    #[serde(default)]
    pub rewrite: Option<RewriteStrategyBody>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct QueryResponseBody {
    pub answer: String,
    pub sources: Vec<RetrievedChunk>,
    pub highlights: Vec<Highlight>,
    pub from_cache: bool,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl From<QueryOutput> for QueryResponseBody {
    fn from(output: QueryOutput) -> Self {
        Self {
            answer: output.answer,
            sources: output.sources,
            highlights: output.highlights,
            from_cache: output.from_cache,
            input_tokens: output.usage.input_tokens,
            output_tokens: output.usage.output_tokens,
        }
    }
}

fn build_input(body: &QueryRequest, user: &AuthenticatedUser) -> QueryInput {
    let k = body.k.unwrap_or(DEFAULT_RETRIEVAL_K).clamp(1, MAX_RETRIEVAL_K);
    QueryInput {
        question: body.question.clone(),
        k,
        filters: SearchFilters {
            chunk_type: body.chunk_type.clone(),
            language: body.language.clone(),
            category: body.category.clone(),
            min_score: body.min_score,
        },
        group_ids: body.group_ids.clone(),
        tenant: user.tenant(),
        use_history: body.use_history,
        use_cache: body.use_cache,
        use_reranker: body.use_reranker,
        rewrite: body.rewrite.clone().map(RewriteStrategy::from).unwrap_or_default(),
    }
}

fn session_key(body: &QueryRequest, user: &AuthenticatedUser) -> String {
    body.session_id.clone().unwrap_or_else(|| user.user_id.clone())
}

/// Run the non-streaming pipeline and return the full answer in one
/// response.
#[post("/query", data = "<body>")]
pub async fn query(
    context: &State<Arc<AppContext>>,
    sessions: &State<Arc<ConversationSessionStore>>,
    user: AuthenticatedUser,
    body: Json<QueryRequest>,
) -> Result<Json<QueryResponseBody>, ApiError> {
    let input = build_input(&body, &user);
    let key = session_key(&body, &user);
    let mut history = sessions.get(&key);

    let output = context.qa_chain.query(&input, &mut history).await?;

    if input.use_history {
        sessions.store(&key, history);
    }

    Ok(Json(output.into()))
}

/// Run the streaming pipeline, emitting `sources`, `chunk` (repeated),
/// and a terminal `done` (or `error`) server-sent event.
#[post("/query/stream", data = "<body>")]
pub async fn query_stream(
    context: &State<Arc<AppContext>>,
    user: AuthenticatedUser,
    body: Json<QueryRequest>,
) -> EventStream![Event] {
    let input = build_input(&body, &user);
    let qa_chain = context.qa_chain.clone();

    EventStream! {
        let mut events = qa_chain.query_stream(input);
        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Sources(sources) => {
                    if let Ok(json) = serde_json::to_string(&sources) {
                        yield Event::data(json).event("sources");
                    }
                }
                StreamEvent::Chunk(text) => yield Event::data(text).event("chunk"),
                StreamEvent::Done(answer) => {
                    if let Ok(json) = serde_json::to_string(&serde_json::json!({ "answer": answer })) {
                        yield Event::data(json).event("done");
                    }
                }
                StreamEvent::Error(message) => yield Event::data(message).event("error"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(question: &str) -> QueryRequest {
        QueryRequest {
            question: question.to_string(),
            k: None,
            chunk_type: None,
            language: None,
            category: None,
            min_score: None,
            group_ids: Vec::new(),
            session_id: None,
            use_history: false,
            use_cache: true,
            use_reranker: false,
            rewrite: None,
        }
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u1".to_string(),
            username: "alice".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn build_input_defaults_k_and_rewrite() {
        let input = build_input(&request("what is rust"), &user());
        assert_eq!(input.k, DEFAULT_RETRIEVAL_K);
        assert_eq!(input.rewrite, RewriteStrategy::None);
        assert!(!input.tenant.is_admin);
    }

    #[test]
    fn build_input_clamps_k_to_max() {
        let mut body = request("q");
        body.k = Some(MAX_RETRIEVAL_K + 100);
        let input = build_input(&body, &user());
        assert_eq!(input.k, MAX_RETRIEVAL_K);
    }

    #[test]
    fn build_input_clamps_k_to_minimum_one() {
        let mut body = request("q");
        body.k = Some(0);
        let input = build_input(&body, &user());
        assert_eq!(input.k, 1);
    }

    #[test]
    fn session_key_falls_back_to_user_id() {
        let body = request("q");
        assert_eq!(session_key(&body, &user()), "u1");
    }

    #[test]
    fn session_key_prefers_explicit_session_id() {
        let mut body = request("q");
        body.session_id = Some("sess-42".to_string());
        assert_eq!(session_key(&body, &user()), "sess-42");
    }
}
