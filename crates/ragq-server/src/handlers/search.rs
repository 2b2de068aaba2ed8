//! `/search`: the C6 hybrid retriever exposed directly, without the QA
//! chain wrapped around it.

use std::sync::Arc;

use rocket::post;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use ragq_application::RetrievalQuery;
use ragq_domain::value_objects::{RetrievedChunk, RewriteStrategy, SearchFilters};
use ragq_infrastructure::AppContext;

use crate::auth::AuthenticatedUser;
use crate::constants::{DEFAULT_RETRIEVAL_K, MAX_RETRIEVAL_K};
use crate::error_response::ApiError;
use crate::handlers::query::RewriteStrategyBody;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
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
    #[serde(default)]
    pub use_reranker: bool,
    #[serde(default)]
    pub rewrite: Option<RewriteStrategyBody>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseBody {
    pub sources: Vec<RetrievedChunk>,
}

fn build_query(body: &SearchRequest, user: &AuthenticatedUser) -> RetrievalQuery {
    let k = body.k.unwrap_or(DEFAULT_RETRIEVAL_K).clamp(1, MAX_RETRIEVAL_K);
    RetrievalQuery {
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
        use_reranker: body.use_reranker,
        rewrite: body.rewrite.clone().map(RewriteStrategy::from).unwrap_or_default(),
    }
}

#[post("/search", data = "<body>")]
pub async fn search(
    context: &State<Arc<AppContext>>,
    user: AuthenticatedUser,
    body: Json<SearchRequest>,
) -> Result<Json<SearchResponseBody>, ApiError> {
    let query = build_query(&body, &user);
    let sources = context.retriever.search(&query).await?;
    Ok(Json(SearchResponseBody { sources }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest {
            question: "how does retrieval work".to_string(),
            k: None,
            chunk_type: None,
            language: None,
            category: None,
            min_score: None,
            group_ids: Vec::new(),
            use_reranker: false,
            rewrite: None,
        }
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u1".to_string(),
            username: "alice".to_string(),
            is_admin: true,
        }
    }

    #[test]
    fn build_query_defaults_k_and_carries_admin_tenant() {
        let query = build_query(&request(), &user());
        assert_eq!(query.k, DEFAULT_RETRIEVAL_K);
        assert!(query.tenant.is_admin);
    }

    #[test]
    fn build_query_clamps_k_to_max() {
        let mut body = request();
        body.k = Some(MAX_RETRIEVAL_K * 2);
        let query = build_query(&body, &user());
        assert_eq!(query.k, MAX_RETRIEVAL_K);
    }
}
