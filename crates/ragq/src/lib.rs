//! RAG question-answering service.
//!
//! This crate is a thin facade over the four layers beneath it, plus the
//! `ragq` binary's CLI. Most users only need the binary; the facade is
//! useful for embedding the service (e.g. running [`serve`] from a custom
//! supervisor process).

/// Domain layer — entities, value objects, ports, and the error type.
pub mod domain {
    pub use ragq_domain::*;
}

/// Application layer — use case orchestration.
pub mod application {
    pub use ragq_application::*;
}

/// HTTP surface — route handlers and the Rocket entry point.
pub mod server {
    pub use ragq_server::*;
}

/// Infrastructure layer — adapters, configuration, and [`AppContext`].
pub mod infrastructure {
    pub use ragq_infrastructure::*;
}

pub use domain::error::{Error, Result};
pub use infrastructure::AppContext;

/// Load configuration and run the HTTP server until shutdown.
pub async fn serve(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = load_config(config_path)?;
    infrastructure::logging::init_logging(&config.logging)?;

    let context = AppContext::bootstrap(config).await?;
    server::run(context)
        .await
        .map_err(|e| Error::internal(format!("HTTP server error: {e}")))
}

/// Roll a knowledge entry back to a prior version: record the rollback as
/// a new version, re-embed the restored content, and overwrite the
/// entry's relational row and vector-store point to match.
pub async fn restore(
    config_path: Option<&std::path::Path>,
    entry_id: &str,
    target_version: u32,
    actor: &str,
) -> Result<()> {
    let config = load_config(config_path)?;
    infrastructure::logging::init_logging(&config.logging)?;

    let context = AppContext::bootstrap(config).await?;

    let restored = context
        .version_tracker
        .rollback_to(entry_id, target_version, actor, None)
        .await?;

    let mut entry = context
        .knowledge_repository
        .get_entry(entry_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("knowledge entry {entry_id}")))?;

    #[derive(serde::Deserialize)]
    struct RestoredMetadata {
        title: String,
        category: Option<String>,
        summary: String,
        keywords: Vec<String>,
        tech_stack: Vec<String>,
        is_public: bool,
    }

    let metadata: RestoredMetadata = serde_json::from_value(restored.metadata.clone())?;
    entry.title = metadata.title;
    entry.category = metadata.category;
    entry.summary = metadata.summary;
    entry.keywords = metadata.keywords;
    entry.tech_stack = metadata.tech_stack;
    entry.is_public = metadata.is_public;
    entry.content_preview = restored.content.chars().take(280).collect();
    entry.updated_at = restored.created_at;

    let embeddings = context
        .embedding_client
        .encode(std::slice::from_ref(&restored.content))
        .await?;
    let embedding = embeddings
        .into_iter()
        .next()
        .ok_or_else(|| Error::embedding("embedding client returned no vectors"))?;

    let mut payload = std::collections::HashMap::new();
    payload.insert("content".to_string(), serde_json::json!(restored.content));
    payload.insert("owner_id".to_string(), serde_json::json!(entry.owner_id));
    payload.insert("is_public".to_string(), serde_json::json!(entry.is_public));

    context
        .vector_store
        .upsert(
            &context.config.indexing.knowledge_collection,
            vec![domain::ports::providers::VectorPoint {
                id: entry.id.clone(),
                vector: embedding.vector,
                payload,
            }],
        )
        .await?;

    context.knowledge_repository.update_entry(&entry).await
}

fn load_config(config_path: Option<&std::path::Path>) -> Result<infrastructure::config::AppConfig> {
    let loader = match config_path {
        Some(path) => infrastructure::config::ConfigLoader::new().with_config_path(path),
        None => infrastructure::config::ConfigLoader::new(),
    };
    loader.load()
}
