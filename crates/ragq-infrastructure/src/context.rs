//! Application context: every port wired to a concrete adapter, built
//! once at startup and shared behind an `Arc`.
//!
//! The teacher wires its adapters through a `shaku`-based compile-time DI
//! graph (see `infrastructure/di/modules`). That machinery buys type-safe
//! construction in exchange for macro-generated indirection; this service
//! has few enough components that a plain struct built by one function is
//! easier to read and just as safe, so the DI crates are not carried
//! forward. `AppContext` is that struct.

use std::sync::Arc;

use ragq_application::{HybridRetriever, IngestionCoordinator, KnowledgeTaskProcessor, QaChain, VersionTracker};
use ragq_domain::error::{Error, Result};
use ragq_domain::ports::infrastructure::{LockProvider, TokenVerifier};
use ragq_domain::ports::providers::{CodeChunker, DocumentChunker, EmbeddingClient, KeywordIndex, LlmClient, Reranker, VectorStoreClient};
use ragq_domain::ports::repositories::{ApiKeyRepository, KnowledgeRepository, TaskRepository, UsageRepository, VersionRepository};
use ragq_providers::{
    Bm25Index, CachingCrossEncoderReranker, HeadingAwareDocumentChunker, LocalEmbeddingClient,
    OpenAiCompatibleClient, QdrantClient, RegexCodeChunker, RemoteEmbeddingClient,
};

use crate::auth::JwtTokenVerifier;
use crate::cache::CachingApiKeyRepository;
use crate::config::AppConfig;
use crate::constants::JWT_MIN_SECRET_LENGTH;
use crate::db::{
    self, PgApiKeyRepository, PgKnowledgeRepository, PgStateStoreProvider, PgTaskRepository,
    PgUsageRepository, PgVersionRepository,
};
use crate::lock::InMemoryLockProvider;
use crate::rate_limiter::LoginRateLimiter;
use crate::scheduler::Scheduler;
use crate::task_queue::TaskQueue;

/// Every wired dependency the HTTP surface, task queue, and scheduler run
/// against. Built once in [`AppContext::bootstrap`] and shared by `Arc`.
pub struct AppContext {
    pub config: AppConfig,

    pub token_verifier: Arc<dyn TokenVerifier>,
    pub lock_provider: Arc<dyn LockProvider>,
    pub login_rate_limiter: Arc<LoginRateLimiter>,

    pub api_key_repository: Arc<dyn ApiKeyRepository>,
    pub knowledge_repository: Arc<dyn KnowledgeRepository>,
    pub task_repository: Arc<dyn TaskRepository>,
    pub usage_repository: Arc<dyn UsageRepository>,
    pub version_repository: Arc<dyn VersionRepository>,

    pub embedding_client: Arc<dyn EmbeddingClient>,
    pub vector_store: Arc<dyn VectorStoreClient>,
    pub keyword_index: Arc<dyn KeywordIndex>,
    pub document_chunker: Arc<dyn DocumentChunker>,
    pub code_chunker: Arc<dyn CodeChunker>,
    pub reranker: Option<Arc<dyn Reranker>>,
    pub llm_client: Arc<dyn LlmClient>,

    pub ingestion_coordinator: Arc<IngestionCoordinator>,
    pub retriever: Arc<HybridRetriever>,
    pub qa_chain: Arc<QaChain>,
    pub version_tracker: Arc<VersionTracker>,
    pub knowledge_task_processor: Arc<KnowledgeTaskProcessor>,

    pub task_queue: Arc<TaskQueue>,
    pub scheduler: Arc<Scheduler>,
}

impl AppContext {
    /// Validate `config`, connect every external dependency, and wire the
    /// use cases and background workers on top. Returns an error on a bad
    /// secret or a failed database connection; never panics.
    pub async fn bootstrap(config: AppConfig) -> Result<Arc<Self>> {
        if config.auth.jwt_secret.len() < JWT_MIN_SECRET_LENGTH {
            return Err(Error::configuration(format!(
                "auth.jwt_secret must be at least {JWT_MIN_SECRET_LENGTH} characters"
            )));
        }

        let pool = db::build_pool(&config.database).await?;

        let token_verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(&config.auth.jwt_secret));
        let lock_provider: Arc<dyn LockProvider> = Arc::new(InMemoryLockProvider::new());
        let login_rate_limiter = Arc::new(LoginRateLimiter::new());

        let raw_api_key_repository = PgApiKeyRepository::new(pool.clone());
        let api_key_repository: Arc<dyn ApiKeyRepository> = CachingApiKeyRepository::shared(raw_api_key_repository);
        let knowledge_repository: Arc<dyn KnowledgeRepository> = Arc::new(PgKnowledgeRepository::new(pool.clone()));
        let task_repository: Arc<dyn TaskRepository> = Arc::new(PgTaskRepository::new(pool.clone()));
        let usage_repository: Arc<dyn UsageRepository> = Arc::new(PgUsageRepository::new(pool.clone()));
        let version_repository: Arc<dyn VersionRepository> = Arc::new(PgVersionRepository::new(pool.clone()));
        let state_store: Arc<dyn ragq_domain::ports::infrastructure::StateStoreProvider> =
            Arc::new(PgStateStoreProvider::new(pool));

        let embedding_client: Arc<dyn EmbeddingClient> = build_embedding_client(&config)?;
        let vector_store: Arc<dyn VectorStoreClient> = Arc::new(QdrantClient::new(
            config.providers.vector_store.base_url.clone(),
            config.providers.vector_store.api_key.clone(),
        ));
        let keyword_index: Arc<dyn KeywordIndex> = Arc::new(Bm25Index::new());
        let document_chunker: Arc<dyn DocumentChunker> = Arc::new(HeadingAwareDocumentChunker::new());
        let code_chunker: Arc<dyn CodeChunker> = Arc::new(RegexCodeChunker::new());
        let reranker: Option<Arc<dyn Reranker>> = (!config.providers.reranker.base_url.is_empty()).then(|| {
            Arc::new(CachingCrossEncoderReranker::new(
                config.providers.reranker.base_url.clone(),
                config.providers.reranker.api_key.clone(),
            )) as Arc<dyn Reranker>
        });
        let llm_client: Arc<dyn LlmClient> = Arc::new(OpenAiCompatibleClient::new(
            config.providers.llm.api_key.clone().unwrap_or_default(),
            config.providers.llm.base_url.clone(),
            config.providers.llm.model.clone().unwrap_or_default(),
        ));

        let ingestion_coordinator = Arc::new(IngestionCoordinator::new(
            document_chunker.clone(),
            code_chunker.clone(),
            embedding_client.clone(),
            vector_store.clone(),
            keyword_index.clone(),
            state_store,
            config.indexing.corpus_collection.clone(),
        ));

        let retriever = Arc::new(HybridRetriever::new(
            embedding_client.clone(),
            vector_store.clone(),
            keyword_index.clone(),
            reranker.clone(),
            Some(llm_client.clone()),
            config.indexing.corpus_collection.clone(),
        ));

        let qa_chain = Arc::new(QaChain::new(
            retriever.clone(),
            llm_client.clone(),
            embedding_client.clone(),
            vector_store.clone(),
            usage_repository.clone(),
            config.indexing.cache_collection.clone(),
            "openai-compatible".to_string(),
            config.providers.llm.model.clone().unwrap_or_default(),
        ));

        let version_tracker = Arc::new(VersionTracker::new(version_repository.clone(), lock_provider.clone()));

        let knowledge_task_processor = Arc::new(KnowledgeTaskProcessor::new(
            llm_client.clone(),
            embedding_client.clone(),
            vector_store.clone(),
            knowledge_repository.clone(),
            version_tracker.clone(),
            config.indexing.knowledge_collection.clone(),
        ));

        let task_queue = Arc::new(TaskQueue::spawn(knowledge_task_processor.clone(), task_repository.clone()));

        let scheduler = Arc::new(Scheduler::new(
            ingestion_coordinator.clone(),
            config.indexing.root_path.clone(),
            config.indexing.owner_id.clone(),
            config.indexing.is_public,
        ));

        Ok(Arc::new(Self {
            config,
            token_verifier,
            lock_provider,
            login_rate_limiter,
            api_key_repository,
            knowledge_repository,
            task_repository,
            usage_repository,
            version_repository,
            embedding_client,
            vector_store,
            keyword_index,
            document_chunker,
            code_chunker,
            reranker,
            llm_client,
            ingestion_coordinator,
            retriever,
            qa_chain,
            version_tracker,
            knowledge_task_processor,
            task_queue,
            scheduler,
        }))
    }

    /// Start the background reindex scheduler. Call once after bootstrap;
    /// the task queue's workers are already running at that point.
    pub fn start_background_workers(&self) {
        self.scheduler.start();
    }
}

fn build_embedding_client(config: &AppConfig) -> Result<Arc<dyn EmbeddingClient>> {
    match config.providers.embedding.kind.as_str() {
        "local" => Ok(Arc::new(LocalEmbeddingClient::new()?)),
        "remote" => Ok(Arc::new(RemoteEmbeddingClient::new(
            config.providers.embedding.endpoint.api_key.clone().unwrap_or_default(),
            config.providers.embedding.endpoint.base_url.clone(),
            config.providers.embedding.endpoint.model.clone().unwrap_or_default(),
        ))),
        other => Err(Error::configuration(format!(
            "providers.embedding.kind must be \"local\" or \"remote\", got {other:?}"
        ))),
    }
}
