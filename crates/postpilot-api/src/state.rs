//! Application state wiring the chat service to its infrastructure.
//!
//! AppState holds the concrete service instance used by both the CLI and
//! the REST API. `ChatService` is generic over its repository and generator;
//! AppState pins it to SQLite storage and a boxed generator.

use std::path::PathBuf;
use std::sync::Arc;

use postpilot_core::chat::service::ChatService;
use postpilot_core::generation::box_generator::BoxTextGenerator;
use postpilot_core::generation::generator::TextGenerator;
use postpilot_infra::config::{database_url, gemini_api_key, load_config, resolve_data_dir};
use postpilot_infra::generation::gemini::GeminiGenerator;
use postpilot_infra::sqlite::chat::SqliteChatRepository;
use postpilot_infra::sqlite::lazy::LazyDatabase;
use postpilot_types::config::AppConfig;
use postpilot_types::error::GenerationError;

/// Concrete chat service pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository, BoxTextGenerator>;

/// Shared application state.
///
/// Cheap to clone: the service sits behind an `Arc` and the database handle
/// inside it connects lazily on first use.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub database_url: String,
}

impl AppState {
    /// Load configuration and wire the service. Does not touch the database.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;
        let db_url = database_url(&config, &data_dir);

        let generator = match gemini_api_key() {
            Some(key) => BoxTextGenerator::new(GeminiGenerator::from_config(&config.generation, key)?),
            None => {
                tracing::warn!("GEMINI_API_KEY is not set; chat generation requests will fail");
                BoxTextGenerator::new(MissingApiKey)
            }
        };

        let repo = SqliteChatRepository::new(LazyDatabase::new(db_url.clone()));

        Ok(Self::from_parts(repo, generator, config, data_dir, db_url))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        repo: SqliteChatRepository,
        generator: BoxTextGenerator,
        config: AppConfig,
        data_dir: PathBuf,
        database_url: String,
    ) -> Self {
        Self {
            chat_service: Arc::new(ChatService::new(repo, generator)),
            config: Arc::new(config),
            data_dir,
            database_url,
        }
    }
}

/// Stand-in generator used when no API key is configured.
struct MissingApiKey;

impl TextGenerator for MissingApiKey {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::AuthenticationFailed)
    }
}
