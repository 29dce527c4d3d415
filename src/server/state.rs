use std::sync::Arc;
use std::time::Duration;

use crate::ai::{
    AIProvider, OpenAIProvider, TracedProvider, UnconfiguredProvider, MAX_ASSISTANT_TIMEOUT,
};
use crate::core::Config;
use crate::integrations::{ImgbbClient, LangfuseClient};
use crate::pdf::{converter_from_config, Branding, PdfConverter};
use crate::session::{Artifact, SessionStore};
use crate::store::{save_artifact, SessionRepository, SqliteRepository, StoreError};

use super::error::ApiError;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub ai: Arc<dyn AIProvider>,
    pub pdf: Arc<dyn PdfConverter>,
    pub repo: Arc<dyn SessionRepository>,
    pub imgbb: Option<Arc<ImgbbClient>>,
    pub branding: Arc<Branding>,
    pub assistant_id: Option<String>,
    pub assistant_timeout: Duration,
}

impl AppState {
    pub fn new(
        ai: Arc<dyn AIProvider>,
        pdf: Arc<dyn PdfConverter>,
        repo: Arc<dyn SessionRepository>,
        branding: Branding,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            ai,
            pdf,
            repo,
            imgbb: None,
            branding: Arc::new(branding),
            assistant_id: None,
            assistant_timeout: crate::ai::DEFAULT_ASSISTANT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_imgbb(mut self, client: ImgbbClient) -> Self {
        self.imgbb = Some(Arc::new(client));
        self
    }

    #[must_use]
    pub fn with_assistant(mut self, assistant_id: Option<String>, timeout: Duration) -> Self {
        self.assistant_id = assistant_id.filter(|id| !id.trim().is_empty());
        self.assistant_timeout = timeout.min(MAX_ASSISTANT_TIMEOUT);
        self
    }

    /// Wire up providers, converter and database from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let ai = build_provider(config);
        let pdf = converter_from_config(&config.pdf)?;
        let repo = SqliteRepository::open(config.database.resolve_path())?;
        let branding = Branding::from_config(&config.branding);

        let mut state = Self::new(ai, pdf, Arc::new(repo), branding).with_assistant(
            config.ai.assistant_id.clone(),
            Duration::from_secs(config.ai.assistant_timeout_secs),
        );
        if let Some(key) = config.imgbb.api_key.as_deref().filter(|k| !k.is_empty()) {
            state = state.with_imgbb(ImgbbClient::new(key));
        }

        tracing::info!(
            ai = state.ai.name(),
            model = state.ai.model(),
            pdf = state.pdf.name(),
            imgbb = state.imgbb.is_some(),
            sketch_assistant = state.assistant_id.is_some(),
            "Application state ready"
        );
        Ok(state)
    }

    /// Persist an artifact on the blocking pool and return the row id
    /// (also written into the artifact's badge).
    pub async fn persist<T: Artifact>(&self, mut artifact: T) -> Result<(i64, T), ApiError> {
        let repo = Arc::clone(&self.repo);
        let result = tokio::task::spawn_blocking(move || {
            save_artifact(repo.as_ref(), &mut artifact).map(|row| (row, artifact))
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))??;
        Ok(result)
    }

    /// Run a repository call on the blocking pool.
    pub async fn with_repo<R, F>(&self, f: F) -> Result<R, ApiError>
    where
        R: Send + 'static,
        F: FnOnce(&dyn SessionRepository) -> Result<R, StoreError> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        let result = tokio::task::spawn_blocking(move || f(repo.as_ref()))
            .await
            .map_err(|e| StoreError::Join(e.to_string()))??;
        Ok(result)
    }
}

fn build_provider(config: &Config) -> Arc<dyn AIProvider> {
    let base: Arc<dyn AIProvider> = match config.ai.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => Arc::new(
            OpenAIProvider::with_api_key(key)
                .with_model(&config.ai.model)
                .with_base_url(&config.ai.base_url),
        ),
        None => {
            tracing::warn!("OPENAI_API_KEY not set, AI endpoints will fail");
            Arc::new(UnconfiguredProvider)
        }
    };

    match LangfuseClient::from_config(&config.langfuse) {
        Some(langfuse) => Arc::new(TracedProvider::new(base, langfuse)),
        None => base,
    }
}
