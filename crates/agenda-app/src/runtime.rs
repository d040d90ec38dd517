//! Wiring: config sections to reasoning client, store, tools, and orchestrator.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use agenda_ai::{
    appointment_tools, ClaudeClient, ClaudeConfig, Executor, OpenAiClient, OpenAiConfig,
    Orchestrator, OrchestratorOptions, ReasoningClient, RetryPolicy, ToolRegistry,
};
use agenda_common::AgendaError;
use agenda_config::{AgendaConfig, AssistantConfig, ReasoningConfig, ReasoningProvider, StoreConfig};
use agenda_store::{AppointmentStore, MemoryStore};

pub struct Runtime {
    pub orchestrator: Orchestrator,
}

pub fn build(config: &AgendaConfig) -> Result<Runtime, AgendaError> {
    let client = build_client(&config.reasoning)?;
    let store: Arc<dyn AppointmentStore> = Arc::new(build_store(&config.store)?);
    let registry = Arc::new(build_registry()?);

    let executor = Executor::new(registry, store).with_timeout(Duration::from_secs(
        u64::from(config.assistant.tool_timeout_secs),
    ));
    let orchestrator =
        Orchestrator::new(client, executor).with_options(orchestrator_options(&config.assistant));

    Ok(Runtime { orchestrator })
}

pub fn build_registry() -> Result<ToolRegistry, AgendaError> {
    appointment_tools().map_err(|e| AgendaError::Other(format!("tool registry: {e}")))
}

pub fn orchestrator_options(config: &AssistantConfig) -> OrchestratorOptions {
    OrchestratorOptions {
        system_prompt: Some(config.system_prompt.clone()).filter(|p| !p.trim().is_empty()),
        tool_notice_prefix: config
            .show_tool_notices
            .then(|| config.tool_notice_prefix.clone()),
        parallel_tools: config.parallel_tools,
        error_message: config.error_message.clone(),
    }
}

fn retry_policy(config: &ReasoningConfig) -> RetryPolicy {
    RetryPolicy::new(
        config.max_retries,
        Duration::from_millis(u64::from(config.retry_backoff_ms)),
    )
}

fn build_client(config: &ReasoningConfig) -> Result<Arc<dyn ReasoningClient>, AgendaError> {
    let timeout = Duration::from_secs(u64::from(config.timeout_secs));
    let ai_err = |e: agenda_ai::AiError| AgendaError::Ai(e.to_string());

    match config.provider {
        ReasoningProvider::OpenAi => {
            let mut openai = OpenAiConfig::from_env()
                .map_err(ai_err)?
                .with_max_tokens(config.max_tokens)
                .with_temperature(config.temperature)
                .with_timeout(timeout)
                .with_retry(retry_policy(config));
            if let Some(ref model) = config.model {
                openai = openai.with_model(model.clone());
            }
            if let Some(ref url) = config.base_url {
                openai = openai.with_base_url(url.clone());
            }
            info!(
                model = %openai.model,
                base_url = %openai.base_url,
                "using OpenAI reasoning service"
            );
            Ok(Arc::new(OpenAiClient::new(openai).map_err(ai_err)?))
        }
        ReasoningProvider::Claude => {
            if config.base_url.is_some() {
                warn!("reasoning.base_url is ignored for the claude provider");
            }
            let mut claude = ClaudeConfig::from_env()
                .map_err(ai_err)?
                .with_max_tokens(config.max_tokens)
                .with_temperature(config.temperature)
                .with_timeout(timeout)
                .with_retry(retry_policy(config));
            if let Some(ref model) = config.model {
                claude = claude.with_model(model.clone());
            }
            info!(model = %claude.model, "using Claude reasoning service");
            Ok(Arc::new(ClaudeClient::new(claude).map_err(ai_err)?))
        }
    }
}

fn build_store(config: &StoreConfig) -> Result<MemoryStore, AgendaError> {
    let pool_size = config.pool_size as usize;
    match config.seed_file {
        Some(ref path) => MemoryStore::load_seed(path, pool_size),
        None => Ok(MemoryStore::with_pool_size(pool_size)),
    }
}
