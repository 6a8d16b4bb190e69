//! Shared application state.

use crate::config::{Config, EngineMode};
use crate::error::Result;
use engine::{BridgeEngine, EnginePool};
use runtime::{AgentRegistry, LoopConfig};
use std::time::Duration;
use storage::SessionStore;
use tracing::info;

/// State shared by every handler.
pub struct AppState {
    pub sessions: SessionStore,
    pub agents: AgentRegistry,
    /// Live engines in managed mode; `None` in local mode.
    pub engines: Option<EnginePool<BridgeEngine>>,
    /// Client shared by provider backends.
    pub http: reqwest::Client,
    pub loop_config: LoopConfig,
}

impl AppState {
    /// Build the state for a fully overridden config, validating it first.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.check()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()?;

        let engines = match config.engine.mode {
            EngineMode::Local => None,
            EngineMode::Managed => {
                info!(
                    bridge = %config.engine.bridge_url,
                    pool_size = config.engine.pool_size,
                    "managed engine mode"
                );
                let engines = (0..config.engine.pool_size)
                    .map(|_| BridgeEngine::with_client(http.clone(), &config.engine.bridge_url))
                    .collect();
                Some(EnginePool::new(engines)?)
            }
        };

        Ok(Self {
            sessions: SessionStore::new(),
            agents: AgentRegistry::with_default(&config.agent.default_agent)?,
            engines,
            http,
            loop_config: LoopConfig {
                max_iterations: config.agent.max_iterations,
                ..LoopConfig::default()
            },
        })
    }

    /// Local-mode state with default settings.
    pub fn local() -> Self {
        Self {
            sessions: SessionStore::new(),
            agents: AgentRegistry::builtin(),
            engines: None,
            http: reqwest::Client::new(),
            loop_config: LoopConfig::default(),
        }
    }

    pub fn is_managed(&self) -> bool {
        self.engines.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::Error;

    #[test]
    fn mode_override_revalidates_pool_size() {
        let mut config = Config::parse("[engine]\npool_size = 0").unwrap();
        config.engine.mode = EngineMode::Managed;

        let result = AppState::from_config(&config);
        assert!(matches!(result, Err(Error::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn managed_mode_builds_one_engine_per_slot() {
        let mut config = Config::default();
        config.engine.mode = EngineMode::Managed;
        config.engine.pool_size = 3;

        let state = AppState::from_config(&config).unwrap();
        assert!(state.is_managed());
        assert_eq!(state.engines.as_ref().unwrap().size(), 3);
    }

    #[test]
    fn local_mode_has_no_engines() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert!(!state.is_managed());
        assert_eq!(state.loop_config.max_iterations, 5);
    }
}
