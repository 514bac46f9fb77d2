//! Owner of the single live host session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capability::{self, Capability};
use crate::error::{ChatError, HostError};
use crate::host::{HostSession, ModelHost};
use crate::stats::Stats;

use super::config::SessionConfig;

/// Creates, replaces, and destroys the one session the chat talks to.
///
/// A replacement is created before the old session is destroyed, and the
/// swap is only committed once creation succeeds. At most one session is
/// live once any call returns.
pub struct SessionController {
    host: Arc<dyn ModelHost>,
    capability: Option<Capability>,
    session: Option<Box<dyn HostSession>>,
}

impl SessionController {
    pub fn new(host: Arc<dyn ModelHost>) -> Self {
        Self {
            host,
            capability: None,
            session: None,
        }
    }

    /// Probe the host (once per controller) and create a session with its
    /// default sampling parameters.
    pub async fn initialize(&mut self) -> Result<&dyn HostSession, ChatError> {
        let capability = match self.capability {
            Some(capability) => capability,
            None => {
                let capability = capability::probe(self.host.as_ref()).await?;
                self.capability = Some(capability);
                capability
            }
        };

        let config = capability.default_config();
        let session = self
            .host
            .create_session(config)
            .await
            .map_err(|e| match e {
                HostError::Unsupported => ChatError::Unsupported,
                e => {
                    warn!(error = %e, "session creation failed");
                    ChatError::Initialization(e.to_string())
                }
            })?;
        info!(
            session = %session.id(),
            temperature = config.temperature,
            top_k = config.top_k,
            "session created"
        );
        Ok(self.swap_in(session).await)
    }

    /// Replace the live session with one using `config`.
    ///
    /// Returns `Ok(None)` without touching the host when no session is live.
    /// On failure the previous session stays live and current.
    pub async fn reconfigure(
        &mut self,
        config: SessionConfig,
    ) -> Result<Option<&dyn HostSession>, ChatError> {
        if self.session.is_none() {
            debug!("no live session, reconfigure ignored");
            return Ok(None);
        }
        config.validate()?;

        let session = self.host.create_session(config).await.map_err(|e| {
            warn!(error = %e, "reconfigure failed, keeping previous session");
            ChatError::Configuration(e.to_string())
        })?;
        info!(
            session = %session.id(),
            temperature = config.temperature,
            top_k = config.top_k,
            "session reconfigured"
        );
        Ok(Some(self.swap_in(session).await))
    }

    /// Create a session with `config` whether or not one is live, replacing
    /// any current session. Used to resume after a prompt was cancelled by
    /// destroying its session.
    pub async fn recreate(&mut self, config: SessionConfig) -> Result<&dyn HostSession, ChatError> {
        config.validate()?;
        let session = self.host.create_session(config).await.map_err(|e| {
            warn!(error = %e, "session re-creation failed");
            ChatError::Initialization(e.to_string())
        })?;
        info!(
            session = %session.id(),
            temperature = config.temperature,
            top_k = config.top_k,
            "session re-created"
        );
        Ok(self.swap_in(session).await)
    }

    /// Release the live session, if any. Safe to call repeatedly.
    pub async fn destroy(&mut self) {
        if let Some(session) = self.session.take() {
            session.destroy().await;
            info!(session = %session.id(), "session destroyed");
        }
    }

    /// Counters and sampling parameters of the live session.
    pub fn refresh_stats(&self) -> Option<Stats> {
        self.session().map(Stats::read)
    }

    pub fn session(&self) -> Option<&dyn HostSession> {
        self.session.as_deref()
    }

    pub fn config(&self) -> Option<SessionConfig> {
        self.session().map(|s| s.config())
    }

    pub fn capability(&self) -> Option<Capability> {
        self.capability
    }

    async fn swap_in(&mut self, session: Box<dyn HostSession>) -> &dyn HostSession {
        if let Some(previous) = self.session.take() {
            previous.destroy().await;
            debug!(session = %previous.id(), "previous session destroyed");
        }
        &**self.session.insert(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::simulated::SimulatedHost;

    fn controller() -> (Arc<SimulatedHost>, SessionController) {
        let host = Arc::new(SimulatedHost::new(0.8, 3));
        let controller = SessionController::new(host.clone());
        (host, controller)
    }

    #[tokio::test]
    async fn initialize_uses_capability_defaults() {
        let (host, mut controller) = controller();
        let session = controller.initialize().await.unwrap();
        assert_eq!(session.config(), SessionConfig::new(0.8, 3));
        assert_eq!(host.live_sessions(), 1);
        assert_eq!(
            controller.capability(),
            Some(Capability {
                default_temperature: 0.8,
                default_top_k: 3,
            })
        );
    }

    #[tokio::test]
    async fn initialize_without_capability_is_unsupported() {
        let host = Arc::new(SimulatedHost::unavailable());
        let mut controller = SessionController::new(host.clone());
        let err = controller.initialize().await.err();
        assert_eq!(err, Some(ChatError::Unsupported));
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn initialize_creation_failure_is_initialization_error() {
        let (host, mut controller) = controller();
        host.fail_next_create("model still downloading");
        let err = controller.initialize().await.err();
        assert_eq!(
            err,
            Some(ChatError::Initialization("model still downloading".into()))
        );
        assert_eq!(host.live_sessions(), 0);
    }

    #[tokio::test]
    async fn reconfigure_without_session_is_noop() {
        let (host, mut controller) = controller();
        let result = controller.reconfigure(SessionConfig::new(0.2, 5)).await;
        assert!(matches!(result, Ok(None)));
        assert_eq!(host.sessions_created(), 0);
    }

    #[tokio::test]
    async fn reconfigure_replaces_and_keeps_one_live_session() {
        let (host, mut controller) = controller();
        controller.initialize().await.unwrap();
        for k in 1..=5 {
            let session = controller
                .reconfigure(SessionConfig::new(0.5, k))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(session.config().top_k, k);
            assert_eq!(host.live_sessions(), 1);
        }
        assert_eq!(host.sessions_created(), 6);
    }

    #[tokio::test]
    async fn failed_reconfigure_rolls_back() {
        let (host, mut controller) = controller();
        let original_id = controller.initialize().await.unwrap().id().clone();
        host.fail_next_create("host busy");

        let err = controller
            .reconfigure(SessionConfig::new(0.9, 5))
            .await
            .err();
        assert_eq!(err, Some(ChatError::Configuration("host busy".into())));
        assert_eq!(controller.config(), Some(SessionConfig::new(0.8, 3)));
        assert_eq!(controller.session().unwrap().id(), &original_id);
        assert_eq!(host.live_sessions(), 1);
    }

    #[tokio::test]
    async fn invalid_config_never_reaches_host() {
        let (host, mut controller) = controller();
        controller.initialize().await.unwrap();
        let err = controller
            .reconfigure(SessionConfig::new(2.0, 3))
            .await
            .err();
        assert!(matches!(err, Some(ChatError::Configuration(_))));
        assert_eq!(host.sessions_created(), 1);
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let (host, mut controller) = controller();
        controller.initialize().await.unwrap();
        controller.destroy().await;
        controller.destroy().await;
        assert!(controller.session().is_none());
        assert!(controller.refresh_stats().is_none());
        assert_eq!(host.live_sessions(), 0);
    }

    #[tokio::test]
    async fn reinitialize_replaces_previous_session() {
        let (host, mut controller) = controller();
        controller.initialize().await.unwrap();
        controller.initialize().await.unwrap();
        assert_eq!(host.live_sessions(), 1);
        assert_eq!(host.sessions_created(), 2);
    }

    #[tokio::test]
    async fn recreate_restores_config_after_destroy() {
        let (host, mut controller) = controller();
        controller.initialize().await.unwrap();
        controller.reconfigure(SessionConfig::new(0.4, 7)).await.unwrap();
        let config = controller.config().unwrap();
        controller.destroy().await;

        let session = controller.recreate(config).await.unwrap();
        assert_eq!(session.config(), SessionConfig::new(0.4, 7));
        assert_eq!(host.live_sessions(), 1);
    }

    #[tokio::test]
    async fn recreate_failure_leaves_no_session() {
        let (host, mut controller) = controller();
        host.fail_next_create("gpu lost");
        let err = controller.recreate(SessionConfig::new(0.5, 2)).await.err();
        assert_eq!(err, Some(ChatError::Initialization("gpu lost".into())));
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn refresh_stats_reads_live_session() {
        let (_host, mut controller) = controller();
        controller.initialize().await.unwrap();
        let stats = controller.refresh_stats().unwrap();
        assert_eq!(stats.top_k, 3);
        assert_eq!(stats.tokens_so_far + stats.tokens_left, stats.max_tokens);
    }
}
