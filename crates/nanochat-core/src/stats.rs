//! Usage statistics mirrored from the live session.

use serde::Serialize;

use crate::host::HostSession;

/// Snapshot of a session's sampling parameters and token counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Stats {
    pub temperature: f64,
    pub top_k: u32,
    pub tokens_so_far: u64,
    pub tokens_left: u64,
    pub max_tokens: u64,
}

impl Stats {
    /// Read the counters straight off the session without calling the host.
    pub fn read(session: &dyn HostSession) -> Self {
        let config = session.config();
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            tokens_so_far: session.tokens_so_far(),
            tokens_left: session.tokens_left(),
            max_tokens: session.max_tokens(),
        }
    }

    /// Fraction of the context window used, in `[0, 1]`.
    pub fn usage_ratio(&self) -> f64 {
        if self.max_tokens == 0 {
            return 0.0;
        }
        (self.tokens_so_far as f64 / self.max_tokens as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::simulated::{Reply, SimulatedHost};
    use crate::host::ModelHost;
    use crate::session::SessionConfig;
    use futures_util::StreamExt;

    #[test]
    fn default_is_zeroed() {
        let stats = Stats::default();
        assert_eq!(stats.max_tokens, 0);
        assert_eq!(stats.usage_ratio(), 0.0);
    }

    #[test]
    fn usage_ratio_is_fraction_of_max() {
        let stats = Stats {
            tokens_so_far: 25,
            tokens_left: 75,
            max_tokens: 100,
            ..Stats::default()
        };
        assert!((stats.usage_ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn read_mirrors_session_fields() {
        let host = SimulatedHost::new(0.8, 3).with_max_tokens(100);
        let session = host.create_session(SessionConfig::new(0.4, 7)).await.unwrap();
        host.push_reply(Reply::chunks(["one two three"]));
        let _: Vec<_> = session.prompt_streaming("a b").await.unwrap().collect().await;

        let stats = Stats::read(session.as_ref());
        assert!((stats.temperature - 0.4).abs() < f64::EPSILON);
        assert_eq!(stats.top_k, 7);
        assert_eq!(stats.tokens_so_far, 5);
        assert_eq!(stats.tokens_left, 95);
        assert_eq!(stats.tokens_so_far + stats.tokens_left, stats.max_tokens);
    }
}
