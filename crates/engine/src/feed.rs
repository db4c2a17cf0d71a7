//! Presence feed abstraction.
//!
//! Session establishment with the presence provider lives outside the
//! engine. The engine only asks a feed to connect or disconnect and reads
//! its connection state for display.

use std::sync::RwLock;

use titlecast_core::{ConnectionState, Result, TitlecastError};

#[async_trait::async_trait]
pub trait PresenceFeed: Send + Sync {
    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;

    fn connection_state(&self) -> ConnectionState;
}

/// In-process feed whose events are pushed by the host itself.
#[derive(Debug, Default)]
pub struct StaticFeed {
    state: RwLock<ConnectionState>,
    refuse: Option<String>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// A feed whose `connect` always fails with `reason`.
    pub fn refusing(reason: impl Into<String>) -> Self {
        Self {
            state: RwLock::default(),
            refuse: Some(reason.into()),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write().expect("feed state lock poisoned") = state;
    }
}

#[async_trait::async_trait]
impl PresenceFeed for StaticFeed {
    async fn connect(&self) -> Result<()> {
        self.set_state(ConnectionState::Connecting);
        if let Some(reason) = &self.refuse {
            self.set_state(ConnectionState::Disconnected);
            return Err(TitlecastError::Feed(reason.clone()));
        }
        self.set_state(ConnectionState::Connected);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.set_state(ConnectionState::Disconnecting);
        self.set_state(ConnectionState::Disconnected);
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        *self.state.read().expect("feed state lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_then_disconnect() {
        let feed = StaticFeed::new();
        assert_eq!(feed.connection_state(), ConnectionState::Disconnected);

        feed.connect().await.unwrap();
        assert_eq!(feed.connection_state(), ConnectionState::Connected);

        feed.disconnect().await.unwrap();
        assert_eq!(feed.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn refusing_feed_stays_disconnected() {
        let feed = StaticFeed::refusing("auth rejected");
        let err = feed.connect().await.unwrap_err();
        assert!(err.to_string().contains("auth rejected"));
        assert_eq!(feed.connection_state(), ConnectionState::Disconnected);
    }
}
