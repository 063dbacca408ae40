//! Shared application state for the gateway

use agora_auth::SessionAuthenticator;
use agora_chats::{ChatServices, PresenceRegistry};
use agora_config::RealtimeConfig;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct GatewayState {
    pub chats: ChatServices,
    pub authenticator: SessionAuthenticator,
    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,
}

impl GatewayState {
    pub fn new(
        pool: SqlitePool,
        presence: PresenceRegistry,
        authenticator: SessionAuthenticator,
        realtime: &RealtimeConfig,
    ) -> Self {
        Self {
            chats: ChatServices::new(pool, presence, realtime),
            authenticator,
            outbound_buffer: realtime.outbound_buffer,
        }
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.chats.presence
    }
}
