use tracing::{debug, warn};

use crate::presence::{ConnectionHandle, PresenceRegistry};
use crate::types::{DeliveryEnvelope, ServerEvent};

/// What happened to one envelope. Failed pushes never undo persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub recipient_online: bool,
    pub recipient_delivered: bool,
    pub echoed: bool,
}

/// Pushes envelopes to the recipient when online and echoes them to the sender.
#[derive(Clone)]
pub struct DeliveryRouter {
    presence: PresenceRegistry,
}

impl DeliveryRouter {
    pub fn new(presence: PresenceRegistry) -> Self {
        Self { presence }
    }

    pub async fn deliver(
        &self,
        envelope: &DeliveryEnvelope,
        recipient_id: &str,
        sender: &ConnectionHandle,
    ) -> DeliveryOutcome {
        let mut outcome = DeliveryOutcome {
            recipient_online: false,
            recipient_delivered: false,
            echoed: false,
        };

        match self.presence.lookup(recipient_id).await {
            Some(recipient) if recipient.id() != sender.id() => {
                outcome.recipient_online = true;
                match recipient.push(ServerEvent::NewMessage(envelope.clone())) {
                    Ok(()) => outcome.recipient_delivered = true,
                    Err(error) => warn!(
                        message_id = %envelope.message_id,
                        recipient_id = %recipient_id,
                        %error,
                        "failed to push message to recipient"
                    ),
                }
            }
            Some(_) => {}
            None => debug!(
                message_id = %envelope.message_id,
                recipient_id = %recipient_id,
                "recipient offline, message stays stored"
            ),
        }

        match sender.push(ServerEvent::NewMessage(envelope.clone())) {
            Ok(()) => outcome.echoed = true,
            Err(error) => warn!(
                message_id = %envelope.message_id,
                %error,
                "failed to echo message to sender"
            ),
        }

        outcome
    }
}
