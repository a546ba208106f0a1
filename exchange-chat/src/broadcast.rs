use std::sync::Arc;

use tracing::{debug, warn};

use crate::registry::Registry;

/// Delivers text to every connection registered at the time of the call.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Returns how many connections accepted the message. A recipient whose
    /// writer has already gone away is skipped; its own read loop removes it.
    pub async fn send(&self, text: &str) -> usize {
        let members = self.registry.snapshot().await;
        let mut delivered = 0;

        for member in &members {
            match member.send(text.to_string()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    debug!(id = member.id(), name = member.name(), ?err, "failed to queue message")
                }
            }
        }

        if delivered < members.len() {
            warn!(
                delivered,
                recipients = members.len(),
                "broadcast reached only part of the registry"
            );
        }
        delivered
    }
}
