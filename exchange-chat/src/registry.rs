//! The authoritative set of live connections.
//!
//! A connection is present from the moment its socket is upgraded until its
//! read loop finishes. All mutation goes through [`Registry::register`] and
//! [`Registry::unregister`]; readers only ever see copies taken under the lock.

use std::{collections::HashMap, fmt, sync::Arc};

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::names::NameGenerator;

pub type ConnectionId = String;

/// One client session: its id, the name it was given on registration and the
/// channel feeding its socket writer.
#[derive(Clone)]
pub struct Connection {
    id: ConnectionId,
    name: Arc<str>,
    outbound: mpsc::UnboundedSender<String>,
}

impl Connection {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queues `text` for delivery. Fails once the writer side has gone away.
    pub fn send(&self, text: String) -> Result<(), mpsc::error::SendError<String>> {
        self.outbound.send(text)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

pub struct Registry {
    connections: Mutex<HashMap<ConnectionId, Connection>>,
    names: Box<dyn NameGenerator>,
}

impl Registry {
    pub fn new(names: impl NameGenerator + 'static) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            names: Box::new(names),
        }
    }

    /// Names the connection and adds it to the live set.
    pub async fn register(&self, outbound: mpsc::UnboundedSender<String>) -> Connection {
        let connection = Connection {
            id: nanoid::nanoid!(),
            name: Arc::from(self.names.generate()),
            outbound,
        };

        let mut connections = self.connections.lock().await;
        connections.insert(connection.id.clone(), connection.clone());
        info!(
            id = %connection.id,
            name = %connection.name,
            live = connections.len(),
            "connection registered"
        );
        connection
    }

    pub async fn unregister(&self, id: &str) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        let removed = connections.remove(id);
        match &removed {
            Some(connection) => info!(
                id = %connection.id,
                name = %connection.name,
                live = connections.len(),
                "connection unregistered"
            ),
            None => debug!(id, "unregister for unknown connection"),
        }
        removed
    }

    /// Point-in-time copy of the live set.
    pub async fn snapshot(&self) -> Vec<Connection> {
        let connections = self.connections.lock().await;
        connections.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}
