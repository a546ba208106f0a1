use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{net::TcpListener, sync::mpsc, time::timeout};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::{
    audit::{CommandLog, FileCommandLog},
    broadcast::Broadcaster,
    config::RelayConfig,
    names::{NameGenerator, RandomNames},
    rates::{PrivatBankClient, RateAggregator, RateProvider},
    registry::{Connection, Registry},
    router::MessageRouter,
};

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything a connection task needs, owned by the server for its lifetime.
pub struct RelayState {
    pub registry: Arc<Registry>,
    pub router: MessageRouter,
}

impl RelayState {
    pub fn new(
        config: &RelayConfig,
        provider: Arc<dyn RateProvider>,
        command_log: Arc<dyn CommandLog>,
        names: impl NameGenerator + 'static,
    ) -> Self {
        let registry = Arc::new(Registry::new(names));
        let router = MessageRouter::new(
            Broadcaster::new(Arc::clone(&registry)),
            RateAggregator::new(provider),
            command_log,
            config.provider.currencies.clone(),
        )
        .with_max_days(config.max_days)
        .with_echo_commands(config.echo_commands);

        Self { registry, router }
    }
}

pub struct RelayServer {
    listener: TcpListener,
    state: Arc<RelayState>,
}

impl RelayServer {
    pub fn new(listener: TcpListener, state: RelayState) -> Self {
        Self {
            listener,
            state: Arc::new(state),
        }
    }

    /// Binds `config.listen` and wires up the PrivatBank client, the file
    /// command log and random display names.
    pub async fn bind(config: &RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("failed to bind {}", config.listen))?;
        let provider = Arc::new(PrivatBankClient::new(&config.provider)?);
        let command_log = Arc::new(FileCommandLog::new(config.command_log.clone()));
        let state = RelayState::new(config, provider, command_log, RandomNames);
        Ok(Self::new(listener, state))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<RelayState> {
        Arc::clone(&self.state)
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let RelayServer { listener, state } = self;
        let app = app(state).into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("relay server failed")?;

        info!("relay shutting down");
        Ok(())
    }

    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

pub fn app(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, peer, state))
}

async fn handle_connection(socket: WebSocket, peer: SocketAddr, state: Arc<RelayState>) {
    let (sink, stream) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let connection = state.registry.register(outbound_tx).await;
    info!(%peer, name = connection.name(), "client connected");

    let writer = tokio::spawn(forward_outbound(outbound_rx, sink, peer));

    if let Err(err) = run_session(&state, &connection, stream).await {
        warn!(%peer, error = ?err, "client connection closed with error");
    }
    cleanup_client_disconnect(&state, &connection, peer).await;

    // The writer exits once the last sender is gone and its queue is drained.
    drop(connection);
    let abort = writer.abort_handle();
    if timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        debug!(%peer, "writer did not finish in time");
        abort.abort();
    }
}

async fn run_session(
    state: &RelayState,
    connection: &Connection,
    mut stream: SplitStream<WebSocket>,
) -> Result<()> {
    while let Some(frame) = stream.next().await {
        match frame.context("failed to read frame")? {
            Message::Text(text) => state.router.route(connection, &text).await,
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
        }
    }
    Ok(())
}

async fn forward_outbound(
    mut outbound: mpsc::UnboundedReceiver<String>,
    mut sink: SplitSink<WebSocket, Message>,
    peer: SocketAddr,
) {
    while let Some(text) = outbound.recv().await {
        if let Err(err) = sink.send(Message::Text(text)).await {
            debug!(%peer, ?err, "failed to deliver message to client");
            return;
        }
    }
    if let Err(err) = sink.close().await {
        debug!(%peer, ?err, "failed to close client socket");
    }
}

async fn cleanup_client_disconnect(state: &RelayState, connection: &Connection, peer: SocketAddr) {
    if state.registry.unregister(connection.id()).await.is_some() {
        info!(%peer, name = connection.name(), "client disconnected");
    }
}
