//! WebSocket chat relay with an embedded exchange-rate command.
//!
//! Every text frame a client sends is relayed to all connected clients,
//! prefixed with the sender's display name. Lines containing `exchange`
//! instead fetch the last few days of PrivatBank exchange rates concurrently
//! and broadcast the aggregated table. Each module focuses on a concrete
//! responsibility:
//!
//! - [`cli`] parses the command-line interface for server and standalone modes.
//! - [`config`] holds the runtime settings the library consumes.
//! - [`registry`] tracks live connections and their assigned display names.
//! - [`broadcast`] fans a line of text out to every registered connection.
//! - [`command`] classifies inbound lines and extracts day counts.
//! - [`router`] decides what each inbound line turns into.
//! - [`rates`] fetches, aggregates and renders exchange rates.
//! - [`audit`] appends exchange commands to the command log.
//! - [`names`] generates display names for new connections.
//! - [`server`] serves the WebSocket endpoint and drives connection lifecycles.
//! - [`standalone`] prints a rate table without starting the server.

pub mod audit;
pub mod broadcast;
pub mod cli;
pub mod command;
pub mod config;
pub mod names;
pub mod rates;
pub mod registry;
pub mod router;
pub mod server;
pub mod standalone;
