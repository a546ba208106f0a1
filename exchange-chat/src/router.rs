//! Turns each inbound line into the broadcast it should produce.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::{
    audit::{CommandLog, command_entry},
    broadcast::Broadcaster,
    command::{DayCount, Inbound, classify},
    rates::{RateAggregator, format::render_report},
    registry::Connection,
};

pub struct MessageRouter {
    broadcaster: Broadcaster,
    aggregator: RateAggregator,
    command_log: Arc<dyn CommandLog>,
    currencies: Vec<String>,
    max_days: u32,
    echo_commands: bool,
}

impl MessageRouter {
    pub fn new(
        broadcaster: Broadcaster,
        aggregator: RateAggregator,
        command_log: Arc<dyn CommandLog>,
        currencies: Vec<String>,
    ) -> Self {
        Self {
            broadcaster,
            aggregator,
            command_log,
            currencies,
            max_days: crate::config::MAX_DAYS,
            echo_commands: false,
        }
    }

    pub fn with_max_days(mut self, max_days: u32) -> Self {
        self.max_days = max_days;
        self
    }

    pub fn with_echo_commands(mut self, echo_commands: bool) -> Self {
        self.echo_commands = echo_commands;
        self
    }

    /// Handles one line from `sender`. Resolves once the resulting broadcast
    /// has been queued, so lines from one connection are handled in order.
    pub async fn route(&self, sender: &Connection, line: &str) {
        match classify(line) {
            Inbound::Chat => {
                self.broadcaster.send(&decorate(sender, line)).await;
            }
            Inbound::Exchange { requested_days } => {
                self.handle_exchange(sender, line, requested_days).await;
            }
        }
    }

    async fn handle_exchange(&self, sender: &Connection, line: &str, requested_days: u32) {
        let entry = command_entry(Local::now(), sender.name(), line);
        if let Err(err) = self.command_log.append(&entry).await {
            warn!(error = ?err, "failed to record exchange command");
        }

        if self.echo_commands {
            self.broadcaster.send(&decorate(sender, line)).await;
        }

        let days = DayCount::clamped(requested_days, self.max_days);
        if days.get() != requested_days {
            debug!(requested_days, days = days.get(), "day count adjusted");
        }
        info!(name = sender.name(), days = days.get(), "exchange command");

        let report = self.aggregator.aggregate(days).await;
        let text = render_report(&report, &self.currencies);
        self.broadcaster.send(&text).await;
    }
}

fn decorate(sender: &Connection, line: &str) -> String {
    format!("{}: {line}", sender.name())
}
