//! Exchange rate lookup: the upstream client, the concurrent aggregator and
//! the text rendering broadcast to chat.

pub mod aggregator;
pub mod format;
pub mod model;
pub mod provider;

pub use aggregator::RateAggregator;
pub use model::{CurrencyRate, DayRates, RateReport, RateSnapshot, RateTable, RateValue};
pub use provider::{PrivatBankClient, RateProvider};
