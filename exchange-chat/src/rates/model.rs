use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer};

/// Date format used both in upstream requests and as the table key.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

pub const NO_DATA: &str = "No data";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateValue {
    Value(f64),
    NoData,
}

impl From<Option<f64>> for RateValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RateValue::NoData, RateValue::Value)
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateValue::Value(value) => write!(f, "{value}"),
            RateValue::NoData => f.write_str(NO_DATA),
        }
    }
}

impl Serialize for RateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RateValue::Value(value) => serializer.serialize_f64(*value),
            RateValue::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrencyRate {
    pub sale: RateValue,
    pub purchase: RateValue,
}

impl CurrencyRate {
    pub const NO_DATA: Self = Self {
        sale: RateValue::NoData,
        purchase: RateValue::NoData,
    };
}

/// One day's rates for the tracked currencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateSnapshot {
    rates: BTreeMap<String, CurrencyRate>,
}

impl RateSnapshot {
    pub fn insert(&mut self, currency: impl Into<String>, rate: CurrencyRate) {
        self.rates.insert(currency.into(), rate);
    }

    pub fn get(&self, currency: &str) -> Option<&CurrencyRate> {
        self.rates.get(currency)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayRates {
    pub date: String,
    pub snapshot: RateSnapshot,
}

/// Date-keyed snapshots in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    days: Vec<DayRates>,
}

impl RateTable {
    /// Adds a day, replacing any earlier entry with the same date.
    pub fn insert(&mut self, day: DayRates) {
        match self.days.iter_mut().find(|existing| existing.date == day.date) {
            Some(existing) => existing.snapshot = day.snapshot,
            None => self.days.push(day),
        }
    }

    pub fn get(&self, date: &str) -> Option<&RateSnapshot> {
        self.day(date).map(|day| &day.snapshot)
    }

    pub fn day(&self, date: &str) -> Option<&DayRates> {
        self.days.iter().find(|day| day.date == date)
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.iter().map(|day| day.date.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayRates> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl Serialize for RateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.days.iter().map(|day| (&day.date, &day.snapshot)))
    }
}

/// One rendered block of a report, in request order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Section<'a> {
    Rates(&'a DayRates),
    Missing(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Rates(String),
    Missing(String),
}

/// Result of one aggregation: the table plus the requested dates that came
/// back empty. Days are recorded in request order and [`RateReport::sections`]
/// replays that order with failed days in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RateReport {
    table: RateTable,
    missing: Vec<String>,
    #[serde(skip)]
    order: Vec<Slot>,
}

impl RateReport {
    pub fn record_day(&mut self, day: DayRates) {
        if self.table.get(&day.date).is_none() {
            self.order.push(Slot::Rates(day.date.clone()));
        }
        self.table.insert(day);
    }

    pub fn record_missing(&mut self, date: impl Into<String>) {
        let date = date.into();
        self.order.push(Slot::Missing(date.clone()));
        self.missing.push(date);
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn sections(&self) -> impl Iterator<Item = Section<'_>> {
        self.order.iter().filter_map(|slot| match slot {
            Slot::Rates(date) => self.table.day(date).map(Section::Rates),
            Slot::Missing(date) => Some(Section::Missing(date)),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, eur_sale: f64) -> DayRates {
        let mut snapshot = RateSnapshot::default();
        snapshot.insert(
            "EUR",
            CurrencyRate {
                sale: RateValue::Value(eur_sale),
                purchase: RateValue::NoData,
            },
        );
        DayRates {
            date: date.to_string(),
            snapshot,
        }
    }

    #[test]
    fn table_keeps_request_order_and_replaces_duplicates() {
        let mut table = RateTable::default();
        table.insert(day("16.10.2026", 45.1));
        table.insert(day("15.10.2026", 45.0));
        table.insert(day("16.10.2026", 45.2));

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.dates().collect::<Vec<_>>(),
            vec!["16.10.2026", "15.10.2026"]
        );
        let eur = table.get("16.10.2026").and_then(|s| s.get("EUR")).copied();
        assert_eq!(eur.map(|rate| rate.sale), Some(RateValue::Value(45.2)));
    }

    #[test]
    fn report_serializes_missing_fields_as_no_data() {
        let mut report = RateReport::default();
        report.record_day(day("16.10.2026", 45.5));
        report.record_missing("15.10.2026");

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "table": {
                    "16.10.2026": { "EUR": { "sale": 45.5, "purchase": "No data" } }
                },
                "missing": ["15.10.2026"]
            })
        );
        assert!(!report.is_complete());
    }

    #[test]
    fn sections_follow_request_order() {
        let mut report = RateReport::default();
        report.record_missing("16.10.2026");
        report.record_day(day("15.10.2026", 45.0));
        report.record_day(day("15.10.2026", 45.3));
        report.record_missing("14.10.2026");

        let sections: Vec<_> = report
            .sections()
            .map(|section| match section {
                Section::Rates(day) => format!("rates {}", day.date),
                Section::Missing(date) => format!("missing {date}"),
            })
            .collect();
        assert_eq!(
            sections,
            vec!["missing 16.10.2026", "rates 15.10.2026", "missing 14.10.2026"]
        );
        assert_eq!(report.table().len(), 1);
        assert_eq!(report.missing(), ["16.10.2026", "14.10.2026"]);
    }
}
