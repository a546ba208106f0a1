use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use futures::future::join_all;
use tracing::{debug, warn};

use super::model::{DATE_FORMAT, RateReport};
use super::provider::RateProvider;
use crate::command::DayCount;

/// Fans one fetch per day out to the provider and waits for all of them.
#[derive(Clone)]
pub struct RateAggregator {
    provider: Arc<dyn RateProvider>,
}

impl RateAggregator {
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self { provider }
    }

    pub async fn aggregate(&self, days: DayCount) -> RateReport {
        self.aggregate_from(Local::now().date_naive(), days).await
    }

    /// Fetches `today` and the `days - 1` calendar days before it. Days whose
    /// fetch failed are left out of the table and listed in
    /// [`RateReport::missing`]. Every fetch runs in its own task and all of
    /// them are awaited before the report is built.
    pub async fn aggregate_from(&self, today: NaiveDate, days: DayCount) -> RateReport {
        let dates = requested_dates(today, days);
        debug!(days = dates.len(), %today, "fetching exchange rates");

        let fetches = dates.iter().map(|&date| {
            let provider = Arc::clone(&self.provider);
            tokio::spawn(async move { provider.fetch_day(date).await })
        });
        let outcomes = join_all(fetches).await;

        let mut report = RateReport::default();
        for (date, outcome) in dates.iter().zip(outcomes) {
            match outcome {
                Ok(Some(day)) => report.record_day(day),
                Ok(None) => report.record_missing(date.format(DATE_FORMAT).to_string()),
                Err(err) => {
                    warn!(%date, error = %err, "rate fetch task failed");
                    report.record_missing(date.format(DATE_FORMAT).to_string());
                }
            }
        }

        if !report.is_complete() {
            warn!(
                requested = dates.len(),
                missing = report.missing().len(),
                "some days returned no exchange rates"
            );
        }
        report
    }
}

/// `today` followed by the preceding days, newest first.
pub fn requested_dates(today: NaiveDate, days: DayCount) -> Vec<NaiveDate> {
    (0..days.get())
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, time::Duration};

    use async_trait::async_trait;
    use tokio::{
        sync::{Barrier, Mutex},
        time::timeout,
    };

    use super::*;
    use crate::rates::model::{CurrencyRate, DayRates, RateSnapshot, RateValue, Section};

    /// Records every requested date and fails the ones listed in `failing`.
    #[derive(Default)]
    struct RecordingProvider {
        requested: Mutex<Vec<NaiveDate>>,
        failing: HashSet<NaiveDate>,
    }

    #[async_trait]
    impl RateProvider for RecordingProvider {
        async fn fetch_day(&self, date: NaiveDate) -> Option<DayRates> {
            self.requested.lock().await.push(date);
            if self.failing.contains(&date) {
                return None;
            }
            let mut snapshot = RateSnapshot::default();
            snapshot.insert(
                "EUR",
                CurrencyRate {
                    sale: RateValue::Value(45.0),
                    purchase: RateValue::Value(44.0),
                },
            );
            Some(DayRates {
                date: date.format(DATE_FORMAT).to_string(),
                snapshot,
            })
        }
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn requested_dates_walk_back_across_month_boundary() {
        let dates = requested_dates(ymd(2026, 3, 2), DayCount::clamped(4, 10));
        assert_eq!(
            dates,
            vec![ymd(2026, 3, 2), ymd(2026, 3, 1), ymd(2026, 2, 28), ymd(2026, 2, 27)]
        );
    }

    #[tokio::test]
    async fn aggregate_issues_one_fetch_per_day() {
        let provider = Arc::new(RecordingProvider::default());
        let aggregator = RateAggregator::new(provider.clone());
        let today = ymd(2026, 10, 16);

        let report = aggregator
            .aggregate_from(today, DayCount::clamped(5, 10))
            .await;

        let mut requested = provider.requested.lock().await.clone();
        requested.sort();
        let mut expected = requested_dates(today, DayCount::clamped(5, 10));
        expected.sort();
        assert_eq!(requested, expected);

        assert!(report.is_complete());
        assert_eq!(report.table().len(), 5);
        assert_eq!(
            report.table().dates().collect::<Vec<_>>(),
            vec!["16.10.2026", "15.10.2026", "14.10.2026", "13.10.2026", "12.10.2026"]
        );
    }

    #[tokio::test]
    async fn failed_days_are_reported_as_missing() {
        let provider = Arc::new(RecordingProvider {
            failing: HashSet::from([ymd(2026, 10, 15)]),
            ..Default::default()
        });
        let aggregator = RateAggregator::new(provider.clone());

        let report = aggregator
            .aggregate_from(ymd(2026, 10, 16), DayCount::clamped(3, 10))
            .await;

        assert_eq!(provider.requested.lock().await.len(), 3);
        assert_eq!(report.table().len(), 2);
        assert!(report.table().get("15.10.2026").is_none());
        assert_eq!(report.missing(), ["15.10.2026"]);
    }

    struct PanickingProvider;

    #[async_trait]
    impl RateProvider for PanickingProvider {
        async fn fetch_day(&self, _date: NaiveDate) -> Option<DayRates> {
            panic!("provider blew up");
        }
    }

    #[tokio::test]
    async fn panicking_fetch_does_not_poison_the_join() {
        let aggregator = RateAggregator::new(Arc::new(PanickingProvider));

        let report = aggregator
            .aggregate_from(ymd(2026, 10, 16), DayCount::clamped(2, 10))
            .await;

        assert!(report.table().is_empty());
        assert_eq!(report.missing(), ["16.10.2026", "15.10.2026"]);
    }

    /// Holds every fetch until `n` of them are in flight at once.
    struct BarrierProvider {
        barrier: Barrier,
    }

    #[async_trait]
    impl RateProvider for BarrierProvider {
        async fn fetch_day(&self, date: NaiveDate) -> Option<DayRates> {
            self.barrier.wait().await;
            Some(DayRates {
                date: date.format(DATE_FORMAT).to_string(),
                snapshot: RateSnapshot::default(),
            })
        }
    }

    #[tokio::test]
    async fn fetches_run_concurrently_and_join_together() {
        let aggregator = RateAggregator::new(Arc::new(BarrierProvider {
            barrier: Barrier::new(4),
        }));

        let report = timeout(
            Duration::from_secs(2),
            aggregator.aggregate_from(ymd(2026, 10, 16), DayCount::clamped(4, 10)),
        )
        .await
        .expect("all four fetches must be in flight at the same time");

        assert!(report.is_complete());
        assert_eq!(report.table().len(), 4);
    }

    #[tokio::test]
    async fn failed_today_stays_first_in_sections() {
        let provider = Arc::new(RecordingProvider {
            failing: HashSet::from([ymd(2026, 10, 16)]),
            ..Default::default()
        });
        let report = RateAggregator::new(provider)
            .aggregate_from(ymd(2026, 10, 16), DayCount::clamped(3, 10))
            .await;

        let first = report.sections().next();
        assert_eq!(first, Some(Section::Missing("16.10.2026")));
    }
}
