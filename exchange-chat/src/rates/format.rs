//! Rendering of rate reports into the chat message format.

use super::model::{CurrencyRate, NO_DATA, RateReport, Section};

pub const HEADER: &str = "Exchange rates:\n";

/// Renders one section per requested date, newest first, listing each
/// tracked currency in order. Currencies absent from a day render as
/// "No data", as do days whose fetch failed.
pub fn render_report(report: &RateReport, currencies: &[String]) -> String {
    let mut out = String::from(HEADER);

    for section in report.sections() {
        match section {
            Section::Rates(day) => {
                out.push_str(&day.date);
                out.push('\n');
                for currency in currencies {
                    let rate = day.snapshot.get(currency).unwrap_or(&CurrencyRate::NO_DATA);
                    out.push_str(&format!(
                        "    {currency}:\n        Sale: {}\n        Purchase: {}\n",
                        rate.sale, rate.purchase
                    ));
                }
            }
            Section::Missing(date) => out.push_str(&format!("{date}\n    {NO_DATA}\n")),
        }
    }

    out
}
