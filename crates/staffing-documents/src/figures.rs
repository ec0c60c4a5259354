//! Contract financial figures
//!
//! `total_usd = total_hours * hourly_rate`, `total_khr = round(total_usd * exchange_rate)`.
//! A missing rate computes as zero but is presented as a blank figure.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractFigures {
    pub total_hours: i64,
    pub hourly_rate: Option<Decimal>,
    pub total_usd: Decimal,
    pub total_khr: Decimal,
    pub exchange_rate: Decimal,
}

impl ContractFigures {
    pub fn compute(total_hours: i64, hourly_rate: Option<Decimal>, exchange_rate: Decimal) -> Self {
        let rate = hourly_rate.unwrap_or(Decimal::ZERO);
        let total_usd = Decimal::from(total_hours) * rate;
        let total_khr = (total_usd * exchange_rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Self {
            total_hours,
            hourly_rate,
            total_usd,
            total_khr,
            exchange_rate,
        }
    }

    pub fn rate_known(&self) -> bool {
        self.hourly_rate.is_some()
    }

    /// USD total for display, `None` when the rate is unknown
    pub fn display_usd(&self) -> Option<Decimal> {
        self.hourly_rate.map(|_| self.total_usd)
    }

    /// KHR total for display, `None` when the rate is unknown
    pub fn display_khr(&self) -> Option<Decimal> {
        self.hourly_rate.map(|_| self.total_khr)
    }
}

/// Thousands-grouped decimal with trailing fractional zeros removed: `4,100,000`, `1,234.5`
pub fn group_thousands(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}
