//! EUR / BTC / sats conversions against the current price.
//!
//! Every function returns zero when the price is unset or the input amount is not a
//! positive finite number.

use crate::domain::model::Price;

pub const SATS_PER_BTC: u64 = 100_000_000;

fn positive(amount: f64) -> Option<f64> {
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

pub fn eur_to_btc(eur: f64, price: Option<Price>) -> f64 {
    match (positive(eur), price) {
        (Some(eur), Some(price)) => eur / price.eur_per_btc(),
        _ => 0.0,
    }
}

pub fn btc_to_eur(btc: f64, price: Option<Price>) -> f64 {
    match (positive(btc), price) {
        (Some(btc), Some(price)) => btc * price.eur_per_btc(),
        _ => 0.0,
    }
}

pub fn eur_to_sats(eur: f64, price: Option<Price>) -> u64 {
    btc_to_sats(eur_to_btc(eur, price))
}

pub fn sats_to_eur(sats: u64, price: Option<Price>) -> f64 {
    btc_to_eur(sats_to_btc(sats), price)
}

pub fn btc_to_sats(btc: f64) -> u64 {
    positive(btc)
        .map(|btc| (btc * SATS_PER_BTC as f64).round() as u64)
        .unwrap_or(0)
}

pub fn sats_to_btc(sats: u64) -> f64 {
    sats as f64 / SATS_PER_BTC as f64
}

/// `58123.4` -> `58.123,40 €`
pub fn format_eur(amount: f64) -> String {
    format!("{} €", format_decimal(amount, 2))
}

/// `0.00012345` -> `0,00012345 BTC`
pub fn format_btc(amount: f64) -> String {
    format!("{} BTC", format_decimal(amount, 8))
}

/// `12345` -> `12.345 sats`
pub fn format_sats(sats: u64) -> String {
    format!("{} sats", group_thousands(&sats.to_string()))
}

/// es-ES number format: `,` decimal separator, `.` groups from five integer digits up.
fn format_decimal(amount: f64, decimals: usize) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    if fraction.is_empty() {
        format!("{}{}", sign, group_thousands(integer))
    } else {
        format!("{}{},{}", sign, group_thousands(integer), fraction)
    }
}

fn group_thousands(digits: &str) -> String {
    // 四位數不分組 (1234)，跟瀏覽器 es-ES 的 Intl 格式一致
    if digits.len() < 5 {
        return digits.to_string();
    }

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}
