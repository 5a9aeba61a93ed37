use crate::core::price::convert;
use crate::domain::model::{PriceSnapshot, PriceStatus};
use serde::Serialize;

/// Amounts the user asked to convert with `--eur` / `--sats`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuoteRequest {
    pub eur: Option<f64>,
    pub sats: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EurConversion {
    pub eur: f64,
    pub btc: f64,
    pub sats: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatsConversion {
    pub sats: u64,
    pub eur: f64,
}

/// One price plus the requested conversions, as printed by the `price` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub price_eur: f64,
    pub source: String,
    pub status: PriceStatus,
    pub fetched_at: String,
    pub eur: Option<EurConversion>,
    pub sats: Option<SatsConversion>,
}

impl PriceQuote {
    pub fn new(snapshot: &PriceSnapshot, request: QuoteRequest) -> Self {
        let price = Some(snapshot.price);

        Self {
            price_eur: snapshot.price.eur_per_btc(),
            source: snapshot.source.clone(),
            status: PriceStatus::Live {
                source: snapshot.source.clone(),
            },
            fetched_at: snapshot.fetched_at.to_rfc3339(),
            eur: request.eur.map(|amount| EurConversion {
                eur: amount,
                btc: convert::eur_to_btc(amount, price),
                sats: convert::eur_to_sats(amount, price),
            }),
            sats: request.sats.map(|amount| SatsConversion {
                sats: amount,
                eur: convert::sats_to_eur(amount, price),
            }),
        }
    }

    /// es-ES text, one line for the price and one per conversion.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "💶 1 BTC = {} ({})",
            convert::format_eur(self.price_eur),
            self.status.label()
        )];

        if let Some(conversion) = &self.eur {
            lines.push(format!(
                "   {} = {} = {}",
                convert::format_eur(conversion.eur),
                convert::format_btc(conversion.btc),
                convert::format_sats(conversion.sats)
            ));
        }
        if let Some(conversion) = &self.sats {
            lines.push(format!(
                "   {} = {}",
                convert::format_sats(conversion.sats),
                convert::format_eur(conversion.eur)
            ));
        }

        lines
    }
}
