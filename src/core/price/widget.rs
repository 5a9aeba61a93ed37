use crate::core::price::convert::format_eur;
use crate::domain::model::{PriceSnapshot, PriceStatus};
use crate::domain::ports::PriceObserver;
use std::sync::{Mutex, PoisonError};

/// Text the price widget shows. Mirrors the page elements: price, status badge, last update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub price_text: String,
    pub status_text: String,
    pub status_class: &'static str,
    pub updated_text: String,
}

impl Default for WidgetView {
    fn default() -> Self {
        Self {
            price_text: "--".to_string(),
            status_text: PriceStatus::Idle.label(),
            status_class: "idle",
            updated_text: String::new(),
        }
    }
}

/// Observer that keeps a [`WidgetView`] in sync with the price store.
#[derive(Debug, Default)]
pub struct PriceWidget {
    view: Mutex<WidgetView>,
}

impl PriceWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> WidgetView {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PriceObserver for PriceWidget {
    fn on_price(&self, snapshot: &PriceSnapshot) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        view.price_text = format_eur(snapshot.price.eur_per_btc());
        view.updated_text = snapshot.fetched_at.format("%H:%M:%S UTC").to_string();
    }

    fn on_status(&self, status: &PriceStatus) {
        let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
        view.status_text = status.label();
        view.status_class = match status {
            PriceStatus::Idle => "idle",
            PriceStatus::Loading => "loading",
            PriceStatus::Live { .. } => "live",
            PriceStatus::Unavailable => "error",
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::store::PriceStore;
    use crate::domain::model::Price;
    use std::sync::Arc;

    #[test]
    fn test_widget_follows_store() {
        let store = PriceStore::new();
        let widget = Arc::new(PriceWidget::new());
        store.subscribe(widget.clone());
        assert_eq!(widget.view(), WidgetView::default());

        store.begin_fetch();
        assert_eq!(widget.view().status_class, "loading");

        store.set_current_and_notify(PriceSnapshot::new(Price::new(58_123.4).unwrap(), "kraken"));
        let view = widget.view();
        assert_eq!(view.price_text, "58.123,40 €");
        assert_eq!(view.status_class, "live");
        assert_eq!(view.status_text, "live price via kraken");
        assert!(view.updated_text.ends_with("UTC"));

        store.mark_unavailable();
        let view = widget.view();
        assert_eq!(view.status_class, "error");
        assert_eq!(view.price_text, "58.123,40 €");
    }
}
