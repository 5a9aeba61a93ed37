pub mod convert;
pub mod fetcher;
pub mod quote;
pub mod refresh;
pub mod store;
pub mod widget;

pub use fetcher::PriceFetcher;
pub use quote::{PriceQuote, QuoteRequest};
pub use refresh::{PriceTicker, TickerHandle};
pub use store::{ObserverId, PriceStore};
pub use widget::{PriceWidget, WidgetView};
