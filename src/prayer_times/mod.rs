pub mod aladhan;
pub mod cache;
pub mod calendar;
pub mod offline;
pub mod provider;

pub use cache::{last_fetched, load_day, load_month, mark_fetched};
pub use provider::{from_config, FetchError, TimingsProvider};
