pub mod chart;
pub mod config;
pub mod error;
pub mod market;
pub mod models;
pub mod news;
pub mod watchlist;

pub use chart::Viewport;
pub use config::Config;
pub use error::MarketError;
pub use market::MarketClient;
pub use models::*;
pub use watchlist::WatchlistStore;
