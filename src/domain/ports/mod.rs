pub mod article_fetcher;
pub mod feed_source;
pub mod inference;
pub mod market_data;
pub mod news_event_repository;
pub mod news_repository;
pub mod notifier;
pub mod position_repository;
