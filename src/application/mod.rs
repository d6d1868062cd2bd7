pub mod dispatcher;
pub mod feed_state;
pub mod feed_watcher;
pub mod lifecycle;
pub mod pipeline;
pub mod pricing;
pub mod query;
pub mod ticker_scan;
pub mod timeout;
