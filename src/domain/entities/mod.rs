pub mod analysis;
pub mod assignment;
pub mod decision;
pub mod news_event;
pub mod news_item;
pub mod position;
pub mod ticker_candidate;
