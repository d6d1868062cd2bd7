pub mod article;
pub mod feeds;
pub mod llm;
pub mod market_data;
pub mod notify;
pub mod sqlite;
