pub mod http;

pub use http::{parse_feed, HttpFeedSource};
