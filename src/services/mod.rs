pub mod feed_service;

pub use feed_service::{config_endpoint_url, FeedService};
