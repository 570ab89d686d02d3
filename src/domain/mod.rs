pub mod event;
pub mod feed;
pub mod item;
pub mod options;

pub use event::CalendarEvent;
pub use feed::{Feed, FeedSource, OutputType};
pub use item::{FeedItem, FeedPayload, Media};
pub use options::{AdminFormField, ConfigOption, SecretField};
