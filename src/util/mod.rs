pub mod html;

pub use html::html_to_text;
