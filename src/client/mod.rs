pub mod pool;
pub mod secrets;
pub mod token;

pub use pool::{ApiClient, ClientPool};
pub use secrets::Secrets;
pub use token::{TokenCache, TOKEN_SAFETY_MARGIN};
