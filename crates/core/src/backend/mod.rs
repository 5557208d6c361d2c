pub mod channel;
pub mod http;
pub mod traits;
