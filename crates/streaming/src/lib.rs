pub mod fetch;
pub mod protocol;
pub mod request;

pub use fetch::*;
pub use protocol::*;
pub use request::*;
