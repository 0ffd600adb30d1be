pub mod message;
pub mod types;

pub use message::{MessageResponse, PageMessage};
pub use types::*;
