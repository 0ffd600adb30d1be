pub mod race;
pub mod sanitize;
pub mod selection;

pub use race::{Raced, race_deadline};
pub use sanitize::{Sanitizer, clean};
pub use selection::capture_text;
