// HTTP routes
pub mod health;
pub mod phone_number;

pub use health::*;
pub use phone_number::*;
