//! Auth domain - phone accounts and sessions
//!
//! Responsibilities:
//! - Accounts keyed by hashed phone number (Postgres or in-memory)
//! - Password hashing
//! - Short-lived record of phones that passed OTP verification
//! - Session/JWT token management

pub mod jwt;
pub mod models;
pub mod password;
pub mod registration;
pub mod verified;

pub use jwt::{Claims, JwtService};
pub use models::{hash_phone_number, Account};
pub use registration::{InMemoryRegistrationService, PostgresRegistrationService};
pub use verified::VerifiedPhoneStore;
