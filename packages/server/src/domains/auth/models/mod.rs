mod account;

pub use account::{hash_phone_number, Account};
