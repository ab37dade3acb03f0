// Nextrip phone signup - core library
//
// Holds the signup wizard (domains/signup), account registration and
// sessions (domains/auth), UI preferences, and the HTTP API that fronts
// the OTP provider (server/).

pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
