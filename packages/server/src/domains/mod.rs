// Business domains
pub mod auth;
pub mod preferences;
pub mod signup;
