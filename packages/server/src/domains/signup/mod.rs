//! Signup domain - three-step phone signup wizard
//!
//! Flow: verify phone (send code, enter code, accept terms) → set password → success.
//!
//! Responsibilities:
//! - Field validation rules (phone, code, consent, password)
//! - Wizard state and the controller that moves it between steps
//! - Resend cooldown timer
//! - Step views for front ends

pub mod controller;
pub mod countdown;
pub mod errors;
pub mod messages;
pub mod state;
pub mod validation;
pub mod views;

pub use controller::WizardController;
pub use errors::SignupError;
pub use messages::Message;
pub use state::{PhoneIdentity, Step, WizardState};
pub use validation::{Field, PhonePolicy, RegionPolicies, ValidationResult};
pub use views::StepView;
