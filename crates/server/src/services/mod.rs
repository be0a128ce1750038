//! Clients for external services.

pub mod identity;
pub mod payments;

pub use identity::{FirebaseVerifier, Identity, IdentityError, TokenVerifier};
pub use payments::{PaymentError, StripeClient};
