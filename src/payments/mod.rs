//! Payment provider integration: hosted checkout sessions and webhook
//! driven order fulfillment.

mod client;
pub use client::{CheckoutRequest, CheckoutSession, PaymentProvider, StripeClient};

mod error;
pub use error::{PaymentError, PaymentResult};

pub mod event;
pub use event::{PurchaseKind, WebhookEvent};

pub mod fulfillment;
pub use fulfillment::FulfillmentOutcome;

pub mod signature;
