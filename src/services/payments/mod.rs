//! 결제사 연동 (체크아웃 세션)

pub mod stripe_gateway;

pub use stripe_gateway::{CheckoutRequest, PaymentGateway, StripeGateway};
