//! HTTP-specific constants.

pub use razorpay::webhook::SIGNATURE_HEADER;

/// Maximum number of redirects the default adapter follows.
pub const DEFAULT_REDIRECT_LIMIT: usize = 10;
