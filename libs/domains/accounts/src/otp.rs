//! One-time code verification for phone ownership.
//!
//! Only a fixed-code placeholder exists; no code is ever sent.

pub const DEFAULT_PLACEHOLDER_CODE: &str = "1234";

#[cfg_attr(test, mockall::automock)]
pub trait OtpVerifier: Send + Sync {
    fn verify(&self, phone_number: &str, code: &str) -> bool;
}

/// Accepts a single configured code for every phone number
#[derive(Debug, Clone)]
pub struct StaticOtpVerifier {
    code: String,
}

impl StaticOtpVerifier {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl Default for StaticOtpVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_CODE)
    }
}

impl OtpVerifier for StaticOtpVerifier {
    fn verify(&self, _phone_number: &str, code: &str) -> bool {
        code == self.code
    }
}
