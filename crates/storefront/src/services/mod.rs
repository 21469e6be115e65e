//! Business services for storefront.

pub mod checkout;
pub mod orders;
