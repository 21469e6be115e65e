//! Opaque order reference type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An opaque order reference returned by the orders API on successful
/// submission (e.g., `ord_123`).
///
/// The storefront never parses or interprets the reference; it is only
/// displayed to the customer and passed back to the orders API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRef(String);

impl OrderRef {
    /// Create an order reference from the value returned by the orders API.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderRef` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn displays_raw_reference() {
        let order = OrderRef::new("ord_123");
        assert_eq!(order.to_string(), "ord_123");
        assert_eq!(order.as_str(), "ord_123");
    }

    #[test]
    fn deserializes_from_bare_string() {
        let order: OrderRef = serde_json::from_str("\"ord_123\"").unwrap();
        assert_eq!(order, OrderRef::new("ord_123"));
    }
}
