//! Composite identity keys used to correlate records across backends.

use std::fmt;

/// `(node, identifier, address)` tuple compared across record kinds.
///
/// Ordering is lexicographic over the three fields, which gives the
/// reconciler a stable row order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    node: String,
    identifier: String,
    address: String,
}

impl IdentityKey {
    pub fn new(
        node: impl Into<String>,
        identifier: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            node: node.into(),
            identifier: identifier.into(),
            address: address.into(),
        }
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.node, self.identifier, self.address)
    }
}
