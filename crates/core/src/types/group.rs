//! Visibility groups: named field subsets allowed in a response.

use core::fmt;

/// A named subset of a record's fields permitted in a given response.
///
/// Passing no group to the serializer means every field is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityGroup {
    /// Fields shown when listing a customer's users.
    ListUsers,
    /// Fields shown when listing customers.
    ListCustomers,
}

impl VisibilityGroup {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListUsers => "list_users",
            Self::ListCustomers => "list_customers",
        }
    }
}

impl fmt::Display for VisibilityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
