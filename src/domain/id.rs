//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from a string.")]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[doc = concat!("Get the `", stringify!($name), "` as a string slice.")]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Market contract identifier as issued by the upstream venue.
    ContractId
);

string_id!(
    /// Tenant that owns detector output. Single-tenant deployments use `default`.
    TenantId
);

string_id!(
    /// Subscriber identifier.
    UserId
);

string_id!(
    /// Alert identifier, assigned when the detector emits the alert.
    AlertId
);

string_id!(
    /// Copilot recommendation identifier.
    RecommendationId
);

impl AlertId {
    /// Generate a fresh random alert id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl RecommendationId {
    /// Generate a fresh random recommendation id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_their_inner_value() {
        assert_eq!(ContractId::new("0xabc").to_string(), "0xabc");
        assert_eq!(UserId::from("u1").as_str(), "u1");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(AlertId::generate(), AlertId::generate());
        assert_ne!(RecommendationId::generate(), RecommendationId::generate());
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&ContractId::new("c1")).unwrap();
        assert_eq!(json, "\"c1\"");
    }
}
