//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Defines a non-empty, trimmed string identifier.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a user whose profile drives a decision.
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of a scanned product.
    ProductId,
    "product_id"
);

/// Stable graph key of an ingredient node.
///
/// Keys are namespaced by the strongest identifier available:
/// a bare lowercased InChIKey, `cas:<number>`, `dtxsid:<id>` or
/// `inci:<lowercased name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientKey(String);

impl IngredientKey {
    pub fn from_inchi_key(inchi_key: &str) -> Self {
        Self(inchi_key.trim().to_lowercase())
    }

    pub fn from_cas(cas: &str) -> Self {
        Self(format!("cas:{}", cas.trim()))
    }

    pub fn from_dtxsid(dtxsid: &str) -> Self {
        Self(format!("dtxsid:{}", dtxsid.trim()))
    }

    pub fn from_inci(inci_name: &str) -> Self {
        Self(format!("inci:{}", inci_name.trim().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IngredientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_trimmed() {
        assert_eq!(UserId::new("  user-123 ").unwrap().as_str(), "user-123");
    }

    #[test]
    fn blank_user_id_names_field() {
        match UserId::new("") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "user_id"),
            other => panic!("expected EmptyField, got {:?}", other),
        }
    }

    #[test]
    fn product_id_rejects_whitespace() {
        assert!(ProductId::new("   ").is_err());
    }

    #[test]
    fn ingredient_key_namespaces() {
        assert_eq!(
            IngredientKey::from_inchi_key("XLYOFNOQVPJJNP-UHFFFAOYSA-N").as_str(),
            "xlyofnoqvpjjnp-uhfffaoysa-n"
        );
        assert_eq!(IngredientKey::from_cas("7732-18-5").as_str(), "cas:7732-18-5");
        assert_eq!(IngredientKey::from_dtxsid("DTXSID6026296").as_str(), "dtxsid:DTXSID6026296");
        assert_eq!(IngredientKey::from_inci(" Aqua ").as_str(), "inci:aqua");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ProductId::new("prod-1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"prod-1\"");
    }
}
