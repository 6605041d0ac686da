use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque string identifiers. Fresh ids are UUIDv7 strings, but any string
/// read back from storage or an imported file is accepted as-is.
macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let short: String = self.0.chars().take(8).collect();
                write!(f, "{}({})", stringify!($name), short)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(ProjectId);
string_id!(BoxId);
string_id!(ToastId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        let a = BoxId::new();
        let b = BoxId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ProjectId::from("p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
        let back: ProjectId = serde_json::from_str("\"p1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn debug_truncates_without_panicking_on_short_ids() {
        assert_eq!(format!("{:?}", BoxId::from("b1")), "BoxId(b1)");
        let long = BoxId::from("0123456789abcdef");
        assert_eq!(format!("{long:?}"), "BoxId(01234567)");
    }
}
