use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound of a sequential user's completed counter.
pub const MAX_COMPLETED: u32 = 683;

/// Which table a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Sequential,
    Random,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Sequential => "sequential",
            UserType::Random => "random",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown usertype '{0}'")]
pub struct UnknownUserType(pub String);

impl FromStr for UserType {
    type Err = UnknownUserType;

    /// Matching is exact: `"Sequential"` is rejected just like `"admin"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(UserType::Sequential),
            "random" => Ok(UserType::Random),
            other => Err(UnknownUserType(other.to_string())),
        }
    }
}

/// Result of looking a username up across both tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKind {
    #[serde(rename = "sequential")]
    Sequential,
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "does not exist")]
    DoesNotExist,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_usertypes() {
        assert_eq!("sequential".parse::<UserType>(), Ok(UserType::Sequential));
        assert_eq!("random".parse::<UserType>(), Ok(UserType::Random));
    }

    #[test]
    fn rejects_unknown_or_miscased_usertypes() {
        assert_eq!(
            "Random".parse::<UserType>(),
            Err(UnknownUserType("Random".into()))
        );
        assert!("".parse::<UserType>().is_err());
        assert!("admin".parse::<UserType>().is_err());
    }

    #[test]
    fn user_kind_serializes_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&UserKind::DoesNotExist).unwrap(),
            "\"does not exist\""
        );
        assert_eq!(
            serde_json::to_string(&UserKind::Sequential).unwrap(),
            "\"sequential\""
        );
    }

    #[test]
    fn user_type_displays_as_parsed() {
        for raw in ["sequential", "random"] {
            assert_eq!(raw.parse::<UserType>().unwrap().to_string(), raw);
        }
    }
}
