//! Identifier tokens (`PolicyId`, `GroupId`, `ArchetypeId`) with a strict charset.
//!
//! Token shape: `^[A-Za-z0-9_.:-]{1,64}$` (ASCII only).

use core::fmt;
use core::str::FromStr;

use crate::errors::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const TOKEN_MAX_LEN: usize = 64;

/// True if `s` is a valid token.
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    let len = s.len();
    if len == 0 || len > TOKEN_MAX_LEN {
        return false;
    }
    s.bytes().all(|b| {
        matches!(b,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
            b'_' | b'-' | b':' | b'.'
        )
    })
}

macro_rules! def_token {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_valid_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken(s.to_string())) }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                if is_valid_token(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken(s)) }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = CoreError;
            #[inline]
            fn try_from(s: &str) -> Result<Self, Self::Error> { s.parse() }
        }

        impl From<$name> for String {
            #[inline]
            fn from(v: $name) -> String { v.0 }
        }
    };
}

def_token!(
    /// Identifier of a policy approach in the catalog.
    PolicyId
);
def_token!(
    /// Sub-group label attached to population ratings (e.g. a region or cohort).
    GroupId
);
def_token!(
    /// Identifier of a named weight-profile archetype.
    ArchetypeId
);
