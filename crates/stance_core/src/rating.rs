//! Discrete ratings on the 5-point stance scale and the rows that carry them.

use core::fmt;

use crate::errors::EngineError;
use crate::tokens::{GroupId, PolicyId};

#[cfg(feature = "serde")]
use serde::{de::Error as DeError, de::Unexpected, Deserialize, Deserializer, Serialize};

/// A rater's stance on one policy: -2 (strongly oppose) ..= 2 (strongly support).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Rating(i8);

impl Rating {
    pub const MIN: i8 = -2;
    pub const MAX: i8 = 2;

    pub const STRONGLY_OPPOSE: Rating = Rating(-2);
    pub const OPPOSE: Rating = Rating(-1);
    pub const NEUTRAL: Rating = Rating(0);
    pub const SUPPORT: Rating = Rating(1);
    pub const STRONGLY_SUPPORT: Rating = Rating(2);

    pub fn new(v: i8) -> Result<Self, EngineError> {
        if (Self::MIN..=Self::MAX).contains(&v) {
            Ok(Rating(v))
        } else {
            Err(EngineError::range("rating", v as f64, Self::MIN as f64, Self::MAX as f64))
        }
    }

    #[inline]
    pub fn value(self) -> i8 {
        self.0
    }

    /// Strength of opinion regardless of direction (0..=2).
    #[inline]
    pub fn magnitude(self) -> u8 {
        self.0.unsigned_abs()
    }

    pub fn stance(self) -> Stance {
        match self.0 {
            v if v > 0 => Stance::Support,
            v if v < 0 => Stance::Oppose,
            _ => Stance::Neutral,
        }
    }

    #[inline] pub fn is_support(self) -> bool { self.0 > 0 }
    #[inline] pub fn is_oppose(self) -> bool { self.0 < 0 }
    #[inline] pub fn is_neutral(self) -> bool { self.0 == 0 }
}

impl TryFrom<i8> for Rating {
    type Error = EngineError;
    fn try_from(v: i8) -> Result<Self, Self::Error> {
        Rating::new(v)
    }
}

impl TryFrom<i64> for Rating {
    type Error = EngineError;
    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match i8::try_from(v) {
            Ok(small) => Rating::new(small),
            Err(_) => Err(EngineError::range("rating", v as f64, Self::MIN as f64, Self::MAX as f64)),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("0")
        } else {
            write!(f, "{:+}", self.0)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = i64::deserialize(d)?;
        Rating::try_from(v).map_err(|_| D::Error::invalid_value(Unexpected::Signed(v), &"an integer in -2..=2"))
    }
}

/// Which side of the scale a rating falls on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stance {
    Support,
    Neutral,
    Oppose,
}

/// One row of a rater's rating sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RatingEntry {
    pub policy_id: PolicyId,
    pub rating: Rating,
}

impl RatingEntry {
    pub fn new(policy_id: PolicyId, rating: Rating) -> Self {
        RatingEntry { policy_id, rating }
    }
}

/// One population row for a single policy, optionally tagged with a sub-group.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopulationRating {
    pub rating: Rating,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub group: Option<GroupId>,
}

impl PopulationRating {
    pub fn new(rating: Rating) -> Self {
        PopulationRating { rating, group: None }
    }

    pub fn in_group(rating: Rating, group: GroupId) -> Self {
        PopulationRating { rating, group: Some(group) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_domain_is_closed() {
        for v in -2..=2i8 {
            assert_eq!(Rating::new(v).unwrap().value(), v);
        }
        assert!(matches!(Rating::new(3), Err(EngineError::Range { .. })));
        assert!(Rating::new(-3).is_err());
        assert!(Rating::try_from(300i64).is_err());
        assert_eq!(Rating::try_from(-1i64).unwrap(), Rating::OPPOSE);
    }

    #[test]
    fn stance_and_magnitude() {
        assert_eq!(Rating::STRONGLY_OPPOSE.magnitude(), 2);
        assert_eq!(Rating::STRONGLY_OPPOSE.stance(), Stance::Oppose);
        assert_eq!(Rating::NEUTRAL.stance(), Stance::Neutral);
        assert!(Rating::SUPPORT.is_support());
        assert_eq!(Rating::STRONGLY_SUPPORT.to_string(), "+2");
        assert_eq!(Rating::OPPOSE.to_string(), "-1");
        assert_eq!(Rating::NEUTRAL.to_string(), "0");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_out_of_scale_ratings() {
        let row: PopulationRating = serde_json::from_str(r#"{"rating":-2,"group":"rural"}"#).unwrap();
        assert_eq!(row.rating, Rating::STRONGLY_OPPOSE);
        assert_eq!(row.group.unwrap().as_str(), "rural");
        assert!(serde_json::from_str::<PopulationRating>(r#"{"rating":5}"#).is_err());
    }
}
