use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// A customer rating between [Rating::MIN] and [Rating::MAX], inclusive.
///
/// Deserializing rejects anything outside that range, so request bodies carrying a `Rating`
/// are validated before they reach a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, InvalidRating> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidRating { value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every valid rating, lowest first.
    pub fn all() -> impl Iterator<Item = Rating> {
        (Self::MIN..=Self::MAX).map(Rating)
    }

    /// Zero-based position of the rating among [Rating::all].
    pub fn index(self) -> usize {
        usize::from(self.0 - Self::MIN)
    }
}

impl TryFrom<i64> for Rating {
    type Error = InvalidRating;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(display("rating must be between 1 and 10, got {value}"))]
pub struct InvalidRating {
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_full_range() {
        let ratings: Vec<u8> = Rating::all().map(Rating::get).collect();
        assert_eq!(ratings, (1..=10).collect::<Vec<_>>());
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(10).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Rating::new(0), Err(InvalidRating { value: 0 }));
        assert_eq!(Rating::new(11), Err(InvalidRating { value: 11 }));
        assert_eq!(Rating::new(-3), Err(InvalidRating { value: -3 }));
    }

    #[test]
    fn deserialization_validates() {
        let rating: Rating = serde_json::from_str("7").unwrap();
        assert_eq!(rating.get(), 7);
        assert_eq!(rating.index(), 6);

        let error = serde_json::from_str::<Rating>("11").unwrap_err();
        assert!(error.to_string().contains("between 1 and 10"));
    }
}
