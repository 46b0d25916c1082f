//! Aggregations behind the dashboard: rating distribution, best/worst highlights, daily and
//! weekly timelines and per-company counters.
//!
//! Everything here is a pure function over a slice of [Feedback](crate::model::Feedback) that the
//! caller already scoped to one company (see [Scope]). Rows whose rating falls outside 1..=10 are
//! skipped rather than failing the whole computation.

use serde::ser::SerializeMap;
use serde::Serialize;

use crate::model::Rating;

pub use distribution::*;
pub use highlights::*;
pub use scope::*;
pub use summary::*;
pub use timeline::*;

mod distribution;
mod highlights;
mod scope;
mod summary;
mod timeline;

/// Number of occurrences of each rating value.
///
/// Serializes as an object with all ten keys `"1"` to `"10"`, zero counts included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingCounts([u64; Rating::MAX as usize]);

impl RatingCounts {
    pub fn add(&mut self, rating: Rating) {
        self.0[rating.index()] += 1;
    }

    pub fn get(&self, rating: Rating) -> u64 {
        self.0[rating.index()]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rating, u64)> + '_ {
        Rating::all().map(|rating| (rating, self.get(rating)))
    }

    fn serialize_entries<M: SerializeMap>(&self, map: &mut M, prefix: &str) -> Result<(), M::Error> {
        for (rating, count) in self.iter() {
            map.serialize_entry(&format!("{prefix}{rating}"), &count)?;
        }
        Ok(())
    }
}

impl FromIterator<Rating> for RatingCounts {
    fn from_iter<I: IntoIterator<Item = Rating>>(iter: I) -> Self {
        let mut counts = Self::default();
        for rating in iter {
            counts.add(rating);
        }
        counts
    }
}

impl Serialize for RatingCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Rating::MAX as usize))?;
        self.serialize_entries(&mut map, "")?;
        map.end()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{Feedback, Timestamp};

    pub fn at(timestamp: &str) -> Timestamp {
        timestamp.parse().expect("valid rfc3339 timestamp")
    }

    pub fn feedback(id: &str, rating: i64, created_at: &str) -> Feedback {
        Feedback {
            id: id.to_string(),
            qr_code_id: "qr-1".to_string(),
            company_id: "company-1".to_string(),
            rating,
            comment: None,
            ip_address: None,
            created_at: at(created_at),
            qr_label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_serialize_every_key() {
        let counts: RatingCounts = [3, 3, 10].into_iter().map(|r| Rating::new(r).unwrap()).collect();
        let json = serde_json::to_value(counts).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 10);
        assert_eq!(json["3"], 2);
        assert_eq!(json["10"], 1);
        assert_eq!(json["7"], 0);
        assert_eq!(counts.total(), 3);
    }
}
