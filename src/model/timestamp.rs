use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A UTC instant.
///
/// Serialized as RFC 3339 with a fixed microsecond precision so that the textual form sorts in
/// chronological order, which the store relies on for `ORDER BY created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(6))
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl Deref for Timestamp {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::str::FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s).map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rfc3339().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_fixed_precision() {
        let timestamp: Timestamp = "2024-01-02T03:04:05Z".parse().unwrap();
        assert_eq!(timestamp.to_rfc3339(), "2024-01-02T03:04:05.000000Z");
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let timestamp: Timestamp = "2024-01-02T01:00:00+02:00".parse().unwrap();
        assert_eq!(timestamp.to_rfc3339(), "2024-01-01T23:00:00.000000Z");
    }

    #[test]
    fn textual_order_matches_chronological_order() {
        let earlier: Timestamp = "2024-01-02T03:04:05Z".parse().unwrap();
        let later: Timestamp = "2024-01-02T03:04:05.5Z".parse().unwrap();

        assert!(earlier < later);
        assert!(earlier.to_rfc3339() < later.to_rfc3339());
    }
}
