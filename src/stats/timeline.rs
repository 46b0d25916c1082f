use chrono::{Datelike, Duration, NaiveDate};
use serde::ser::SerializeMap;
use serde::Serialize;

use super::RatingCounts;
use crate::model::{Feedback, Timestamp};

pub const DAILY_BUCKETS: usize = 30;
pub const WEEKLY_BUCKETS: usize = 4;

const LABEL_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub daily: Vec<TimelineEntry>,
    pub weekly: Vec<TimelineEntry>,
}

/// One bucket of a timeline. Serializes flat as `{ "label": .., "r1": .., .., "r10": .. }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub label: String,
    pub counts: RatingCounts,
}

impl TimelineEntry {
    fn starting(date: NaiveDate) -> Self {
        Self {
            label: date.format(LABEL_FORMAT).to_string(),
            counts: RatingCounts::default(),
        }
    }
}

impl Serialize for TimelineEntry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.counts.0.len()))?;
        map.serialize_entry("label", &self.label)?;
        self.counts.serialize_entries(&mut map, "r")?;
        map.end()
    }
}

/// Buckets ratings into the last 30 UTC days and the last 4 ISO weeks, both ending at `now`.
///
/// The series are fixed length and gap free, oldest bucket first. Daily labels are the day,
/// weekly labels the Monday the week starts on, both as `YYYY-MM-DD`. Records outside a window
/// (older, or later than the current day/week) don't show up in that series.
pub fn timeline(records: &[Feedback], now: Timestamp) -> Timeline {
    let today = now.date_naive();
    let first_day = today - Duration::days(DAILY_BUCKETS as i64 - 1);

    let this_week = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let first_week = this_week - Duration::weeks(WEEKLY_BUCKETS as i64 - 1);

    let mut daily: Vec<TimelineEntry> = (0..DAILY_BUCKETS as i64)
        .map(|offset| TimelineEntry::starting(first_day + Duration::days(offset)))
        .collect();

    let mut weekly: Vec<TimelineEntry> = (0..WEEKLY_BUCKETS as i64)
        .map(|offset| TimelineEntry::starting(first_week + Duration::weeks(offset)))
        .collect();

    for record in records {
        let Some(rating) = record.rating() else {
            continue;
        };
        let day = record.created_at.date_naive();

        if let Some(entry) = bucket(first_day, day, 1).and_then(|i| daily.get_mut(i)) {
            entry.counts.add(rating);
        }

        if let Some(entry) = bucket(first_week, day, 7).and_then(|i| weekly.get_mut(i)) {
            entry.counts.add(rating);
        }
    }

    Timeline { daily, weekly }
}

/// Index of the bucket `day` falls in, counting `width` days per bucket from `start`.
fn bucket(start: NaiveDate, day: NaiveDate, width: i64) -> Option<usize> {
    let offset = (day - start).num_days();
    if offset < 0 {
        return None;
    }

    usize::try_from(offset / width).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rating;
    use crate::stats::fixtures::{at, feedback};

    fn sum(entries: &[TimelineEntry]) -> u64 {
        entries.iter().map(|entry| entry.counts.total()).sum()
    }

    #[test]
    fn empty_input_still_has_every_bucket() {
        let result = timeline(&[], at("2024-05-15T09:30:00Z"));

        assert_eq!(result.daily.len(), DAILY_BUCKETS);
        assert_eq!(result.weekly.len(), WEEKLY_BUCKETS);
        assert_eq!(sum(&result.daily), 0);
        assert_eq!(sum(&result.weekly), 0);
    }

    #[test]
    fn labels_cover_the_window_in_order() {
        // 2024-05-15 is a Wednesday
        let result = timeline(&[], at("2024-05-15T09:30:00Z"));

        assert_eq!(result.daily.first().unwrap().label, "2024-04-16");
        assert_eq!(result.daily.last().unwrap().label, "2024-05-15");

        let weeks: Vec<&str> = result.weekly.iter().map(|entry| entry.label.as_str()).collect();
        assert_eq!(weeks, vec!["2024-04-22", "2024-04-29", "2024-05-06", "2024-05-13"]);

        let mut sorted = result.daily.clone();
        sorted.sort_by(|a, b| a.label.cmp(&b.label));
        assert_eq!(sorted, result.daily);
    }

    #[test]
    fn records_land_in_their_day_and_week() {
        let now = at("2024-05-15T09:30:00Z");
        let records = vec![
            feedback("today", 9, "2024-05-15T00:00:01Z"),
            feedback("later-today", 9, "2024-05-15T23:59:59Z"),
            feedback("monday", 2, "2024-05-13T12:00:00Z"),
            feedback("sunday", 7, "2024-05-12T23:59:59Z"),
            feedback("first-day", 4, "2024-04-16T00:00:00Z"),
        ];

        let result = timeline(&records, now);
        let nine = Rating::new(9).unwrap();

        assert_eq!(result.daily[29].counts.get(nine), 2);
        assert_eq!(result.daily[27].counts.get(Rating::new(2).unwrap()), 1);
        assert_eq!(result.daily[26].counts.get(Rating::new(7).unwrap()), 1);
        assert_eq!(result.daily[0].counts.get(Rating::new(4).unwrap()), 1);

        assert_eq!(result.weekly[3].counts.total(), 3);
        assert_eq!(result.weekly[2].counts.get(Rating::new(7).unwrap()), 1);
        // 2024-04-16 is a Tuesday, one week before the weekly window starts
        assert_eq!(sum(&result.weekly), 4);
    }

    #[test]
    fn records_outside_the_window_are_ignored() {
        let now = at("2024-05-15T09:30:00Z");
        let records = vec![
            feedback("inside", 5, "2024-05-01T10:00:00Z"),
            feedback("thirty-one-days", 5, "2024-04-14T09:30:00Z"),
            feedback("future", 5, "2024-05-20T10:00:00Z"),
        ];

        let result = timeline(&records, now);

        assert_eq!(sum(&result.daily), 1);
        assert_eq!(sum(&result.weekly), 1);
        assert_eq!(crate::stats::distribution(&records).total, 3);
    }

    #[test]
    fn daily_sum_matches_records_in_window() {
        let now = at("2024-03-01T18:00:00Z");
        let records: Vec<Feedback> = (0..60)
            .map(|i| {
                let created = *now - Duration::hours(i * 17);
                feedback(&i.to_string(), i % 10 + 1, &Timestamp::from(created).to_rfc3339())
            })
            .collect();

        let first_day = now.date_naive() - Duration::days(29);
        let expected = records
            .iter()
            .filter(|record| record.created_at.date_naive() >= first_day)
            .count() as u64;

        let result = timeline(&records, now);
        assert_eq!(sum(&result.daily), expected);
    }

    #[test]
    fn entries_serialize_flat() {
        let records = vec![feedback("a", 10, "2024-05-15T08:00:00Z")];
        let result = timeline(&records, at("2024-05-15T09:30:00Z"));

        let json = serde_json::to_value(&result).unwrap();
        let last = &json["daily"][29];

        assert_eq!(last["label"], "2024-05-15");
        assert_eq!(last["r10"], 1);
        assert_eq!(last["r1"], 0);
        assert_eq!(last.as_object().unwrap().len(), 11);
        assert_eq!(json["weekly"].as_array().unwrap().len(), 4);
    }
}
