use serde::Serialize;

use super::RatingCounts;
use crate::model::Feedback;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub total: u64,
    pub average_rating: Option<f64>,
    pub distribution: RatingCounts,
}

/// Histogram of ratings plus their mean. The mean is left unrounded and is `None` exactly when
/// there is nothing to count.
pub fn distribution(records: &[Feedback]) -> Distribution {
    let counts: RatingCounts = records.iter().filter_map(Feedback::rating).collect();
    let total = counts.total();

    let average_rating = (total > 0).then(|| {
        let sum: u64 = counts.iter().map(|(rating, count)| u64::from(rating.get()) * count).sum();
        sum as f64 / total as f64
    });

    Distribution {
        total,
        average_rating,
        distribution: counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rating;
    use crate::stats::fixtures::feedback;

    fn rating(value: i64) -> Rating {
        Rating::new(value).unwrap()
    }

    #[test]
    fn two_records() {
        let records = vec![
            feedback("a", 10, "2024-01-01T12:00:00Z"),
            feedback("b", 1, "2024-01-02T12:00:00Z"),
        ];

        let result = distribution(&records);

        assert_eq!(result.total, 2);
        assert_eq!(result.distribution.get(rating(10)), 1);
        assert_eq!(result.distribution.get(rating(1)), 1);
        assert_eq!(result.average_rating, Some(5.5));
    }

    #[test]
    fn empty_input() {
        let result = distribution(&[]);

        assert_eq!(result.total, 0);
        assert_eq!(result.average_rating, None);
        assert!(result.distribution.iter().all(|(_, count)| count == 0));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_rating"], serde_json::Value::Null);
        assert_eq!(json["distribution"].as_object().unwrap().len(), 10);
    }

    #[test]
    fn buckets_sum_to_total_and_mean_is_exact() {
        let records: Vec<Feedback> = [7, 7, 8, 2, 9, 10, 3, 3, 3, 6, 1]
            .into_iter()
            .enumerate()
            .map(|(i, value)| feedback(&i.to_string(), value, "2024-03-01T08:00:00Z"))
            .collect();

        let result = distribution(&records);
        let expected = [7, 7, 8, 2, 9, 10, 3, 3, 3, 6, 1].iter().sum::<i64>() as f64 / 11.0;

        assert_eq!(result.distribution.total(), result.total);
        assert_eq!(result.total, 11);
        assert!((result.average_rating.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn malformed_ratings_are_skipped() {
        let records = vec![
            feedback("a", 0, "2024-01-01T12:00:00Z"),
            feedback("b", 11, "2024-01-01T12:00:00Z"),
            feedback("c", 4, "2024-01-01T12:00:00Z"),
        ];

        let result = distribution(&records);

        assert_eq!(result.total, 1);
        assert_eq!(result.average_rating, Some(4.0));
        assert_eq!(result.distribution.total(), 1);
    }
}
