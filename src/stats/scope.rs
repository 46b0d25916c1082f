use serde::Deserialize;

use crate::model::{Feedback, Timestamp};

/// Optional narrowing of a company's feedback before it is aggregated: one QR code and/or a
/// `[from, to)` time range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Scope {
    pub qr_code_id: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl Scope {
    pub fn contains(&self, record: &Feedback) -> bool {
        let qr_code = self
            .qr_code_id
            .as_ref()
            .map_or(true, |id| &record.qr_code_id == id);
        let after = self.from.map_or(true, |from| record.created_at >= from);
        let before = self.to.map_or(true, |to| record.created_at < to);

        qr_code && after && before
    }

    pub fn apply(&self, mut records: Vec<Feedback>) -> Vec<Feedback> {
        records.retain(|record| self.contains(record));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::{at, feedback};

    fn ids(records: &[Feedback]) -> Vec<&str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    fn records() -> Vec<Feedback> {
        let mut other_code = feedback("other", 3, "2024-01-02T00:00:00Z");
        other_code.qr_code_id = "qr-2".to_string();

        vec![
            feedback("jan1", 8, "2024-01-01T00:00:00Z"),
            other_code,
            feedback("jan3", 6, "2024-01-03T00:00:00Z"),
        ]
    }

    #[test]
    fn default_scope_keeps_everything() {
        assert_eq!(ids(&Scope::default().apply(records())), vec!["jan1", "other", "jan3"]);
    }

    #[test]
    fn filters_by_qr_code() {
        let scope = Scope {
            qr_code_id: Some("qr-2".to_string()),
            ..Scope::default()
        };
        assert_eq!(ids(&scope.apply(records())), vec!["other"]);
    }

    #[test]
    fn range_is_half_open() {
        let scope = Scope {
            from: Some(at("2024-01-02T00:00:00Z")),
            to: Some(at("2024-01-03T00:00:00Z")),
            ..Scope::default()
        };
        assert_eq!(ids(&scope.apply(records())), vec!["other"]);
    }

    #[test]
    fn deserializes_from_a_query_string() {
        let scope: Scope = serde_json::from_value(serde_json::json!({
            "qr_code_id": "qr-1",
            "from": "2024-01-01T00:00:00Z",
        }))
        .unwrap();

        assert_eq!(scope.qr_code_id.as_deref(), Some("qr-1"));
        assert_eq!(scope.from, Some(at("2024-01-01T00:00:00Z")));
        assert_eq!(scope.to, None);
    }
}
