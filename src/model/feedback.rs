use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{new_id, QrCode, Rating, Timestamp};

/// A single submission from the public form.
///
/// `rating` is kept as the raw stored integer; [Feedback::rating] yields `None` for rows that
/// somehow escaped validation so aggregations can skip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub qr_code_id: String,
    pub company_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub qr_label: Option<String>,
}

crate::define_relation! {
    Feedback > insert(id: &str, qr_code_id: &str, company_id: &str, rating: i64, comment: Option<&str>, ip_address: Option<&str>, created_at: &Timestamp)
        where "CREATE type::thing('feedbacks', $id) SET qr_code_id = $qr_code_id, company_id = $company_id, rating = $rating, comment = $comment, ip_address = $ip_address, created_at = $created_at RETURN NONE"
}

crate::define_relation! {
    Feedback > by_company(company_id: &str) > Vec<Feedback>
        where "SELECT meta::id(id) AS id, qr_code_id, company_id, rating, comment, ip_address, created_at FROM feedbacks WHERE company_id = $company_id ORDER BY created_at DESC"
}

crate::define_relation! {
    Feedback > page_by_company(company_id: &str, limit: u64, start: u64) > Vec<Feedback>
        where "SELECT meta::id(id) AS id, qr_code_id, company_id, rating, comment, ip_address, created_at FROM feedbacks WHERE company_id = $company_id ORDER BY created_at DESC LIMIT $limit START $start"
}

crate::define_relation! {
    Feedback > page(limit: u64, start: u64) > Vec<Feedback>
        where "SELECT meta::id(id) AS id, qr_code_id, company_id, rating, comment, ip_address, created_at FROM feedbacks ORDER BY created_at DESC LIMIT $limit START $start"
}

impl Feedback {
    /// A submission made through `qr_code`, stamped with the current time.
    pub fn new(
        qr_code: &QrCode, rating: Rating, comment: Option<String>, ip_address: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            qr_code_id: qr_code.id.clone(),
            company_id: qr_code.company_id.clone(),
            rating: rating.into(),
            comment,
            ip_address,
            created_at: Timestamp::now(),
            qr_label: Some(qr_code.label.clone()),
        }
    }

    pub async fn save(
        &self, db: &crate::database::Database,
    ) -> Result<(), crate::database::DatabaseQueryError> {
        Self::insert(
            &self.id,
            &self.qr_code_id,
            &self.company_id,
            self.rating,
            self.comment.as_deref(),
            self.ip_address.as_deref(),
            &self.created_at,
            db,
        )
        .await
    }

    pub fn rating(&self) -> Option<Rating> {
        Rating::new(self.rating).ok()
    }
}

/// Fills in `qr_label` from the codes the feedback was submitted through.
pub fn attach_labels(feedback: &mut [Feedback], qr_codes: &[QrCode]) {
    let labels: HashMap<&str, &str> = qr_codes
        .iter()
        .map(|code| (code.id.as_str(), code.label.as_str()))
        .collect();

    for entry in feedback {
        entry.qr_label = labels.get(entry.qr_code_id.as_str()).map(|label| label.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_feedback_inherits_the_code() {
        let code = QrCode::new("company".to_string(), "Bar".to_string());
        let feedback = Feedback::new(&code, Rating::new(4).unwrap(), Some("ok".to_string()), None);

        assert_eq!(feedback.qr_code_id, code.id);
        assert_eq!(feedback.company_id, "company");
        assert_eq!(feedback.qr_label.as_deref(), Some("Bar"));
    }

    #[test]
    fn out_of_range_rows_have_no_rating() {
        let code = QrCode::new("company".to_string(), "Bar".to_string());
        let mut feedback = Feedback::new(&code, Rating::new(4).unwrap(), None, None);
        assert_eq!(feedback.rating().map(Rating::get), Some(4));

        feedback.rating = 42;
        assert_eq!(feedback.rating(), None);
    }

    #[test]
    fn labels_come_from_the_matching_code() {
        let code = QrCode::new("company".to_string(), "Terrace".to_string());
        let rating = Rating::new(9).unwrap();
        let mut feedback = vec![
            Feedback::new(&code, rating, None, None),
            Feedback::new(&code, rating, None, None),
        ];
        feedback[1].qr_code_id = "deleted".to_string();

        attach_labels(&mut feedback, &[code]);

        assert_eq!(feedback[0].qr_label.as_deref(), Some("Terrace"));
        assert_eq!(feedback[1].qr_label, None);
    }
}
