use serde::Serialize;

use super::distribution;
use crate::model::{Company, Feedback, QrCode};

/// Headline numbers for one company, as shown on its dashboard and in the super-admin overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyStats {
    pub company: Company,
    pub total_feedback: u64,
    pub average_rating: Option<f64>,
    pub total_qr_codes: u64,
    pub active_qr_codes: u64,
}

pub fn company_stats(company: Company, feedback: &[Feedback], qr_codes: &[QrCode]) -> CompanyStats {
    let summary = distribution(feedback);

    CompanyStats {
        company,
        total_feedback: summary.total,
        average_rating: summary.average_rating.map(round_to_cents),
        total_qr_codes: qr_codes.len() as u64,
        active_qr_codes: qr_codes.iter().filter(|code| code.is_active).count() as u64,
    }
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
