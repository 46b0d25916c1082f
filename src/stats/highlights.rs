use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{Feedback, Rating};

/// How many entries each highlight list holds at most.
pub const HIGHLIGHTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlights {
    pub top3: Vec<Feedback>,
    pub worst3: Vec<Feedback>,
}

/// Picks the best and worst rated feedback.
///
/// Within an equal rating the most recent entry wins in both lists. `top3` is filled first and
/// `worst3` never repeats one of its records, so with fewer than six records the worst list is
/// whatever is left over (a single record only ever shows up in `top3`).
pub fn highlights(records: &[Feedback]) -> Highlights {
    let mut rated: Vec<(Rating, &Feedback)> = records
        .iter()
        .filter_map(|record| record.rating().map(|rating| (rating, record)))
        .collect();

    rated.sort_by(|(a_rating, a), (b_rating, b)| b_rating.cmp(a_rating).then_with(|| newest_first(a, b)));
    let top3: Vec<Feedback> = rated
        .iter()
        .take(HIGHLIGHTS)
        .map(|(_, record)| (*record).clone())
        .collect();

    rated.sort_by(|(a_rating, a), (b_rating, b)| a_rating.cmp(b_rating).then_with(|| newest_first(a, b)));
    let worst3: Vec<Feedback> = rated
        .iter()
        .filter(|(_, record)| !top3.iter().any(|top| top.id == record.id))
        .take(HIGHLIGHTS)
        .map(|(_, record)| (*record).clone())
        .collect();

    Highlights { top3, worst3 }
}

fn newest_first(a: &Feedback, b: &Feedback) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}
