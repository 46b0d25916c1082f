use serde::{Deserialize, Serialize};

use uuid::Uuid;

use super::{new_id, Timestamp};

const SLUG_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SLUG_SUFFIX_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
}

crate::define_relation! {
    Company > get(id: &str) > Option<Company>
        where "SELECT meta::id(id) AS id, name, slug, created_at FROM type::thing('companies', $id)"
}

crate::define_relation! {
    Company > all() > Vec<Company>
        where "SELECT meta::id(id) AS id, name, slug, created_at FROM companies ORDER BY created_at ASC"
}

impl Company {
    pub fn new(name: String) -> Self {
        Self {
            id: new_id(),
            slug: slugify(&name),
            name,
            created_at: Timestamp::now(),
        }
    }
}

/// Lower-cases the name, turns spaces into dashes and appends a short random suffix so that
/// two companies with the same name still get distinct slugs.
pub fn slugify(name: &str) -> String {
    let base = name.trim().to_lowercase().replace(' ', "-");
    format!("{base}-{}", slug_suffix(Uuid::new_v4().as_bytes()))
}

fn slug_suffix(random: &[u8]) -> String {
    random
        .iter()
        .take(SLUG_SUFFIX_LEN)
        .map(|byte| char::from(SLUG_ALPHABET[usize::from(*byte) % SLUG_ALPHABET.len()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_keeps_the_name_readable() {
        let slug = slugify("Cafe Aurora");
        let (base, suffix) = slug.rsplit_once('-').unwrap();

        assert_eq!(base, "cafe-aurora");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn suffix_uses_letters_beyond_hex() {
        assert_eq!(slug_suffix(&[0, 25, 26, 35]), "az09");
        assert_eq!(slug_suffix(&[36, 103, 255, 7, 9]), "a5dh");
    }

    #[test]
    fn new_company_gets_an_id_and_slug() {
        let company = Company::new("Harbor Grill".to_string());
        assert!(!company.id.is_empty());
        assert!(company.slug.starts_with("harbor-grill-"));
    }
}
