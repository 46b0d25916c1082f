use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{new_id, Company, Timestamp};

/// An account that can sign in to the dashboard. The password hash stays in the store and is
/// never loaded into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct User {
    #[new(value = "new_id()")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub is_super_admin: bool,
}

crate::define_relation! {
    User > insert(id: &str, email: &str, password: &str, company_id: Option<&str>, is_super_admin: bool)
        where "CREATE type::thing('users', $id) SET email = $email, password = crypto::argon2::generate($password), company_id = $company_id, is_super_admin = $is_super_admin RETURN NONE"
}

crate::define_relation! {
    User > get(id: &str) > Option<User>
        where "SELECT meta::id(id) AS id, email, company_id, is_super_admin FROM type::thing('users', $id)"
}

crate::define_relation! {
    User > by_email(email: &str) > Option<User>
        where "SELECT meta::id(id) AS id, email, company_id, is_super_admin FROM users WHERE email = $email LIMIT 1"
}

crate::define_relation! {
    User > verify(email: &str, password: &str) > Option<User>
        where "SELECT meta::id(id) AS id, email, company_id, is_super_admin FROM users WHERE email = $email AND crypto::argon2::compare(password, $password) LIMIT 1"
}

crate::define_relation! {
    User > insert_with_company(id: &str, email: &str, password: &str, company_id: &str, name: &str, slug: &str, created_at: &Timestamp)
        where "BEGIN TRANSACTION; \
               CREATE type::thing('companies', $company_id) SET name = $name, slug = $slug, created_at = $created_at RETURN NONE; \
               CREATE type::thing('users', $id) SET email = $email, password = crypto::argon2::generate($password), company_id = $company_id, is_super_admin = false RETURN NONE; \
               COMMIT TRANSACTION;"
}

impl User {
    /// Stores the user, hashing `password` with argon2 inside the database.
    pub async fn save(
        &self, password: &str, db: &crate::database::Database,
    ) -> Result<(), crate::database::DatabaseQueryError> {
        Self::insert(
            &self.id,
            &self.email,
            password,
            self.company_id.as_deref(),
            self.is_super_admin,
            db,
        )
        .await
    }

    /// Stores a company and its first user together, neither is kept if either insert fails.
    pub async fn save_with_company(
        &self, company: &Company, password: &str, db: &crate::database::Database,
    ) -> Result<(), crate::database::DatabaseQueryError> {
        Self::insert_with_company(
            &self.id,
            &self.email,
            password,
            &company.id,
            &company.name,
            &company.slug,
            &company.created_at,
            db,
        )
        .await
    }
}
