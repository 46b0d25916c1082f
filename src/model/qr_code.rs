use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{new_id, Timestamp};

/// A company-owned entry point to the public feedback form. `uuid` is the public identifier that
/// ends up in the printed link, `id` stays internal to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct QrCode {
    #[new(value = "new_id()")]
    pub id: String,
    pub company_id: String,
    #[new(value = "new_id()")]
    pub uuid: String,
    pub label: String,
    #[new(value = "true")]
    pub is_active: bool,
    #[new(value = "Timestamp::now()")]
    pub created_at: Timestamp,
}

crate::define_relation! {
    QrCode > insert(id: &str, company_id: &str, uuid: &str, label: &str, is_active: bool, created_at: &Timestamp)
        where "CREATE type::thing('qr_codes', $id) SET company_id = $company_id, uuid = $uuid, label = $label, is_active = $is_active, created_at = $created_at RETURN NONE"
}

crate::define_relation! {
    QrCode > by_company(company_id: &str) > Vec<QrCode>
        where "SELECT meta::id(id) AS id, company_id, uuid, label, is_active, created_at FROM qr_codes WHERE company_id = $company_id ORDER BY created_at ASC"
}

crate::define_relation! {
    QrCode > all() > Vec<QrCode>
        where "SELECT meta::id(id) AS id, company_id, uuid, label, is_active, created_at FROM qr_codes"
}

crate::define_relation! {
    QrCode > by_uuid(uuid: &str) > Option<QrCode>
        where "SELECT meta::id(id) AS id, company_id, uuid, label, is_active, created_at FROM qr_codes WHERE uuid = $uuid LIMIT 1"
}

crate::define_relation! {
    QrCode > owned(id: &str, company_id: &str) > Option<QrCode>
        where "SELECT meta::id(id) AS id, company_id, uuid, label, is_active, created_at FROM type::thing('qr_codes', $id) WHERE company_id = $company_id"
}

crate::define_relation! {
    QrCode > set_active(id: &str, is_active: bool)
        where "UPDATE type::thing('qr_codes', $id) SET is_active = $is_active RETURN NONE"
}

crate::define_relation! {
    QrCode > remove(id: &str)
        where "DELETE type::thing('qr_codes', $id) RETURN NONE"
}

impl QrCode {
    pub async fn save(
        &self, db: &crate::database::Database,
    ) -> Result<(), crate::database::DatabaseQueryError> {
        Self::insert(
            &self.id,
            &self.company_id,
            &self.uuid,
            &self.label,
            self.is_active,
            &self.created_at,
            db,
        )
        .await
    }

    /// The public feedback form this code points to.
    pub fn link(&self, frontend_url: &url::Url) -> String {
        let base = frontend_url.as_str().trim_end_matches('/');
        format!("{base}/feedback/{}", self.uuid)
    }
}
