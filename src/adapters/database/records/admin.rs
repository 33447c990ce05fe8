use crate::domain::admin::AdminUser;

#[derive(Debug, sqlx::FromRow)]
pub struct AdminUserRecord {
    pub(crate) id: i64,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

impl From<AdminUserRecord> for AdminUser {
    fn from(record: AdminUserRecord) -> Self {
        Self { id: record.id, email: record.email, password_hash: record.password_hash }
    }
}
