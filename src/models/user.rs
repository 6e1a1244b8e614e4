use chrono::{DateTime, Utc};
use rideshare_orm::{EntitySchema, FieldDef, Model};
use serde::{Deserialize, Serialize};

use super::media::MediaRef;

pub const USER_STATUSES: &[&str] = &["active", "disabled"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Disabled,
}

pub static USERS: EntitySchema = EntitySchema {
    table: "users",
    primary_key: "id",
    fields: &[
        FieldDef::integer("id").read_only(),
        FieldDef::text("email"),
        FieldDef::boolean("email_verified").read_only(),
        FieldDef::text("full_name"),
        FieldDef::text("cnic").nullable(),
        FieldDef::text("address").nullable(),
        FieldDef::json("image").nullable(),
        FieldDef::choice("status", USER_STATUSES).read_only(),
        FieldDef::boolean("is_root").read_only(),
        FieldDef::boolean("is_active").read_only(),
        FieldDef::integer("role_id").nullable().read_only(),
        FieldDef::text("password").read_only(),
        FieldDef::text("country"),
        FieldDef::text("country_code"),
        FieldDef::text("currency_code"),
        FieldDef::text("currency_symbol"),
        FieldDef::text("phone").nullable().read_only(),
        FieldDef::text("unverified_phone").nullable(),
        FieldDef::boolean("verified").read_only(),
        FieldDef::datetime("created_at").nullable().read_only(),
        FieldDef::datetime("updated_at").nullable().read_only(),
    ],
    relations: &[],
    search_fields: &["full_name", "email", "phone"],
    default_order: &[],
};

/// An account
///
/// `phone` only ever holds a verified number; a newly entered number waits
/// in `unverified_phone` until verification promotes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub email: String,
    pub email_verified: bool,
    pub full_name: String,
    pub cnic: Option<String>,
    pub address: Option<String>,
    pub image: Option<MediaRef>,
    pub status: UserStatus,
    pub is_root: bool,
    pub is_active: bool,
    pub role_id: Option<i64>,
    /// Password hash
    pub password: String,
    pub country: String,
    pub country_code: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub phone: Option<String>,
    pub unverified_phone: Option<String>,
    pub verified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for User {
    fn schema() -> &'static EntitySchema {
        &USERS
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRead {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub email_verified: bool,
    pub phone: Option<String>,
    pub unverified_phone: Option<String>,
    pub cnic: Option<String>,
    pub address: Option<String>,
    pub image: Option<MediaRef>,
    pub status: UserStatus,
    pub verified: bool,
    pub country: String,
    pub country_code: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            full_name: user.full_name,
            email: user.email,
            email_verified: user.email_verified,
            phone: user.phone,
            unverified_phone: user.unverified_phone,
            cnic: user.cnic,
            address: user.address,
            image: user.image,
            status: user.status,
            verified: user.verified,
            country: user.country,
            country_code: user.country_code,
            currency_code: user.currency_code,
            currency_symbol: user.currency_symbol,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_values_match_enum() {
        for name in USER_STATUSES {
            let parsed: UserStatus = serde_json::from_value(serde_json::json!(name)).unwrap();
            assert_eq!(serde_json::to_value(parsed).unwrap(), serde_json::json!(name));
        }
    }

    #[test]
    fn test_credentials_are_not_writable() {
        for field in ["password", "verified", "email_verified", "phone", "is_root"] {
            assert!(!USERS.field(field).unwrap().writable, "{field}");
        }
        assert!(USERS.field("unverified_phone").unwrap().writable);
    }
}
