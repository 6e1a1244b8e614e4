use rideshare_orm::{ModelResult, UpdateField, UpdatePayload};
use serde::Deserialize;

use crate::models::MediaRef;

/// Profile update form for the signed-in user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cnic: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub currency_code: Option<String>,
    pub currency_symbol: Option<String>,
    #[serde(skip)]
    pub image: Option<MediaRef>,
}

impl ProfileForm {
    pub fn into_payload(self) -> ModelResult<UpdatePayload> {
        let mut payload = UpdatePayload::from_form([
            ("full_name", self.full_name),
            ("email", self.email),
            ("phone", self.phone),
            ("cnic", self.cnic),
            ("address", self.address),
            ("country", self.country),
            ("country_code", self.country_code),
            ("currency_code", self.currency_code),
            ("currency_symbol", self.currency_symbol),
        ]);
        if let Some(image) = self.image {
            payload.set("image", UpdateField::of(serde_json::to_value(image)?));
        }
        Ok(payload)
    }
}
