use rideshare_orm::{ModelResult, UpdateField, UpdatePayload};
use rideshare_validation::coerce;
use serde::Deserialize;
use serde_json::Value;

use crate::models::MediaRef;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DefaultRideSettingForm {
    pub car_number: Option<String>,
    pub car_type: Option<String>,
    pub car_name: Option<String>,
    pub car_model: Option<String>,
    pub notes: Option<String>,
    pub seats_available: Option<String>,
    pub price_per_seat: Option<String>,
    pub total_price: Option<String>,
    pub negotiable: Option<String>,
    pub active: Option<String>,
    #[serde(skip)]
    pub car_pic: Option<MediaRef>,
    pub delete_images: Option<Value>,
}

impl DefaultRideSettingForm {
    pub fn delete_list(&self) -> Vec<String> {
        self.delete_images.as_ref().map(coerce::parse_list).unwrap_or_default()
    }

    pub fn into_payload(self) -> ModelResult<UpdatePayload> {
        let mut payload = UpdatePayload::from_form([
            ("car_number", self.car_number),
            ("car_type", self.car_type),
            ("car_name", self.car_name),
            ("car_model", self.car_model),
            ("notes", self.notes),
            ("seats_available", self.seats_available),
            ("price_per_seat", self.price_per_seat),
            ("total_price", self.total_price),
            ("negotiable", self.negotiable),
            ("active", self.active),
        ]);
        if let Some(pic) = self.car_pic {
            payload.set("car_pic", UpdateField::of(serde_json::to_value(pic)?));
        }
        Ok(payload)
    }
}
