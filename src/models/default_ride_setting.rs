use chrono::{DateTime, Utc};
use rideshare_orm::{EntitySchema, FieldDef, Model};
use serde::{Deserialize, Serialize};

use super::media::MediaRef;
use super::ride::{CarType, CAR_TYPES};

pub static DEFAULT_RIDE_SETTINGS: EntitySchema = EntitySchema {
    table: "default_ride_settings",
    primary_key: "id",
    fields: &[
        FieldDef::integer("id").read_only(),
        FieldDef::integer("user_id").read_only(),
        FieldDef::text("car_number"),
        FieldDef::json("car_pic").nullable(),
        FieldDef::integer("seats_available"),
        FieldDef::float("price_per_seat").nullable(),
        FieldDef::float("total_price").nullable(),
        FieldDef::boolean("negotiable").nullable(),
        FieldDef::text("notes").nullable(),
        FieldDef::choice("car_type", CAR_TYPES),
        FieldDef::text("car_name"),
        FieldDef::text("car_model").nullable(),
        FieldDef::boolean("active"),
        FieldDef::datetime("created_at").nullable().read_only(),
        FieldDef::datetime("updated_at").nullable().read_only(),
    ],
    relations: &[],
    search_fields: &["car_number", "car_type", "car_name", "car_model"],
    default_order: &[],
};

/// A driver's defaults used to prefill new rides; one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultRideSetting {
    pub id: Option<i64>,
    pub user_id: i64,
    pub car_number: String,
    pub car_pic: Option<MediaRef>,
    pub seats_available: i64,
    pub price_per_seat: Option<f64>,
    pub total_price: Option<f64>,
    pub negotiable: Option<bool>,
    pub notes: Option<String>,
    pub car_type: CarType,
    pub car_name: String,
    pub car_model: Option<String>,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for DefaultRideSetting {
    fn schema() -> &'static EntitySchema {
        &DEFAULT_RIDE_SETTINGS
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }
}

impl DefaultRideSetting {
    /// Drop the car picture if its filename is listed
    pub fn remove_images(&mut self, filenames: &[String]) -> Vec<String> {
        match &self.car_pic {
            Some(pic) if filenames.contains(&pic.filename) => {
                let removed = vec![pic.filename.clone()];
                self.car_pic = None;
                removed
            }
            _ => Vec::new(),
        }
    }
}
