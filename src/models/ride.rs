use chrono::{DateTime, Utc};
use rideshare_orm::{EntitySchema, FieldDef, Model, Relation};
use serde::{Deserialize, Serialize};

use super::media::MediaRef;

/// Allowed `car_type` values
pub const CAR_TYPES: &[&str] = &[
    "sedan",
    "hatchback",
    "suv",
    "crossover",
    "coupe",
    "convertible",
    "pickup",
    "van",
    "wagon",
    "minivan",
    "jeep",
    "other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Sedan,
    Hatchback,
    Suv,
    Crossover,
    Coupe,
    Convertible,
    Pickup,
    Van,
    Wagon,
    Minivan,
    Jeep,
    Other,
}

/// Fields of the owning user embedded in ride reads
pub const RIDE_OWNER_FIELDS: &[FieldDef] = &[
    FieldDef::integer("id"),
    FieldDef::text("full_name"),
    FieldDef::text("email").nullable(),
    FieldDef::text("phone").nullable(),
    FieldDef::boolean("verified"),
];

pub static RIDES: EntitySchema = EntitySchema {
    table: "rides",
    primary_key: "id",
    fields: &[
        FieldDef::integer("id").read_only(),
        FieldDef::integer("user_id").read_only(),
        FieldDef::json("from_location"),
        FieldDef::json("to_location"),
        FieldDef::text("from_address"),
        FieldDef::text("to_address"),
        FieldDef::datetime("arrival_time"),
        FieldDef::text("car_number"),
        FieldDef::json("car_pic").nullable(),
        FieldDef::json("other_images").nullable(),
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
    relations: &[Relation {
        name: "user",
        table: "users",
        local_key: "user_id",
        foreign_key: "id",
        fields: RIDE_OWNER_FIELDS,
    }],
    search_fields: &[
        "from_address",
        "to_address",
        "car_number",
        "car_type",
        "car_name",
        "car_model",
    ],
    default_order: &[],
};

/// GeoJSON point, `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl Location {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![longitude, latitude],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideOwner {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub verified: bool,
}

/// A ride offered by a driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: Option<i64>,
    pub user_id: i64,
    pub from_location: Location,
    pub to_location: Location,
    pub from_address: String,
    pub to_address: String,
    pub arrival_time: DateTime<Utc>,
    pub car_number: String,
    pub car_pic: Option<MediaRef>,
    pub other_images: Option<Vec<MediaRef>>,
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
    #[serde(default)]
    pub user: Option<RideOwner>,
}

impl Model for Ride {
    fn schema() -> &'static EntitySchema {
        &RIDES
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }
}

impl Ride {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    /// Whether the owner's phone has been verified
    pub fn has_verified_owner(&self) -> bool {
        self.user.as_ref().map_or(false, |owner| owner.verified)
    }

    /// Drop the car picture and any extra images whose filename is listed.
    /// Returns the filenames actually removed.
    pub fn remove_images(&mut self, filenames: &[String]) -> Vec<String> {
        let mut removed = Vec::new();

        if let Some(pic) = &self.car_pic {
            if filenames.contains(&pic.filename) {
                removed.push(pic.filename.clone());
                self.car_pic = None;
            }
        }

        if let Some(images) = &mut self.other_images {
            images.retain(|image| {
                let drop = filenames.contains(&image.filename);
                if drop {
                    removed.push(image.filename.clone());
                }
                !drop
            });
        }

        removed
    }
}
