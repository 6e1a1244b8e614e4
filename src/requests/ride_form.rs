use rideshare_orm::{ModelResult, UpdateField, UpdatePayload};
use rideshare_validation::{codes, coerce, ValidationError, ValidationResult};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{Location, MediaRef};

/// `{"longitude": .., "latitude": ..}` as submitted in `from_` / `to_`.
/// Numbers may arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    /// Parse a submitted coordinate object; blank input is `None`
    pub fn parse(field: &str, raw: &str) -> ValidationResult<Option<Self>> {
        let Some(value) = coerce::to_json(field, raw)? else {
            return Ok(None);
        };

        let axis = |name: &str| -> ValidationResult<f64> {
            let parsed = match value.get(name) {
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::String(s)) => coerce::to_float(field, s)?,
                _ => None,
            };
            parsed.ok_or_else(|| {
                ValidationError::with_code(field, format!("missing or invalid {}", name), codes::INVALID_TYPE)
                    .rejected(value.clone())
            })
        };

        Ok(Some(Self {
            longitude: axis("longitude")?,
            latitude: axis("latitude")?,
        }))
    }

    pub fn to_point(self) -> Location {
        Location::point(self.longitude, self.latitude)
    }
}

/// Ride create/update form
///
/// Every scalar arrives as an optional string: a missing field is left
/// alone on update, a blank one clears it. Uploaded media has already been
/// stored by the transport layer and arrives as references.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RideForm {
    #[serde(rename = "from_")]
    pub from: Option<String>,
    #[serde(rename = "to_")]
    pub to: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub arrival_time: Option<String>,
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
    #[serde(skip)]
    pub other_images: Vec<MediaRef>,
    /// Filenames to drop from `car_pic` / `other_images`
    pub delete_images: Option<Value>,
}

impl RideForm {
    /// Filenames listed in `delete_images`
    pub fn delete_list(&self) -> Vec<String> {
        self.delete_images.as_ref().map(coerce::parse_list).unwrap_or_default()
    }

    pub fn into_payload(self) -> ModelResult<UpdatePayload> {
        let mut payload = UpdatePayload::from_form([
            ("from_address", self.from_address),
            ("to_address", self.to_address),
            ("arrival_time", self.arrival_time),
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

        for (field, raw) in [("from_location", self.from), ("to_location", self.to)] {
            let point = match raw {
                Some(raw) => Coordinates::parse(field, &raw)?,
                None => None,
            };
            if let Some(point) = point {
                payload.set(field, UpdateField::of(serde_json::to_value(point.to_point())?));
            }
        }

        // No new upload never clears the stored media
        if let Some(pic) = self.car_pic {
            payload.set("car_pic", UpdateField::of(serde_json::to_value(pic)?));
        }
        if !self.other_images.is_empty() {
            payload.set("other_images", UpdateField::of(serde_json::to_value(self.other_images)?));
        }

        Ok(payload)
    }
}
