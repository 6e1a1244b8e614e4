//! Request handlers for the ride sharing resources
//!
//! Controllers sit between the transport layer and the list/update engine:
//! they receive already-decoded [`ListParams`](rideshare_orm::ListParams),
//! forms and the authenticated [`Caller`], and return typed results or a
//! [`ControllerError`] that the transport maps onto its response envelope.

use chrono::Utc;
use rideshare_orm::{Model, ModelError, Reconciler, Snapshot, UpdatePayload};
use rideshare_validation::{format_datetime, ValidationError};
use serde_json::{json, Value};
use thiserror::Error;

pub mod default_ride_setting_controller;
pub mod media_controller;
pub mod review_controller;
pub mod ride_controller;
pub mod user_controller;

pub use default_ride_setting_controller::DefaultRideSettingController;
pub use media_controller::MediaController;
pub use review_controller::ReviewController;
pub use ride_controller::RideController;
pub use user_controller::UserController;

/// The authenticated identity behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub is_admin: bool,
}

impl Caller {
    pub fn user(id: i64) -> Self {
        Self { id, is_admin: false }
    }

    pub fn admin(id: i64) -> Self {
        Self { id, is_admin: true }
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;

#[derive(Debug, Clone, Error)]
pub enum ControllerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The request is well-formed but the resource is not in a usable state
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<ValidationError> for ControllerError {
    fn from(err: ValidationError) -> Self {
        ControllerError::Model(ModelError::Validation(err))
    }
}

impl ControllerError {
    pub fn status_code(&self) -> u16 {
        match self {
            ControllerError::NotFound(_) => 404,
            ControllerError::Forbidden(_) => 403,
            ControllerError::Rejected(_) => 400,
            ControllerError::Model(ModelError::Validation(_)) => 422,
            ControllerError::Model(ModelError::NotFound(_)) => 404,
            ControllerError::Model(_) => 500,
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ControllerError::Model(err) => err.validation(),
            _ => None,
        }
    }

    /// Error body for the transport envelope
    pub fn to_json(&self) -> Value {
        match self.validation() {
            Some(err) => json!({ "error": err.to_json() }),
            None => json!({ "error": { "message": self.to_string() } }),
        }
    }
}

/// Build a new entity from a create payload on top of server-side `preset`
/// values (owner, defaults, timestamps).
///
/// Every writable, non-nullable field must end up with a value.
pub(crate) fn new_entity<M: Model>(payload: &UpdatePayload, mut preset: Snapshot) -> ControllerResult<M> {
    let schema = M::schema();
    let planned = Reconciler::plan(schema, payload)?;
    for (def, value) in &planned {
        preset.insert(def.name, value.clone());
    }

    if let Some(missing) = schema
        .fields
        .iter()
        .find(|def| def.writable && !def.nullable && preset.get(def.name).map_or(true, Value::is_null))
    {
        return Err(ValidationError::new(missing.name, "field is required").into());
    }

    Ok(Reconciler::materialize(preset, &planned)?)
}

/// Current time as stored in timestamp columns
pub(crate) fn now() -> Value {
    Value::String(format_datetime(&Utc::now()))
}
