//! Ride sharing backend resources
//!
//! Models, request forms and controllers for rides, reviews, users, media
//! and default ride settings, all listed and updated through
//! [`rideshare_orm`].

pub mod controllers;
pub mod models;
pub mod requests;

pub use controllers::{Caller, ControllerError, ControllerResult};
