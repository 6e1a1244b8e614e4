pub mod default_ride_setting_form;
pub mod profile_form;
pub mod review_request;
pub mod ride_form;

pub use default_ride_setting_form::DefaultRideSettingForm;
pub use profile_form::ProfileForm;
pub use review_request::ReviewCreate;
pub use ride_form::{Coordinates, RideForm};
