pub mod default_ride_setting;
pub mod media;
pub mod review;
pub mod ride;
pub mod user;

pub use default_ride_setting::DefaultRideSetting;
pub use media::{Media, MediaRead, MediaRef};
pub use review::{Review, ReviewStats};
pub use ride::{CarType, Location, Ride, RideOwner};
pub use user::{User, UserRead, UserStatus};
