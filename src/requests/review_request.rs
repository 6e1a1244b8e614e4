use rideshare_validation::{ValidationError, ValidationResult};
use serde::Deserialize;

use crate::models::review::{MAX_RATING, MIN_RATING};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewCreate {
    pub target_id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl ReviewCreate {
    pub fn validate(&self) -> ValidationResult<()> {
        check_rating(self.rating)
    }
}

pub fn check_rating(rating: i64) -> ValidationResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "rating",
            format!("rating must be between {} and {}", MIN_RATING, MAX_RATING),
        )
        .rejected(rating))
    }
}
