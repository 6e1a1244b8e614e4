use chrono::{DateTime, Utc};
use rideshare_orm::{EntitySchema, FieldDef, Model, OrderDirection, Relation};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

const REVIEW_USER_FIELDS: &[FieldDef] = &[
    FieldDef::integer("id"),
    FieldDef::text("full_name"),
    FieldDef::json("image").nullable(),
    FieldDef::boolean("verified"),
];

pub static REVIEWS: EntitySchema = EntitySchema {
    table: "reviews",
    primary_key: "id",
    fields: &[
        FieldDef::integer("id").read_only(),
        FieldDef::integer("reviewer_id").read_only(),
        FieldDef::integer("target_id").read_only(),
        FieldDef::integer("rating"),
        FieldDef::text("comment").nullable(),
        FieldDef::datetime("created_at").nullable().read_only(),
        FieldDef::datetime("updated_at").nullable().read_only(),
    ],
    relations: &[
        Relation {
            name: "reviewer",
            table: "users",
            local_key: "reviewer_id",
            foreign_key: "id",
            fields: REVIEW_USER_FIELDS,
        },
        Relation {
            name: "target",
            table: "users",
            local_key: "target_id",
            foreign_key: "id",
            fields: REVIEW_USER_FIELDS,
        },
    ],
    search_fields: &["comment"],
    default_order: &[("created_at", OrderDirection::Desc)],
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewUser {
    pub id: i64,
    pub full_name: String,
    pub image: Option<serde_json::Value>,
    pub verified: bool,
}

/// One user's rating of another; a reviewer rates a target at most once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Option<i64>,
    pub reviewer_id: i64,
    pub target_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewer: Option<ReviewUser>,
    #[serde(default)]
    pub target: Option<ReviewUser>,
}

impl Model for Review {
    fn schema() -> &'static EntitySchema {
        &REVIEWS
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }
}

/// Aggregate figures attached to a target's review list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub average_rating: Option<f64>,
    pub total_reviews: u64,
    /// Timestamp of the oldest review
    pub start_date: Option<DateTime<Utc>>,
}

impl ReviewStats {
    pub fn of(reviews: &[Review]) -> Self {
        let total_reviews = reviews.len() as u64;
        let average_rating = (total_reviews > 0)
            .then(|| reviews.iter().map(|review| review.rating as f64).sum::<f64>() / total_reviews as f64);
        let start_date = reviews
            .iter()
            .filter_map(|review| review.updated_at.or(review.created_at))
            .min();

        Self {
            average_rating,
            total_reviews,
            start_date,
        }
    }
}
