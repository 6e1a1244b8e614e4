use chrono::{DateTime, Utc};
use rideshare_core::config::AppConfig;
use rideshare_orm::{EntitySchema, FieldDef, Model};
use serde::{Deserialize, Serialize};

pub static MEDIA: EntitySchema = EntitySchema {
    table: "media",
    primary_key: "id",
    fields: &[
        FieldDef::integer("id").read_only(),
        FieldDef::text("filename"),
        FieldDef::text("extension"),
        FieldDef::text("original"),
        FieldDef::float("size_mb").nullable(),
        FieldDef::text("thumbnail").nullable(),
        FieldDef::text("media_type"),
        FieldDef::datetime("created_at").nullable().read_only(),
        FieldDef::datetime("updated_at").nullable().read_only(),
    ],
    relations: &[],
    search_fields: &["media_type"],
    default_order: &[],
};

/// A stored upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: Option<i64>,
    pub filename: String,
    pub extension: String,
    /// Path of the original file, relative to the public domain
    pub original: String,
    pub size_mb: Option<f64>,
    pub thumbnail: Option<String>,
    /// `image`, `video` or `doc`
    pub media_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Media {
    fn schema() -> &'static EntitySchema {
        &MEDIA
    }

    fn primary_key(&self) -> Option<i64> {
        self.id
    }

    fn set_primary_key(&mut self, key: i64) {
        self.id = Some(key);
    }
}

impl Media {
    /// The compact form embedded in other records (`car_pic`, `image`, ...)
    pub fn reference(&self) -> MediaRef {
        MediaRef {
            id: self.id,
            filename: self.filename.clone(),
            original: self.original.clone(),
            media_type: self.media_type.clone(),
        }
    }
}

/// Media reference stored inside JSON columns of other entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: Option<i64>,
    pub filename: String,
    pub original: String,
    pub media_type: String,
}

/// Read model with public URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRead {
    pub id: i64,
    pub filename: String,
    pub extension: String,
    pub original: String,
    pub size_mb: Option<f64>,
    pub thumbnail: Option<String>,
    pub media_type: String,
}

impl MediaRead {
    pub fn new(media: Media, config: &AppConfig) -> Self {
        Self {
            id: media.id.unwrap_or_default(),
            filename: media.filename,
            extension: media.extension,
            original: config.media_url(&media.original),
            size_mb: media.size_mb,
            thumbnail: media
                .thumbnail
                .filter(|path| !path.is_empty())
                .map(|path| config.media_url(&path)),
            media_type: media.media_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media() -> Media {
        Media {
            id: Some(3),
            filename: "car.webp".to_string(),
            extension: "webp".to_string(),
            original: "/media/car.webp".to_string(),
            size_mb: Some(0.4),
            thumbnail: Some("/media/thumb_car.webp".to_string()),
            media_type: "image".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_read_prefixes_domain() {
        let config = AppConfig {
            domain: "https://cdn.example.com/".to_string(),
            ..AppConfig::testing()
        };
        let read = MediaRead::new(media(), &config);
        assert_eq!(read.original, "https://cdn.example.com/media/car.webp");
        assert_eq!(read.thumbnail.as_deref(), Some("https://cdn.example.com/media/thumb_car.webp"));
    }

    #[test]
    fn test_missing_thumbnail_stays_missing() {
        let mut media = media();
        media.thumbnail = Some(String::new());
        let read = MediaRead::new(media, &AppConfig::testing());
        assert_eq!(read.thumbnail, None);
    }

    #[test]
    fn test_reference() {
        let reference = media().reference();
        assert_eq!(reference.filename, "car.webp");
        assert_eq!(reference.id, Some(3));
    }
}
