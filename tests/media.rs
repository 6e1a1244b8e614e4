use std::sync::Arc;

use rideshare::controllers::MediaController;
use rideshare::models::Media;
use rideshare_core::config::AppConfig;
use rideshare_orm::{ListParams, MemoryStore};

fn media(name: &str, media_type: &str) -> Media {
    Media {
        id: None,
        filename: name.to_string(),
        extension: name.rsplit('.').next().unwrap_or_default().to_string(),
        original: format!("/media/{}", name),
        size_mb: Some(1.2),
        thumbnail: None,
        media_type: media_type.to_string(),
        created_at: None,
        updated_at: None,
    }
}

fn controller() -> MediaController<MemoryStore<Media>> {
    let store = Arc::new(MemoryStore::with_rows(vec![
        media("car.webp", "image"),
        media("tour.mp4", "video"),
        media("licence.pdf", "doc"),
        media("seat.webp", "image"),
    ]));
    let config = AppConfig {
        domain: "https://files.example.com".to_string(),
        ..AppConfig::testing()
    };
    MediaController::new(store, Arc::new(config))
}

#[tokio::test]
async fn test_list_searches_media_type() {
    let controller = controller();

    let page = controller.list(&ListParams::new().search("image")).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.data[0].original, "https://files.example.com/media/car.webp");
    assert_eq!(page.data[1].filename, "seat.webp");
}

#[tokio::test]
async fn test_list_pages() {
    let controller = controller();

    let page = controller
        .list(&ListParams::new().limit(3).page(2))
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.len(), 1);
    assert_eq!(page.data[0].id, 4);
}

#[tokio::test]
async fn test_find() {
    let controller = controller();

    let read = controller.find(2).await.unwrap();
    assert_eq!(read.media_type, "video");
    assert_eq!(read.thumbnail, None);
    assert!(controller.find(10).await.is_err());
}
