use std::sync::Arc;

use rideshare_core::config::AppConfig;
use rideshare_orm::{list, ListParams, Page, SearchFields, Store};

use super::{ControllerError, ControllerResult};
use crate::models::{Media, MediaRead};

pub struct MediaController<S> {
    store: Arc<S>,
    config: Arc<AppConfig>,
}

impl<S: Store<Media>> MediaController<S> {
    pub fn new(store: Arc<S>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub async fn list(&self, params: &ListParams) -> ControllerResult<Page<MediaRead>> {
        let page: Page<Media> = list(
            &*self.store,
            params,
            &self.config.listing,
            |spec| spec,
            &SearchFields::of::<Media>(),
            &[],
            &(),
        )
        .await?;
        Ok(page.map(|media| MediaRead::new(media, &self.config)))
    }

    pub async fn find(&self, id: i64) -> ControllerResult<MediaRead> {
        let media = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ControllerError::NotFound("media".to_string()))?;
        Ok(MediaRead::new(media, &self.config))
    }
}
