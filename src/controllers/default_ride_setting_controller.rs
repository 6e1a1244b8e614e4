use std::sync::Arc;

use rideshare_core::config::AppConfig;
use rideshare_orm::{compile, FilterSpec, Reconciler, SearchFields, Snapshot, Store};
use tracing::info;

use super::{new_entity, now, Caller, ControllerError, ControllerResult};
use crate::models::DefaultRideSetting;
use crate::requests::DefaultRideSettingForm;

pub struct DefaultRideSettingController<S> {
    store: Arc<S>,
    config: Arc<AppConfig>,
}

impl<S: Store<DefaultRideSetting>> DefaultRideSettingController<S> {
    pub fn new(store: Arc<S>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// The caller's own setting, if one was saved
    pub async fn current(&self, caller: &Caller) -> ControllerResult<Option<DefaultRideSetting>> {
        let spec = FilterSpec::unfiltered(&self.config.listing).scoped_to("user_id", caller.id);
        let compiled = compile::<DefaultRideSetting, ()>(&spec, &SearchFields::none(), &[], &())?;
        Ok(self.store.first(&compiled.query).await?)
    }

    pub async fn find(&self, caller: &Caller) -> ControllerResult<DefaultRideSetting> {
        self.current(caller)
            .await?
            .ok_or_else(|| ControllerError::NotFound("default ride setting".to_string()))
    }

    pub async fn create(&self, caller: &Caller, form: DefaultRideSettingForm) -> ControllerResult<DefaultRideSetting> {
        if self.current(caller).await?.is_some() {
            return Err(ControllerError::Rejected("default ride setting already exists".to_string()));
        }

        let payload = form.into_payload()?;
        let mut preset = Snapshot::new();
        preset.insert("user_id", caller.id);
        preset.insert("active", true);
        preset.insert("created_at", now());
        preset.insert("updated_at", now());

        let setting: DefaultRideSetting = new_entity(&payload, preset)?;
        Ok(self.store.insert(setting).await?)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: i64,
        form: DefaultRideSettingForm,
    ) -> ControllerResult<DefaultRideSetting> {
        let mut setting = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| ControllerError::NotFound("default ride setting".to_string()))?;
        if setting.user_id != caller.id {
            return Err(ControllerError::Forbidden(
                "you are not allowed to update this setting".to_string(),
            ));
        }

        let delete = form.delete_list();
        let outcome = Reconciler::reconcile(&mut setting, &form.into_payload()?)?;
        let removed = setting.remove_images(&delete);
        if !removed.is_empty() {
            info!(setting_id = id, removed = ?removed, "Removed default ride setting images");
        }

        if !outcome.is_empty() || !removed.is_empty() {
            setting.updated_at = Some(chrono::Utc::now());
        }
        Ok(self.store.save(&setting).await?)
    }
}
