use std::sync::Arc;

use rideshare_core::config::AppConfig;
use rideshare_orm::{list, ListParams, Page, Reconciler, SearchFields, Snapshot, Store};
use tracing::info;

use super::{new_entity, now, Caller, ControllerError, ControllerResult};
use crate::models::Ride;
use crate::requests::RideForm;

pub struct RideController<S> {
    store: Arc<S>,
    config: Arc<AppConfig>,
}

impl<S: Store<Ride>> RideController<S> {
    pub fn new(store: Arc<S>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub async fn list(&self, params: &ListParams) -> ControllerResult<Page<Ride>> {
        Ok(list(
            &*self.store,
            params,
            &self.config.listing,
            |spec| spec,
            &SearchFields::of::<Ride>(),
            &[],
            &(),
        )
        .await?)
    }

    /// Rides offered by the caller
    pub async fn list_by_user(&self, caller: &Caller, params: &ListParams) -> ControllerResult<Page<Ride>> {
        Ok(list(
            &*self.store,
            params,
            &self.config.listing,
            |spec| spec.scoped_to("user_id", caller.id),
            &SearchFields::of::<Ride>(),
            &[],
            &(),
        )
        .await?)
    }

    pub async fn create(&self, caller: &Caller, form: RideForm) -> ControllerResult<Ride> {
        let payload = form.into_payload()?;

        let mut preset = Snapshot::new();
        preset.insert("user_id", caller.id);
        preset.insert("active", true);
        preset.insert("created_at", now());
        preset.insert("updated_at", now());

        let ride: Ride = new_entity(&payload, preset)?;
        let ride = self.store.insert(ride).await?;
        info!(ride_id = ?ride.id, user_id = caller.id, "Ride created");
        Ok(ride)
    }

    pub async fn update(&self, caller: &Caller, id: i64, form: RideForm) -> ControllerResult<Ride> {
        let mut ride = self.find_any(id).await?;
        if !ride.is_owned_by(caller.id) {
            return Err(ControllerError::Forbidden("you are not allowed to update this ride".to_string()));
        }

        let delete = form.delete_list();
        let payload = form.into_payload()?;
        let outcome = Reconciler::reconcile(&mut ride, &payload)?;

        let removed = ride.remove_images(&delete);
        if !removed.is_empty() {
            info!(ride_id = id, removed = ?removed, "Removed ride images");
        }

        if !outcome.is_empty() || !removed.is_empty() {
            ride.updated_at = Some(chrono::Utc::now());
        }
        Ok(self.store.save(&ride).await?)
    }

    /// A ride whose owner has a verified phone
    pub async fn find(&self, id: i64) -> ControllerResult<Ride> {
        let ride = self.find_any(id).await?;
        if !ride.has_verified_owner() {
            return Err(ControllerError::Rejected("user not verified".to_string()));
        }
        Ok(ride)
    }

    pub async fn delete(&self, caller: &Caller, id: i64) -> ControllerResult<()> {
        let ride = self.find_any(id).await?;
        if !caller.is_admin && !ride.is_owned_by(caller.id) {
            return Err(ControllerError::Forbidden("you are not allowed to delete this ride".to_string()));
        }
        self.store.delete(id).await?;
        info!(ride_id = id, user_id = caller.id, "Ride deleted");
        Ok(())
    }

    async fn find_any(&self, id: i64) -> ControllerResult<Ride> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ControllerError::NotFound("ride".to_string()))
    }
}
