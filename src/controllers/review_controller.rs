use std::sync::Arc;

use rideshare_core::config::AppConfig;
use rideshare_orm::{
    list, ListParams, Model, ModelError, Page, PredicateHook, Reconciler, SearchFields, Snapshot, Store,
    UpdateField, UpdatePayload,
};
use serde_json::Value;
use tracing::info;

use super::{new_entity, now, Caller, ControllerError, ControllerResult};
use crate::models::{Review, ReviewStats};
use crate::requests::review_request::{check_rating, ReviewCreate};

pub struct ReviewController<S> {
    store: Arc<S>,
    config: Arc<AppConfig>,
    about_target: [PredicateHook<Review, i64>; 1],
}

impl<S: Store<Review>> ReviewController<S> {
    pub fn new(store: Arc<S>, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            config,
            about_target: [PredicateHook::new("about_target", |query, target| {
                query.where_eq("target_id", *target)
            })],
        }
    }

    /// Reviews about `target_id`, with the target's rating statistics in
    /// the page's extra fields
    pub async fn list(&self, target_id: i64, params: &ListParams) -> ControllerResult<Page<Review>> {
        let page = list(
            &*self.store,
            params,
            &self.config.listing,
            |spec| spec,
            &SearchFields::of::<Review>(),
            &self.about_target,
            &target_id,
        )
        .await?;

        let stats = self.stats(target_id).await?;
        let extra = match serde_json::to_value(&stats).map_err(ModelError::from)? {
            Value::Object(map) => map,
            _ => Default::default(),
        };
        Ok(extra
            .into_iter()
            .fold(page, |page, (key, value)| page.with_extra(key, value)))
    }

    pub async fn stats(&self, target_id: i64) -> ControllerResult<ReviewStats> {
        let reviews = self
            .store
            .fetch(&Review::query().where_eq("target_id", target_id))
            .await?;
        Ok(ReviewStats::of(&reviews))
    }

    pub async fn create(&self, caller: &Caller, body: ReviewCreate) -> ControllerResult<Review> {
        body.validate()?;

        let mut preset = Snapshot::new();
        preset.insert("reviewer_id", caller.id);
        preset.insert("target_id", body.target_id);
        preset.insert("created_at", now());
        preset.insert("updated_at", now());

        let payload = UpdatePayload::new()
            .with("rating", UpdateField::of(body.rating))
            .with("comment", body.comment.map_or(UpdateField::Absent, UpdateField::of));

        let review: Review = new_entity(&payload, preset)?;
        let review = self.store.insert(review).await?;
        info!(review_id = ?review.id, target_id = body.target_id, "Review created");
        Ok(review)
    }

    /// Apply a JSON update to one of the caller's own reviews
    pub async fn update(&self, caller: &Caller, id: i64, body: &Value) -> ControllerResult<Review> {
        let mut review = self.own_review(caller, id).await?;

        let payload = UpdatePayload::from_json(body)?;
        let outcome = Reconciler::reconcile(&mut review, &payload)?;
        check_rating(review.rating)?;

        if !outcome.is_empty() {
            review.updated_at = Some(chrono::Utc::now());
        }
        Ok(self.store.save(&review).await?)
    }

    pub async fn delete(&self, caller: &Caller, id: i64, target_id: i64) -> ControllerResult<()> {
        let review = self.own_review(caller, id).await?;
        if review.target_id != target_id {
            return Err(ControllerError::NotFound("review".to_string()));
        }
        self.store.delete(id).await?;
        Ok(())
    }

    async fn own_review(&self, caller: &Caller, id: i64) -> ControllerResult<Review> {
        let query = Review::query()
            .where_eq("id", id)
            .where_eq("reviewer_id", caller.id);
        self.store
            .first(&query)
            .await?
            .ok_or_else(|| ControllerError::NotFound("review".to_string()))
    }
}
