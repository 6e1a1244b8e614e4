use std::sync::Arc;

use rideshare_orm::{FieldType, Reconciler, Store, UpdateField};
use tracing::info;

use super::{Caller, ControllerError, ControllerResult};
use crate::models::{User, UserRead};
use crate::requests::ProfileForm;

pub struct UserController<S> {
    store: Arc<S>,
}

impl<S: Store<User>> UserController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn find(&self, id: i64) -> ControllerResult<UserRead> {
        Ok(self.find_user(id).await?.into())
    }

    /// Update the caller's own profile.
    ///
    /// A new phone number is parked in `unverified_phone` and the account
    /// loses its verified status; a new email resets `email_verified`.
    pub async fn update_profile(&self, caller: &Caller, form: ProfileForm) -> ControllerResult<UserRead> {
        let mut user = self.find_user(caller.id).await?;
        let mut payload = form.into_payload()?;

        let mut phone_changed = false;
        if let UpdateField::Value(raw) = payload.remove("phone") {
            let phone = FieldType::Text.coerce("phone", &raw)?;
            if let Some(phone) = phone.as_str() {
                if user.phone.as_deref() != Some(phone) {
                    payload.set("unverified_phone", UpdateField::of(phone));
                    phone_changed = true;
                }
            }
        }

        let outcome = Reconciler::reconcile(&mut user, &payload)?;
        if phone_changed {
            user.verified = false;
        }
        if outcome.is_changed("email") {
            user.email_verified = false;
        }
        if outcome.is_empty() && !phone_changed {
            return Ok(user.into());
        }

        user.updated_at = Some(chrono::Utc::now());
        let user = self.store.save(&user).await?;
        info!(
            user_id = caller.id,
            changed = ?outcome.changed,
            phone_changed,
            "Profile updated"
        );
        Ok(user.into())
    }

    async fn find_user(&self, id: i64) -> ControllerResult<User> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| ControllerError::NotFound("user".to_string()))
    }
}
