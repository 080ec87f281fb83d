use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::PackingService;
use crate::error::{PackingError, PackingResult};
use crate::guard::{resolve_user, Principal};
use crate::models::{NewUser, User, UserPatch, UserRole};
use crate::store::EntityStore;
use crate::validation::{normalize_text, validate_email, validate_name};

const DEFAULT_DISPLAY_NAME: &str = "Traveler";

/// Identity asserted by the external authentication provider
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub external_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(external_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            display_name: Some(display_name.into()),
            email: None,
        }
    }
}

impl<S: EntityStore> PackingService<S> {
    /// Return the user for `identity`, creating it on first access
    pub async fn ensure_user(&self, identity: Identity) -> PackingResult<User> {
        let external_id = identity.external_id.trim();
        if external_id.is_empty() {
            return Err(PackingError::Validation(
                "External id is required".to_string(),
            ));
        }

        if let Some(user) = self.store.find_user_by_external_id(external_id).await? {
            return Ok(user);
        }

        let display_name = normalize_text(identity.display_name)
            .and_then(|name| validate_name("Display name", &name).ok())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        let email = normalize_text(identity.email).filter(|email| match validate_email(email) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring email for {}: {}", external_id, e);
                false
            }
        });

        let inserted = self
            .store
            .insert_user(NewUser {
                external_id: external_id.to_string(),
                display_name,
                email,
                role: UserRole::User,
            })
            .await;

        if let Err(e) = inserted {
            // A concurrent first request may have created the row
            return match self.store.find_user_by_external_id(external_id).await? {
                Some(user) => Ok(user),
                None => Err(e.into()),
            };
        }

        info!("Created user for {}", external_id);
        resolve_user(&self.store, &Principal::new(external_id)).await
    }

    pub async fn current_user(&self, actor: &Principal) -> PackingResult<User> {
        resolve_user(&self.store, actor).await
    }

    /// Replace the acting user's preference bag
    pub async fn update_preferences(
        &self,
        actor: &Principal,
        preferences: Value,
    ) -> PackingResult<User> {
        if !preferences.is_object() {
            return Err(PackingError::Validation(
                "Preferences must be a JSON object".to_string(),
            ));
        }

        let user = resolve_user(&self.store, actor).await?;
        self.store
            .patch_user(
                user.id,
                UserPatch {
                    preferences: Some(preferences),
                    ..Default::default()
                },
            )
            .await?;

        info!("Updated preferences for user {}", user.id);
        resolve_user(&self.store, actor).await
    }
}
