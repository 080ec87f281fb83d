//! Ownership and access guard

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EntityKind, PackingError, PackingResult};
use crate::ids::{CategoryId, ItemId, ListId};
use crate::models::{Category, Item, PackingList, User};
use crate::store::EntityStore;

/// Category and item mutations check only that their target exists; list
/// mutations check ownership. Set to `false` to make every category and
/// item mutation walk up to its list and require ownership too.
pub const CATEGORY_AND_ITEM_MUTATIONS_TRUST_CALLER_AUTHORIZATION: bool = true;

/// Authorization depth applied by [`crate::service::PackingService`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessPolicy {
    pub trust_caller_for_children: bool,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            trust_caller_for_children: CATEGORY_AND_ITEM_MUTATIONS_TRUST_CALLER_AUTHORIZATION,
        }
    }
}

impl AccessPolicy {
    /// Policy that enforces list ownership on every descendant mutation
    pub fn strict() -> Self {
        Self {
            trust_caller_for_children: false,
        }
    }
}

/// The acting user, identified by the external identity provider's id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub external_id: String,
}

impl Principal {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
        }
    }
}

/// Resolve the acting user's internal record
pub async fn resolve_user<S: EntityStore>(store: &S, actor: &Principal) -> PackingResult<User> {
    store
        .find_user_by_external_id(&actor.external_id)
        .await?
        .ok_or_else(|| PackingError::not_found(EntityKind::User, &actor.external_id))
}

pub async fn require_list<S: EntityStore>(store: &S, id: ListId) -> PackingResult<PackingList> {
    store
        .get_list(id)
        .await?
        .ok_or_else(|| PackingError::not_found(EntityKind::List, id))
}

pub async fn require_category<S: EntityStore>(
    store: &S,
    id: CategoryId,
) -> PackingResult<Category> {
    store
        .get_category(id)
        .await?
        .ok_or_else(|| PackingError::not_found(EntityKind::Category, id))
}

pub async fn require_item<S: EntityStore>(store: &S, id: ItemId) -> PackingResult<Item> {
    store
        .get_item(id)
        .await?
        .ok_or_else(|| PackingError::not_found(EntityKind::Item, id))
}

/// Check that `actor` owns the list, returning it so callers avoid a
/// second lookup.
pub async fn assert_owns_list<S: EntityStore>(
    store: &S,
    actor: &Principal,
    list_id: ListId,
) -> PackingResult<PackingList> {
    let user = resolve_user(store, actor).await?;
    let list = require_list(store, list_id).await?;

    if list.user_id != user.id {
        debug!("User {} does not own list {}", user.id, list_id);
        return Err(PackingError::Unauthorized);
    }
    Ok(list)
}

/// Gate for mutations below a list: existence only, or ownership under a
/// strict policy.
pub async fn authorize_list_children<S: EntityStore>(
    store: &S,
    policy: AccessPolicy,
    actor: &Principal,
    list_id: ListId,
) -> PackingResult<PackingList> {
    if policy.trust_caller_for_children {
        require_list(store, list_id).await
    } else {
        assert_owns_list(store, actor, list_id).await
    }
}

/// Resolve the acting user and require the admin role
pub async fn assert_admin<S: EntityStore>(store: &S, actor: &Principal) -> PackingResult<User> {
    let user = resolve_user(store, actor).await?;
    if !user.is_admin() {
        debug!("User {} is not an admin", user.id);
        return Err(PackingError::Unauthorized);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewList, NewUser, UserRole};
    use crate::store::MemoryStore;

    async fn seed_user(store: &MemoryStore, external_id: &str, role: UserRole) {
        store
            .insert_user(NewUser {
                external_id: external_id.to_string(),
                display_name: external_id.to_string(),
                email: None,
                role,
            })
            .await
            .unwrap();
    }

    async fn seed_list(store: &MemoryStore, owner: &str) -> ListId {
        let user = store.find_user_by_external_id(owner).await.unwrap().unwrap();
        store
            .insert_list(NewList {
                user_id: user.id,
                name: "Trip".to_string(),
                description: None,
                tags: Vec::new(),
                is_template: false,
                is_public: false,
                template_id: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn owner_passes_and_stranger_is_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", UserRole::User).await;
        seed_user(&store, "bob", UserRole::User).await;
        let list_id = seed_list(&store, "alice").await;

        let list = assert_owns_list(&store, &Principal::new("alice"), list_id)
            .await
            .unwrap();
        assert_eq!(list.id, list_id);

        let err = assert_owns_list(&store, &Principal::new("bob"), list_id)
            .await
            .unwrap_err();
        assert!(matches!(err, PackingError::Unauthorized));
    }

    #[tokio::test]
    async fn unknown_actor_is_not_found() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", UserRole::User).await;
        let list_id = seed_list(&store, "alice").await;

        let err = assert_owns_list(&store, &Principal::new("ghost"), list_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PackingError::NotFound {
                kind: EntityKind::User,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_list_is_not_found() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", UserRole::User).await;

        let err = assert_owns_list(&store, &Principal::new("alice"), ListId::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PackingError::NotFound {
                kind: EntityKind::List,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn child_gate_follows_policy() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", UserRole::User).await;
        seed_user(&store, "bob", UserRole::User).await;
        let list_id = seed_list(&store, "alice").await;
        let bob = Principal::new("bob");

        assert!(
            authorize_list_children(&store, AccessPolicy::default(), &bob, list_id)
                .await
                .is_ok()
        );
        assert!(matches!(
            authorize_list_children(&store, AccessPolicy::strict(), &bob, list_id).await,
            Err(PackingError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn admin_gate() {
        let store = MemoryStore::new();
        seed_user(&store, "root", UserRole::Admin).await;
        seed_user(&store, "alice", UserRole::User).await;

        assert!(assert_admin(&store, &Principal::new("root")).await.is_ok());
        assert!(matches!(
            assert_admin(&store, &Principal::new("alice")).await,
            Err(PackingError::Unauthorized)
        ));
    }
}
