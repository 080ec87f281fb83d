//! Operation facade
//!
//! [`PackingService`] exposes every list, category, item, template,
//! moderation and maintenance operation. The acting user is always an
//! explicit [`Principal`] argument. Multi-step operations run inside one
//! store transaction.

mod categories;
mod items;
mod lists;
mod maintenance;
mod moderation;
mod queries;
mod templates;
mod users;

pub use categories::AddCategoryInput;
pub use items::AddItemInput;
pub use lists::CreateListInput;
pub use maintenance::SweepReport;
pub use moderation::ModerationEntry;
pub use queries::{CategoryDetail, ListDetail, Progress};
pub use templates::{CreateTemplateInput, SaveTemplateInput};
pub use users::Identity;

use crate::error::PackingResult;
use crate::guard::{assert_owns_list, AccessPolicy, Principal};
use crate::ids::ListId;
use crate::store::EntityStore;

/// Entry point for every packing operation
#[derive(Debug, Clone)]
pub struct PackingService<S> {
    store: S,
    policy: AccessPolicy,
}

impl<S: EntityStore> PackingService<S> {
    /// Create a service with the default access policy
    pub fn new(store: S) -> Self {
        Self::with_policy(store, AccessPolicy::default())
    }

    pub fn with_policy(store: S, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Ownership check for a category or item mutation whose target already
    /// resolved. A no-op unless the policy is strict.
    async fn guard_descendant(
        &self,
        store: &S,
        actor: &Principal,
        list_id: ListId,
    ) -> PackingResult<()> {
        if self.policy.trust_caller_for_children {
            return Ok(());
        }
        assert_owns_list(store, actor, list_id).await.map(|_| ())
    }
}
