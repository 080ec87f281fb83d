//! Entity models for the list/category/item hierarchy, templates and
//! moderation

pub mod category;
pub mod item;
pub mod list;
pub mod moderation;
pub mod template;
pub mod user;

pub use category::{Category, CategoryPatch, NewCategory};
pub use item::{Item, ItemPatch, NewItem, Priority};
pub use list::{ListPatch, NewList, PackingList};
pub use moderation::{
    ContentType, ModerationHistoryEntry, ModerationPatch, ModerationRecord, ModerationStatus,
    NewModerationHistory, NewModerationRecord,
};
pub use template::{NewTemplate, Template, TemplateCategory, TemplateCreator, TemplateItem};
pub use user::{NewUser, User, UserPatch, UserRole};

/// Row counts across the store, used for the admin statistics view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EntityCounts {
    pub users: u64,
    pub lists: u64,
    pub templates: u64,
    pub items: u64,
    pub packed_items: u64,
    pub pending_moderation: u64,
}
