use serde::Serialize;

use super::PackingService;
use crate::error::{PackingError, PackingResult};
use crate::guard::{resolve_user, Principal};
use crate::ids::ListId;
use crate::models::{Category, Item, PackingList};
use crate::ordering::sort_siblings;
use crate::store::EntityStore;

/// Packing progress of a list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total_items: usize,
    pub packed_items: usize,
    /// Rounded down; 0 for an empty list
    pub percent: u8,
}

impl Progress {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let (total_items, packed_items) = items
            .into_iter()
            .fold((0usize, 0usize), |(total, packed), item| {
                (total + 1, packed + usize::from(item.packed))
            });

        let percent = if total_items == 0 {
            0
        } else {
            u8::try_from(packed_items * 100 / total_items).unwrap_or(100)
        };

        Self {
            total_items,
            packed_items,
            percent,
        }
    }
}

/// A category with its items in display order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub items: Vec<Item>,
}

/// A list with its categories and items in display order
#[derive(Debug, Clone, Serialize)]
pub struct ListDetail {
    #[serde(flatten)]
    pub list: PackingList,
    pub categories: Vec<CategoryDetail>,
    pub progress: Progress,
}

async fn load_detail<S: EntityStore>(store: &S, list: PackingList) -> PackingResult<ListDetail> {
    let mut categories = store.categories_by_list(list.id).await?;
    sort_siblings(&mut categories);

    let mut details = Vec::with_capacity(categories.len());
    for category in categories {
        let mut items = store.items_by_category(category.id).await?;
        sort_siblings(&mut items);
        details.push(CategoryDetail { category, items });
    }

    let progress = Progress::from_items(details.iter().flat_map(|c| c.items.iter()));
    Ok(ListDetail {
        list,
        categories: details,
        progress,
    })
}

impl<S: EntityStore> PackingService<S> {
    /// Every list of the acting user, newest first, fully nested
    pub async fn get_user_lists(&self, actor: &Principal) -> PackingResult<Vec<ListDetail>> {
        let user = resolve_user(&self.store, actor).await?;
        let mut lists = self.store.lists_by_user(user.id).await?;
        lists.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut details = Vec::with_capacity(lists.len());
        for list in lists {
            details.push(load_detail(&self.store, list).await?);
        }
        Ok(details)
    }

    /// A single list, fully nested. Visible to its owner, or to anyone when
    /// public.
    pub async fn get_list(
        &self,
        actor: &Principal,
        list_id: ListId,
    ) -> PackingResult<Option<ListDetail>> {
        let user = resolve_user(&self.store, actor).await?;
        let Some(list) = self.store.get_list(list_id).await? else {
            return Ok(None);
        };

        if list.user_id != user.id && !list.is_public {
            return Err(PackingError::Unauthorized);
        }
        load_detail(&self.store, list).await.map(Some)
    }
}
