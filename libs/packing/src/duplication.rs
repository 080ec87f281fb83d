//! Deep copies between lists and templates
//!
//! Every copy gets fresh identities, parent references are re-pointed at the
//! new parents and `packed` is always reset to `false`.

use crate::error::PackingResult;
use crate::ids::ListId;
use crate::models::{NewCategory, NewItem, Template, TemplateCategory, TemplateItem};
use crate::ordering::sort_siblings;
use crate::store::EntityStore;

/// Copy every category and item of `source` under `target`, preserving
/// order values. Returns the number of items copied.
pub async fn copy_list_contents<S: EntityStore>(
    store: &S,
    source: ListId,
    target: ListId,
) -> PackingResult<usize> {
    let mut copied = 0;
    let mut categories = store.categories_by_list(source).await?;
    sort_siblings(&mut categories);

    for category in categories {
        let new_category = store
            .insert_category(NewCategory {
                list_id: target,
                name: category.name,
                color: category.color,
                icon: category.icon,
                order: category.order,
                collapsed: category.collapsed,
            })
            .await?;

        let mut items = store.items_by_category(category.id).await?;
        sort_siblings(&mut items);

        for item in items {
            store
                .insert_item(NewItem {
                    category_id: new_category,
                    name: item.name,
                    quantity: item.quantity,
                    packed: false,
                    priority: item.priority,
                    notes: item.notes,
                    description: item.description,
                    weight: item.weight,
                    tags: item.tags,
                    order: item.order,
                })
                .await?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Materialise a template's categories and items under `target`. Authored
/// array order becomes the order value.
pub async fn instantiate_template<S: EntityStore>(
    store: &S,
    template: &Template,
    target: ListId,
) -> PackingResult<usize> {
    let mut created = 0;
    for (category_index, category) in template.categories.iter().enumerate() {
        let category_id = store
            .insert_category(NewCategory {
                list_id: target,
                name: category.name.clone(),
                color: category.color.clone(),
                icon: category.icon.clone(),
                order: position(category_index),
                collapsed: false,
            })
            .await?;

        for (item_index, item) in category.items.iter().enumerate() {
            store
                .insert_item(NewItem {
                    category_id,
                    name: item.name.clone(),
                    quantity: item.quantity,
                    packed: false,
                    priority: item.priority,
                    notes: item.notes.clone(),
                    description: item.description.clone(),
                    weight: item.weight,
                    tags: item.tags.clone(),
                    order: position(item_index),
                })
                .await?;
            created += 1;
        }
    }
    Ok(created)
}

/// Value snapshot of a list's current categories and items, in display
/// order, with no foreign keys and no packed state.
pub async fn snapshot_list<S: EntityStore>(
    store: &S,
    list_id: ListId,
) -> PackingResult<Vec<TemplateCategory>> {
    let mut categories = store.categories_by_list(list_id).await?;
    sort_siblings(&mut categories);

    let mut snapshot = Vec::with_capacity(categories.len());
    for category in categories {
        let mut items = store.items_by_category(category.id).await?;
        sort_siblings(&mut items);

        snapshot.push(TemplateCategory {
            name: category.name,
            color: category.color,
            icon: category.icon,
            items: items
                .into_iter()
                .map(|item| TemplateItem {
                    name: item.name,
                    quantity: item.quantity,
                    priority: item.priority,
                    notes: item.notes,
                    description: item.description,
                    weight: item.weight,
                    tags: item.tags,
                })
                .collect(),
        });
    }
    Ok(snapshot)
}

fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
