//! Default placement, reorder and move

mod common;

use common::{alice, category, item, list, service};
use packing::ordering::sort_siblings;
use packing::store::EntityStore;
use packing::{CategoryId, ItemId};

async fn item_orders(
    service: &common::TestService,
    category_id: CategoryId,
) -> Vec<(ItemId, i32)> {
    let mut items = service
        .store()
        .items_by_category(category_id)
        .await
        .unwrap();
    sort_siblings(&mut items);
    items.into_iter().map(|i| (i.id, i.order)).collect()
}

#[tokio::test]
async fn test_default_order_is_dense_from_zero() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let list_id = list(&service, &alice, "Dense").await;
    let category_id = category(&service, &alice, list_id, "Stuff").await;

    let mut inserted = Vec::new();
    for n in 0..5 {
        inserted.push(item(&service, &alice, category_id, &format!("Item {}", n), false).await?);
    }

    let orders = item_orders(&service, category_id).await;
    let expected: Vec<(ItemId, i32)> = inserted.into_iter().zip(0..).collect();
    assert_eq!(orders, expected);

    // Categories follow the same rule
    let second = category(&service, &alice, list_id, "More").await;
    assert_eq!(service.store().get_category(second).await?.unwrap().order, 1);
    Ok(())
}

#[tokio::test]
async fn test_reorder_items_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let list_id = list(&service, &alice, "Shuffle").await;
    let category_id = category(&service, &alice, list_id, "Deck").await;

    let a = item(&service, &alice, category_id, "A", false).await?;
    let b = item(&service, &alice, category_id, "B", false).await?;
    let c = item(&service, &alice, category_id, "C", false).await?;

    service.reorder_items(&alice, category_id, &[c, a, b]).await?;
    let once = item_orders(&service, category_id).await;
    assert_eq!(once, vec![(c, 0), (a, 1), (b, 2)]);

    service.reorder_items(&alice, category_id, &[c, a, b]).await?;
    assert_eq!(item_orders(&service, category_id).await, once);
    Ok(())
}

#[tokio::test]
async fn test_reorder_is_permissive() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let list_id = list(&service, &alice, "Partial").await;
    let here = category(&service, &alice, list_id, "Here").await;
    let elsewhere = category(&service, &alice, list_id, "Elsewhere").await;

    let a = item(&service, &alice, here, "A", false).await?;
    let b = item(&service, &alice, here, "B", false).await?;
    let c = item(&service, &alice, here, "C", false).await?;
    let stranger = item(&service, &alice, elsewhere, "Stranger", false).await?;

    // The stranger is skipped and keeps its category; `a` is omitted and
    // keeps order 0, tying with `c`
    service
        .reorder_items(&alice, here, &[c, stranger, b])
        .await?;

    let store = service.store();
    assert_eq!(store.get_item(c).await?.unwrap().order, 0);
    assert_eq!(store.get_item(b).await?.unwrap().order, 2);
    assert_eq!(store.get_item(a).await?.unwrap().order, 0);

    let stranger = store.get_item(stranger).await?.unwrap();
    assert_eq!(stranger.category_id, elsewhere);
    assert_eq!(stranger.order, 0);
    Ok(())
}

#[tokio::test]
async fn test_reorder_categories() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let list_id = list(&service, &alice, "Sections").await;
    let first = category(&service, &alice, list_id, "First").await;
    let second = category(&service, &alice, list_id, "Second").await;

    service
        .reorder_categories(&alice, list_id, &[second, first])
        .await?;

    let detail = service.get_list(&alice, list_id).await?.unwrap();
    let names: Vec<_> = detail
        .categories
        .iter()
        .map(|c| c.category.name.as_str())
        .collect();
    assert_eq!(names, ["Second", "First"]);
    Ok(())
}

#[tokio::test]
async fn test_move_item_appends_to_target() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let list_id = list(&service, &alice, "Moves").await;
    let from = category(&service, &alice, list_id, "From").await;
    let to = category(&service, &alice, list_id, "To").await;

    let mover = item(&service, &alice, from, "Mover", true).await?;
    item(&service, &alice, to, "Resident 1", false).await?;
    item(&service, &alice, to, "Resident 2", false).await?;

    assert_eq!(service.move_item(&alice, mover, to).await?, 2);

    let moved = service.store().get_item(mover).await?.unwrap();
    assert_eq!(moved.category_id, to);
    assert_eq!(moved.order, 2);
    assert!(moved.packed);
    assert!(item_orders(&service, from).await.is_empty());

    // Moving into its own category changes nothing
    assert_eq!(service.move_item(&alice, mover, to).await?, 2);
    Ok(())
}
