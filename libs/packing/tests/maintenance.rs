//! Orphan sweep, statistics and user bootstrap

mod common;

use common::{admin, alice, beach_trip, bob, category, item, list, service};
use packing::models::{NewCategory, NewItem, Priority};
use packing::store::EntityStore;
use packing::{CategoryId, Identity, ListId, PackingError, Principal};

#[tokio::test]
async fn test_sweep_removes_orphans_idempotently() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let list_id = list(&service, &alice, "Healthy").await;
    let healthy = category(&service, &alice, list_id, "Fine").await;
    let healthy_item = item(&service, &alice, healthy, "Hat", false).await?;

    // Leftovers of an interrupted cascade
    let store = service.store();
    let stray_category = store
        .insert_category(NewCategory {
            list_id: ListId::new(),
            name: "Stray".to_string(),
            color: None,
            icon: None,
            order: 0,
            collapsed: false,
        })
        .await?;
    for category_id in [stray_category, CategoryId::new()] {
        store
            .insert_item(NewItem {
                category_id,
                name: "Lost".to_string(),
                quantity: 1,
                packed: false,
                priority: Priority::Low,
                notes: None,
                description: None,
                weight: None,
                tags: Vec::new(),
                order: 0,
            })
            .await?;
    }

    let report = service.sweep_orphans().await?;
    assert_eq!(report.categories, 1);
    assert_eq!(report.items, 2);
    assert!(store.get_category(stray_category).await?.is_none());
    assert!(store.get_item(healthy_item).await?.is_some());

    assert!(service.sweep_orphans().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_admin_sweep_rejects_non_admins() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;

    assert!(matches!(
        service.sweep_orphans_as(&alice()).await,
        Err(PackingError::Unauthorized)
    ));
    assert!(matches!(
        service.sweep_orphans_as(&Principal::new("auth0|stranger")).await,
        Err(PackingError::NotFound { .. })
    ));
    assert!(service.sweep_orphans_as(&admin()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_platform_stats_are_admin_only() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    beach_trip(&service, &alice).await;

    assert!(matches!(
        service.platform_stats(&alice).await,
        Err(PackingError::Unauthorized)
    ));

    let stats = service.platform_stats(&admin()).await?;
    assert_eq!(stats.users, 3);
    assert_eq!(stats.lists, 1);
    assert_eq!(stats.items, 2);
    assert_eq!(stats.packed_items, 1);
    assert_eq!(stats.pending_moderation, 0);
    Ok(())
}

#[tokio::test]
async fn test_ensure_user_is_lazy_and_stable() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;

    let first = service
        .ensure_user(Identity {
            external_id: "auth0|carol".to_string(),
            display_name: None,
            email: Some("not an email".to_string()),
        })
        .await?;
    assert_eq!(first.display_name, "Traveler");
    assert!(first.email.is_none());

    let again = service
        .ensure_user(Identity::new("auth0|carol", "Carol"))
        .await?;
    assert_eq!(again.id, first.id);

    let unknown = Principal::new("auth0|nobody");
    assert!(matches!(
        service.current_user(&unknown).await,
        Err(PackingError::NotFound { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_update_preferences() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let bob = bob();

    let user = service
        .update_preferences(&bob, serde_json::json!({"units": "metric"}))
        .await?;
    assert_eq!(user.preferences["units"], "metric");

    assert!(matches!(
        service
            .update_preferences(&bob, serde_json::json!(["not", "an", "object"]))
            .await,
        Err(PackingError::Validation(_))
    ));
    Ok(())
}
