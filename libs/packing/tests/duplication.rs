//! Duplicating lists and round-tripping through templates

mod common;

use std::collections::HashSet;

use common::{alice, beach_trip, bob, category, item, list, service};
use packing::builtin_templates::BEACH_VACATION_ID;
use packing::models::{ListPatch, Priority};
use packing::service::{AddItemInput, ListDetail, SaveTemplateInput};
use packing::store::EntityStore;
use packing::{PackingError, TemplateId};

/// (category name, [(item name, quantity, priority, packed)]) in display
/// order
fn shape(detail: &ListDetail) -> Vec<(String, Vec<(String, i32, Priority, bool)>)> {
    detail
        .categories
        .iter()
        .map(|c| {
            (
                c.category.name.clone(),
                c.items
                    .iter()
                    .map(|i| (i.name.clone(), i.quantity, i.priority, i.packed))
                    .collect(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_duplicate_beach_trip() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let source_id = beach_trip(&service, &alice).await;

    let copy_id = service.duplicate_list(&alice, source_id, None).await?;
    assert_ne!(copy_id, source_id);

    let copy = service.get_list(&alice, copy_id).await?.unwrap();
    assert_eq!(copy.list.name, "Copy of Beach Trip");
    assert!(!copy.list.is_public);
    assert!(!copy.list.is_template);

    assert_eq!(copy.categories.len(), 1);
    let clothing = &copy.categories[0];
    assert_eq!(clothing.category.name, "Clothing");
    assert_eq!(clothing.category.order, 0);

    let items: Vec<_> = clothing
        .items
        .iter()
        .map(|i| (i.name.as_str(), i.order, i.packed))
        .collect();
    assert_eq!(items, [("Swimsuit", 0, false), ("Sunscreen", 1, false)]);

    // The source is untouched
    let source = service.get_list(&alice, source_id).await?.unwrap();
    assert!(source.categories[0].items[1].packed);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_resets_packed_and_keeps_fields() -> Result<(), Box<dyn std::error::Error>>
{
    let service = service().await;
    let alice = alice();
    let source_id = list(&service, &alice, "All packed").await;
    let mut source_ids = HashSet::new();
    for category_name in ["Bags", "Tech"] {
        let category_id = category(&service, &alice, source_id, category_name).await;
        source_ids.insert(category_id.to_string());
        for n in 0..3 {
            let mut input = AddItemInput::new(format!("{} {}", category_name, n), n + 1, Priority::Low);
            input.packed = true;
            input.notes = Some(format!("note {}", n));
            source_ids.insert(service.add_item(&alice, category_id, input).await?.to_string());
        }
    }

    let copy_id = service
        .duplicate_list(&alice, source_id, Some("Next time".to_string()))
        .await?;
    let source = service.get_list(&alice, source_id).await?.unwrap();
    let copy = service.get_list(&alice, copy_id).await?.unwrap();
    assert_eq!(copy.list.name, "Next time");

    for (original, duplicated) in source.categories.iter().zip(&copy.categories) {
        assert_eq!(original.category.name, duplicated.category.name);
        assert!(!source_ids.contains(&duplicated.category.id.to_string()));

        for (a, b) in original.items.iter().zip(&duplicated.items) {
            assert!(a.packed);
            assert!(!b.packed);
            assert_eq!(a.name, b.name);
            assert_eq!(a.quantity, b.quantity);
            assert_eq!(a.priority, b.priority);
            assert_eq!(a.notes, b.notes);
            assert_ne!(a.id, b.id);
            assert!(!source_ids.contains(&b.id.to_string()));
        }
    }
    assert_eq!(copy.progress.total_items, 6);
    assert_eq!(copy.progress.packed_items, 0);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_requires_ownership_or_public() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let (alice, bob) = (alice(), bob());
    let list_id = beach_trip(&service, &alice).await;

    assert!(matches!(
        service.duplicate_list(&bob, list_id, None).await,
        Err(PackingError::Unauthorized)
    ));

    service
        .update_list(
            &alice,
            list_id,
            ListPatch {
                is_public: Some(true),
                ..Default::default()
            },
        )
        .await?;

    // Public lists are duplicable by anyone; the copy belongs to Bob
    let copy_id = service.duplicate_list(&bob, list_id, None).await?;
    let copy = service.get_list(&bob, copy_id).await?.unwrap();
    let bob_user = service.current_user(&bob).await?;
    assert_eq!(copy.list.user_id, bob_user.id);
    assert!(!copy.list.is_public);
    Ok(())
}

#[tokio::test]
async fn test_template_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let alice = alice();
    let source_id = beach_trip(&service, &alice).await;
    let toiletries = category(&service, &alice, source_id, "Toiletries").await;
    item(&service, &alice, toiletries, "Toothbrush", true).await?;

    let template_id = service
        .save_list_as_template(&alice, source_id, SaveTemplateInput::default())
        .await?;
    let template = service.get_template(&alice, template_id).await?.unwrap();
    assert_eq!(template.name, "Beach Trip");
    assert_eq!(template.usage_count, 0);
    assert_eq!(template.item_count(), 3);

    let applied_id = service
        .apply_template(&alice, template_id, "Beach Trip 2027")
        .await?
        .unwrap();

    let source = service.get_list(&alice, source_id).await?.unwrap();
    let applied = service.get_list(&alice, applied_id).await?.unwrap();
    assert_eq!(applied.list.name, "Beach Trip 2027");
    assert_eq!(applied.list.template_id, Some(template_id));
    assert_eq!(
        applied.list.description.as_deref(),
        Some("Created from Beach Trip template")
    );

    let unpacked: Vec<_> = shape(&source)
        .into_iter()
        .map(|(name, items)| {
            let items = items
                .into_iter()
                .map(|(n, q, p, _)| (n, q, p, false))
                .collect();
            (name, items)
        })
        .collect();
    assert_eq!(shape(&applied), unpacked);

    // Applying a user template counts its usage
    let template = service.get_template(&alice, template_id).await?.unwrap();
    assert_eq!(template.usage_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_apply_builtin_template() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let bob = bob();

    let list_id = service
        .apply_template(&bob, BEACH_VACATION_ID, "Nice in June")
        .await?
        .unwrap();
    let detail = service.get_list(&bob, list_id).await?.unwrap();

    let builtin = service.get_template(&bob, BEACH_VACATION_ID).await?.unwrap();
    assert_eq!(detail.categories.len(), builtin.categories.len());
    assert_eq!(detail.progress.total_items, builtin.item_count());
    assert_eq!(detail.list.tags, builtin.tags);
    for (index, category) in detail.categories.iter().enumerate() {
        assert_eq!(category.category.order as usize, index);
        assert_eq!(category.category.name, builtin.categories[index].name);
    }
    Ok(())
}

#[tokio::test]
async fn test_apply_unknown_or_foreign_template_is_empty() -> Result<(), Box<dyn std::error::Error>>
{
    let service = service().await;
    let (alice, bob) = (alice(), bob());

    assert!(service
        .apply_template(&alice, TemplateId::new(), "Nowhere")
        .await?
        .is_none());

    // Bob's templates are not Alice's to apply, even public ones
    let bob_list = beach_trip(&service, &bob).await;
    let bob_template = service
        .save_list_as_template(
            &bob,
            bob_list,
            SaveTemplateInput {
                is_public: true,
                ..Default::default()
            },
        )
        .await?;
    assert!(service
        .apply_template(&alice, bob_template, "Borrowed")
        .await?
        .is_none());
    assert!(service.get_user_lists(&alice).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_template_catalogue_and_deletion() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let (alice, bob) = (alice(), bob());
    let list_id = beach_trip(&service, &alice).await;

    let private = service
        .save_list_as_template(
            &alice,
            list_id,
            SaveTemplateInput {
                name: Some("Private".to_string()),
                ..Default::default()
            },
        )
        .await?;
    let public = service
        .save_list_as_template(
            &alice,
            list_id,
            SaveTemplateInput {
                name: Some("Shared".to_string()),
                is_public: true,
                ..Default::default()
            },
        )
        .await?;

    let builtin_count = packing::builtin_templates::builtin_templates().len();
    assert_eq!(service.available_templates(&alice).await?.len(), builtin_count + 2);
    let for_bob = service.available_templates(&bob).await?;
    assert_eq!(for_bob.len(), builtin_count + 1);
    assert!(for_bob.iter().any(|t| t.id == public));

    assert!(matches!(
        service.get_template(&bob, private).await,
        Err(PackingError::Unauthorized)
    ));
    assert!(matches!(
        service.delete_template(&bob, public).await,
        Err(PackingError::Unauthorized)
    ));
    assert!(matches!(
        service.delete_template(&alice, BEACH_VACATION_ID).await,
        Err(PackingError::Unauthorized)
    ));

    service.delete_template(&alice, private).await?;
    assert!(service.store().get_template(private).await?.is_none());
    Ok(())
}
