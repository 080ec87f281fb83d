//! Moderation records, queue tolerance and duplicate cleanup

mod common;

use common::{admin, alice, beach_trip, bob, service};
use packing::models::{ContentType, ModerationStatus, NewModerationRecord};
use packing::store::EntityStore;
use packing::PackingError;

#[tokio::test]
async fn test_duplicate_report_returns_existing_record() -> Result<(), Box<dyn std::error::Error>>
{
    let service = service().await;
    let (alice, bob) = (alice(), bob());
    let list_id = beach_trip(&service, &alice).await;
    let content_id = list_id.to_string();

    let first = service
        .create_moderation_record(&bob, &content_id, ContentType::List, Some("Spam".into()))
        .await?;
    let second = service
        .create_moderation_record(&alice, &content_id, ContentType::List, None)
        .await?;
    assert_eq!(first, second);

    let records = service.store().moderation_records(None).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, ModerationStatus::Pending);

    // Same id under another content type is a different pair
    let other = service
        .create_moderation_record(&bob, &content_id, ContentType::Template, None)
        .await?;
    assert_ne!(other, first);
    Ok(())
}

#[tokio::test]
async fn test_queue_skips_dangling_content() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let (alice, bob, admin) = (alice(), bob(), admin());

    let kept = beach_trip(&service, &alice).await;
    let doomed = beach_trip(&service, &alice).await;
    let bob_user = service.current_user(&bob).await?;

    service
        .create_moderation_record(&bob, &kept.to_string(), ContentType::List, None)
        .await?;
    service
        .create_moderation_record(&bob, &doomed.to_string(), ContentType::List, None)
        .await?;
    service
        .create_moderation_record(&alice, &bob_user.id.to_string(), ContentType::User, None)
        .await?;
    service
        .create_moderation_record(&alice, "not-a-uuid", ContentType::Template, None)
        .await?;

    service.delete_list(&alice, doomed).await?;

    let queue = service.moderation_queue(&admin, None).await?;
    assert_eq!(queue.len(), 2);
    let kept_id = kept.to_string();
    let bob_id = bob_user.id.to_string();
    assert!(queue.iter().any(|e| e.record.content_id == kept_id));
    assert!(queue
        .iter()
        .any(|e| e.record.content_id == bob_id && e.content_title == "Bob"));
    assert!(queue
        .iter()
        .all(|e| e.record.content_id != doomed.to_string()));
    Ok(())
}

#[tokio::test]
async fn test_status_updates_build_history() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let (alice, bob, admin) = (alice(), bob(), admin());
    let list_id = beach_trip(&service, &alice).await;

    let record_id = service
        .create_moderation_record(&bob, &list_id.to_string(), ContentType::List, None)
        .await?;

    assert!(matches!(
        service
            .update_moderation_status(&bob, record_id, ModerationStatus::Approved, None)
            .await,
        Err(PackingError::Unauthorized)
    ));

    service
        .update_moderation_status(
            &admin,
            record_id,
            ModerationStatus::Flagged,
            Some("Needs a look".to_string()),
        )
        .await?;
    service
        .update_moderation_status(&admin, record_id, ModerationStatus::Approved, None)
        .await?;

    let history = service.moderation_history(&admin, record_id).await?;
    let statuses: Vec<_> = history.iter().map(|h| h.status).collect();
    assert_eq!(
        statuses,
        [
            ModerationStatus::Pending,
            ModerationStatus::Flagged,
            ModerationStatus::Approved
        ]
    );

    let record = service.store().get_moderation(record_id).await?.unwrap();
    let admin_user = service.current_user(&admin).await?;
    assert_eq!(record.status, ModerationStatus::Approved);
    assert_eq!(record.reviewed_by, Some(admin_user.id));

    let approved = service
        .moderation_queue(&admin, Some(ModerationStatus::Approved))
        .await?;
    assert_eq!(approved.len(), 1);
    assert!(service
        .moderation_queue(&admin, Some(ModerationStatus::Pending))
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cleanup_keeps_oldest_record() -> Result<(), Box<dyn std::error::Error>> {
    let service = service().await;
    let admin = admin();

    // Duplicates can only appear by writing past the service
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(
            service
                .store()
                .insert_moderation(NewModerationRecord {
                    content_id: "shared".to_string(),
                    content_type: ContentType::User,
                    status: ModerationStatus::Pending,
                    reason: None,
                    reported_by: None,
                })
                .await?,
        );
    }
    let oldest = service
        .store()
        .find_moderation("shared", ContentType::User)
        .await?
        .unwrap()
        .id;

    assert!(matches!(
        service.cleanup_duplicate_moderation_records(&alice()).await,
        Err(PackingError::Unauthorized)
    ));
    assert_eq!(
        service.cleanup_duplicate_moderation_records(&admin).await?,
        2
    );

    let remaining = service.store().moderation_records(None).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, oldest);
    assert!(ids.contains(&oldest));

    // Nothing left to clean
    assert_eq!(
        service.cleanup_duplicate_moderation_records(&admin).await?,
        0
    );
    Ok(())
}
