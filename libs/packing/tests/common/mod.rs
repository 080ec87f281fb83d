//! Shared fixtures for the packing integration tests

#![allow(dead_code)]

use packing::models::{Priority, UserRole};
use packing::service::{AddCategoryInput, AddItemInput, CreateListInput};
use packing::store::{EntityStore, MemoryStore};
use packing::{
    AccessPolicy, CategoryId, Identity, ItemId, ListId, PackingResult, PackingService, Principal,
};

pub type TestService = PackingService<MemoryStore>;

pub const ALICE: &str = "auth0|alice";
pub const BOB: &str = "auth0|bob";
pub const ADMIN: &str = "auth0|admin";

/// Service over an empty in-memory store with Alice, Bob and an admin
/// already signed in once
pub async fn service() -> TestService {
    seeded(PackingService::new(MemoryStore::new())).await
}

pub async fn strict_service() -> TestService {
    seeded(PackingService::with_policy(
        MemoryStore::new(),
        AccessPolicy::strict(),
    ))
    .await
}

async fn seeded(service: TestService) -> TestService {
    for (external_id, name) in [(ALICE, "Alice"), (BOB, "Bob"), (ADMIN, "Admin")] {
        service
            .ensure_user(Identity::new(external_id, name))
            .await
            .unwrap();
    }

    let admin = service
        .store()
        .find_user_by_external_id(ADMIN)
        .await
        .unwrap()
        .unwrap();
    service
        .store()
        .patch_user(
            admin.id,
            packing::models::UserPatch {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    service
}

pub fn alice() -> Principal {
    Principal::new(ALICE)
}

pub fn bob() -> Principal {
    Principal::new(BOB)
}

pub fn admin() -> Principal {
    Principal::new(ADMIN)
}

pub async fn list(service: &TestService, owner: &Principal, name: &str) -> ListId {
    service
        .create_list(owner, CreateListInput::named(name))
        .await
        .unwrap()
}

pub async fn category(
    service: &TestService,
    owner: &Principal,
    list_id: ListId,
    name: &str,
) -> CategoryId {
    service
        .add_category(
            owner,
            list_id,
            AddCategoryInput {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

pub async fn item(
    service: &TestService,
    owner: &Principal,
    category_id: CategoryId,
    name: &str,
    packed: bool,
) -> PackingResult<ItemId> {
    let mut input = AddItemInput::new(name, 1, Priority::Medium);
    input.packed = packed;
    service.add_item(owner, category_id, input).await
}

/// The "Beach Trip" list: Clothing holds Swimsuit (unpacked) and
/// Sunscreen (packed)
pub async fn beach_trip(service: &TestService, owner: &Principal) -> ListId {
    let list_id = list(service, owner, "Beach Trip").await;
    let clothing = category(service, owner, list_id, "Clothing").await;

    let mut swimsuit = AddItemInput::new("Swimsuit", 1, Priority::Essential);
    swimsuit.notes = Some("The blue one".to_string());
    service.add_item(owner, clothing, swimsuit).await.unwrap();

    let mut sunscreen = AddItemInput::new("Sunscreen", 2, Priority::High);
    sunscreen.packed = true;
    service.add_item(owner, clothing, sunscreen).await.unwrap();

    list_id
}
