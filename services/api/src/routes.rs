//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use packing::models::{CategoryPatch, ItemPatch, ListPatch};
use packing::service::{
    AddCategoryInput, AddItemInput, CreateListInput, CreateTemplateInput, SaveTemplateInput,
};
use packing::store::EntityStore;
use packing::{CategoryId, ItemId, ListId, ModerationId, TemplateId};
use serde_json::{Value, json};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{
        ApplyTemplateRequest, DuplicateListRequest, IdResponse, ModerationQuery,
        ModerationStatusRequest, MoveItemRequest, ReorderCategoriesRequest, ReorderItemsRequest,
        ReportContentRequest,
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router<S: EntityStore + Clone>(state: AppState<S>) -> Router {
    let protected_routes = Router::new()
        .route("/me", get(current_user::<S>))
        .route("/me/preferences", put(update_preferences::<S>))
        .route("/lists", get(get_user_lists::<S>).post(create_list::<S>))
        .route(
            "/lists/:id",
            get(get_list::<S>)
                .patch(update_list::<S>)
                .delete(delete_list::<S>),
        )
        .route("/lists/:id/complete", post(mark_list_completed::<S>))
        .route("/lists/:id/incomplete", post(mark_list_incomplete::<S>))
        .route("/lists/:id/duplicate", post(duplicate_list::<S>))
        .route("/lists/:id/reset", post(reset_list_packing::<S>))
        .route("/lists/:id/template", post(save_list_as_template::<S>))
        .route("/lists/:id/categories", post(add_category::<S>))
        .route("/lists/:id/categories/order", put(reorder_categories::<S>))
        .route(
            "/categories/:id",
            patch(update_category::<S>).delete(delete_category::<S>),
        )
        .route("/categories/:id/collapse", post(toggle_category_collapse::<S>))
        .route("/categories/:id/items", post(add_item::<S>))
        .route("/categories/:id/items/order", put(reorder_items::<S>))
        .route("/items/:id", patch(update_item::<S>).delete(delete_item::<S>))
        .route("/items/:id/packed", post(toggle_item_packed::<S>))
        .route("/items/:id/move", post(move_item::<S>))
        .route(
            "/templates",
            get(available_templates::<S>).post(create_template::<S>),
        )
        .route(
            "/templates/:id",
            get(get_template::<S>).delete(delete_template::<S>),
        )
        .route("/templates/:id/apply", post(apply_template::<S>))
        .route("/moderation", post(report_content::<S>))
        .route("/admin/moderation", get(moderation_queue::<S>))
        .route("/admin/moderation/cleanup", post(cleanup_moderation::<S>))
        .route("/admin/moderation/:id", put(update_moderation_status::<S>))
        .route("/admin/moderation/:id/history", get(moderation_history::<S>))
        .route("/admin/maintenance/sweep", post(sweep_orphans::<S>))
        .route("/admin/stats", get(platform_stats::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

fn created<T: serde::Serialize>(id: T) -> impl IntoResponse {
    (StatusCode::CREATED, Json(IdResponse { id }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "packing-api"
    }))
}

// Users

async fn current_user<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.current_user(&auth.principal).await?))
}

async fn update_preferences<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Json(preferences): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .service
        .update_preferences(&auth.principal, preferences)
        .await?;
    Ok(Json(user))
}

// Lists

async fn get_user_lists<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.get_user_lists(&auth.principal).await?))
}

async fn create_list<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<CreateListInput>,
) -> ApiResult<impl IntoResponse> {
    let id = state.service.create_list(&auth.principal, input).await?;
    Ok(created(id))
}

async fn get_list<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
) -> ApiResult<impl IntoResponse> {
    let list = state
        .service
        .get_list(&auth.principal, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("List not found: {}", id)))?;
    Ok(Json(list))
}

async fn update_list<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
    Json(patch): Json<ListPatch>,
) -> ApiResult<impl IntoResponse> {
    let id = state.service.update_list(&auth.principal, id, patch).await?;
    Ok(Json(IdResponse { id }))
}

async fn delete_list<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.delete_list(&auth.principal, id).await?))
}

async fn mark_list_completed<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .mark_list_completed(&auth.principal, id)
        .await?;
    Ok(Json(IdResponse { id }))
}

async fn mark_list_incomplete<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .mark_list_incomplete(&auth.principal, id)
        .await?;
    Ok(Json(IdResponse { id }))
}

async fn duplicate_list<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
    payload: Option<Json<DuplicateListRequest>>,
) -> ApiResult<impl IntoResponse> {
    let name = payload.and_then(|Json(payload)| payload.name);
    let id = state
        .service
        .duplicate_list(&auth.principal, id, name)
        .await?;
    Ok(created(id))
}

async fn reset_list_packing<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
) -> ApiResult<impl IntoResponse> {
    let unpacked = state
        .service
        .reset_list_packing(&auth.principal, id)
        .await?;
    Ok(Json(json!({ "unpacked": unpacked })))
}

async fn save_list_as_template<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ListId>,
    input: Option<Json<SaveTemplateInput>>,
) -> ApiResult<impl IntoResponse> {
    let input = input.map(|Json(input)| input).unwrap_or_default();
    let id = state
        .service
        .save_list_as_template(&auth.principal, id, input)
        .await?;
    Ok(created(id))
}

// Categories

async fn add_category<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(list_id): Path<ListId>,
    Json(input): Json<AddCategoryInput>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .add_category(&auth.principal, list_id, input)
        .await?;
    Ok(created(id))
}

async fn reorder_categories<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(list_id): Path<ListId>,
    Json(payload): Json<ReorderCategoriesRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .service
        .reorder_categories(&auth.principal, list_id, &payload.ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_category<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<CategoryId>,
    Json(patch): Json<CategoryPatch>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .update_category(&auth.principal, id, patch)
        .await?;
    Ok(Json(IdResponse { id }))
}

async fn delete_category<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<CategoryId>,
) -> ApiResult<impl IntoResponse> {
    let items = state.service.delete_category(&auth.principal, id).await?;
    Ok(Json(json!({ "items": items })))
}

async fn toggle_category_collapse<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<CategoryId>,
) -> ApiResult<impl IntoResponse> {
    let collapsed = state
        .service
        .toggle_category_collapse(&auth.principal, id)
        .await?;
    Ok(Json(json!({ "collapsed": collapsed })))
}

// Items

async fn add_item<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(category_id): Path<CategoryId>,
    Json(input): Json<AddItemInput>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .add_item(&auth.principal, category_id, input)
        .await?;
    Ok(created(id))
}

async fn reorder_items<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(category_id): Path<CategoryId>,
    Json(payload): Json<ReorderItemsRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .service
        .reorder_items(&auth.principal, category_id, &payload.ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_item<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ItemId>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<impl IntoResponse> {
    let id = state.service.update_item(&auth.principal, id, patch).await?;
    Ok(Json(IdResponse { id }))
}

async fn delete_item<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ItemId>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete_item(&auth.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_item_packed<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ItemId>,
) -> ApiResult<impl IntoResponse> {
    let packed = state
        .service
        .toggle_item_packed(&auth.principal, id)
        .await?;
    Ok(Json(json!({ "packed": packed })))
}

async fn move_item<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ItemId>,
    Json(payload): Json<MoveItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let order = state
        .service
        .move_item(&auth.principal, id, payload.category_id)
        .await?;
    Ok(Json(json!({ "order": order })))
}

// Templates

async fn available_templates<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state.service.available_templates(&auth.principal).await?,
    ))
}

async fn create_template<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<CreateTemplateInput>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .create_template(&auth.principal, input)
        .await?;
    Ok(created(id))
}

async fn get_template<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<TemplateId>,
) -> ApiResult<impl IntoResponse> {
    let template = state
        .service
        .get_template(&auth.principal, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Template not found: {}", id)))?;
    Ok(Json(template))
}

async fn delete_template<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<TemplateId>,
) -> ApiResult<impl IntoResponse> {
    state.service.delete_template(&auth.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_template<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<TemplateId>,
    Json(payload): Json<ApplyTemplateRequest>,
) -> ApiResult<impl IntoResponse> {
    let list_id = state
        .service
        .apply_template(&auth.principal, id, &payload.name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Template not found: {}", id)))?;
    Ok(created(list_id))
}

// Moderation and administration

async fn report_content<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ReportContentRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = state
        .service
        .create_moderation_record(
            &auth.principal,
            &payload.content_id,
            payload.content_type,
            payload.reason,
        )
        .await?;
    Ok(created(id))
}

async fn moderation_queue<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ModerationQuery>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .service
            .moderation_queue(&auth.principal, query.status)
            .await?,
    ))
}

async fn update_moderation_status<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ModerationId>,
    Json(payload): Json<ModerationStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .service
        .update_moderation_status(&auth.principal, id, payload.status, payload.reason)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn moderation_history<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<ModerationId>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state
            .service
            .moderation_history(&auth.principal, id)
            .await?,
    ))
}

async fn cleanup_moderation<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let removed = state
        .service
        .cleanup_duplicate_moderation_records(&auth.principal)
        .await?;
    Ok(Json(json!({ "removed": removed })))
}

async fn sweep_orphans<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.sweep_orphans_as(&auth.principal).await?))
}

async fn platform_stats<S: EntityStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.platform_stats(&auth.principal).await?))
}
