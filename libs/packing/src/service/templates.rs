use serde::Deserialize;
use tracing::{debug, info};

use super::PackingService;
use crate::builtin_templates::{builtin_templates, find_builtin};
use crate::duplication::{instantiate_template, snapshot_list};
use crate::error::{EntityKind, PackingError, PackingResult};
use crate::guard::{assert_owns_list, resolve_user, Principal};
use crate::ids::{ListId, TemplateId};
use crate::models::{NewList, NewTemplate, Template, TemplateCategory};
use crate::store::EntityStore;
use crate::validation::{
    normalize_tags, normalize_text, validate_color, validate_name, validate_quantity,
    validate_weight,
};

/// Fields accepted by [`PackingService::create_template`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTemplateInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub categories: Vec<TemplateCategory>,
}

/// Fields accepted by [`PackingService::save_list_as_template`]. Name,
/// description and tags default to the list's own.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveTemplateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_public: bool,
}

fn validate_blueprint(categories: Vec<TemplateCategory>) -> PackingResult<Vec<TemplateCategory>> {
    categories
        .into_iter()
        .map(|mut category| -> PackingResult<TemplateCategory> {
            category.name = validate_name("Category name", &category.name)?;
            category.color = normalize_text(category.color);
            if let Some(color) = &category.color {
                validate_color(color)?;
            }
            for item in &mut category.items {
                item.name = validate_name("Item name", &item.name)?;
                validate_quantity(item.quantity)?;
                if let Some(weight) = item.weight {
                    validate_weight(weight)?;
                }
                item.tags = normalize_tags(std::mem::take(&mut item.tags))?;
            }
            Ok(category)
        })
        .collect()
}

impl<S: EntityStore> PackingService<S> {
    /// Snapshot a list the actor owns into a new template
    pub async fn save_list_as_template(
        &self,
        actor: &Principal,
        list_id: ListId,
        input: SaveTemplateInput,
    ) -> PackingResult<TemplateId> {
        let list = assert_owns_list(&self.store, actor, list_id).await?;

        let name = match input.name {
            Some(name) => validate_name("Template name", &name)?,
            None => list.name,
        };
        let tags = match input.tags {
            Some(tags) => normalize_tags(tags)?,
            None => list.tags,
        };
        let categories = snapshot_list(&self.store, list_id).await?;

        let template_id = self
            .store
            .insert_template(NewTemplate {
                name,
                description: normalize_text(input.description).or(list.description),
                tags,
                is_public: input.is_public,
                creator_id: list.user_id,
                difficulty: None,
                season: None,
                duration: None,
                categories,
            })
            .await?;

        info!("Saved list {} as template {}", list_id, template_id);
        Ok(template_id)
    }

    /// Create a list from one of the actor's templates or a built-in one.
    ///
    /// Returns `None` when the template is found in neither.
    pub async fn apply_template(
        &self,
        actor: &Principal,
        template_id: TemplateId,
        list_name: &str,
    ) -> PackingResult<Option<ListId>> {
        let user = resolve_user(&self.store, actor).await?;
        let name = validate_name("List name", list_name)?;

        let owned = self
            .store
            .get_template(template_id)
            .await?
            .filter(|t| t.is_owned_by(user.id));
        let Some(template) = owned.or_else(|| find_builtin(template_id).cloned()) else {
            debug!(
                "Template {} is neither owned by {} nor built in",
                template_id, user.id
            );
            return Ok(None);
        };

        let tx = self.store.begin().await?;
        let list_id = tx
            .insert_list(NewList {
                user_id: user.id,
                name,
                description: Some(format!("Created from {} template", template.name)),
                tags: template.tags.clone(),
                is_template: false,
                is_public: false,
                template_id: Some(template.id),
            })
            .await?;
        let items = instantiate_template(&tx, &template, list_id).await?;
        if !template.is_builtin() {
            tx.increment_template_usage(template.id).await?;
        }
        tx.commit().await?;

        info!(
            "User {} applied template {} as list {} ({} items)",
            user.id, template.id, list_id, items
        );
        Ok(Some(list_id))
    }

    pub async fn create_template(
        &self,
        actor: &Principal,
        input: CreateTemplateInput,
    ) -> PackingResult<TemplateId> {
        let user = resolve_user(&self.store, actor).await?;

        let template_id = self
            .store
            .insert_template(NewTemplate {
                name: validate_name("Template name", &input.name)?,
                description: normalize_text(input.description),
                tags: normalize_tags(input.tags)?,
                is_public: input.is_public,
                creator_id: user.id,
                difficulty: normalize_text(input.difficulty),
                season: normalize_text(input.season),
                duration: normalize_text(input.duration),
                categories: validate_blueprint(input.categories)?,
            })
            .await?;

        info!("User {} created template {}", user.id, template_id);
        Ok(template_id)
    }

    /// Built-ins, then the actor's own templates, then other users' public
    /// templates by popularity
    pub async fn available_templates(&self, actor: &Principal) -> PackingResult<Vec<Template>> {
        let user = resolve_user(&self.store, actor).await?;

        let mut own = self.store.templates_by_creator(user.id).await?;
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut shared: Vec<Template> = self
            .store
            .public_templates()
            .await?
            .into_iter()
            .filter(|t| !t.is_owned_by(user.id))
            .collect();
        shared.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut templates = builtin_templates().to_vec();
        templates.extend(own);
        templates.extend(shared);
        Ok(templates)
    }

    /// A built-in, own or public template. Private templates of other users
    /// are `Unauthorized`.
    pub async fn get_template(
        &self,
        actor: &Principal,
        template_id: TemplateId,
    ) -> PackingResult<Option<Template>> {
        if let Some(builtin) = find_builtin(template_id) {
            return Ok(Some(builtin.clone()));
        }

        let user = resolve_user(&self.store, actor).await?;
        match self.store.get_template(template_id).await? {
            Some(t) if t.is_public || t.is_owned_by(user.id) => Ok(Some(t)),
            Some(_) => Err(PackingError::Unauthorized),
            None => Ok(None),
        }
    }

    /// Delete a template authored by the actor. Built-ins cannot be deleted.
    pub async fn delete_template(
        &self,
        actor: &Principal,
        template_id: TemplateId,
    ) -> PackingResult<()> {
        if find_builtin(template_id).is_some() {
            return Err(PackingError::Unauthorized);
        }

        let user = resolve_user(&self.store, actor).await?;
        let template = self
            .store
            .get_template(template_id)
            .await?
            .ok_or_else(|| PackingError::not_found(EntityKind::Template, template_id))?;

        if !template.is_owned_by(user.id) {
            return Err(PackingError::Unauthorized);
        }

        self.store.delete_template(template_id).await?;
        info!("User {} deleted template {}", user.id, template_id);
        Ok(())
    }
}
