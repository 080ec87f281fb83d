//! Built-in templates shipped with the application
//!
//! They have stable ids, `TemplateCreator::System` as creator, and no usage
//! counter tracking.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ids::TemplateId;
use crate::models::{Priority, Template, TemplateCategory, TemplateCreator, TemplateItem};

pub const BEACH_VACATION_ID: TemplateId =
    TemplateId::from_uuid(Uuid::from_u128(0x5d6f_0c1e_7b2a_4f3e_9a10_0000_0000_0001));
pub const BUSINESS_TRIP_ID: TemplateId =
    TemplateId::from_uuid(Uuid::from_u128(0x5d6f_0c1e_7b2a_4f3e_9a10_0000_0000_0002));
pub const CAMPING_WEEKEND_ID: TemplateId =
    TemplateId::from_uuid(Uuid::from_u128(0x5d6f_0c1e_7b2a_4f3e_9a10_0000_0000_0003));

fn item(name: &str, quantity: i32, priority: Priority) -> TemplateItem {
    TemplateItem {
        name: name.to_string(),
        quantity,
        priority,
        notes: None,
        description: None,
        weight: None,
        tags: Vec::new(),
    }
}

fn category(name: &str, color: &str, icon: &str, items: Vec<TemplateItem>) -> TemplateCategory {
    TemplateCategory {
        name: name.to_string(),
        color: Some(color.to_string()),
        icon: Some(icon.to_string()),
        items,
    }
}

#[allow(clippy::too_many_arguments)]
fn template(
    id: TemplateId,
    name: &str,
    description: &str,
    tags: &[&str],
    difficulty: &str,
    season: &str,
    duration: &str,
    categories: Vec<TemplateCategory>,
) -> Template {
    let published: DateTime<Utc> = DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default();
    Template {
        id,
        name: name.to_string(),
        description: Some(description.to_string()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        is_public: true,
        creator: TemplateCreator::System,
        usage_count: 0,
        difficulty: Some(difficulty.to_string()),
        season: Some(season.to_string()),
        duration: Some(duration.to_string()),
        categories,
        created_at: published,
        updated_at: published,
    }
}

fn build() -> Vec<Template> {
    use Priority::{Essential, High, Low, Medium};

    vec![
        template(
            BEACH_VACATION_ID,
            "Beach Vacation",
            "Sun, sand and everything you need for a week by the sea",
            &["beach", "summer", "vacation"],
            "easy",
            "summer",
            "1 week",
            vec![
                category(
                    "Clothing",
                    "#f59e0b",
                    "shirt",
                    vec![
                        item("Swimsuit", 2, Essential),
                        item("T-shirts", 5, High),
                        item("Shorts", 3, High),
                        item("Sandals", 1, Medium),
                    ],
                ),
                category(
                    "Beach Gear",
                    "#0ea5e9",
                    "umbrella",
                    vec![
                        item("Sunscreen", 1, Essential),
                        item("Beach towel", 2, High),
                        item("Sunglasses", 1, High),
                        item("Snorkel", 1, Low),
                    ],
                ),
                category(
                    "Documents",
                    "#6366f1",
                    "passport",
                    vec![item("Passport", 1, Essential), item("Travel insurance", 1, High)],
                ),
            ],
        ),
        template(
            BUSINESS_TRIP_ID,
            "Business Trip",
            "Short work trip with meetings",
            &["business", "work"],
            "easy",
            "all",
            "3 days",
            vec![
                category(
                    "Clothing",
                    "#64748b",
                    "shirt",
                    vec![
                        item("Suit", 1, Essential),
                        item("Dress shirts", 3, High),
                        item("Dress shoes", 1, High),
                    ],
                ),
                category(
                    "Electronics",
                    "#22c55e",
                    "laptop",
                    vec![
                        item("Laptop", 1, Essential),
                        item("Laptop charger", 1, Essential),
                        item("Phone charger", 1, High),
                        item("Travel adapter", 1, Medium),
                    ],
                ),
                category(
                    "Documents",
                    "#6366f1",
                    "briefcase",
                    vec![item("ID card", 1, Essential), item("Business cards", 1, Low)],
                ),
            ],
        ),
        template(
            CAMPING_WEEKEND_ID,
            "Camping Weekend",
            "Two nights under the stars",
            &["camping", "outdoors", "hiking"],
            "moderate",
            "summer",
            "2 days",
            vec![
                category(
                    "Shelter",
                    "#16a34a",
                    "tent",
                    vec![
                        item("Tent", 1, Essential),
                        item("Sleeping bag", 1, Essential),
                        item("Sleeping pad", 1, High),
                    ],
                ),
                category(
                    "Kitchen",
                    "#ea580c",
                    "flame",
                    vec![
                        item("Stove", 1, High),
                        item("Fuel canister", 2, High),
                        item("Water bottles", 2, Essential),
                    ],
                ),
                category(
                    "Safety",
                    "#dc2626",
                    "first-aid",
                    vec![
                        item("First aid kit", 1, Essential),
                        item("Headlamp", 1, High),
                        item("Map", 1, Medium),
                    ],
                ),
            ],
        ),
    ]
}

/// All built-in templates
pub fn builtin_templates() -> &'static [Template] {
    static TEMPLATES: OnceLock<Vec<Template>> = OnceLock::new();
    TEMPLATES.get_or_init(build)
}

/// Look up a built-in template by id
pub fn find_builtin(id: TemplateId) -> Option<&'static Template> {
    builtin_templates().iter().find(|t| t.id == id)
}
