//! Menu Models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level menu category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Subcategory, holds menu items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Descriptive attribute ("Spicy", "Vegan", ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attribute {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub value: Option<String>,
}

/// Priced extra that can be attached to menu items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Addon {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub price: f64,
    pub is_available: bool,
}

/// Sellable menu item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub subcategory_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_veg: bool,
    pub is_available: bool,
    pub preparation_minutes: i32,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub attribute_ids: Vec<i64>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub addon_ids: Vec<i64>,
}

/// One component of a combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboComponent {
    pub item_id: i64,
    pub quantity: i32,
}

/// Fixed-price bundle of menu items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Combo {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<ComboComponent>,
}

// ==================== Payloads ====================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubcategoryCreate {
    pub category_id: i64,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubcategoryUpdate {
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttributeCreate {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[validate(length(max = 120))]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttributeUpdate {
    #[validate(length(min = 1, max = 60))]
    pub name: Option<String>,
    #[validate(length(max = 120))]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddonCreate {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(range(min = 0.0, max = 100000.0))]
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddonUpdate {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, max = 100000.0))]
    pub price: Option<f64>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemCreate {
    pub subcategory_id: i64,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100000.0))]
    pub price: f64,
    #[serde(default)]
    pub is_veg: bool,
    #[validate(range(min = 0, max = 600))]
    pub preparation_minutes: Option<i32>,
    #[serde(default)]
    pub attribute_ids: Vec<i64>,
    #[serde(default)]
    pub addon_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuItemUpdate {
    pub subcategory_id: Option<i64>,
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100000.0))]
    pub price: Option<f64>,
    pub is_veg: Option<bool>,
    pub is_available: Option<bool>,
    #[validate(range(min = 0, max = 600))]
    pub preparation_minutes: Option<i32>,
    pub attribute_ids: Option<Vec<i64>>,
    pub addon_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComboCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100000.0))]
    pub price: f64,
    pub items: Vec<ComboComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComboUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100000.0))]
    pub price: Option<f64>,
    pub is_available: Option<bool>,
    pub items: Option<Vec<ComboComponent>>,
}

// ==================== Public menu tree ====================

/// Nested public menu: categories → subcategories → items, plus combos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuTree {
    pub restaurant_id: i64,
    pub categories: Vec<MenuCategoryNode>,
    pub combos: Vec<Combo>,
    pub addons: Vec<Addon>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub subcategories: Vec<MenuSubcategoryNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSubcategoryNode {
    #[serde(flatten)]
    pub subcategory: Subcategory,
    pub items: Vec<MenuItem>,
}
