//! Menu Repository
//!
//! Categories, subcategories, attributes, addons, items and combos. Every
//! entity belongs to exactly one restaurant and every query is scoped by it.
//! Cross references (item → subcategory/attributes/addons, combo → items)
//! must stay inside the restaurant.

use super::{RepoError, RepoResult, to_json};
use shared::error::ErrorCode;
use shared::models::{
    Addon, AddonCreate, AddonUpdate, Attribute, AttributeCreate, AttributeUpdate, Category,
    CategoryCreate, CategoryUpdate, Combo, ComboComponent, ComboCreate, ComboUpdate,
    MenuCategoryNode, MenuItem, MenuItemCreate, MenuItemUpdate, MenuSubcategoryNode, MenuTree,
    Subcategory, SubcategoryCreate, SubcategoryUpdate,
};
use shared::util::snowflake_id;
use sqlx::SqlitePool;
use std::collections::HashSet;

const CATEGORY_COLUMNS: &str = "id, restaurant_id, name, sort_order, is_active";
const SUBCATEGORY_COLUMNS: &str = "id, category_id, restaurant_id, name, sort_order, is_active";
const ATTRIBUTE_COLUMNS: &str = "id, restaurant_id, name, value";
const ADDON_COLUMNS: &str = "id, restaurant_id, name, price, is_available";
const ITEM_COLUMNS: &str = "id, restaurant_id, subcategory_id, name, description, price, is_veg, is_available, preparation_minutes, attribute_ids, addon_ids";
const COMBO_COLUMNS: &str = "id, restaurant_id, name, description, price, is_available, items";

fn business(code: ErrorCode, msg: impl Into<String>) -> RepoError {
    RepoError::Business(code, msg.into())
}

/// Ids of all rows of `table` owned by the restaurant
async fn owned_ids(pool: &SqlitePool, table: &str, restaurant_id: i64) -> RepoResult<HashSet<i64>> {
    let ids: Vec<i64> = sqlx::query_scalar(&format!(
        "SELECT id FROM {table} WHERE restaurant_id = ?"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(ids.into_iter().collect())
}

fn check_owned(owned: &HashSet<i64>, ids: &[i64], what: &str) -> RepoResult<()> {
    match ids.iter().find(|id| !owned.contains(id)) {
        Some(id) => Err(business(
            ErrorCode::InvalidMenuReference,
            format!("{what} {id} does not belong to this restaurant"),
        )),
        None => Ok(()),
    }
}

// ==================== Categories ====================

pub async fn category_list(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM category WHERE restaurant_id = ? ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn category_get(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<Category> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| business(ErrorCode::CategoryNotFound, format!("Category {id} not found")))
}

pub async fn category_create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &CategoryCreate,
) -> RepoResult<Category> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO category (id, restaurant_id, name, sort_order, is_active) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(data.sort_order.unwrap_or(0))
    .execute(pool)
    .await?;
    category_get(pool, restaurant_id, id).await
}

pub async fn category_update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: &CategoryUpdate,
) -> RepoResult<Category> {
    category_get(pool, restaurant_id, id).await?;
    sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), sort_order = COALESCE(?2, sort_order), is_active = COALESCE(?3, is_active) WHERE id = ?4 AND restaurant_id = ?5",
    )
    .bind(&data.name)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    category_get(pool, restaurant_id, id).await
}

pub async fn category_delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    category_get(pool, restaurant_id, id).await?;
    let children: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subcategory WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if children > 0 {
        return Err(business(
            ErrorCode::CategoryNotEmpty,
            format!("Category still has {children} subcategories"),
        ));
    }
    sqlx::query("DELETE FROM category WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ==================== Subcategories ====================

pub async fn subcategory_list(
    pool: &SqlitePool,
    restaurant_id: i64,
    category_id: Option<i64>,
) -> RepoResult<Vec<Subcategory>> {
    let rows = sqlx::query_as::<_, Subcategory>(&format!(
        "SELECT {SUBCATEGORY_COLUMNS} FROM subcategory WHERE restaurant_id = ?1 AND (?2 IS NULL OR category_id = ?2) ORDER BY sort_order, name"
    ))
    .bind(restaurant_id)
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn subcategory_get(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Subcategory> {
    sqlx::query_as::<_, Subcategory>(&format!(
        "SELECT {SUBCATEGORY_COLUMNS} FROM subcategory WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        business(
            ErrorCode::SubcategoryNotFound,
            format!("Subcategory {id} not found"),
        )
    })
}

pub async fn subcategory_create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &SubcategoryCreate,
) -> RepoResult<Subcategory> {
    category_get(pool, restaurant_id, data.category_id).await?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO subcategory (id, category_id, restaurant_id, name, sort_order, is_active) VALUES (?, ?, ?, ?, ?, 1)",
    )
    .bind(id)
    .bind(data.category_id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(data.sort_order.unwrap_or(0))
    .execute(pool)
    .await?;
    subcategory_get(pool, restaurant_id, id).await
}

pub async fn subcategory_update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: &SubcategoryUpdate,
) -> RepoResult<Subcategory> {
    subcategory_get(pool, restaurant_id, id).await?;
    if let Some(category_id) = data.category_id {
        category_get(pool, restaurant_id, category_id).await?;
    }
    sqlx::query(
        "UPDATE subcategory SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), sort_order = COALESCE(?3, sort_order), is_active = COALESCE(?4, is_active) WHERE id = ?5 AND restaurant_id = ?6",
    )
    .bind(data.category_id)
    .bind(&data.name)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    subcategory_get(pool, restaurant_id, id).await
}

pub async fn subcategory_delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    subcategory_get(pool, restaurant_id, id).await?;
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_item WHERE subcategory_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if items > 0 {
        return Err(business(
            ErrorCode::CategoryNotEmpty,
            format!("Subcategory still has {items} items"),
        ));
    }
    sqlx::query("DELETE FROM subcategory WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ==================== Attributes ====================

pub async fn attribute_list(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Attribute>> {
    let rows = sqlx::query_as::<_, Attribute>(&format!(
        "SELECT {ATTRIBUTE_COLUMNS} FROM attribute WHERE restaurant_id = ? ORDER BY name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn attribute_get(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<Attribute> {
    sqlx::query_as::<_, Attribute>(&format!(
        "SELECT {ATTRIBUTE_COLUMNS} FROM attribute WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| business(ErrorCode::AttributeNotFound, format!("Attribute {id} not found")))
}

pub async fn attribute_create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &AttributeCreate,
) -> RepoResult<Attribute> {
    let id = snowflake_id();
    sqlx::query("INSERT INTO attribute (id, restaurant_id, name, value) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(restaurant_id)
        .bind(&data.name)
        .bind(&data.value)
        .execute(pool)
        .await?;
    attribute_get(pool, restaurant_id, id).await
}

pub async fn attribute_update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: &AttributeUpdate,
) -> RepoResult<Attribute> {
    attribute_get(pool, restaurant_id, id).await?;
    sqlx::query(
        "UPDATE attribute SET name = COALESCE(?1, name), value = COALESCE(?2, value) WHERE id = ?3 AND restaurant_id = ?4",
    )
    .bind(&data.name)
    .bind(&data.value)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    attribute_get(pool, restaurant_id, id).await
}

/// Delete the attribute and detach it from every item
pub async fn attribute_delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    attribute_get(pool, restaurant_id, id).await?;

    let mut tx = pool.begin().await?;
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM menu_item WHERE restaurant_id = ?"
    ))
    .bind(restaurant_id)
    .fetch_all(&mut *tx)
    .await?;
    for item in items.iter().filter(|i| i.attribute_ids.contains(&id)) {
        let kept: Vec<i64> = item.attribute_ids.iter().copied().filter(|a| *a != id).collect();
        sqlx::query("UPDATE menu_item SET attribute_ids = ? WHERE id = ?")
            .bind(to_json(&kept)?)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DELETE FROM attribute WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

// ==================== Addons ====================

pub async fn addon_list(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Addon>> {
    let rows = sqlx::query_as::<_, Addon>(&format!(
        "SELECT {ADDON_COLUMNS} FROM addon WHERE restaurant_id = ? ORDER BY name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn addon_get(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<Addon> {
    sqlx::query_as::<_, Addon>(&format!(
        "SELECT {ADDON_COLUMNS} FROM addon WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| business(ErrorCode::AddonNotFound, format!("Addon {id} not found")))
}

pub async fn addon_create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &AddonCreate,
) -> RepoResult<Addon> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO addon (id, restaurant_id, name, price, is_available) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(data.price)
    .execute(pool)
    .await?;
    addon_get(pool, restaurant_id, id).await
}

pub async fn addon_update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: &AddonUpdate,
) -> RepoResult<Addon> {
    addon_get(pool, restaurant_id, id).await?;
    sqlx::query(
        "UPDATE addon SET name = COALESCE(?1, name), price = COALESCE(?2, price), is_available = COALESCE(?3, is_available) WHERE id = ?4 AND restaurant_id = ?5",
    )
    .bind(&data.name)
    .bind(data.price)
    .bind(data.is_available)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    addon_get(pool, restaurant_id, id).await
}

/// Delete the addon and detach it from every item
pub async fn addon_delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    addon_get(pool, restaurant_id, id).await?;

    let mut tx = pool.begin().await?;
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM menu_item WHERE restaurant_id = ?"
    ))
    .bind(restaurant_id)
    .fetch_all(&mut *tx)
    .await?;
    for item in items.iter().filter(|i| i.addon_ids.contains(&id)) {
        let kept: Vec<i64> = item.addon_ids.iter().copied().filter(|a| *a != id).collect();
        sqlx::query("UPDATE menu_item SET addon_ids = ? WHERE id = ?")
            .bind(to_json(&kept)?)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DELETE FROM addon WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

// ==================== Menu items ====================

pub async fn item_list(
    pool: &SqlitePool,
    restaurant_id: i64,
    subcategory_id: Option<i64>,
) -> RepoResult<Vec<MenuItem>> {
    let rows = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM menu_item WHERE restaurant_id = ?1 AND (?2 IS NULL OR subcategory_id = ?2) ORDER BY name"
    ))
    .bind(restaurant_id)
    .bind(subcategory_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn item_get(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<MenuItem> {
    sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM menu_item WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| business(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found")))
}

async fn check_item_refs(
    pool: &SqlitePool,
    restaurant_id: i64,
    subcategory_id: Option<i64>,
    attribute_ids: Option<&[i64]>,
    addon_ids: Option<&[i64]>,
) -> RepoResult<()> {
    if let Some(sub) = subcategory_id
        && !owned_ids(pool, "subcategory", restaurant_id).await?.contains(&sub)
    {
        return Err(business(
            ErrorCode::InvalidMenuReference,
            format!("Subcategory {sub} does not belong to this restaurant"),
        ));
    }
    if let Some(ids) = attribute_ids {
        check_owned(&owned_ids(pool, "attribute", restaurant_id).await?, ids, "Attribute")?;
    }
    if let Some(ids) = addon_ids {
        check_owned(&owned_ids(pool, "addon", restaurant_id).await?, ids, "Addon")?;
    }
    Ok(())
}

pub async fn item_create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &MenuItemCreate,
) -> RepoResult<MenuItem> {
    check_item_refs(
        pool,
        restaurant_id,
        Some(data.subcategory_id),
        Some(&data.attribute_ids),
        Some(&data.addon_ids),
    )
    .await?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO menu_item (id, restaurant_id, subcategory_id, name, description, price, is_veg, is_available, preparation_minutes, attribute_ids, addon_ids) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(data.subcategory_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.is_veg)
    .bind(data.preparation_minutes.unwrap_or(15))
    .bind(to_json(&data.attribute_ids)?)
    .bind(to_json(&data.addon_ids)?)
    .execute(pool)
    .await?;
    item_get(pool, restaurant_id, id).await
}

pub async fn item_update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: &MenuItemUpdate,
) -> RepoResult<MenuItem> {
    item_get(pool, restaurant_id, id).await?;
    check_item_refs(
        pool,
        restaurant_id,
        data.subcategory_id,
        data.attribute_ids.as_deref(),
        data.addon_ids.as_deref(),
    )
    .await?;

    let attribute_ids = data.attribute_ids.as_ref().map(to_json).transpose()?;
    let addon_ids = data.addon_ids.as_ref().map(to_json).transpose()?;
    sqlx::query(
        "UPDATE menu_item SET \
         subcategory_id = COALESCE(?1, subcategory_id), name = COALESCE(?2, name), description = COALESCE(?3, description), \
         price = COALESCE(?4, price), is_veg = COALESCE(?5, is_veg), is_available = COALESCE(?6, is_available), \
         preparation_minutes = COALESCE(?7, preparation_minutes), attribute_ids = COALESCE(?8, attribute_ids), addon_ids = COALESCE(?9, addon_ids) \
         WHERE id = ?10 AND restaurant_id = ?11",
    )
    .bind(data.subcategory_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.is_veg)
    .bind(data.is_available)
    .bind(data.preparation_minutes)
    .bind(attribute_ids)
    .bind(addon_ids)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    item_get(pool, restaurant_id, id).await
}

/// Items that are part of a combo cannot be deleted
pub async fn item_delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    item_get(pool, restaurant_id, id).await?;
    if let Some(combo) = combo_list(pool, restaurant_id)
        .await?
        .into_iter()
        .find(|c| c.items.iter().any(|comp| comp.item_id == id))
    {
        return Err(business(
            ErrorCode::InvalidMenuReference,
            format!("Item is part of combo '{}'", combo.name),
        ));
    }
    sqlx::query("DELETE FROM menu_item WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ==================== Combos ====================

pub async fn combo_list(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Combo>> {
    let rows = sqlx::query_as::<_, Combo>(&format!(
        "SELECT {COMBO_COLUMNS} FROM combo WHERE restaurant_id = ? ORDER BY name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn combo_get(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<Combo> {
    sqlx::query_as::<_, Combo>(&format!(
        "SELECT {COMBO_COLUMNS} FROM combo WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| business(ErrorCode::ComboNotFound, format!("Combo {id} not found")))
}

async fn check_components(
    pool: &SqlitePool,
    restaurant_id: i64,
    components: &[ComboComponent],
) -> RepoResult<()> {
    if components.is_empty() {
        return Err(business(ErrorCode::ComboEmpty, "A combo needs at least one item"));
    }
    if let Some(c) = components.iter().find(|c| c.quantity < 1) {
        return Err(business(
            ErrorCode::InvalidQuantity,
            format!("Invalid quantity {} for item {}", c.quantity, c.item_id),
        ));
    }
    let ids: Vec<i64> = components.iter().map(|c| c.item_id).collect();
    check_owned(&owned_ids(pool, "menu_item", restaurant_id).await?, &ids, "Item")
}

pub async fn combo_create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &ComboCreate,
) -> RepoResult<Combo> {
    check_components(pool, restaurant_id, &data.items).await?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO combo (id, restaurant_id, name, description, price, is_available, items) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(to_json(&data.items)?)
    .execute(pool)
    .await?;
    combo_get(pool, restaurant_id, id).await
}

pub async fn combo_update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: &ComboUpdate,
) -> RepoResult<Combo> {
    combo_get(pool, restaurant_id, id).await?;
    if let Some(items) = &data.items {
        check_components(pool, restaurant_id, items).await?;
    }

    let items = data.items.as_ref().map(to_json).transpose()?;
    sqlx::query(
        "UPDATE combo SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), is_available = COALESCE(?4, is_available), items = COALESCE(?5, items) WHERE id = ?6 AND restaurant_id = ?7",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.is_available)
    .bind(items)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    combo_get(pool, restaurant_id, id).await
}

pub async fn combo_delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    combo_get(pool, restaurant_id, id).await?;
    sqlx::query("DELETE FROM combo WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ==================== Tree ====================

/// Nested menu of a restaurant
///
/// With `available_only`, inactive categories/subcategories and unavailable
/// items, combos and addons are left out, as are combos with an
/// unavailable component.
pub async fn menu_tree(
    pool: &SqlitePool,
    restaurant_id: i64,
    available_only: bool,
) -> RepoResult<MenuTree> {
    let categories = category_list(pool, restaurant_id).await?;
    let subcategories = subcategory_list(pool, restaurant_id, None).await?;
    let items = item_list(pool, restaurant_id, None).await?;
    let mut combos = combo_list(pool, restaurant_id).await?;
    let mut addons = addon_list(pool, restaurant_id).await?;
    let attributes = attribute_list(pool, restaurant_id).await?;

    let nodes = categories
        .into_iter()
        .filter(|c| !available_only || c.is_active)
        .map(|category| {
            let subcategories = subcategories
                .iter()
                .filter(|s| s.category_id == category.id && (!available_only || s.is_active))
                .map(|sub| MenuSubcategoryNode {
                    subcategory: sub.clone(),
                    items: items
                        .iter()
                        .filter(|i| i.subcategory_id == sub.id && (!available_only || i.is_available))
                        .cloned()
                        .collect(),
                })
                .collect();
            MenuCategoryNode {
                category,
                subcategories,
            }
        })
        .collect();

    if available_only {
        let available: HashSet<i64> = items.iter().filter(|i| i.is_available).map(|i| i.id).collect();
        combos.retain(|c| c.is_available && c.items.iter().all(|comp| available.contains(&comp.item_id)));
        addons.retain(|a| a.is_available);
    }

    Ok(MenuTree {
        restaurant_id,
        categories: nodes,
        combos,
        addons,
        attributes,
    })
}
