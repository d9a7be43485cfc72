//! Menu API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Addon, AddonCreate, AddonUpdate, Attribute, AttributeCreate, AttributeUpdate, Category,
    CategoryCreate, CategoryUpdate, Combo, ComboCreate, ComboUpdate, MenuItem, MenuItemCreate,
    MenuItemUpdate, MenuTree, Subcategory, SubcategoryCreate, SubcategoryUpdate,
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::menu;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct SubcategoryFilter {
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ItemFilter {
    pub subcategory_id: Option<i64>,
}

/// GET /api/staff/menu/tree - full menu including unavailable entries
pub async fn tree(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<MenuTree>> {
    Ok(Json(menu::menu_tree(state.pool(), user.restaurant_id()?, false).await?))
}

// ==================== Category ====================

/// GET /api/staff/menu/categories
pub async fn category_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(menu::category_list(state.pool(), user.restaurant_id()?).await?))
}

/// GET /api/staff/menu/categories/{id}
pub async fn category_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    Ok(Json(menu::category_get(state.pool(), user.restaurant_id()?, id).await?))
}

/// POST /api/staff/menu/categories
pub async fn category_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let created = menu::category_create(state.pool(), restaurant_id, &payload).await?;
    tracing::debug!(restaurant_id, category_id = created.id, "Category created");
    Ok(Json(created))
}

/// PUT /api/staff/menu/categories/{id}
pub async fn category_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    payload.validate()?;
    Ok(Json(menu::category_update(state.pool(), user.restaurant_id()?, id, &payload).await?))
}

/// DELETE /api/staff/menu/categories/{id}
pub async fn category_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let restaurant_id = user.restaurant_id()?;
    menu::category_delete(state.pool(), restaurant_id, id).await?;
    tracing::debug!(restaurant_id, category_id = id, "Category deleted");
    Ok(Json(true))
}

// ==================== Subcategory ====================

/// GET /api/staff/menu/subcategories?category_id=
pub async fn subcategory_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<SubcategoryFilter>,
) -> AppResult<Json<Vec<Subcategory>>> {
    let rows = menu::subcategory_list(state.pool(), user.restaurant_id()?, filter.category_id).await?;
    Ok(Json(rows))
}

/// GET /api/staff/menu/subcategories/{id}
pub async fn subcategory_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Subcategory>> {
    Ok(Json(menu::subcategory_get(state.pool(), user.restaurant_id()?, id).await?))
}

/// POST /api/staff/menu/subcategories
pub async fn subcategory_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<SubcategoryCreate>,
) -> AppResult<Json<Subcategory>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let created = menu::subcategory_create(state.pool(), restaurant_id, &payload).await?;
    tracing::debug!(restaurant_id, subcategory_id = created.id, "Subcategory created");
    Ok(Json(created))
}

/// PUT /api/staff/menu/subcategories/{id}
pub async fn subcategory_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<SubcategoryUpdate>,
) -> AppResult<Json<Subcategory>> {
    payload.validate()?;
    Ok(Json(menu::subcategory_update(state.pool(), user.restaurant_id()?, id, &payload).await?))
}

/// DELETE /api/staff/menu/subcategories/{id}
pub async fn subcategory_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let restaurant_id = user.restaurant_id()?;
    menu::subcategory_delete(state.pool(), restaurant_id, id).await?;
    tracing::debug!(restaurant_id, subcategory_id = id, "Subcategory deleted");
    Ok(Json(true))
}

// ==================== Attribute ====================

/// GET /api/staff/menu/attributes
pub async fn attribute_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Attribute>>> {
    Ok(Json(menu::attribute_list(state.pool(), user.restaurant_id()?).await?))
}

/// GET /api/staff/menu/attributes/{id}
pub async fn attribute_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Attribute>> {
    Ok(Json(menu::attribute_get(state.pool(), user.restaurant_id()?, id).await?))
}

/// POST /api/staff/menu/attributes
pub async fn attribute_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AttributeCreate>,
) -> AppResult<Json<Attribute>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let created = menu::attribute_create(state.pool(), restaurant_id, &payload).await?;
    tracing::debug!(restaurant_id, attribute_id = created.id, "Attribute created");
    Ok(Json(created))
}

/// PUT /api/staff/menu/attributes/{id}
pub async fn attribute_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AttributeUpdate>,
) -> AppResult<Json<Attribute>> {
    payload.validate()?;
    Ok(Json(menu::attribute_update(state.pool(), user.restaurant_id()?, id, &payload).await?))
}

/// DELETE /api/staff/menu/attributes/{id}
pub async fn attribute_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let restaurant_id = user.restaurant_id()?;
    menu::attribute_delete(state.pool(), restaurant_id, id).await?;
    tracing::debug!(restaurant_id, attribute_id = id, "Attribute deleted");
    Ok(Json(true))
}

// ==================== Addon ====================

/// GET /api/staff/menu/addons
pub async fn addon_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Addon>>> {
    Ok(Json(menu::addon_list(state.pool(), user.restaurant_id()?).await?))
}

/// GET /api/staff/menu/addons/{id}
pub async fn addon_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Addon>> {
    Ok(Json(menu::addon_get(state.pool(), user.restaurant_id()?, id).await?))
}

/// POST /api/staff/menu/addons
pub async fn addon_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AddonCreate>,
) -> AppResult<Json<Addon>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let created = menu::addon_create(state.pool(), restaurant_id, &payload).await?;
    tracing::debug!(restaurant_id, addon_id = created.id, "Addon created");
    Ok(Json(created))
}

/// PUT /api/staff/menu/addons/{id}
pub async fn addon_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AddonUpdate>,
) -> AppResult<Json<Addon>> {
    payload.validate()?;
    Ok(Json(menu::addon_update(state.pool(), user.restaurant_id()?, id, &payload).await?))
}

/// DELETE /api/staff/menu/addons/{id}
pub async fn addon_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let restaurant_id = user.restaurant_id()?;
    menu::addon_delete(state.pool(), restaurant_id, id).await?;
    tracing::debug!(restaurant_id, addon_id = id, "Addon deleted");
    Ok(Json(true))
}

// ==================== Menu items ====================

/// GET /api/staff/menu/items?subcategory_id=
pub async fn item_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<ItemFilter>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let rows = menu::item_list(state.pool(), user.restaurant_id()?, filter.subcategory_id).await?;
    Ok(Json(rows))
}

/// GET /api/staff/menu/items/{id}
pub async fn item_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(menu::item_get(state.pool(), user.restaurant_id()?, id).await?))
}

/// POST /api/staff/menu/items
pub async fn item_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let created = menu::item_create(state.pool(), restaurant_id, &payload).await?;
    tracing::debug!(restaurant_id, item_id = created.id, "Menu item created");
    Ok(Json(created))
}

/// PUT /api/staff/menu/items/{id}
pub async fn item_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    payload.validate()?;
    Ok(Json(menu::item_update(state.pool(), user.restaurant_id()?, id, &payload).await?))
}

/// DELETE /api/staff/menu/items/{id}
pub async fn item_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let restaurant_id = user.restaurant_id()?;
    menu::item_delete(state.pool(), restaurant_id, id).await?;
    tracing::debug!(restaurant_id, item_id = id, "Menu item deleted");
    Ok(Json(true))
}

// ==================== Combo ====================

/// GET /api/staff/menu/combos
pub async fn combo_list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Combo>>> {
    Ok(Json(menu::combo_list(state.pool(), user.restaurant_id()?).await?))
}

/// GET /api/staff/menu/combos/{id}
pub async fn combo_get(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Combo>> {
    Ok(Json(menu::combo_get(state.pool(), user.restaurant_id()?, id).await?))
}

/// POST /api/staff/menu/combos
pub async fn combo_create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<ComboCreate>,
) -> AppResult<Json<Combo>> {
    payload.validate()?;
    let restaurant_id = user.restaurant_id()?;
    let created = menu::combo_create(state.pool(), restaurant_id, &payload).await?;
    tracing::debug!(restaurant_id, combo_id = created.id, "Combo created");
    Ok(Json(created))
}

/// PUT /api/staff/menu/combos/{id}
pub async fn combo_update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ComboUpdate>,
) -> AppResult<Json<Combo>> {
    payload.validate()?;
    Ok(Json(menu::combo_update(state.pool(), user.restaurant_id()?, id, &payload).await?))
}

/// DELETE /api/staff/menu/combos/{id}
pub async fn combo_delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let restaurant_id = user.restaurant_id()?;
    menu::combo_delete(state.pool(), restaurant_id, id).await?;
    tracing::debug!(restaurant_id, combo_id = id, "Combo deleted");
    Ok(Json(true))
}
