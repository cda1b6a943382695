use tracing::{info, instrument, warn};

use crate::{
    categories::{
        dto::{CategoryRequest, ListCategoriesQuery},
        repo_types::Category,
    },
    db::Store,
    error::{AppError, AppResult},
    pagination::{Page, Pagination},
    transactions::repo_types::TransactionFilter,
    validation::{is_blank, Checks},
};

pub(crate) const NOT_FOUND: &str = "category not found";

fn validated_name(req: &CategoryRequest) -> AppResult<String> {
    Checks::new().require("name", &req.name).finish()?;
    Ok(req.name.trim().to_string())
}

/// Fails with `Conflict` when another category already uses `name` (ignoring case).
async fn ensure_name_free(store: &dyn Store, name: &str, except: Option<i64>) -> AppResult<()> {
    match store.find_category_by_name(name).await? {
        Some(existing) if Some(existing.id) != except => {
            warn!(existing_id = existing.id, "category name taken");
            Err(AppError::Conflict("category already exists".into()))
        }
        _ => Ok(()),
    }
}

#[instrument(skip(store, req))]
pub async fn create(store: &dyn Store, req: CategoryRequest) -> AppResult<Category> {
    let name = validated_name(&req)?;
    ensure_name_free(store, &name, None).await?;
    let category = store.create_category(&name).await?;
    info!(category_id = category.id, "category created");
    Ok(category)
}

#[instrument(skip(store))]
pub async fn list(store: &dyn Store, query: &ListCategoriesQuery) -> AppResult<Page<Category>> {
    let search = query.q.as_deref().filter(|q| !is_blank(q)).map(str::trim);
    let pagination = Pagination::from_query(query.limit.as_deref(), query.page.as_deref());
    let total = store.count_categories(search).await?;
    let items = store.list_categories(search, &pagination).await?;
    Ok(Page::new(total, &pagination, items))
}

#[instrument(skip(store))]
pub async fn get(store: &dyn Store, id: i64) -> AppResult<Category> {
    store
        .find_category(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

#[instrument(skip(store, req))]
pub async fn update(store: &dyn Store, id: i64, req: CategoryRequest) -> AppResult<Category> {
    let name = validated_name(&req)?;
    get(store, id).await?;
    ensure_name_free(store, &name, Some(id)).await?;
    let category = store
        .update_category(id, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    info!(category_id = id, "category updated");
    Ok(category)
}

#[instrument(skip(store))]
pub async fn delete(store: &dyn Store, id: i64) -> AppResult<()> {
    get(store, id).await?;
    let in_use = TransactionFilter {
        category_id: Some(id),
        ..Default::default()
    };
    if store.count_transactions(&in_use).await? > 0 {
        return Err(AppError::Conflict("category is in use".into()));
    }
    if !store.delete_category(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    info!(category_id = id, "category deleted");
    Ok(())
}
