use serde::Deserialize;

/// Body for creating or renaming a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

/// `GET /categories` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesQuery {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}
