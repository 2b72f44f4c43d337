use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use super::extract::{AppJson, AuthUser};
use super::response::{ApiError, ApiResult, ok};
use super::state::AppState;
use crate::model::{Recipe, RecipeFilters};
use crate::social::Relation;
use crate::store::SocialTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SmartStep {
    Titles,
    FullRecipe,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartRequest {
    #[serde(default)]
    step: Option<String>,
    #[serde(default)]
    query: String,
    #[serde(default)]
    title: String,
    #[serde(flatten)]
    filters: RecipeFilters,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRef {
    #[serde(default)]
    recipe_id: String,
}

impl RecipeRef {
    fn id(&self) -> ApiResult<&str> {
        let id = self.recipe_id.trim();
        if id.is_empty() {
            return Err(ApiError::bad_request("Recipe ID is required"));
        }
        Ok(id)
    }
}

fn parse_step(step: Option<&str>) -> Option<SmartStep> {
    serde_json::from_value(serde_json::Value::String(step?.trim().to_owned())).ok()
}

/// Two-step flow: `titles` suggests dish names, `fullRecipe` generates and
/// persists one recipe.
pub async fn smart(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppJson(req): AppJson<SmartRequest>,
) -> ApiResult<Response> {
    let query = req.query.trim();
    match parse_step(req.step.as_deref()) {
        Some(SmartStep::Titles) => {
            if query.is_empty() {
                return Err(ApiError::bad_request("Query is required for titles"));
            }
            let titles = state
                .generator
                .suggest_titles(query, &req.filters)
                .await
                .map_err(|err| ApiError::generation("Something went wrong.", err))?;
            ok(json!({ "titles": titles }))
        }
        Some(SmartStep::FullRecipe) => {
            let title = req.title.trim();
            if title.is_empty() || query.is_empty() {
                return Err(ApiError::bad_request("Title and query are required"));
            }
            let created_by = auth.as_ref().map(|a| a.user.id.as_str());
            let recipe = state
                .generator
                .generate_recipe(title, query, &req.filters, created_by)
                .await
                .map_err(|err| ApiError::generation("Something went wrong.", err))?;
            ok(json!({ "recipe": recipe }))
        }
        None => Err(ApiError::bad_request("Invalid step provided")),
    }
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Response> {
    let recipes = state.store.list_recipes().await?;
    ok(json!({ "recipes": recipes }))
}

/// Saved ids whose recipe no longer exists are skipped.
pub async fn saved(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Response> {
    let mut recipes: Vec<Recipe> = Vec::with_capacity(auth.user.saved_recipes.len());
    for id in &auth.user.saved_recipes {
        if let Some(recipe) = state.store.get_recipe(id).await? {
            recipes.push(recipe);
        }
    }
    ok(json!({ "recipes": recipes }))
}

pub async fn toggle_save(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<RecipeRef>,
) -> ApiResult<Response> {
    let id = req.id()?;
    let saved = state
        .store
        .update_saved(SocialTarget::Recipe, id, &auth.user.id, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    let message = if saved { "Recipe saved" } else { "Recipe removed from saved" };
    ok(json!({ "message": message, "saved": saved }))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<RecipeRef>,
) -> ApiResult<Response> {
    let id = req.id()?;
    let social = state
        .store
        .update_social(SocialTarget::Recipe, id, Relation::Like, &auth.user.id, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;
    ok(json!({
        "liked": social.contains(Relation::Like, &auth.user.id),
        "likes": social.likes,
    }))
}

/// Removes a recipe from the caller's saved list; the recipe itself stays.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    if !auth.user.saved_recipes.iter().any(|saved| *saved == id) {
        return Err(ApiError::not_found("Recipe not found in saved list"));
    }
    state
        .store
        .update_saved(SocialTarget::Recipe, &id, &auth.user.id, Some(false))
        .await?;
    ok(json!({ "message": "Recipe removed from saved list" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_parse_by_wire_name() {
        assert_eq!(parse_step(Some("titles")), Some(SmartStep::Titles));
        assert_eq!(parse_step(Some(" fullRecipe ")), Some(SmartStep::FullRecipe));
        assert_eq!(parse_step(Some("full_recipe")), None);
        assert_eq!(parse_step(None), None);
    }
}
