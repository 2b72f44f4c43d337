//! Generation flows: prompt, call the model, normalize, enrich and persist.
//!
//! A flow either persists a fully normalized record or nothing at all.

use std::sync::Arc;

use chrono::Utc;

use crate::genai::{GenerationRequest, TextModel};
use crate::model::{CatalogEntry, MealPlan, MealPlanParams, Recipe, RecipeContent, RecipeFilters, new_id};
use crate::normalize::{
    self, JsonShape, PipelineError, RecipeContext, normalize_meal_plan, normalize_recipe,
    normalize_tips, normalize_titles,
};
use crate::photos::{PhotoSearch, enrich_image};
use crate::prompts;
use crate::social::SocialState;
use crate::store::Store;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("upstream call failed: {0:#}")]
    Upstream(anyhow::Error),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("storage failed: {0:#}")]
    Storage(anyhow::Error),

    #[error("{0} not found")]
    NotFound(&'static str),
}

#[derive(Clone)]
pub struct Generator {
    model: Arc<dyn TextModel>,
    photos: Arc<dyn PhotoSearch>,
    store: Arc<dyn Store>,
}

impl Generator {
    pub fn new(model: Arc<dyn TextModel>, photos: Arc<dyn PhotoSearch>, store: Arc<dyn Store>) -> Self {
        Self {
            model,
            photos,
            store,
        }
    }

    async fn ask(&self, prompt: String, shape: JsonShape) -> Result<serde_json::Value, GenerationError> {
        let raw = self
            .model
            .generate(&GenerationRequest::json(prompt, shape))
            .await
            .map_err(GenerationError::Upstream)?;
        match normalize::decode(&raw, shape) {
            Ok(value) => Ok(value),
            Err(err) => {
                let payload = match &err {
                    PipelineError::MalformedJson { payload, .. } => payload.as_str(),
                    _ => raw.as_str(),
                };
                tracing::warn!(model = self.model.model_name(), error = %err, payload, "unusable model output");
                Err(err.into())
            }
        }
    }

    pub async fn suggest_titles(
        &self,
        query: &str,
        filters: &RecipeFilters,
    ) -> Result<Vec<String>, GenerationError> {
        let value = self
            .ask(prompts::titles_prompt(query, filters), JsonShape::Object)
            .await?;
        Ok(normalize_titles(&value))
    }

    pub async fn generate_recipe(
        &self,
        title: &str,
        query: &str,
        filters: &RecipeFilters,
        created_by: Option<&str>,
    ) -> Result<Recipe, GenerationError> {
        let value = self
            .ask(prompts::full_recipe_prompt(title, query, filters), JsonShape::Object)
            .await?;
        let mut content = normalize_recipe(&value, &RecipeContext {
            requested_title: Some(title),
            diet: &filters.diet,
            nutrition_pref: &filters.nutrition_pref,
        });

        let photo = enrich_image(self.photos.as_ref(), &content.title)
            .await
            .map_err(GenerationError::Upstream)?;
        content.image_url = choose_image(photo, &content.image_url);

        let recipe = Recipe {
            id: new_id(),
            content,
            diet: filters.diet.clone(),
            nutrition_pref: filters.nutrition_pref.clone(),
            allergies: filters.allergies.clone(),
            social: SocialState::default(),
            created_by: created_by.map(str::to_owned),
            created_at: Utc::now(),
        };
        self.store
            .insert_recipe(&recipe)
            .await
            .map_err(GenerationError::Storage)?;
        tracing::info!(recipe_id = %recipe.id, title = %recipe.content.title, "recipe generated");
        Ok(recipe)
    }

    /// Expands a curated entry into full content. The entry's own title,
    /// description and image win over whatever the model returns.
    pub async fn expand_catalog_entry(&self, entry_id: &str) -> Result<RecipeContent, GenerationError> {
        let entry: CatalogEntry = self
            .store
            .get_catalog_entry(entry_id)
            .await
            .map_err(GenerationError::Storage)?
            .ok_or(GenerationError::NotFound("catalog entry"))?;

        let value = self
            .ask(prompts::catalog_recipe_prompt(&entry), JsonShape::Object)
            .await?;
        let mut content = normalize_recipe(&value, &RecipeContext {
            requested_title: Some(&entry.title),
            ..Default::default()
        });
        content.title = entry.title;
        content.description = entry.description;
        content.image_url = entry.image_url;
        Ok(content)
    }

    pub async fn generate_meal_plan(
        &self,
        params: MealPlanParams,
        user: Option<&str>,
    ) -> Result<MealPlan, GenerationError> {
        let value = self
            .ask(prompts::meal_plan_prompt(&params), JsonShape::Array)
            .await?;
        let plan = normalize_meal_plan(&value)?;

        let nutrition_tips = match self
            .ask(prompts::nutrition_tips_prompt(&params), JsonShape::Array)
            .await
        {
            Ok(value) => normalize_tips(&value),
            Err(err) => {
                tracing::warn!(error = %err, "nutrition tips unavailable");
                Vec::new()
            }
        };

        let meal_plan = MealPlan {
            id: new_id(),
            user: user.map(str::to_owned),
            params,
            plan,
            nutrition_tips,
            social: SocialState::default(),
            created_at: Utc::now(),
        };
        self.store
            .insert_meal_plan(&meal_plan)
            .await
            .map_err(GenerationError::Storage)?;
        tracing::info!(plan_id = %meal_plan.id, days = meal_plan.plan.len(), "meal plan generated");
        Ok(meal_plan)
    }
}

/// Photo hit first, then a usable model-provided URL, else empty.
fn choose_image(photo: String, from_model: &str) -> String {
    if !photo.is_empty() {
        return photo;
    }
    let from_model = from_model.trim();
    if from_model.starts_with("https://") || from_model.starts_with("http://") || from_model.starts_with('/') {
        from_model.to_owned()
    } else {
        String::new()
    }
}
