use axum::extract::{Path, State};
use axum::response::Response;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use super::extract::{AppJson, AuthUser};
use super::response::{ApiError, ApiResult, ok};
use super::state::AppState;
use crate::model::{MealPlan, MealPlanParams};
use crate::social::Relation;
use crate::store::SocialTarget;

/// Wire form of a plan request. Required fields are optional here so a
/// missing one is reported with the envelope message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    goal: Option<String>,
    #[serde(default, deserialize_with = "numeric")]
    weight: Option<f64>,
    #[serde(default, deserialize_with = "numeric")]
    height: Option<f64>,
    #[serde(default, deserialize_with = "numeric")]
    duration: Option<u32>,
    start_date: Option<String>,
    #[serde(default, deserialize_with = "numeric")]
    age: Option<u32>,
    gender: Option<String>,
    activity: Option<String>,
    diet_type: Option<String>,
    allergies: Option<String>,
    health_issues: Option<String>,
}

/// Numbers may arrive as JSON numbers or numeric strings (`"70"`); anything
/// else reads as absent.
fn numeric<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let parsed = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.to_string().parse().ok(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    };
    Ok(parsed)
}

impl GenerateRequest {
    fn into_params(self) -> Option<MealPlanParams> {
        let goal = self.goal.map(|g| g.trim().to_owned()).filter(|g| !g.is_empty())?;
        let start_date = self
            .start_date
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty())?;
        let weight = self.weight.filter(|w| *w > 0.0)?;
        let height = self.height.filter(|h| *h > 0.0)?;
        let duration = self.duration.filter(|d| *d > 0)?;
        let text = |value: Option<String>| value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        Some(MealPlanParams {
            goal,
            weight,
            height,
            duration,
            start_date,
            age: self.age.filter(|a| *a > 0),
            gender: text(self.gender),
            activity: text(self.activity),
            diet_type: text(self.diet_type),
            allergies: text(self.allergies),
            health_issues: text(self.health_issues),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PlanRef {
    #[serde(default)]
    id: String,
}

impl PlanRef {
    fn id(&self) -> ApiResult<&str> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(ApiError::bad_request("Meal plan ID is required"));
        }
        Ok(id)
    }
}

pub async fn generate(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppJson(req): AppJson<GenerateRequest>,
) -> ApiResult<Response> {
    let params = req
        .into_params()
        .ok_or_else(|| ApiError::bad_request("Required fields are missing."))?;
    let user = auth.as_ref().map(|a| a.user.id.as_str());
    let plan = state
        .generator
        .generate_meal_plan(params, user)
        .await
        .map_err(|err| ApiError::generation("Server error while generating meal plan.", err))?;

    ok(json!({
        "message": "Meal plan generated successfully.",
        "plan": plan.plan,
        "nutritionTips": plan.nutrition_tips,
        "metadata": {
            "id": plan.id,
            "createdAt": plan.created_at,
            "startDate": plan.params.start_date,
            "goal": plan.params.goal,
            "duration": plan.params.duration,
        },
    }))
}

pub async fn saved(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Response> {
    let mut meals: Vec<MealPlan> = Vec::with_capacity(auth.user.saved_meal_plans.len());
    for id in &auth.user.saved_meal_plans {
        if let Some(plan) = state.store.get_meal_plan(id).await? {
            meals.push(plan);
        }
    }
    ok(json!({ "meals": meals }))
}

pub async fn toggle_save(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<PlanRef>,
) -> ApiResult<Response> {
    let id = req.id()?;
    let saved = state
        .store
        .update_saved(SocialTarget::MealPlan, id, &auth.user.id, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal plan not found"))?;

    let message = if saved { "Meal plan saved" } else { "Meal plan unsaved" };
    ok(json!({ "message": message, "saved": saved }))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<PlanRef>,
) -> ApiResult<Response> {
    let id = req.id()?;
    let social = state
        .store
        .update_social(SocialTarget::MealPlan, id, Relation::Like, &auth.user.id, None)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal plan not found"))?;
    ok(json!({
        "liked": social.contains(Relation::Like, &auth.user.id),
        "likes": social.likes,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    if state.store.get_meal_plan(&id).await?.is_none() {
        return Err(ApiError::not_found("Meal plan not found"));
    }

    let was_saved = auth.user.saved_meal_plans.iter().any(|saved| *saved == id);
    if was_saved {
        state
            .store
            .update_saved(SocialTarget::MealPlan, &id, &auth.user.id, Some(false))
            .await?;
    }

    let message = if was_saved {
        "Meal plan removed from saved list"
    } else {
        "Meal plan was not in saved list"
    };
    ok(json!({ "message": message, "wasSaved": was_saved }))
}
