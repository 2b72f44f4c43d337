use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::social::SocialState;

/// Per-request filters the user picked when asking for a recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilters {
    #[serde(default, deserialize_with = "one_or_many")]
    pub cuisine: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub diet: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub nutrition_pref: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub allergies: Vec<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub cook_time: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub serving_size: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthInfo {
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub dietary: Vec<String>,
}

/// Guaranteed-shape recipe content produced by the normalizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeContent {
    pub title: String,
    pub description: String,
    pub cook_time: String,
    pub serving_size: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub health_info: HealthInfo,
    pub chef_tip: String,
    pub serving_tip: String,
    pub additional_info: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    #[serde(flatten)]
    pub content: RecipeContent,
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub nutrition_pref: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(flatten)]
    pub social: SocialState,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MealDay {
    pub day: String,
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    pub snacks: String,
}

/// Inputs of a meal-plan request; stored verbatim alongside the plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanParams {
    pub goal: String,
    pub weight: f64,
    pub height: f64,
    pub duration: u32,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_issues: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: String,
    pub user: Option<String>,
    #[serde(flatten)]
    pub params: MealPlanParams,
    pub plan: Vec<MealDay>,
    pub nutrition_tips: Vec<String>,
    #[serde(flatten)]
    pub social: SocialState,
    pub created_at: DateTime<Utc>,
}

/// Curated "healthy recipes" entry. Only title/description/image are required;
/// the full content is generated on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub likes: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub saved_recipes: Vec<String>,
    #[serde(default)]
    pub saved_meal_plans: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-facing view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub saved_recipes: Vec<String>,
    pub saved_meal_plans: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            saved_recipes: user.saved_recipes.clone(),
            saved_meal_plans: user.saved_meal_plans.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Accepts `"Vegan"`, `"Vegan, Keto"` or `["Vegan", "Keto"]`.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => value.split(',').map(str::to_owned).collect(),
        Some(OneOrMany::Many(values)) => values,
    };
    Ok(values
        .into_iter()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect())
}

/// Accepts `"30 min"`, `30` or `true`; form clients often send numbers.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    let text = match Option::<Scalar>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Number(number)) => number.to_string(),
        Some(Scalar::Flag(flag)) => flag.to_string(),
    };
    Ok(Some(text))
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
