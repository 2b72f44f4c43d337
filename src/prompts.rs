//! Prompt templates. Optional inputs are left out of a prompt when empty so
//! the model does not invent values for them.

use std::fmt::Write as _;

use crate::model::{CatalogEntry, MealPlanParams, RecipeFilters};

fn joined(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

pub fn titles_prompt(query: &str, filters: &RecipeFilters) -> String {
    let mut inputs = format!("- Query (dish idea or ingredients): \"{}\"\n", query.trim());
    let optional = [
        ("Cuisine", joined(&filters.cuisine)),
        ("Diet", joined(&filters.diet)),
        ("Nutrition preferences", joined(&filters.nutrition_pref)),
        ("Allergies", joined(&filters.allergies)),
        (
            "Cook time",
            non_empty(filters.cook_time.as_deref()).unwrap_or_default().to_owned(),
        ),
        (
            "Serving size",
            non_empty(filters.serving_size.as_deref()).unwrap_or_default().to_owned(),
        ),
        (
            "Notes",
            non_empty(filters.additional_notes.as_deref()).unwrap_or_default().to_owned(),
        ),
    ];
    for (label, value) in optional {
        if !value.is_empty() {
            let _ = writeln!(inputs, "- {label}: {value}");
        }
    }

    format!(
        "Task: suggest 2-4 beginner-friendly dish titles based on the user's query and filters.

User input:
{inputs}
Guidelines:
- Suggest only recipe titles, without ingredients or explanation.
- Respect all filters and allergies.
- Use familiar, practical names; avoid exotic or allergy-conflicting dishes.

Output (JSON only):
{{
  \"titles\": [\"Dish Name 1\", \"Dish Name 2\", \"Dish Name 3\", \"Dish Name 4\"]
}}"
    )
}

const RECIPE_SHAPE: &str = r#"{
  "title": "",
  "description": "",
  "cookTime": "",
  "servingSize": "",
  "ingredients": ["..."],
  "steps": ["..."],
  "healthInfo": {
    "calories": "",
    "protein": "",
    "fat": "",
    "carbs": "",
    "dietary": ["Vegetarian", "Gluten-Free"]
  },
  "chefTip": "",
  "servingTip": "",
  "additionalInfo": "",
  "imageUrl": ""
}"#;

pub fn full_recipe_prompt(title: &str, query: &str, filters: &RecipeFilters) -> String {
    let cuisine = joined(&filters.cuisine);
    let diet = joined(&filters.diet);
    let nutrition = joined(&filters.nutrition_pref);
    let allergies = joined(&filters.allergies);
    let cook_time = non_empty(filters.cook_time.as_deref()).unwrap_or("Not specified");
    let serving_size = non_empty(filters.serving_size.as_deref()).unwrap_or("Not specified");
    let notes = non_empty(filters.additional_notes.as_deref()).unwrap_or("None");

    format!(
        "You are an expert chef.

Generate a detailed recipe as valid JSON only (no markdown, no explanation).

The recipe must:
- Match the given title, query and dietary filters.
- Use simple ingredients that respect allergies.
- Be beginner-friendly with easy cooking steps.
- Include serving tips, chef advice and health data.
- Use simple Hindi brackets for rare terms (e.g. \"asafoetida (हींग)\").

Output structure:
{RECIPE_SHAPE}

User input:
- Query: \"{query}\"
- Title: {title}
- Cuisine: {cuisine}
- Cook time: {cook_time}
- Diet: {diet}
- Nutrition preferences: {nutrition}
- Allergies: {allergies}
- Serving size: {serving_size}
- Notes: {notes}

Return ONLY valid JSON.",
        query = query.trim(),
        title = title.trim(),
        cuisine = or_default(&cuisine, "Not specified"),
        diet = or_default(&diet, "None"),
        nutrition = or_default(&nutrition, "None"),
        allergies = or_default(&allergies, "None"),
    )
}

pub fn catalog_recipe_prompt(entry: &CatalogEntry) -> String {
    format!(
        "You are a healthy Indian recipe expert. Based on this dish:

Title: {title}
Description: {description}

Generate a complete Indian recipe in this JSON format only:
{RECIPE_SHAPE}

Only return valid JSON. No markdown, no explanation, no comments, no ellipsis (...), no trailing commas.",
        title = entry.title,
        description = entry.description,
    )
}

fn profile_lines(params: &MealPlanParams) -> String {
    let mut lines = String::new();
    let _ = writeln!(lines, "- Goal: {}", params.goal.trim());
    let _ = writeln!(lines, "- Weight: {} kg", params.weight);
    let _ = writeln!(lines, "- Height: {} cm", params.height);
    if let Some(age) = params.age {
        let _ = writeln!(lines, "- Age: {age}");
    }
    let optional = [
        ("Gender", params.gender.as_deref()),
        ("Activity level", params.activity.as_deref()),
        ("Diet type", params.diet_type.as_deref()),
        ("Allergies", params.allergies.as_deref()),
        ("Health issues", params.health_issues.as_deref()),
    ];
    for (label, value) in optional {
        if let Some(value) = non_empty(value) {
            let _ = writeln!(lines, "- {label}: {value}");
        }
    }
    lines
}

pub fn meal_plan_prompt(params: &MealPlanParams) -> String {
    format!(
        "You are a smart dietician.
Generate a {duration}-day Indian meal plan starting {start_date} based on:
{profile}
Consider every optional field listed above. Do not assume values for fields that are not listed.

Each day must include breakfast, lunch, dinner and snacks.

Respond strictly in JSON:
[
  {{
    \"day\": \"Day 1\",
    \"breakfast\": \"...\",
    \"lunch\": \"...\",
    \"dinner\": \"...\",
    \"snacks\": \"...\"
  }}
]
ONLY return a valid JSON array. No markdown or extra text.",
        duration = params.duration,
        start_date = params.start_date.trim(),
        profile = profile_lines(params),
    )
}

pub fn nutrition_tips_prompt(params: &MealPlanParams) -> String {
    format!(
        "You are a smart nutritionist.
Based on the following inputs:
{profile}
Give 5 personalized nutrition tips as a JSON array of strings:
[\"Tip 1\", \"Tip 2\"]
Only return a valid JSON array.",
        profile = profile_lines(params),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_prompt_omits_empty_filters() {
        let filters = RecipeFilters {
            diet: vec!["Vegan".to_owned(), " ".to_owned()],
            cook_time: Some("  ".to_owned()),
            ..Default::default()
        };
        let prompt = titles_prompt("  paneer ", &filters);
        assert!(prompt.contains("\"paneer\""));
        assert!(prompt.contains("- Diet: Vegan\n"));
        assert!(!prompt.contains("Cook time"));
        assert!(!prompt.contains("Cuisine"));
    }

    #[test]
    fn full_recipe_prompt_fills_defaults() {
        let prompt = full_recipe_prompt("Dal Tadka", "lentils", &RecipeFilters::default());
        assert!(prompt.contains("- Title: Dal Tadka"));
        assert!(prompt.contains("- Allergies: None"));
        assert!(prompt.contains("- Cook time: Not specified"));
        assert!(prompt.contains("\"healthInfo\""));
    }

    #[test]
    fn meal_plan_prompt_lists_only_given_profile_fields() {
        let params = MealPlanParams {
            goal: "Weight loss".to_owned(),
            weight: 72.5,
            height: 168.0,
            duration: 3,
            start_date: "2025-01-06".to_owned(),
            age: Some(31),
            gender: None,
            diet_type: Some("Vegetarian".to_owned()),
            ..Default::default()
        };
        let prompt = meal_plan_prompt(&params);
        assert!(prompt.contains("3-day"));
        assert!(prompt.contains("- Weight: 72.5 kg"));
        assert!(prompt.contains("- Age: 31"));
        assert!(prompt.contains("- Diet type: Vegetarian"));
        assert!(!prompt.contains("Gender"));

        let tips = nutrition_tips_prompt(&params);
        assert!(tips.contains("5 personalized nutrition tips"));
    }
}
