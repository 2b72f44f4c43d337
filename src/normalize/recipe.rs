use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::{scalar_text, string_list, trimmed_text};
use crate::model::{HealthInfo, RecipeContent};

pub const INGREDIENTS_PLACEHOLDER: &str = "Ingredients missing or unclear. Please verify input.";
pub const STEPS_PLACEHOLDER: &str =
    "Step 1: Heat oil, sauté aromatics, and cook ingredients step-by-step.";
const UNTITLED: &str = "Untitled Recipe";
const FILLER_STEP: &str = "basic cooking instructions";
const MIN_INGREDIENT_CHARS: usize = 5;

/// A line that is only a quantity and/or unit ("2 tsp", "1 cup of", "to taste").
static BARE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\d/.,\s½¼¾⅓⅔-]*(?:teaspoons?|tablespoons?|tsps?|tbsps?|cups?|cans?|grams?|g|kg|ml|l|litres?|liters?|pinch(?:es)?|to taste|optional)\b[\s.]*(?:of)?[\s.]*$",
    )
    .expect("valid bare unit regex")
});

static STEP_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:step\s*)?\d+[:.)\-\s]*").expect("valid step ordinal regex")
});

/// Request-side inputs the normalizer needs besides the model payload.
#[derive(Debug, Clone, Default)]
pub struct RecipeContext<'a> {
    pub requested_title: Option<&'a str>,
    pub diet: &'a [String],
    pub nutrition_pref: &'a [String],
}

pub fn normalize_recipe(value: &Value, ctx: &RecipeContext<'_>) -> RecipeContent {
    let mut title = trimmed_text(value, "title");
    if title.is_empty() {
        title = ctx
            .requested_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
            .to_owned();
    }

    RecipeContent {
        title,
        description: trimmed_text(value, "description"),
        cook_time: trimmed_text(value, "cookTime"),
        serving_size: trimmed_text(value, "servingSize"),
        ingredients: normalize_ingredients(value.get("ingredients")),
        steps: normalize_steps(value.get("steps")),
        health_info: normalize_health_info(value.get("healthInfo"), ctx),
        chef_tip: trimmed_text(value, "chefTip"),
        serving_tip: trimmed_text(value, "servingTip"),
        additional_info: trimmed_text(value, "additionalInfo"),
        image_url: trimmed_text(value, "imageUrl"),
    }
}

pub fn normalize_titles(value: &Value) -> Vec<String> {
    string_list(value.get("titles"))
}

pub fn normalize_ingredients(value: Option<&Value>) -> Vec<String> {
    let mut out: Vec<String> = candidates(value)
        .iter()
        .filter_map(ingredient_line)
        .collect();
    if out.is_empty() {
        out.push(INGREDIENTS_PLACEHOLDER.to_owned());
    }
    out
}

pub fn normalize_steps(value: Option<&Value>) -> Vec<String> {
    let steps: Vec<String> = candidates(value)
        .iter()
        .filter_map(step_text)
        .enumerate()
        .map(|(idx, text)| format!("Step {}: {text}", idx + 1))
        .collect();
    if steps.is_empty() {
        return vec![STEPS_PLACEHOLDER.to_owned()];
    }
    steps
}

/// A list stays a list; a lone string is read as one candidate per line.
fn candidates(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(text)) => text
            .lines()
            .map(|line| Value::String(line.to_owned()))
            .collect(),
        _ => Vec::new(),
    }
}

fn ingredient_line(candidate: &Value) -> Option<String> {
    match candidate {
        Value::Object(_) => {
            let line = ["quantity", "unit", "name"]
                .iter()
                .map(|key| trimmed_text(candidate, key))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if line.is_empty() {
                return None;
            }
            let notes = trimmed_text(candidate, "notes");
            if notes.is_empty() {
                Some(line)
            } else {
                Some(format!("{line} — {notes}"))
            }
        }
        Value::String(text) => {
            let clean = text.trim();
            if clean.chars().count() < MIN_INGREDIENT_CHARS || BARE_UNIT.is_match(clean) {
                return None;
            }
            Some(clean.to_owned())
        }
        _ => None,
    }
}

fn step_text(candidate: &Value) -> Option<String> {
    let raw = match candidate {
        Value::Object(_) => {
            let description = trimmed_text(candidate, "description");
            if description.is_empty() {
                trimmed_text(candidate, "text")
            } else {
                description
            }
        }
        other => scalar_text(other),
    };

    let text = STEP_ORDINAL.replace(&raw, "").trim().to_owned();
    if text.is_empty() || text.to_lowercase().contains(FILLER_STEP) {
        return None;
    }
    Some(text)
}

fn normalize_health_info(value: Option<&Value>, ctx: &RecipeContext<'_>) -> HealthInfo {
    let empty = Value::Null;
    let info = value.unwrap_or(&empty);

    let mut dietary = dedup(tag_list(info.get("dietary")));
    if dietary.is_empty() {
        dietary = dedup(
            ctx.diet
                .iter()
                .chain(ctx.nutrition_pref)
                .map(|tag| tag.trim().to_owned())
                .filter(|tag| !tag.is_empty())
                .collect(),
        );
    }

    HealthInfo {
        calories: trimmed_text(info, "calories"),
        protein: trimmed_text(info, "protein"),
        fat: trimmed_text(info, "fat"),
        carbs: trimmed_text(info, "carbs"),
        dietary,
    }
}

/// Tags arrive either as a list or as one comma-separated string.
fn tag_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(tags)) => tags
            .split(',')
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect(),
        other => string_list(other),
    }
}

/// Keeps the first occurrence of each tag, in order.
fn dedup(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ctx<'a>(diet: &'a [String], nutrition_pref: &'a [String]) -> RecipeContext<'a> {
        RecipeContext {
            requested_title: Some("Requested"),
            diet,
            nutrition_pref,
        }
    }

    #[test]
    fn drops_short_and_bare_unit_ingredients() {
        let value = json!([
            "2 tsp",
            "1 cup",
            "to taste",
            "Optional",
            "salt",
            "1/2 cup of",
            "2 cups basmati rice",
            "salt to taste",
            "fresh coriander leaves chopped"
        ]);
        assert_eq!(
            normalize_ingredients(Some(&value)),
            vec![
                "2 cups basmati rice",
                "salt to taste",
                "fresh coriander leaves chopped"
            ]
        );
    }

    #[test]
    fn placeholder_is_sole_entry_when_everything_is_dropped() {
        let value = json!(["1 tbsp", "oil", null, 3]);
        assert_eq!(normalize_ingredients(Some(&value)), vec![INGREDIENTS_PLACEHOLDER]);
        assert_eq!(normalize_ingredients(None), vec![INGREDIENTS_PLACEHOLDER]);
    }

    #[test]
    fn structured_ingredients_are_joined() {
        let value = json!([
            {"quantity": "2", "unit": "cups", "name": "toor dal", "notes": "rinsed"},
            {"quantity": 1, "unit": "", "name": "onion"},
            {"quantity": "", "unit": "", "name": ""}
        ]);
        assert_eq!(
            normalize_ingredients(Some(&value)),
            vec!["2 cups toor dal — rinsed", "1 onion"]
        );
    }

    #[test]
    fn steps_are_renumbered_without_gaps() {
        let value = json!([
            "3) Boil dal",
            {"description": "Step 7: Add tadka"},
            {"text": "Follow basic cooking instructions"},
            "",
            "  STEP 2 - Garnish  "
        ]);
        assert_eq!(
            normalize_steps(Some(&value)),
            vec!["Step 1: Boil dal", "Step 2: Add tadka", "Step 3: Garnish"]
        );
    }

    #[test]
    fn steps_fall_back_to_fixed_instruction() {
        assert_eq!(normalize_steps(Some(&json!([]))), vec![STEPS_PLACEHOLDER]);
        assert_eq!(
            normalize_steps(Some(&json!(["Basic cooking instructions apply."]))),
            vec![STEPS_PLACEHOLDER]
        );
    }

    #[test]
    fn dietary_defaults_to_union_of_preferences() {
        let diet = vec!["Vegetarian".to_owned(), "Jain".to_owned()];
        let prefs = vec!["High-Protein".to_owned(), "Vegetarian".to_owned()];
        let recipe = normalize_recipe(&json!({"healthInfo": {"dietary": []}}), &ctx(&diet, &prefs));
        assert_eq!(
            recipe.health_info.dietary,
            vec!["Vegetarian", "Jain", "High-Protein"]
        );
    }

    #[test]
    fn model_dietary_tags_are_deduplicated() {
        let recipe = normalize_recipe(
            &json!({"healthInfo": {"calories": 210, "dietary": ["Vegan", "Vegan", "Gluten-Free"]}}),
            &ctx(&[], &[]),
        );
        assert_eq!(recipe.health_info.dietary, vec!["Vegan", "Gluten-Free"]);
        assert_eq!(recipe.health_info.calories, "210");
    }

    #[test]
    fn comma_separated_dietary_string_is_split() {
        let recipe = normalize_recipe(
            &json!({"healthInfo": {"dietary": "Vegan, Gluten-Free, ,Vegan"}}),
            &ctx(&["Jain".to_owned()], &[]),
        );
        assert_eq!(recipe.health_info.dietary, vec!["Vegan", "Gluten-Free"]);
    }

    #[test]
    fn missing_fields_default_to_empty_strings() {
        let recipe = normalize_recipe(&json!({"title": "  Dal  "}), &ctx(&[], &[]));
        assert_eq!(recipe.title, "Dal");
        assert_eq!(recipe.description, "");
        assert_eq!(recipe.chef_tip, "");
        assert_eq!(recipe.image_url, "");
        assert!(recipe.health_info.dietary.is_empty());
    }

    #[test]
    fn empty_title_falls_back_to_requested_title() {
        let recipe = normalize_recipe(&json!({"title": ""}), &ctx(&[], &[]));
        assert_eq!(recipe.title, "Requested");

        let recipe = normalize_recipe(&json!({}), &RecipeContext::default());
        assert_eq!(recipe.title, "Untitled Recipe");
    }

    #[test]
    fn titles_skip_blank_entries() {
        assert_eq!(
            normalize_titles(&json!({"titles": ["Dal Tadka", " ", "Jeera Rice"]})),
            vec!["Dal Tadka", "Jeera Rice"]
        );
        assert!(normalize_titles(&json!({})).is_empty());
    }
}
