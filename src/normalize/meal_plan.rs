use serde_json::Value;

use super::{PipelineError, scalar_text, string_list, trimmed_text};
use crate::model::MealDay;

const MEALS: [&str; 4] = ["breakfast", "lunch", "dinner", "snacks"];

/// Converts a decoded array into plan days.
///
/// Entries that are not mappings are skipped; a missing meal is kept as an
/// empty string since a partial day is still useful. A plan with no days is
/// rejected.
pub fn normalize_meal_plan(value: &Value) -> Result<Vec<MealDay>, PipelineError> {
    let days: Vec<MealDay> = value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .enumerate()
                .map(|(idx, item)| meal_day(idx, item))
                .collect()
        })
        .unwrap_or_default();

    if days.is_empty() {
        return Err(PipelineError::EmptyPlan);
    }
    Ok(days)
}

pub fn normalize_tips(value: &Value) -> Vec<String> {
    match value {
        Value::Object(map) => string_list(map.get("tips")),
        other => string_list(Some(other)),
    }
}

fn meal_day(idx: usize, item: &Value) -> MealDay {
    let mut day = trimmed_text(item, "day");
    if day.is_empty() {
        day = format!("Day {}", idx + 1);
    }

    let [breakfast, lunch, dinner, snacks] =
        MEALS.map(|meal| item.get(meal).map(meal_text).unwrap_or_default());

    MealDay {
        day,
        breakfast,
        lunch,
        dinner,
        snacks,
    }
}

/// Models sometimes describe a meal as a list of dishes or as a mapping with
/// a name; both collapse to one line.
fn meal_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(meal_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => ["name", "title", "description"]
            .iter()
            .map(|key| trimmed_text(value, key))
            .find(|s| !s.is_empty())
            .unwrap_or_default(),
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn partial_days_are_kept_with_empty_meals() -> anyhow::Result<()> {
        let days = normalize_meal_plan(&json!([
            {"day": "Day 1", "breakfast": "Poha", "lunch": "Dal rice", "dinner": "Roti sabzi", "snacks": "Fruit"},
            {"breakfast": "Upma"}
        ]))?;

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].snacks, "Fruit");
        assert_eq!(days[1].day, "Day 2");
        assert_eq!(days[1].breakfast, "Upma");
        assert_eq!(days[1].lunch, "");
        assert_eq!(days[1].snacks, "");
        Ok(())
    }

    #[test]
    fn structured_meals_collapse_to_text() -> anyhow::Result<()> {
        let days = normalize_meal_plan(&json!([
            {"day": "Monday", "lunch": ["Rajma", "Rice"], "dinner": {"name": "Khichdi", "calories": 350}}
        ]))?;
        assert_eq!(days[0].lunch, "Rajma, Rice");
        assert_eq!(days[0].dinner, "Khichdi");
        Ok(())
    }

    #[test]
    fn empty_or_non_mapping_plans_are_rejected() {
        assert!(matches!(
            normalize_meal_plan(&json!([])),
            Err(PipelineError::EmptyPlan)
        ));
        assert!(matches!(
            normalize_meal_plan(&json!(["Day 1: poha"])),
            Err(PipelineError::EmptyPlan)
        ));
    }

    #[test]
    fn tips_accept_bare_list_or_wrapped_object() {
        assert_eq!(
            normalize_tips(&json!(["Drink water", "", "Sleep well"])),
            vec!["Drink water", "Sleep well"]
        );
        assert_eq!(normalize_tips(&json!({"tips": ["Walk daily"]})), vec!["Walk daily"]);
        assert!(normalize_tips(&json!("nope")).is_empty());
    }
}
