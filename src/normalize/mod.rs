//! Turns free-form model output into guaranteed-shape records.
//!
//! The pipeline is `extract -> repair -> parse -> normalize`. Every stage before
//! normalization can reject the input; normalization itself is total.

pub mod extract;
pub mod meal_plan;
pub mod recipe;
pub mod repair;

use std::io::{Read as _, Write as _};

use anyhow::Context as _;
use serde_json::Value;

pub use extract::extract_json;
pub use meal_plan::{normalize_meal_plan, normalize_tips};
pub use recipe::{
    INGREDIENTS_PLACEHOLDER, RecipeContext, STEPS_PLACEHOLDER, normalize_recipe, normalize_titles,
};
pub use repair::repair_json;

/// Top-level JSON value a prompt asks the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    pub fn open(self) -> char {
        match self {
            JsonShape::Object => '{',
            JsonShape::Array => '[',
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no JSON {0:?} found in model output")]
    NoJsonFound(JsonShape),

    #[error("model output is not valid JSON after repair: {source}")]
    MalformedJson {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a JSON {expected:?} in model output")]
    UnexpectedShape { expected: JsonShape },

    #[error("meal plan has no days")]
    EmptyPlan,
}

/// Runs extraction, repair and parse for one model response.
///
/// Never returns partial data: the result is either a value of the requested
/// shape or an error.
pub fn decode(raw: &str, shape: JsonShape) -> Result<Value, PipelineError> {
    let extracted = extract_json(raw, shape)?;
    let repaired = repair_json(extracted);
    let value: Value =
        serde_json::from_str(&repaired).map_err(|source| PipelineError::MalformedJson {
            payload: repaired.clone().into_owned(),
            source,
        })?;

    let shape_ok = match shape {
        JsonShape::Object => value.is_object(),
        JsonShape::Array => value.is_array(),
    };
    if !shape_ok {
        return Err(PipelineError::UnexpectedShape { expected: shape });
    }
    Ok(value)
}

/// Normalizes a saved model response and prints the result as JSON.
pub fn run(args: crate::cli::NormalizeArgs) -> anyhow::Result<()> {
    use crate::cli::PayloadKind;

    let raw = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("read input: {}", args.input.display()))?
    };

    let output = match args.kind {
        PayloadKind::Recipe => {
            let value = decode(&raw, JsonShape::Object)?;
            let recipe = normalize_recipe(&value, &RecipeContext {
                requested_title: args.title.as_deref(),
                diet: &args.diet,
                nutrition_pref: &args.nutrition_pref,
            });
            serde_json::to_value(recipe)?
        }
        PayloadKind::MealPlan => {
            let value = decode(&raw, JsonShape::Array)?;
            serde_json::to_value(normalize_meal_plan(&value)?)?
        }
        PayloadKind::Titles => {
            let value = decode(&raw, JsonShape::Object)?;
            serde_json::json!({ "titles": normalize_titles(&value) })
        }
        PayloadKind::Tips => {
            let value = decode(&raw, JsonShape::Array)?;
            serde_json::json!({ "tips": normalize_tips(&value) })
        }
    };

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output).context("write output")?;
    writeln!(stdout).context("write output")?;
    Ok(())
}

pub(crate) fn trimmed_text(value: &Value, key: &str) -> String {
    value.get(key).map(scalar_text).unwrap_or_default()
}

/// Strings pass through trimmed; numbers and booleans are rendered; anything
/// else (null, lists, mappings) becomes the empty string.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
