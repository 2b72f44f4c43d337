use super::{JsonShape, PipelineError};

/// Locates the JSON value embedded in model output.
///
/// Scanning starts at the first opening delimiter of the requested shape and
/// stops at the delimiter that balances it. Delimiters inside double-quoted
/// strings are ignored, so prose after the value may contain braces.
pub fn extract_json(raw: &str, shape: JsonShape) -> Result<&str, PipelineError> {
    let start = raw
        .find(shape.open())
        .ok_or(PipelineError::NoJsonFound(shape))?;
    let len = balanced_len(&raw[start..]).ok_or(PipelineError::NoJsonFound(shape))?;
    Ok(&raw[start..start + len])
}

/// Byte length of the balanced span at the start of `text`, if it closes.
fn balanced_len(text: &str) -> Option<usize> {
    let mut expected: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => expected.push('}'),
            '[' => expected.push(']'),
            '}' | ']' => {
                if expected.pop() != Some(ch) {
                    return None;
                }
                if expected.is_empty() {
                    return Some(idx + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_exact_object_span_amid_prose() -> anyhow::Result<()> {
        let raw = "Here is your recipe:\n{\"title\":\"Dal\",\"steps\":[\"1. Boil dal\"]}\nEnjoy!";
        assert_eq!(
            extract_json(raw, JsonShape::Object)?,
            "{\"title\":\"Dal\",\"steps\":[\"1. Boil dal\"]}"
        );
        Ok(())
    }

    #[test]
    fn ignores_braces_in_trailing_prose() -> anyhow::Result<()> {
        let raw = "{\"a\": 1} and that's it :}";
        assert_eq!(extract_json(raw, JsonShape::Object)?, "{\"a\": 1}");
        Ok(())
    }

    #[test]
    fn ignores_delimiters_inside_strings() -> anyhow::Result<()> {
        let raw = "x {\"note\": \"use } sparingly \\\" {\", \"n\": [1]} y";
        assert_eq!(
            extract_json(raw, JsonShape::Object)?,
            "{\"note\": \"use } sparingly \\\" {\", \"n\": [1]}"
        );
        Ok(())
    }

    #[test]
    fn array_mode_looks_for_brackets() -> anyhow::Result<()> {
        let raw = "```json\n[{\"day\": \"Day 1\"}]\n```";
        assert_eq!(
            extract_json(raw, JsonShape::Array)?,
            "[{\"day\": \"Day 1\"}]"
        );
        Ok(())
    }

    #[test]
    fn missing_opening_delimiter_is_not_found() {
        assert!(matches!(
            extract_json("no json here", JsonShape::Object),
            Err(PipelineError::NoJsonFound(JsonShape::Object))
        ));
        assert!(matches!(
            extract_json("{\"only\": \"object\"}", JsonShape::Array),
            Err(PipelineError::NoJsonFound(JsonShape::Array))
        ));
    }

    #[test]
    fn unterminated_value_is_not_found() {
        assert!(matches!(
            extract_json("{\"title\": \"Dal\", \"steps\": [", JsonShape::Object),
            Err(PipelineError::NoJsonFound(_))
        ));
    }

    #[test]
    fn tolerates_multibyte_text() -> anyhow::Result<()> {
        let raw = "नमस्ते {\"title\": \"हींग\"} धन्यवाद";
        assert_eq!(
            extract_json(raw, JsonShape::Object)?,
            "{\"title\": \"हींग\"}"
        );
        Ok(())
    }
}
