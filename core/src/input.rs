use crate::error::{Result, TrackerError};

/// One `--row` argument split into the employee name and its `key:value` fields.
#[derive(Debug, PartialEq)]
pub struct ParsedRow {
    pub employee: String,
    pub fields: Vec<(String, String)>,
}

pub fn parse_row(input: &str) -> ParsedRow {
    let mut name_parts = Vec::new();
    let mut fields = Vec::new();

    for token in input.split_whitespace() {
        if let Some((key, value)) = token.split_once(':') {
            if !key.is_empty() {
                fields.push((key.to_string(), value.to_string()));
                continue;
            }
        }
        name_parts.push(token);
    }

    ParsedRow {
        employee: name_parts.join(" "),
        fields,
    }
}

pub fn expand_key<'a>(key: &str, candidates: &[&'a str]) -> Result<&'a str> {
    let key = key.to_lowercase();

    // 1. Exact match
    if let Some(exact) = candidates.iter().find(|&&c| c == key) {
        return Ok(*exact);
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key.as_str()))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0]),
        0 => Err(TrackerError::Validation(format!(
            "unknown field '{}' (expected one of {:?})",
            key, candidates
        ))),
        _ => Err(TrackerError::Validation(format!(
            "ambiguous field '{}' matches {:?}",
            key, matches
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let parsed = parse_row("Aiko morning:60 afternoon:40 mis:1");
        assert_eq!(parsed.employee, "Aiko");
        assert_eq!(
            parsed.fields,
            vec![
                ("morning".to_string(), "60".to_string()),
                ("afternoon".to_string(), "40".to_string()),
                ("mis".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_name_with_space() {
        let parsed = parse_row("Yamada Taro m:3");
        assert_eq!(parsed.employee, "Yamada Taro");
        assert_eq!(parsed.fields.len(), 1);
    }

    #[test]
    fn test_parse_empty_value() {
        let parsed = parse_row("Ken afternoon:");
        assert_eq!(parsed.fields, vec![("afternoon".to_string(), String::new())]);
    }

    #[test]
    fn test_expand_key() {
        let candidates = vec!["morning", "afternoon", "misdeliveries"];

        assert_eq!(expand_key("mo", &candidates).unwrap(), "morning");
        assert_eq!(expand_key("a", &candidates).unwrap(), "afternoon");
        assert_eq!(expand_key("MIS", &candidates).unwrap(), "misdeliveries");
        assert_eq!(expand_key("morning", &candidates).unwrap(), "morning");
    }

    #[test]
    fn test_expand_key_ambiguous() {
        let candidates = vec!["morning", "misdeliveries"];
        let result = expand_key("m", &candidates);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("ambiguous"));
    }

    #[test]
    fn test_expand_key_unknown() {
        let candidates = vec!["morning"];
        assert!(expand_key("x", &candidates).is_err());
    }
}
