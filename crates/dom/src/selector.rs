//! Minimal selector grammar
//!
//! Single simple selectors only: `TAG`, `#id`, `.class`, `[attr]`,
//! `[attr="value"]`.

use std::collections::BTreeMap;

use contracts::ContractError;

/// Parsed simple selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Tag(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

impl Selector {
    /// Parse a selector string
    pub fn parse(input: &str) -> Result<Self, ContractError> {
        let input = input.trim();
        if input.is_empty() || (input.contains(char::is_whitespace) && !input.starts_with('[')) {
            return Err(unsupported(input));
        }

        if let Some(id) = input.strip_prefix('#') {
            return non_empty(id, input).map(|id| Self::Id(id.to_string()));
        }
        if let Some(class) = input.strip_prefix('.') {
            return non_empty(class, input).map(|c| Self::Class(c.to_string()));
        }
        if let Some(body) = input.strip_prefix('[') {
            let body = body.strip_suffix(']').ok_or_else(|| unsupported(input))?;
            return Self::parse_attribute(body, input);
        }
        if input.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Ok(Self::Tag(input.to_ascii_uppercase()));
        }
        Err(unsupported(input))
    }

    fn parse_attribute(body: &str, input: &str) -> Result<Self, ContractError> {
        match body.split_once('=') {
            None => non_empty(body.trim(), input).map(|name| Self::Attribute {
                name: name.to_string(),
                value: None,
            }),
            Some((name, value)) => {
                let name = non_empty(name.trim(), input)?;
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                Ok(Self::Attribute {
                    name: name.to_string(),
                    value: Some(value.to_string()),
                })
            }
        }
    }

    /// Does a node with this tag and attributes match
    pub fn matches(&self, tag: &str, attrs: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Tag(expected) => tag.eq_ignore_ascii_case(expected),
            Self::Id(id) => attrs.get("id").is_some_and(|v| v == id),
            Self::Class(class) => attrs
                .get("class")
                .is_some_and(|v| v.split_whitespace().any(|c| c == class)),
            Self::Attribute { name, value } => match (attrs.get(name), value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
        }
    }
}

fn non_empty<'a>(part: &'a str, input: &str) -> Result<&'a str, ContractError> {
    if part.is_empty() {
        Err(unsupported(input))
    } else {
        Ok(part)
    }
}

fn unsupported(input: &str) -> ContractError {
    ContractError::dom(format!("unsupported selector '{input}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(Selector::parse("body").unwrap(), Selector::Tag("BODY".into()));
        assert_eq!(Selector::parse("#main").unwrap(), Selector::Id("main".into()));
        assert_eq!(
            Selector::parse(".hero").unwrap(),
            Selector::Class("hero".into())
        );
        assert_eq!(
            Selector::parse(r##"[data-prehiding="#hero"]"##).unwrap(),
            Selector::Attribute {
                name: "data-prehiding".into(),
                value: Some("#hero".into())
            }
        );
    }

    #[test]
    fn test_parse_rejects_compound() {
        assert!(Selector::parse("div .hero").is_err());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("#").is_err());
        assert!(Selector::parse("div>p").is_err());
    }

    #[test]
    fn test_class_matching() {
        let selector = Selector::parse(".b").unwrap();
        assert!(selector.matches("DIV", &attrs(&[("class", "a b c")])));
        assert!(!selector.matches("DIV", &attrs(&[("class", "abc")])));
    }

    #[test]
    fn test_attribute_presence() {
        let selector = Selector::parse("[hidden]").unwrap();
        assert!(selector.matches("DIV", &attrs(&[("hidden", "")])));
        assert!(!selector.matches("DIV", &attrs(&[])));
    }
}
