use crate::core::Value;
use crate::prelude::*;
use crate::protocols::ColumnMapPredicate;
use regex::Regex;
use serde::{Deserialize, Serialize};

fn compile(argument: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        TermError::invalid_argument(argument, format!("invalid regex '{pattern}': {e}"))
    })
}

fn compile_list(patterns: &[String]) -> Result<Vec<Regex>> {
    if patterns.is_empty() {
        return Err(TermError::invalid_argument(
            "regex_list",
            "at least one regex is required",
        ));
    }
    patterns.iter().map(|p| compile("regex_list", p)).collect()
}

/// Regexes search anywhere in the value's string rendering.
fn searches(regex: &Regex, value: &Value) -> bool {
    match value {
        Value::Str(s) => regex.is_match(s),
        other => regex.is_match(&other.to_string()),
    }
}

/// Expects every value to contain a match of `regex`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToMatchRegex {
    pub regex: String,
}

impl ValuesToMatchRegex {
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
        }
    }
}

impl ColumnMapPredicate for ValuesToMatchRegex {
    const NAME: &'static str = "expect_column_values_to_match_regex";

    fn validate(&self) -> Result<()> {
        compile("regex", &self.regex).map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let regex = compile("regex", &self.regex)?;
        Ok(values.iter().map(|v| searches(&regex, v)).collect())
    }
}

/// Expects no value to contain a match of `regex`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToNotMatchRegex {
    pub regex: String,
}

impl ValuesToNotMatchRegex {
    pub fn new(regex: impl Into<String>) -> Self {
        Self {
            regex: regex.into(),
        }
    }
}

impl ColumnMapPredicate for ValuesToNotMatchRegex {
    const NAME: &'static str = "expect_column_values_to_not_match_regex";

    fn validate(&self) -> Result<()> {
        compile("regex", &self.regex).map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let regex = compile("regex", &self.regex)?;
        Ok(values.iter().map(|v| !searches(&regex, v)).collect())
    }
}

/// How a value must relate to a list of regexes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOn {
    /// At least one regex matches.
    #[default]
    Any,
    /// Every regex matches.
    All,
}

/// Expects every value to match any (or all) of `regex_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToMatchRegexList {
    pub regex_list: Vec<String>,
    #[serde(default)]
    pub match_on: MatchOn,
}

impl ValuesToMatchRegexList {
    pub fn new<I, S>(regex_list: I, match_on: MatchOn) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regex_list: regex_list.into_iter().map(Into::into).collect(),
            match_on,
        }
    }
}

impl ColumnMapPredicate for ValuesToMatchRegexList {
    const NAME: &'static str = "expect_column_values_to_match_regex_list";

    fn validate(&self) -> Result<()> {
        compile_list(&self.regex_list).map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let regexes = compile_list(&self.regex_list)?;
        Ok(values
            .iter()
            .map(|v| match self.match_on {
                MatchOn::Any => regexes.iter().any(|r| searches(r, v)),
                MatchOn::All => regexes.iter().all(|r| searches(r, v)),
            })
            .collect())
    }
}

/// Expects no value to match any regex of `regex_list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesToNotMatchRegexList {
    pub regex_list: Vec<String>,
}

impl ValuesToNotMatchRegexList {
    pub fn new<I, S>(regex_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regex_list: regex_list.into_iter().map(Into::into).collect(),
        }
    }
}

impl ColumnMapPredicate for ValuesToNotMatchRegexList {
    const NAME: &'static str = "expect_column_values_to_not_match_regex_list";

    fn validate(&self) -> Result<()> {
        compile_list(&self.regex_list).map(|_| ())
    }

    fn map(&self, values: &[Value]) -> Result<Vec<bool>> {
        let regexes = compile_list(&self.regex_list)?;
        Ok(values
            .iter()
            .map(|v| !regexes.iter().any(|r| searches(r, v)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_not_full_match() {
        let p = ValuesToMatchRegex::new(r"\d{3}");
        let values = vec![Value::from("ab123cd"), Value::from("12"), Value::Int(4567)];
        assert_eq!(p.map(&values).unwrap(), vec![true, false, true]);
        assert_eq!(
            ValuesToNotMatchRegex::new(r"\d{3}").map(&values).unwrap(),
            vec![false, true, false]
        );
    }

    #[test]
    fn test_float_rendering() {
        let p = ValuesToMatchRegex::new(r"^\d+\.0$");
        assert_eq!(p.map(&[Value::Float(2.0)]).unwrap(), vec![true]);
    }

    #[test]
    fn test_invalid_regex() {
        assert!(matches!(
            ValuesToMatchRegex::new("(").validate(),
            Err(TermError::InvalidArgument { .. })
        ));
        assert!(ValuesToMatchRegexList::new(Vec::<String>::new(), MatchOn::Any)
            .validate()
            .is_err());
    }

    #[test]
    fn test_regex_list_any_and_all() {
        let values = vec![Value::from("ab"), Value::from("a"), Value::from("c")];
        assert_eq!(
            ValuesToMatchRegexList::new(["a", "b"], MatchOn::Any).map(&values).unwrap(),
            vec![true, true, false]
        );
        assert_eq!(
            ValuesToMatchRegexList::new(["a", "b"], MatchOn::All).map(&values).unwrap(),
            vec![true, false, false]
        );
        assert_eq!(
            ValuesToNotMatchRegexList::new(["a", "b"]).map(&values).unwrap(),
            vec![false, false, true]
        );
    }

    #[test]
    fn test_match_on_kwarg() {
        let p: ValuesToMatchRegexList =
            serde_json::from_str(r#"{"regex_list": ["x"], "match_on": "all"}"#).unwrap();
        assert_eq!(p.match_on, MatchOn::All);
        assert!(serde_json::from_str::<ValuesToMatchRegexList>(
            r#"{"regex_list": ["x"], "match_on": "some"}"#
        )
        .is_err());
    }
}
