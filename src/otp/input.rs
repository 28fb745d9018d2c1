use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use utoipa::ToSchema;

static LEADING_INTEGER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// The submitted guess. Forms send it either as a JSON number or a string.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OtpInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl OtpInput {
    /// Integer value of the guess.
    ///
    /// Text is read up to the first non-digit after optional whitespace and
    /// sign, so `" 482913 "` and `"482913abc"` both yield `482913`. Floats are
    /// truncated toward zero.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(value) => value.is_finite().then(|| value.trunc() as i64),
            Self::Text(value) => leading_integer(value),
        }
    }

    #[must_use]
    pub fn matches(&self, code: u32) -> bool {
        self.as_integer() == Some(i64::from(code))
    }
}

fn leading_integer(value: &str) -> Option<i64> {
    let re = LEADING_INTEGER
        .get_or_init(|| Regex::new(r"^\s*([+-]?[0-9]+)"))
        .as_ref()
        .ok()?;
    let digits = re.captures(value)?.get(1)?;
    digits.as_str().parse().ok()
}
