//! Translation of Google Maps JSON styles into Static Maps `style` parameters.
//! <https://developers.google.com/maps/documentation/maps-static/styling>

use std::fmt;

use serde_json::{Map, Value};

use crate::request::encode_component;

#[derive(Debug, thiserror::Error)]
#[error("there are errors in styles JSON: {0}")]
pub struct StyleParseError(#[from] serde_json::Error);

/// Single entry of a JSON style array, as produced by the Google Maps styling wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub feature_type: String,
    pub element_type: String,
    /// Property overrides, in the order they were written.
    pub stylers: Vec<(String, String)>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    feature_type: Option<String>,
    element_type: Option<String>,
    stylers: Option<Vec<Styler>>,
}

/// `{"color": "#ff0000"}`. Only the first property of the object is used.
#[derive(serde::Deserialize)]
#[serde(try_from = "Map<String, Value>")]
struct Styler {
    property: String,
    value: String,
}

impl TryFrom<Map<String, Value>> for Styler {
    type Error = String;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        let (property, value) = object
            .into_iter()
            .next()
            .ok_or_else(|| "empty styler".to_owned())?;

        let value = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => return Err(format!("unsupported value of '{property}': {other}")),
        };

        Ok(Self { property, value })
    }
}

impl From<RawRule> for StyleRule {
    fn from(raw: RawRule) -> Self {
        Self {
            feature_type: raw.feature_type.unwrap_or_else(|| "all".to_owned()),
            element_type: raw.element_type.unwrap_or_else(|| "all".to_owned()),
            stylers: raw
                .stylers
                .unwrap_or_default()
                .into_iter()
                .map(|styler| (styler.property, styler.value))
                .collect(),
        }
    }
}

impl StyleRule {
    /// Parse a JSON array of style rules.
    ///
    /// # Errors
    ///
    /// When `raw` is not valid JSON, is not an array of objects, or contains a styler which
    /// is not a non-empty object with a textual, numeric or boolean value.
    pub fn parse_all(raw: &str) -> Result<Vec<Self>, StyleParseError> {
        let objects: Vec<Map<String, Value>> = serde_json::from_str(raw)?;
        objects
            .into_iter()
            .map(|object| -> Result<Self, StyleParseError> {
                let rule: RawRule = serde_json::from_value(Value::Object(object))?;
                Ok(rule.into())
            })
            .collect()
    }

    /// Value of the `style` parameter before percent-encoding. Rules without stylers give an
    /// empty string.
    fn to_param(&self) -> String {
        if self.stylers.is_empty() {
            return String::new();
        }

        let mut param = format!("feature:{}|element:{}|", self.feature_type, self.element_type);
        for (property, value) in &self.stylers {
            param.push_str(property);
            param.push(':');
            param.push_str(&color_literal(value));
            param.push('|');
        }
        param
    }
}

/// Static Maps expects `0xRRGGBB` where the styling wizard writes `#RRGGBB`.
fn color_literal(value: &str) -> String {
    match value.strip_prefix('#') {
        Some(hex) => format!("0x{hex}"),
        None => value.to_owned(),
    }
}

/// Already escaped `&style=...` part of the query string. Empty if no styles were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleParams(String);

impl StyleParams {
    /// Encode the JSON style array typed by the user. Blank input means no styling.
    ///
    /// Every rule contributes exactly one `style` entry, even if it has no stylers, so the
    /// number of entries always matches the number of rules.
    ///
    /// # Errors
    ///
    /// See [`StyleRule::parse_all`].
    pub fn encode(raw: &str) -> Result<Self, StyleParseError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(Self::from_rules(&StyleRule::parse_all(raw)?))
    }

    pub fn from_rules(rules: &[StyleRule]) -> Self {
        Self(
            rules
                .iter()
                .map(|rule| format!("&style={}", encode_component(&rule.to_param())))
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StyleParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
