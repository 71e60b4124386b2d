//! Request bodies for the plot endpoints and their validation.
//!
//! Bodies are deserialized loosely (every field is an optional JSON value)
//! so that a missing field, a `null`, an empty string and a zero can all be
//! treated as "not provided" before any type checking happens. Validation
//! then runs in two stages:
//! - [`PlotInput::missing_required`]: any required field absent or falsy.
//! - [`PlotInput::validate`]: every field's shape and enum membership. All
//!   failures are collected and reported together.

use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use plotkeeper_db::models::{AreaUnit, PlotCategory, PlotType};
use plotkeeper_db::queries::plots::PlotValues;

use super::PlotError;

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const INVALID_AREA_UNIT: &str = "Invalid unit for area!";
pub const INVALID_CATEGORY: &str = "Invalid plot category!";
pub const INVALID_PLOT_TYPE: &str = "Invalid plot type!";
pub const INVALID_AREA: &str = "Invalid area!";
pub const AREA_NOT_POSITIVE: &str = "Area must be positive!";
pub const INVALID_PLOT_NUMBER: &str = "Invalid plot number!";
pub const INVALID_CORNER_FLAG: &str = "Invalid corner flag!";
pub const INVALID_BLOCK_ID: &str = "Invalid block id!";
pub const INVALID_CUSTOMER_ID: &str = "Invalid customer id!";
pub const INVALID_PLOT_ID: &str = "Invalid plot id";

/// Body of `POST /plots` and `PATCH /plots`.
///
/// The plot id is only read by update; see [`PlotInput::plot_id`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlotInput {
    #[serde(rename = "_id", default)]
    pub id: Option<Value>,
    #[serde(rename = "id", default)]
    pub id_alias: Option<Value>,
    #[serde(rename = "blockId", default)]
    pub block_id: Option<Value>,
    #[serde(rename = "customerId", default)]
    pub customer_id: Option<Value>,
    #[serde(default)]
    pub plot_number: Option<Value>,
    #[serde(default)]
    pub plot_type: Option<Value>,
    #[serde(default)]
    pub area_unit: Option<Value>,
    #[serde(default)]
    pub area: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub is_cornered: Option<Value>,
}

/// Body of `DELETE /plots`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlotIdInput {
    #[serde(rename = "_id", default)]
    pub id: Option<Value>,
    #[serde(rename = "id", default)]
    pub id_alias: Option<Value>,
}

impl PlotIdInput {
    /// `_id`, or `id` when `_id` is absent or `null`.
    pub fn plot_id(&self) -> Option<&Value> {
        preferred_id(&self.id, &self.id_alias)
    }
}

fn preferred_id<'a>(id: &'a Option<Value>, alias: &'a Option<Value>) -> Option<&'a Value> {
    match id {
        Some(Value::Null) | None => alias.as_ref(),
        Some(value) => Some(value),
    }
}

/// A fully validated plot body, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPlot {
    pub block_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub plot_number: String,
    pub plot_type: PlotType,
    pub area_unit: AreaUnit,
    pub area: f64,
    pub category: PlotCategory,
    pub is_cornered: Option<bool>,
}

impl ValidPlot {
    pub fn values(&self) -> PlotValues<'_> {
        PlotValues {
            block_id: self.block_id,
            customer_id: self.customer_id,
            plot_number: &self.plot_number,
            plot_type: self.plot_type,
            area_unit: self.area_unit,
            area: self.area,
            category: self.category,
            is_cornered: self.is_cornered,
        }
    }
}

impl PlotInput {
    /// `_id`, or `id` when `_id` is absent or `null`.
    pub fn plot_id(&self) -> Option<&Value> {
        preferred_id(&self.id, &self.id_alias)
    }

    /// True when any of `blockId, plot_number, plot_type, area, area_unit,
    /// category` is absent or falsy.
    pub fn missing_required(&self) -> bool {
        [
            &self.block_id,
            &self.plot_number,
            &self.plot_type,
            &self.area,
            &self.area_unit,
            &self.category,
        ]
        .into_iter()
        .any(|field| !is_truthy(field.as_ref()))
    }

    /// Check every field and convert the body into a [`ValidPlot`].
    ///
    /// Assumes [`missing_required`](Self::missing_required) already passed;
    /// a missing field is reported as invalid here. All failures are joined
    /// into one `BadRequest` message, enum checks first.
    pub fn validate(&self) -> Result<ValidPlot, PlotError> {
        let mut failures: Vec<&'static str> = Vec::new();

        let area_unit = parse_enum::<AreaUnit>(self.area_unit.as_ref());
        if area_unit.is_none() {
            failures.push(INVALID_AREA_UNIT);
        }
        let category = parse_enum::<PlotCategory>(self.category.as_ref());
        if category.is_none() {
            failures.push(INVALID_CATEGORY);
        }
        let plot_type = parse_enum::<PlotType>(self.plot_type.as_ref());
        if plot_type.is_none() {
            failures.push(INVALID_PLOT_TYPE);
        }

        let area = match parse_area(self.area.as_ref()) {
            Some(a) if a > 0.0 => Some(a),
            Some(_) => {
                failures.push(AREA_NOT_POSITIVE);
                None
            }
            None => {
                failures.push(INVALID_AREA);
                None
            }
        };

        let plot_number = parse_plot_number(self.plot_number.as_ref());
        if plot_number.is_none() {
            failures.push(INVALID_PLOT_NUMBER);
        }

        let is_cornered = parse_corner_flag(self.is_cornered.as_ref());
        if is_cornered.is_err() {
            failures.push(INVALID_CORNER_FLAG);
        }

        let block_id = parse_uuid(self.block_id.as_ref());
        if block_id.is_none() {
            failures.push(INVALID_BLOCK_ID);
        }

        let customer_id = parse_optional_uuid(self.customer_id.as_ref());
        if customer_id.is_err() {
            failures.push(INVALID_CUSTOMER_ID);
        }

        match (
            block_id,
            customer_id,
            plot_number,
            plot_type,
            area_unit,
            area,
            category,
            is_cornered,
        ) {
            (
                Some(block_id),
                Ok(customer_id),
                Some(plot_number),
                Some(plot_type),
                Some(area_unit),
                Some(area),
                Some(category),
                Ok(is_cornered),
            ) => Ok(ValidPlot {
                block_id,
                customer_id,
                plot_number,
                plot_type,
                area_unit,
                area,
                category,
                is_cornered,
            }),
            _ => Err(PlotError::bad_request(failures.join(" "))),
        }
    }
}

/// Parse a plot identifier supplied in a body (`_id`) or a path segment.
///
/// `missing` is the message used when the identifier is absent or empty.
pub fn parse_plot_id(raw: Option<&Value>, missing: &str) -> Result<Uuid, PlotError> {
    if !is_truthy(raw) {
        return Err(PlotError::bad_request(missing));
    }
    parse_uuid(raw).ok_or_else(|| PlotError::bad_request(INVALID_PLOT_ID))
}

/// JSON truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn parse_enum<T: std::str::FromStr>(value: Option<&Value>) -> Option<T> {
    value?.as_str()?.parse().ok()
}

fn parse_area(value: Option<&Value>) -> Option<f64> {
    let area = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    area.is_finite().then_some(area)
}

fn parse_plot_number(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    }
}

/// Render a JSON number the way JavaScript would stringify it, so `100`,
/// `100.0` and `1e2` all become `"100"`.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        // Integral floats within the exactly representable range.
        Some(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// `Ok(None)` when the flag is unset. Accepts booleans, `"true"`/`"false"`
/// and `1`/`0`.
fn parse_corner_flag(value: Option<&Value>) -> Result<Option<bool>, ()> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(()),
        },
        Some(Value::Number(n)) => match n.as_u64() {
            Some(1) => Ok(Some(true)),
            Some(0) => Ok(Some(false)),
            _ => Err(()),
        },
        Some(_) => Err(()),
    }
}

fn parse_uuid(value: Option<&Value>) -> Option<Uuid> {
    Uuid::parse_str(value?.as_str()?.trim()).ok()
}

/// `Ok(None)` when unset (absent, `null` or `""`).
fn parse_optional_uuid(value: Option<&Value>) -> Result<Option<Uuid>, ()> {
    if !is_truthy(value) {
        return Ok(None);
    }
    parse_uuid(value).map(Some).ok_or(())
}
