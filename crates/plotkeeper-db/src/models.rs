use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What is built (or may be built) on a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlotType {
    Shop,
    House,
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Shop => "shop",
            Self::House => "house",
        };
        f.write_str(s)
    }
}

impl FromStr for PlotType {
    type Err = PlotTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shop" => Ok(Self::Shop),
            "house" => Ok(Self::House),
            other => Err(PlotTypeParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PlotType`] string.
#[derive(Debug, Clone)]
pub struct PlotTypeParseError(pub String);

impl fmt::Display for PlotTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid plot type: {:?}", self.0)
    }
}

impl std::error::Error for PlotTypeParseError {}

// ---------------------------------------------------------------------------

/// Unit a plot's area is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    Kanal,
    Marla,
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Kanal => "kanal",
            Self::Marla => "marla",
        };
        f.write_str(s)
    }
}

impl FromStr for AreaUnit {
    type Err = AreaUnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kanal" => Ok(Self::Kanal),
            "marla" => Ok(Self::Marla),
            other => Err(AreaUnitParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`AreaUnit`] string.
#[derive(Debug, Clone)]
pub struct AreaUnitParseError(pub String);

impl fmt::Display for AreaUnitParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid area unit: {:?}", self.0)
    }
}

impl std::error::Error for AreaUnitParseError {}

// ---------------------------------------------------------------------------

/// Zoning category of a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlotCategory {
    Commercial,
    Residential,
}

impl fmt::Display for PlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Commercial => "commercial",
            Self::Residential => "residential",
        };
        f.write_str(s)
    }
}

impl FromStr for PlotCategory {
    type Err = PlotCategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commercial" => Ok(Self::Commercial),
            "residential" => Ok(Self::Residential),
            other => Err(PlotCategoryParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PlotCategory`] string.
#[derive(Debug, Clone)]
pub struct PlotCategoryParseError(pub String);

impl fmt::Display for PlotCategoryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid plot category: {:?}", self.0)
    }
}

impl std::error::Error for PlotCategoryParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A block -- the parcel plots are subdivided from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Block {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A customer a plot can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A plot row as stored. References are bare identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Plot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "blockId")]
    pub block_id: Uuid,
    #[serde(rename = "customerId")]
    pub customer_id: Option<Uuid>,
    pub plot_number: String,
    pub plot_type: PlotType,
    pub area_unit: AreaUnit,
    pub area: f64,
    pub category: PlotCategory,
    pub is_cornered: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A plot with its references replaced by the records they point at.
///
/// Serializes with the same keys as [`Plot`]; `blockId` and `customerId`
/// carry the embedded record, or `null` when the reference is unset or
/// dangling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulatedPlot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "blockId")]
    pub block: Option<Block>,
    #[serde(rename = "customerId")]
    pub customer: Option<Customer>,
    pub plot_number: String,
    pub plot_type: PlotType,
    pub area_unit: AreaUnit,
    pub area: f64,
    pub category: PlotCategory,
    pub is_cornered: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PopulatedPlot {
    pub fn new(plot: Plot, block: Option<Block>, customer: Option<Customer>) -> Self {
        Self {
            id: plot.id,
            block,
            customer,
            plot_number: plot.plot_number,
            plot_type: plot.plot_type,
            area_unit: plot.area_unit,
            area: plot.area,
            category: plot.category,
            is_cornered: plot.is_cornered,
            created_at: plot.created_at,
            updated_at: plot.updated_at,
        }
    }
}
