//! Product data returned by the data-fetch layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::appliance::ApplianceType;
use super::identifier::PartNumber;

/// How hard a part is to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstallDifficulty {
    Easy,
    #[default]
    Moderate,
    Difficult,
}

impl InstallDifficulty {
    /// Typical time needed for an install of this difficulty.
    #[must_use]
    pub const fn typical_minutes(self) -> u32 {
        match self {
            Self::Easy => 15,
            Self::Moderate => 30,
            Self::Difficult => 60,
        }
    }
}

/// A part as shown in a result grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSummary {
    pub part_number: PartNumber,
    pub name: String,
    /// Price in US dollars.
    pub price: Decimal,
    pub image_url: String,
    pub manufacturer: String,
    pub in_stock: bool,
    pub product_url: String,
}

/// Everything known about a single part.
///
/// Carries every [`PartSummary`] field plus description, media, reviews,
/// compatibility and warranty information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDetail {
    pub part_number: PartNumber,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
    pub manufacturer: String,
    pub in_stock: bool,
    pub product_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Average review rating out of 5.
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub compatible_models: Vec<String>,
    #[serde(default)]
    pub installation_difficulty: InstallDifficulty,
    #[serde(default)]
    pub warranty: String,
    /// The appliance category this part belongs to, when known.
    #[serde(default)]
    pub appliance_type: Option<ApplianceType>,
}

impl PartDetail {
    /// The summary view of this part.
    #[must_use]
    pub fn summary(&self) -> PartSummary {
        PartSummary {
            part_number: self.part_number.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            manufacturer: self.manufacturer.clone(),
            in_stock: self.in_stock,
            product_url: self.product_url.clone(),
        }
    }
}
