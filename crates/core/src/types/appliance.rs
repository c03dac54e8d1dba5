//! The two appliance categories the agent supports.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::identifier::ModelNumber;

/// Appliance category in scope for the support agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplianceType {
    Refrigerator,
    Dishwasher,
}

/// Model-number prefixes of common dishwasher lines.
const DISHWASHER_MODEL_PREFIXES: &[&str] = &[
    "WDT", "WDF", "WDP", "WDTA", "KDTE", "KDTM", "KDFE", "KDPM", "MDB", "MDT", "GDT", "GDF", "GSD",
    "PDT", "FFBD", "FGID", "FDPH", "LDF", "LDP", "LDT", "SHE", "SHX", "SHP", "SHV", "SGE", "DW80",
    "ADB",
];

/// Model-number prefixes of common refrigerator lines.
const REFRIGERATOR_MODEL_PREFIXES: &[&str] = &[
    "WRS", "WRF", "WRX", "WRT", "WRB", "KRFF", "KRFC", "KRMF", "KSRS", "MFI", "MRT", "MSS", "GSS",
    "GSH", "GNE", "GFE", "GTS", "GYE", "PFE", "FFSS", "FFTR", "FGHS", "FRSS", "LFX", "LRMV", "LRFX",
    "RF", "RS", "RT", "RH", "ED5", "ET8", "HRF",
];

impl ApplianceType {
    /// Every supported appliance type.
    pub const ALL: [Self; 2] = [Self::Refrigerator, Self::Dishwasher];

    /// Lowercase name, as used on the wire and in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Refrigerator => "refrigerator",
            Self::Dishwasher => "dishwasher",
        }
    }

    /// Infer the appliance category from a model number's prefix.
    ///
    /// Returns `None` for prefixes not in the known tables. The longest
    /// matching prefix wins.
    #[must_use]
    pub fn from_model_number(model: &ModelNumber) -> Option<Self> {
        let model = model.as_str();
        let longest = |prefixes: &[&str]| {
            prefixes
                .iter()
                .filter(|p| model.starts_with(**p))
                .map(|p| p.len())
                .max()
        };

        match (
            longest(REFRIGERATOR_MODEL_PREFIXES),
            longest(DISHWASHER_MODEL_PREFIXES),
        ) {
            (Some(fridge), Some(dish)) if fridge > dish => Some(Self::Refrigerator),
            (Some(fridge), Some(dish)) if dish > fridge => Some(Self::Dishwasher),
            (Some(_), None) => Some(Self::Refrigerator),
            (None, Some(_)) => Some(Self::Dishwasher),
            _ => None,
        }
    }
}

impl fmt::Display for ApplianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(s: &str) -> ModelNumber {
        ModelNumber::parse(s).expect("valid model")
    }

    #[test]
    fn test_serialization_is_snake_case() {
        let json = serde_json::to_string(&ApplianceType::Refrigerator).expect("serialize");
        assert_eq!(json, "\"refrigerator\"");
    }

    #[test]
    fn test_from_model_number_dishwasher() {
        assert_eq!(
            ApplianceType::from_model_number(&model("WDT780SAEM1")),
            Some(ApplianceType::Dishwasher)
        );
        assert_eq!(
            ApplianceType::from_model_number(&model("KDTE334GPS0")),
            Some(ApplianceType::Dishwasher)
        );
    }

    #[test]
    fn test_from_model_number_refrigerator() {
        assert_eq!(
            ApplianceType::from_model_number(&model("RF28R7351SR")),
            Some(ApplianceType::Refrigerator)
        );
        assert_eq!(
            ApplianceType::from_model_number(&model("WRS325SDHZ")),
            Some(ApplianceType::Refrigerator)
        );
    }

    #[test]
    fn test_from_model_number_unknown() {
        assert_eq!(ApplianceType::from_model_number(&model("ZZ9000")), None);
    }
}
