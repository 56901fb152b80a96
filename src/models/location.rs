//! Location model resolved from a postal code

use serde::{Deserialize, Serialize};

/// Address record for a postal code
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Location {
    /// Postal code as echoed by the provider
    pub cep: String,
    /// State abbreviation (UF)
    pub state: String,
    /// City name; the only field the weather lookup consumes
    pub city: String,
    pub neighborhood: String,
    pub street: String,
}

impl Location {
    /// Create a location that only knows its city
    #[must_use]
    pub fn with_city(cep: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            cep: cep.into(),
            city: city.into(),
            ..Self::default()
        }
    }
}
