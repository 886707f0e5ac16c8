mod card;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
mod schema;

pub use card::{BadgeColor, ReportCard, ReportSection, SharePayload};
pub use schema::{
    fish_schema, identification_schema, plant_schema, similar_species_schema,
    IDENTIFICATION_KEY, SIMILAR_KEY, SIMILAR_SPECIES_COUNT, STATUS_IDENTIFIED, STATUS_KEY,
    STATUS_NOT_RECOGNIZED,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    #[serde(rename = "Риба")]
    Fish,
    #[serde(rename = "Рослина")]
    Plant,
}

impl ReportKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fish => "Риба",
            Self::Plant => "Рослина",
        }
    }
}

/// Closed set of difficulty grades. Values outside this set fail deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CareDifficulty {
    #[serde(rename = "Легкий")]
    Easy,
    #[serde(rename = "Середній")]
    Medium,
    #[serde(rename = "Складний")]
    Hard,
}

impl CareDifficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Wire value, shown verbatim on the report card.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Легкий",
            Self::Medium => "Середній",
            Self::Hard => "Складний",
        }
    }

    pub const fn badge_color(self) -> BadgeColor {
        match self {
            Self::Easy => BadgeColor::Green,
            Self::Medium => BadgeColor::Yellow,
            Self::Hard => BadgeColor::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareConditions {
    pub temperature: String,
    #[serde(rename = "pH")]
    pub ph: String,
    pub hardness: String,
    pub notes: String,
}

/// Fish care conditions: water parameters plus the minimum tank volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankConditions {
    #[serde(flatten)]
    pub water: CareConditions,
    pub minimum_tank_volume: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishReport {
    pub local_name: String,
    pub scientific_name: String,
    pub overview: String,
    pub care_conditions: TankConditions,
    pub compatibility: String,
    pub feeding: String,
    pub breeding: String,
    pub care_difficulty: CareDifficulty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantReport {
    pub local_name: String,
    pub scientific_name: String,
    pub overview: String,
    pub care_conditions: CareConditions,
    pub lighting: String,
    pub co2_and_fertilization: String,
    pub placement: String,
    pub care_difficulty: CareDifficulty,
}

/// A validated identification result, discriminated by the mandatory `kind` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IdentificationReport {
    #[serde(rename = "Риба")]
    Fish(FishReport),
    #[serde(rename = "Рослина")]
    Plant(PlantReport),
}

impl IdentificationReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Fish(_) => ReportKind::Fish,
            Self::Plant(_) => ReportKind::Plant,
        }
    }

    pub fn local_name(&self) -> &str {
        match self {
            Self::Fish(fish) => &fish.local_name,
            Self::Plant(plant) => &plant.local_name,
        }
    }

    pub fn scientific_name(&self) -> &str {
        match self {
            Self::Fish(fish) => &fish.scientific_name,
            Self::Plant(plant) => &plant.scientific_name,
        }
    }

    pub fn overview(&self) -> &str {
        match self {
            Self::Fish(fish) => &fish.overview,
            Self::Plant(plant) => &plant.overview,
        }
    }

    pub fn care_difficulty(&self) -> CareDifficulty {
        match self {
            Self::Fish(fish) => fish.care_difficulty,
            Self::Plant(plant) => plant.care_difficulty,
        }
    }

    pub fn water(&self) -> &CareConditions {
        match self {
            Self::Fish(fish) => &fish.care_conditions.water,
            Self::Plant(plant) => &plant.care_conditions,
        }
    }

    /// Rejects reports with blank text fields.
    pub fn validate(&self) -> Result<(), ContractViolation> {
        for (field, value) in self.text_fields() {
            if value.trim().is_empty() {
                return Err(ContractViolation::EmptyField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let water = self.water();
        let mut fields = vec![
            ("localName", self.local_name()),
            ("scientificName", self.scientific_name()),
            ("overview", self.overview()),
            ("careConditions.temperature", water.temperature.as_str()),
            ("careConditions.pH", water.ph.as_str()),
            ("careConditions.hardness", water.hardness.as_str()),
            ("careConditions.notes", water.notes.as_str()),
        ];
        match self {
            Self::Fish(fish) => fields.extend([
                (
                    "careConditions.minimumTankVolume",
                    fish.care_conditions.minimum_tank_volume.as_str(),
                ),
                ("compatibility", fish.compatibility.as_str()),
                ("feeding", fish.feeding.as_str()),
                ("breeding", fish.breeding.as_str()),
            ]),
            Self::Plant(plant) => fields.extend([
                ("lighting", plant.lighting.as_str()),
                ("co2AndFertilization", plant.co2_and_fertilization.as_str()),
                ("placement", plant.placement.as_str()),
            ]),
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarSpeciesEntry {
    pub name: String,
    pub similarity_reason: String,
}

impl SimilarSpeciesEntry {
    pub fn validate(&self) -> Result<(), ContractViolation> {
        if self.name.trim().is_empty() {
            return Err(ContractViolation::EmptyField {
                field: "name".to_string(),
            });
        }
        if self.similarity_reason.trim().is_empty() {
            return Err(ContractViolation::EmptyField {
                field: "similarityReason".to_string(),
            });
        }
        Ok(())
    }
}

/// Checks a similar-species list: exact entry count, every entry well formed.
pub fn validate_similar_species(entries: &[SimilarSpeciesEntry]) -> Result<(), ContractViolation> {
    if entries.len() != SIMILAR_SPECIES_COUNT {
        return Err(ContractViolation::EntryCount {
            expected: SIMILAR_SPECIES_COUNT,
            actual: entries.len(),
        });
    }
    entries.iter().try_for_each(SimilarSpeciesEntry::validate)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("field `{field}` is empty")]
    EmptyField { field: String },
    #[error("expected {expected} similar species, got {actual}")]
    EntryCount { expected: usize, actual: usize },
}
