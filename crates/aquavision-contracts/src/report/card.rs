use super::{CareConditions, CareDifficulty, IdentificationReport, ReportKind};

/// Badge colour chosen by the care difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Yellow,
    Red,
}

impl BadgeColor {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: &'static str,
    pub body: String,
    pub expanded: bool,
}

impl ReportSection {
    fn collapsed(title: &'static str, body: impl Into<String>) -> Self {
        Self {
            title,
            body: body.into(),
            expanded: false,
        }
    }
}

/// Display projection of a report: header fields plus accordion sections.
///
/// Header values are copied verbatim from the report so what the user reads is
/// exactly what the model returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCard {
    pub title: String,
    pub subtitle: String,
    pub kind: ReportKind,
    pub difficulty: CareDifficulty,
    pub overview: String,
    pub sections: Vec<ReportSection>,
}

impl ReportCard {
    pub fn from_report(report: &IdentificationReport) -> Self {
        let sections = match report {
            IdentificationReport::Fish(fish) => vec![
                ReportSection::collapsed(
                    "Умови утримання",
                    care_conditions_text(
                        &fish.care_conditions.water,
                        Some(&fish.care_conditions.minimum_tank_volume),
                    ),
                ),
                ReportSection::collapsed("Сумісність", fish.compatibility.clone()),
                ReportSection::collapsed("Годування", fish.feeding.clone()),
                ReportSection::collapsed("Розмноження", fish.breeding.clone()),
            ],
            IdentificationReport::Plant(plant) => vec![
                ReportSection::collapsed(
                    "Умови утримання",
                    care_conditions_text(&plant.care_conditions, None),
                ),
                ReportSection::collapsed("Освітлення", plant.lighting.clone()),
                ReportSection::collapsed("CO2 та добрива", plant.co2_and_fertilization.clone()),
                ReportSection::collapsed("Розміщення", plant.placement.clone()),
            ],
        };
        Self {
            title: report.local_name().to_string(),
            subtitle: report.scientific_name().to_string(),
            kind: report.kind(),
            difficulty: report.care_difficulty(),
            overview: report.overview().to_string(),
            sections,
        }
    }

    pub fn badge_color(&self) -> BadgeColor {
        self.difficulty.badge_color()
    }

    pub fn badge_text(&self) -> String {
        format!("Складність: {}", self.difficulty.label())
    }

    /// Flips one section open or closed. Returns the new state, `None` for a bad index.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let section = self.sections.get_mut(index)?;
        section.expanded = !section.expanded;
        Some(section.expanded)
    }

    pub fn expand_all(&mut self) {
        self.set_all(true);
    }

    pub fn collapse_all(&mut self) {
        self.set_all(false);
    }

    fn set_all(&mut self, expanded: bool) {
        for section in &mut self.sections {
            section.expanded = expanded;
        }
    }
}

fn care_conditions_text(water: &CareConditions, tank_volume: Option<&str>) -> String {
    let mut lines = vec![
        format!("Температура: {}", water.temperature),
        format!("pH: {}", water.ph),
        format!("Жорсткість (GH): {}", water.hardness),
    ];
    if let Some(volume) = tank_volume {
        lines.push(format!("Об'єм акваріума: {volume}"));
    }
    lines.push(String::new());
    lines.push(water.notes.clone());
    lines.join("\n")
}

/// What the share affordance hands to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
}

impl SharePayload {
    pub fn from_report(report: &IdentificationReport) -> Self {
        Self {
            title: report.local_name().to_string(),
            text: report.overview().to_string(),
        }
    }
}
