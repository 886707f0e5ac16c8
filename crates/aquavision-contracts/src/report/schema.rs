//! Response schemas sent with structured-output requests.
//!
//! Every key the report card depends on is declared here, so checking the
//! model's answer is a matter of deserializing against the same shape.

use serde_json::{json, Map, Value};

use super::{CareDifficulty, ReportKind};

pub const STATUS_KEY: &str = "status";
pub const IDENTIFICATION_KEY: &str = "identification";
pub const SIMILAR_KEY: &str = "similar";
pub const STATUS_IDENTIFIED: &str = "identified";
pub const STATUS_NOT_RECOGNIZED: &str = "not_recognized";
pub const SIMILAR_SPECIES_COUNT: usize = 3;

fn string_field(description: &str) -> Value {
    json!({
        "type": "STRING",
        "description": description,
    })
}

fn enum_field(values: &[&str], description: &str) -> Value {
    json!({
        "type": "STRING",
        "enum": values,
        "description": description,
    })
}

fn object_schema(description: &str, properties: Vec<(&str, Value)>) -> Value {
    let ordering: Vec<&str> = properties.iter().map(|(key, _)| *key).collect();
    let required = ordering.clone();
    let mut props = Map::new();
    for (key, value) in properties {
        props.insert(key.to_string(), value);
    }
    json!({
        "type": "OBJECT",
        "description": description,
        "properties": props,
        "propertyOrdering": ordering,
        "required": required,
    })
}

fn care_conditions_schema(with_tank_volume: bool) -> Value {
    let mut properties = vec![
        (
            "temperature",
            string_field("Діапазон температур у градусах Цельсія, наприклад '24-28°C'."),
        ),
        (
            "pH",
            string_field("Діапазон кислотності води, наприклад '6.5-7.5'."),
        ),
        (
            "hardness",
            string_field("Діапазон загальної жорсткості, наприклад '5-15 dGH'."),
        ),
        (
            "notes",
            string_field("Додатковий текстовий опис умов утримання."),
        ),
    ];
    if with_tank_volume {
        properties.push((
            "minimumTankVolume",
            string_field("Мінімальний об'єм акваріума в літрах, наприклад 'від 100 л'."),
        ));
    }
    object_schema("Параметри води та акваріума.", properties)
}

fn difficulty_field() -> Value {
    let labels: Vec<&str> = CareDifficulty::ALL.iter().map(|d| d.label()).collect();
    enum_field(&labels, "Складність догляду.")
}

pub fn fish_schema() -> Value {
    object_schema(
        "Звіт про акваріумну рибу.",
        vec![
            ("kind", enum_field(&[ReportKind::Fish.label()], "Тип об'єкта.")),
            ("localName", string_field("Поширена українська назва.")),
            ("scientificName", string_field("Наукова (латинська) назва.")),
            (
                "overview",
                string_field("Походження та характерні риси: розмір, колір, форма."),
            ),
            ("careConditions", care_conditions_schema(true)),
            (
                "compatibility",
                string_field("З якими рибами та безхребетними уживається, а з якими ні."),
            ),
            (
                "feeding",
                string_field("Тип корму (сухий, живий, рослинний) та частота годування."),
            ),
            ("breeding", string_field("Коротко про нерест і розмноження.")),
            ("careDifficulty", difficulty_field()),
        ],
    )
}

pub fn plant_schema() -> Value {
    object_schema(
        "Звіт про акваріумну рослину.",
        vec![
            ("kind", enum_field(&[ReportKind::Plant.label()], "Тип об'єкта.")),
            ("localName", string_field("Поширена українська назва.")),
            ("scientificName", string_field("Наукова (латинська) назва.")),
            (
                "overview",
                string_field("Походження, висота, швидкість росту."),
            ),
            ("careConditions", care_conditions_schema(false)),
            (
                "lighting",
                string_field("Інтенсивність освітлення (низька, середня, висока) та тривалість."),
            ),
            (
                "co2AndFertilization",
                string_field("Чи потрібен CO2, які макро- та мікроелементи критичні."),
            ),
            (
                "placement",
                string_field("Передній, середній чи задній план акваріума."),
            ),
            ("careDifficulty", difficulty_field()),
        ],
    )
}

/// Envelope for identification: an explicit status plus one of the two report shapes.
pub fn identification_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            STATUS_KEY: enum_field(
                &[STATUS_IDENTIFIED, STATUS_NOT_RECOGNIZED],
                "'identified', якщо об'єкт розпізнано як акваріумну рибу чи рослину, інакше 'not_recognized'.",
            ),
            IDENTIFICATION_KEY: {
                "anyOf": [fish_schema(), plant_schema()],
            },
        },
        "propertyOrdering": [STATUS_KEY, IDENTIFICATION_KEY],
        "required": [STATUS_KEY],
    })
}

pub fn similar_species_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            SIMILAR_KEY: {
                "type": "ARRAY",
                "description": "Список схожих акваріумних риб або рослин.",
                "minItems": SIMILAR_SPECIES_COUNT,
                "maxItems": SIMILAR_SPECIES_COUNT,
                "items": object_schema(
                    "Схожий вид.",
                    vec![
                        ("name", string_field("Українська назва схожого виду.")),
                        (
                            "similarityReason",
                            string_field("Чому вид схожий: зовнішній вигляд, умови утримання або поведінка."),
                        ),
                    ],
                ),
            },
        },
        "required": [SIMILAR_KEY],
    })
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{fish_schema, identification_schema, plant_schema, similar_species_schema};

    fn required(schema: &Value) -> Vec<&str> {
        schema["required"]
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn identification_schema_is_a_closed_choice() {
        let schema = identification_schema();
        let choices = schema["properties"]["identification"]["anyOf"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0]["properties"]["kind"]["enum"], json!(["Риба"]));
        assert_eq!(choices[1]["properties"]["kind"]["enum"], json!(["Рослина"]));
        assert_eq!(
            schema["properties"]["status"]["enum"],
            json!(["identified", "not_recognized"])
        );
    }

    #[test]
    fn fish_schema_requires_tank_volume_and_fish_fields() {
        let schema = fish_schema();
        let fields = required(&schema);
        for key in ["kind", "compatibility", "feeding", "breeding", "careDifficulty"] {
            assert!(fields.contains(&key), "missing {key}");
        }
        let care = required(&schema["properties"]["careConditions"]);
        assert!(care.contains(&"minimumTankVolume"));
        assert_eq!(
            schema["properties"]["careDifficulty"]["enum"],
            json!(["Легкий", "Середній", "Складний"])
        );
    }

    #[test]
    fn plant_schema_omits_tank_volume() {
        let schema = plant_schema();
        let fields = required(&schema);
        for key in ["lighting", "co2AndFertilization", "placement"] {
            assert!(fields.contains(&key), "missing {key}");
        }
        let care = required(&schema["properties"]["careConditions"]);
        assert_eq!(care, vec!["temperature", "pH", "hardness", "notes"]);
    }

    #[test]
    fn similar_schema_pins_three_entries() {
        let schema = similar_species_schema();
        let list = &schema["properties"]["similar"];
        assert_eq!(list["type"], json!("ARRAY"));
        assert_eq!(list["minItems"], json!(3));
        assert_eq!(list["maxItems"], json!(3));
        assert_eq!(required(&list["items"]), vec!["name", "similarityReason"]);
    }
}
