//! Sample reports shared by the unit tests of every crate in the workspace.

use serde_json::{json, Value};

use super::schema::{IDENTIFICATION_KEY, SIMILAR_KEY, STATUS_IDENTIFIED, STATUS_KEY};

pub fn fish_json() -> Value {
    json!({
        "kind": "Риба",
        "localName": "Неонова тетра",
        "scientificName": "Paracheirodon innesi",
        "overview": "Невелика зграйна риба з блакитною смугою.",
        "careConditions": {
            "temperature": "22-26°C",
            "pH": "5.5-7.0",
            "hardness": "1-10 dGH",
            "notes": "М'яка вода та приглушене світло.",
            "minimumTankVolume": "від 40 л"
        },
        "compatibility": "Мирні дрібні риби, креветки.",
        "feeding": "Дрібний сухий та живий корм двічі на день.",
        "breeding": "Нерест у м'якій кислій воді в темряві.",
        "careDifficulty": "Легкий"
    })
}

pub fn plant_json() -> Value {
    json!({
        "kind": "Рослина",
        "localName": "Анубіас Бартера",
        "scientificName": "Anubias barteri",
        "overview": "Повільноросла епіфітна рослина.",
        "careConditions": {
            "temperature": "22-28°C",
            "pH": "6.0-7.5",
            "hardness": "3-15 dGH",
            "notes": "Кореневище не закопувати."
        },
        "lighting": "Низька, 8 годин на день.",
        "co2AndFertilization": "CO2 не обов'язковий, калій корисний.",
        "placement": "Середній план, на корчах або каменях.",
        "careDifficulty": "Складний"
    })
}

/// Wraps a report payload in the identified-status envelope.
pub fn identified(report: Value) -> Value {
    json!({ STATUS_KEY: STATUS_IDENTIFIED, IDENTIFICATION_KEY: report })
}

/// `{"similar": [...]}` with `count` filled entries.
pub fn similar_json(count: usize) -> Value {
    let entries = (1..=count)
        .map(|index| {
            json!({
                "name": format!("Вид {index}"),
                "similarityReason": "Схожі умови утримання."
            })
        })
        .collect::<Vec<_>>();
    json!({ SIMILAR_KEY: entries })
}
