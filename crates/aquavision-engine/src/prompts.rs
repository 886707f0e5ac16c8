use aquavision_contracts::report::{IdentificationReport, ReportKind};

const ROLE: &str = "Ви — експертна система для розпізнавання акваріумних риб та рослин.";

const OUTPUT_RULES: &str = "Якщо об'єкт — риба, заповніть поле \"identification\" за схемою риби (kind = \"Риба\"). \
Якщо рослина — за схемою рослини (kind = \"Рослина\"). \
Для умов утримання надайте структуровані дані (температура, pH, жорсткість, для риб — мінімальний об'єм акваріума) та загальний опис у полі \"notes\". \
Складність догляду — лише одне зі значень: \"Легкий\", \"Середній\", \"Складний\". \
Вся текстова інформація має бути українською мовою. \
Поставте \"status\": \"identified\", якщо об'єкт визначено. \
Якщо об'єкт неможливо ідентифікувати як акваріумну рибу або рослину, поверніть лише \"status\": \"not_recognized\" без поля \"identification\".";

pub fn image_identification_prompt(hint: Option<&str>) -> String {
    let mut prompt = format!(
        "{ROLE} Проаналізуйте надане зображення. Чітко визначте, чи це риба, чи рослина. \
Визначте точну наукову (латинську) та поширену (українську) назви об'єкта. \
Надайте вичерпну інформацію у форматі JSON, що відповідає наданій схемі.\n\n{OUTPUT_RULES}"
    );
    if let Some(hint) = hint.map(str::trim).filter(|value| !value.is_empty()) {
        prompt.push_str(&format!(
            "\n\nКористувач надав додатковий контекст: \"{hint}\". \
Будь ласка, врахуйте цю інформацію під час аналізу зображення."
        ));
    }
    prompt
}

pub fn text_identification_prompt(description: &str) -> String {
    format!(
        "{ROLE} Проаналізуйте наданий текстовий опис. Визначте, чи це риба, чи рослина. \
Визначте точну наукову (латинську) та поширену (українську) назви об'єкта. \
Надайте вичерпну інформацію у форматі JSON, що відповідає наданій схемі.\n\n\
Опис від користувача: \"{}\"\n\n{OUTPUT_RULES}",
        description.trim()
    )
}

pub fn illustration_prompt(species_name: &str) -> String {
    format!(
        "A realistic, high-quality, vibrant photograph of a single \"{}\" in a beautiful, \
well-lit aquarium setting. The subject should be in clear focus.",
        species_name.trim()
    )
}

/// Name handed to the illustration model for a text-identified report.
pub fn illustration_subject(report: &IdentificationReport) -> String {
    format!("{} ({})", report.local_name(), report.scientific_name())
}

pub fn similar_species_prompt(report: &IdentificationReport) -> String {
    let object_type = match report.kind() {
        ReportKind::Fish => "рибу",
        ReportKind::Plant => "рослину",
    };
    let water = report.water();
    let summary = format!(
        "Назва: {}. Умови: Температура {}, pH {}, Жорсткість {}.",
        report.local_name(),
        water.temperature,
        water.ph,
        water.hardness
    );
    format!(
        "На основі характеристик акваріумної {object_type} \"{summary}\", запропонуй 3 схожі види. \
Схожість може бути за зовнішнім виглядом, умовами утримання або поведінкою (для риб). \
Надай результат у форматі JSON {{\"similar\": [...]}}, що відповідає наданій схемі, рівно з трьома записами. \
Вся інформація має бути українською мовою."
    )
}
