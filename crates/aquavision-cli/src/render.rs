use std::path::Path;

use aquavision_contracts::chat::CHAT_COMMANDS;
use aquavision_contracts::image::ImageOrigin;
use aquavision_contracts::models::{ModelRegistry, ModelSelection};
use aquavision_contracts::report::{BadgeColor, ReportCard};
use aquavision_contracts::session::{ResultView, Screen, SimilarPanel, ViewState};

const INDENT: &str = "    ";

pub fn home_banner() -> String {
    [
        "Aqua Vision",
        "Розпізнавання акваріумних риб та рослин.",
        "Надішліть фото командою /photo ШЛЯХ [підказка] або просто опишіть вид текстом.",
        "/help: список команд.",
    ]
    .join("\n")
}

pub fn render_state(state: &ViewState, illustration_path: Option<&Path>) -> String {
    match state.screen() {
        Screen::Home => home_banner(),
        Screen::Loading(loading) => loading.message().to_string(),
        Screen::Result(view) => result_view(view, illustration_path),
        Screen::NotFound => not_found(),
        Screen::Error(error) => [
            "Помилка".to_string(),
            error.to_string(),
            "/retry: спробувати ще раз. /reset: на початок.".to_string(),
        ]
        .join("\n"),
    }
}

fn not_found() -> String {
    [
        "Нічого не знайдено",
        "Не вдалося розпізнати акваріумну рибу чи рослину.",
        "Спробуйте інше фото або уточніть опис. /retry: спробувати ще раз.",
    ]
    .join("\n")
}

pub fn result_view(view: &ResultView, illustration_path: Option<&Path>) -> String {
    let mut lines = vec![report_card(&view.card)];
    lines.push(String::new());
    lines.push(match view.image.origin {
        ImageOrigin::Uploaded => format!("Зображення: ваше фото ({})", view.image.data.mime_type),
        ImageOrigin::Generated => match illustration_path {
            Some(path) => format!("Зображення: згенерована ілюстрація, {}", path.display()),
            None => "Зображення: згенерована ілюстрація".to_string(),
        },
    });
    lines.push(String::new());
    lines.push(similar_panel(&view.similar));
    lines.join("\n")
}

pub fn report_card(card: &ReportCard) -> String {
    let mut lines = vec![
        format!("== {} ==", card.title),
        format!("{} · {}", card.subtitle, card.kind.label()),
        badge(card),
        String::new(),
        card.overview.clone(),
        String::new(),
    ];
    for (index, section) in card.sections.iter().enumerate() {
        let marker = if section.expanded { '▾' } else { '▸' };
        lines.push(format!("{marker} {}. {}", index + 1, section.title));
        if section.expanded {
            for body_line in section.body.lines() {
                if body_line.trim().is_empty() {
                    lines.push(String::new());
                } else {
                    lines.push(format!("{INDENT}{body_line}"));
                }
            }
        }
    }
    lines.join("\n")
}

fn badge(card: &ReportCard) -> String {
    let dot = match card.badge_color() {
        BadgeColor::Green => "🟢",
        BadgeColor::Yellow => "🟡",
        BadgeColor::Red => "🔴",
    };
    format!("[{dot} {}]", card.badge_text())
}

pub fn similar_panel(panel: &SimilarPanel) -> String {
    match panel {
        SimilarPanel::Idle => "Схожі види: /similar".to_string(),
        SimilarPanel::Loading => "Шукаємо схожі види…".to_string(),
        SimilarPanel::Loaded(entries) => {
            let mut lines = vec!["Схожі види:".to_string()];
            for (index, entry) in entries.iter().enumerate() {
                lines.push(format!("{}. {}", index + 1, entry.name));
                lines.push(format!("{INDENT}{}", entry.similarity_reason));
            }
            lines.join("\n")
        }
        SimilarPanel::Failed(message) => format!("Не вдалося знайти схожі види: {message}"),
    }
}

pub fn help_text() -> String {
    let width = CHAT_COMMANDS
        .iter()
        .map(|spec| spec.usage.chars().count())
        .max()
        .unwrap_or(0);
    CHAT_COMMANDS
        .iter()
        .map(|spec| {
            let pad = width - spec.usage.chars().count();
            format!("{}{}  {}", spec.usage, " ".repeat(pad), spec.summary)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_line(state: &ViewState) -> String {
    let mut line = format!("screen={} generation={}", state.kind(), state.generation());
    if let Some(phase) = state.loading_phase() {
        line.push_str(&format!(" phase={}", phase.name()));
    }
    if let Some(view) = state.result() {
        line.push_str(&format!(" report={}", view.report.local_name()));
    }
    if let Some(error) = state.error() {
        line.push_str(&format!(" error={}", error.code()));
    }
    line
}

pub fn models_table(
    registry: &ModelRegistry,
    text_model: &ModelSelection,
    image_model: &ModelSelection,
) -> String {
    let mut lines = Vec::new();
    for model in registry.list() {
        let mut roles = Vec::new();
        if model.name == text_model.model.name {
            roles.push("identification");
        }
        if model.name == image_model.model.name {
            roles.push("illustration");
        }
        let role_text = if roles.is_empty() {
            String::new()
        } else {
            format!("  <- {}", roles.join(", "))
        };
        lines.push(format!(
            "{} ({}) [{}]{role_text}",
            model.name,
            model.provider,
            model.capability_names().join(", ")
        ));
    }
    for selection in [text_model, image_model] {
        if let (Some(requested), Some(reason)) =
            (selection.requested.as_deref(), selection.fallback_reason.as_deref())
        {
            lines.push(format!("note: {requested}: {reason}"));
        }
    }
    lines.join("\n")
}
