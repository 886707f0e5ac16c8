#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const CHAT_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "photo",
        usage: "/photo <path> [hint]",
        summary: "Розпізнати рибу чи рослину на фото",
    },
    CommandSpec {
        command: "describe",
        usage: "/describe <text>",
        summary: "Знайти вид за текстовим описом",
    },
    CommandSpec {
        command: "similar",
        usage: "/similar",
        summary: "Показати 3 схожі види",
    },
    CommandSpec {
        command: "open",
        usage: "/open <n>",
        summary: "Розгорнути або згорнути розділ звіту",
    },
    CommandSpec {
        command: "expand",
        usage: "/expand",
        summary: "Розгорнути всі розділи",
    },
    CommandSpec {
        command: "collapse",
        usage: "/collapse",
        summary: "Згорнути всі розділи",
    },
    CommandSpec {
        command: "share",
        usage: "/share",
        summary: "Поділитися назвою та описом",
    },
    CommandSpec {
        command: "reset",
        usage: "/reset",
        summary: "Повернутися на головний екран",
    },
    CommandSpec {
        command: "retry",
        usage: "/retry",
        summary: "Спробувати ще раз",
    },
    CommandSpec {
        command: "status",
        usage: "/status",
        summary: "Показати поточний екран",
    },
    CommandSpec {
        command: "models",
        usage: "/models",
        summary: "Список відомих моделей",
    },
    CommandSpec {
        command: "help",
        usage: "/help",
        summary: "Ця довідка",
    },
    CommandSpec {
        command: "quit",
        usage: "/quit",
        summary: "Вийти",
    },
];
