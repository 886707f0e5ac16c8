mod render;

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use aquavision_contracts::chat::{parse_command, ChatCommand};
use aquavision_contracts::events::{new_session_id, SessionJournal};
use aquavision_contracts::models::{ModelRegistry, ModelSelection};
use aquavision_contracts::session::{LoadingPhase, ScreenKind};
use aquavision_engine::encoding::load_image_file;
use aquavision_engine::{
    ClientConfig, FileShareSink, GeminiTransport, IdentificationClient, ModelTransport,
    SessionController,
};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};

type Controller = SessionController<IdentificationClient<GeminiTransport>>;

#[derive(Debug, Parser)]
#[command(
    name = "aquavision",
    version,
    about = "Identify aquarium fish and plants from a photo or a description"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Identify the fish or plant in a photo.
    Identify(IdentifyArgs),
    /// Find a species from a text description and illustrate it.
    Describe(DescribeArgs),
    /// Interactive session.
    Chat(ChatArgs),
    /// List known models and the ones that would be used.
    Models(ModelArgs),
}

#[derive(Debug, Args)]
struct ModelArgs {
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long)]
    image_model: Option<String>,
}

#[derive(Debug, Args)]
struct SessionArgs {
    #[arg(long, default_value = "aquavision-session")]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[command(flatten)]
    models: ModelArgs,
    /// Per-request timeout in seconds (15-300).
    #[arg(long)]
    timeout: Option<f64>,
}

#[derive(Debug, Parser)]
struct IdentifyArgs {
    #[arg(long)]
    image: PathBuf,
    #[arg(long)]
    hint: Option<String>,
    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Parser)]
struct DescribeArgs {
    #[arg(long)]
    text: String,
    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[command(flatten)]
    session: SessionArgs,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("aquavision error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Identify(args) => run_identify(args),
        Command::Describe(args) => run_describe(args),
        Command::Chat(args) => {
            run_chat(args)?;
            Ok(0)
        }
        Command::Models(args) => run_models(args),
    }
}

fn resolve_config(models: &ModelArgs, timeout: Option<f64>) -> ClientConfig {
    let config = ClientConfig::from_env()
        .with_text_model(models.text_model.clone())
        .with_image_model(models.image_model.clone());
    match timeout {
        Some(seconds) => config.with_request_timeout(seconds),
        None => config,
    }
}

fn open_session(args: &SessionArgs) -> Result<(Controller, ClientConfig)> {
    let config = resolve_config(&args.models, args.timeout);
    if config.api_key.is_none() {
        bail!("GEMINI_API_KEY or GOOGLE_API_KEY not set");
    }
    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));

    let transport = GeminiTransport::new(&config);
    let transport_name = transport.name().to_string();
    let client = IdentificationClient::new(transport, &config)?;
    warn_on_fallback(client.text_model());
    warn_on_fallback(client.image_model());

    let details = json_object(json!({
        "out_dir": args.out.to_string_lossy(),
        "transport": transport_name,
        "text_model": client.text_model().model.name,
        "image_model": client.image_model().model.name,
        "request_timeout_s": config.request_timeout_s,
    }));
    let journal = SessionJournal::new(events_path, new_session_id());
    let controller = SessionController::new(client, journal, details)?
        .with_artifacts_dir(args.out.join("artifacts"))
        .with_share_sink(FileShareSink::new(args.out.join("shared")));
    Ok((controller, config))
}

fn warn_on_fallback(selection: &ModelSelection) {
    if let (Some(requested), Some(reason)) =
        (selection.requested.as_deref(), selection.fallback_reason.as_deref())
    {
        eprintln!(
            "warning: {reason} Using {} instead of {requested}.",
            selection.model.name
        );
    }
}

fn exit_code(screen: ScreenKind) -> i32 {
    match screen {
        ScreenKind::Result => 0,
        ScreenKind::NotFound => 2,
        _ => 1,
    }
}

fn print_screen(controller: &Controller) {
    println!(
        "{}",
        render::render_state(controller.state(), controller.illustration_path())
    );
}

fn run_identify(args: IdentifyArgs) -> Result<i32> {
    let (mut controller, config) = open_session(&args.session)?;
    let image = load_image_file(&args.image, config.max_image_dim)?;
    eprintln!("{}", LoadingPhase::AnalyzingImage.message());
    let screen = controller.submit_image(image, args.hint.as_deref())?;
    controller.expand_all();
    print_screen(&controller);
    Ok(exit_code(screen))
}

fn run_describe(args: DescribeArgs) -> Result<i32> {
    let (mut controller, _) = open_session(&args.session)?;
    eprintln!("{}", LoadingPhase::SearchingByText.message());
    let screen = controller.submit_text(&args.text)?;
    controller.expand_all();
    print_screen(&controller);
    Ok(exit_code(screen))
}

fn run_models(args: ModelArgs) -> Result<i32> {
    let config = resolve_config(&args, None);
    let registry = ModelRegistry::default();
    let client = IdentificationClient::new(GeminiTransport::new(&config), &config)?;
    println!(
        "{}",
        render::models_table(&registry, client.text_model(), client.image_model())
    );
    Ok(0)
}

fn run_chat(args: ChatArgs) -> Result<()> {
    let (mut controller, config) = open_session(&args.session)?;
    let stdin = io::stdin();
    let mut line = String::new();

    println!("{}", render::home_banner());
    if let Some(path) = controller.journal().path() {
        println!("Журнал сесії: {}", path.display());
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        let read = match stdin.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        match parse_command(input) {
            ChatCommand::Noop => continue,
            ChatCommand::Quit => break,
            ChatCommand::Help => println!("{}", render::help_text()),
            ChatCommand::Photo { path, hint } => {
                let image = match load_image_file(Path::new(&path), config.max_image_dim) {
                    Ok(image) => image,
                    Err(err) => {
                        println!("Не вдалося відкрити фото: {err:#}");
                        continue;
                    }
                };
                println!("{}", LoadingPhase::AnalyzingImage.message());
                let submitted = controller.submit_image(image, hint.as_deref());
                report_submission(&controller, submitted);
            }
            ChatCommand::Describe { text } => {
                println!("{}", LoadingPhase::SearchingByText.message());
                let submitted = controller.submit_text(&text);
                report_submission(&controller, submitted);
            }
            ChatCommand::Similar => match controller.find_similar() {
                Ok(_) => {
                    if let Some(panel) = controller.similar_panel() {
                        println!("{}", render::similar_panel(panel));
                    }
                }
                Err(err) => println!("Пошук схожих видів недоступний: {err:#}"),
            },
            ChatCommand::Open { index } => match controller.toggle_section(index) {
                Some(_) => print_screen(&controller),
                None => println!("Немає розділу {}.", index + 1),
            },
            ChatCommand::Expand => {
                if controller.expand_all() {
                    print_screen(&controller);
                } else {
                    println!("Немає відкритого звіту.");
                }
            }
            ChatCommand::Collapse => {
                if controller.collapse_all() {
                    print_screen(&controller);
                } else {
                    println!("Немає відкритого звіту.");
                }
            }
            ChatCommand::Share => match controller.share() {
                Ok(destination) => println!("Звіт збережено: {destination}"),
                Err(err) => println!("Поширення недоступне: {err:#}"),
            },
            ChatCommand::Reset => {
                controller.reset()?;
                print_screen(&controller);
            }
            ChatCommand::Retry => match controller.retry() {
                Ok(_) => print_screen(&controller),
                Err(err) => println!("{err:#}"),
            },
            ChatCommand::Status => println!("{}", render::status_line(controller.state())),
            ChatCommand::Models => println!(
                "{}",
                render::models_table(
                    &ModelRegistry::default(),
                    controller.client().text_model(),
                    controller.client().image_model()
                )
            ),
            ChatCommand::Invalid { command, reason } => println!("/{command}: {reason}"),
            ChatCommand::Unknown { command, .. } => {
                println!("Невідома команда /{command}. /help: список команд.")
            }
        }
    }

    Ok(())
}

fn report_submission(controller: &Controller, submitted: Result<ScreenKind>) {
    match submitted {
        Ok(_) => print_screen(controller),
        Err(err) => println!("{err:#}"),
    }
}

fn json_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}
