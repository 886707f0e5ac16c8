use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use aquavision_contracts::events::{EventPayload, SessionJournal};
use aquavision_contracts::image::ImageData;
use aquavision_contracts::outcome::{IdentifyError, IdentifyOutcome};
use aquavision_contracts::report::{SharePayload, SimilarSpeciesEntry};
use aquavision_contracts::session::{
    LoadingPhase, Resolution, ScreenKind, SimilarPanel, Ticket, TicketScope, TransitionError,
    ViewState,
};
use serde_json::{json, Map, Value};

use crate::client::Identifier;
use crate::encoding::{save_image, sha256_hex};
use crate::prompts::illustration_subject;
use crate::share::{ShareSink, UnsupportedShare};

/// Drives one session: owns the view state, calls the identifier and journals
/// every transition.
///
/// The `submit_*` methods run a whole identification synchronously. Front ends
/// that run model calls elsewhere use `begin_*` and [`SessionController::complete_identification`]
/// directly; completions for tickets issued before a reset are discarded.
pub struct SessionController<C: Identifier> {
    client: C,
    state: ViewState,
    journal: SessionJournal,
    artifacts_dir: Option<PathBuf>,
    share_sink: Box<dyn ShareSink>,
    illustration_path: Option<PathBuf>,
}

impl<C: Identifier> SessionController<C> {
    pub fn new(client: C, journal: SessionJournal, details: EventPayload) -> Result<Self> {
        let mut payload = details;
        payload.insert(
            "screen".to_string(),
            Value::String(ScreenKind::Home.name().to_string()),
        );
        journal.emit("session_started", payload)?;
        Ok(Self {
            client,
            state: ViewState::new(),
            journal,
            artifacts_dir: None,
            share_sink: Box::new(UnsupportedShare),
            illustration_path: None,
        })
    }

    /// Generated illustrations are written here when set.
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    pub fn with_share_sink(mut self, sink: impl ShareSink + 'static) -> Self {
        self.share_sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn journal(&self) -> &SessionJournal {
        &self.journal
    }

    pub fn share_sink_name(&self) -> &str {
        self.share_sink.name()
    }

    /// Where the illustration of the current result was saved, if anywhere.
    pub fn illustration_path(&self) -> Option<&Path> {
        self.illustration_path.as_deref()
    }

    pub fn submit_image(&mut self, image: ImageData, hint: Option<&str>) -> Result<ScreenKind> {
        let hint = hint.map(str::trim).filter(|value| !value.is_empty());
        let ticket = self.begin_image(&image, hint)?;
        let outcome = self.client.identify_from_image(&image, hint);
        self.complete_identification(ticket, outcome)
    }

    pub fn submit_text(&mut self, description: &str) -> Result<ScreenKind> {
        let ticket = self.begin_text(description)?;
        let outcome = self.client.identify_from_text(description.trim());
        self.complete_identification(ticket, outcome)
    }

    pub fn begin_image(&mut self, image: &ImageData, hint: Option<&str>) -> Result<Ticket> {
        let ticket = self.state.submit_image(image.clone())?;
        self.illustration_path = None;
        self.emit_or_abandon(
            ticket,
            "identification_requested",
            map_object(json!({
                "input": "image",
                "generation": ticket.generation(),
                "mime_type": image.mime_type,
                "bytes": image.len(),
                "sha256": sha256_hex(&image.bytes),
                "hint": hint,
            })),
        )?;
        Ok(ticket)
    }

    pub fn begin_text(&mut self, description: &str) -> Result<Ticket> {
        let description = description.trim();
        if description.is_empty() {
            bail!("description is empty");
        }
        let ticket = self.state.submit_text()?;
        self.illustration_path = None;
        self.emit_or_abandon(
            ticket,
            "identification_requested",
            map_object(json!({
                "input": "text",
                "generation": ticket.generation(),
                "description": description,
            })),
        )?;
        Ok(ticket)
    }

    /// Applies an identification outcome; text submissions also fetch their illustration.
    pub fn complete_identification(
        &mut self,
        ticket: Ticket,
        outcome: IdentifyOutcome,
    ) -> Result<ScreenKind> {
        let mut resolution = self.state.resolve_identification(ticket, outcome)?;
        if resolution == Resolution::Applied(ScreenKind::Loading)
            && self.state.loading_phase() == Some(LoadingPhase::GeneratingImage)
        {
            resolution = self.illustrate(ticket)?;
        }
        if resolution == Resolution::Discarded {
            self.journal_discarded(ticket)?;
            return Ok(self.state.kind());
        }

        let screen = self.state.kind();
        let mut payload = map_object(json!({
            "generation": ticket.generation(),
            "outcome": outcome_tag(screen),
            "screen": screen.name(),
        }));
        if let Some(view) = self.state.result() {
            payload.insert(
                "report".to_string(),
                json!({
                    "kind": view.report.kind().label(),
                    "local_name": view.report.local_name(),
                    "scientific_name": view.report.scientific_name(),
                    "care_difficulty": view.report.care_difficulty().label(),
                }),
            );
        }
        if let Some(error) = self.state.error() {
            payload.insert(
                "error".to_string(),
                json!({"code": error.code(), "message": error.to_string()}),
            );
        }
        self.journal.emit("identification_completed", payload)?;
        Ok(screen)
    }

    fn illustrate(&mut self, ticket: Ticket) -> Result<Resolution> {
        let subject = self
            .state
            .pending_report()
            .map(illustration_subject)
            .context("no report is waiting for an illustration")?;
        let illustration = self.client.generate_illustrative_image(&subject);
        let mut generated = None;
        if let Ok(image) = &illustration {
            let mut payload = map_object(json!({
                "generation": ticket.generation(),
                "subject": subject,
                "mime_type": image.mime_type,
                "bytes": image.len(),
                "sha256": sha256_hex(&image.bytes),
                "path": null,
            }));
            // The picture stays in memory when the artifact write fails.
            match self.save_illustration(ticket, image) {
                Ok(saved) => {
                    payload.insert(
                        "path".to_string(),
                        json!(saved.as_ref().map(|path| path.display().to_string())),
                    );
                    self.illustration_path = saved;
                }
                Err(err) => {
                    payload.insert("save_error".to_string(), json!(format!("{err:#}")));
                }
            }
            generated = Some(payload);
        }
        let resolution = self.state.resolve_illustration(ticket, illustration)?;
        if let Some(payload) = generated {
            self.journal.emit("illustration_generated", payload)?;
        }
        Ok(resolution)
    }

    fn save_illustration(&self, ticket: Ticket, image: &ImageData) -> Result<Option<PathBuf>> {
        let Some(dir) = self.artifacts_dir.as_deref() else {
            return Ok(None);
        };
        let saved = save_image(dir, &format!("illustration-{}", ticket.generation()), image)?;
        Ok(Some(saved))
    }

    /// Runs the nested similar-species lookup. The outer screen stays `result`.
    pub fn find_similar(&mut self) -> Result<Resolution> {
        let ticket = self.state.begin_similar()?;
        let report = self
            .state
            .result()
            .map(|view| view.report.clone())
            .context("similar lookup started without a report")?;
        self.emit_or_abandon(
            ticket,
            "similar_requested",
            map_object(json!({
                "generation": ticket.generation(),
                "local_name": report.local_name(),
            })),
        )?;
        let result = self.client.find_similar_species(&report);
        self.complete_similar(ticket, result)
    }

    pub fn complete_similar(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<SimilarSpeciesEntry>, IdentifyError>,
    ) -> Result<Resolution> {
        let mut payload = map_object(json!({
            "generation": ticket.generation(),
            "ok": result.is_ok(),
        }));
        match &result {
            Ok(entries) => {
                payload.insert("count".to_string(), json!(entries.len()));
            }
            Err(error) => {
                payload.insert(
                    "error".to_string(),
                    json!({"code": error.code(), "message": error.to_string()}),
                );
            }
        }
        let resolution = self.state.resolve_similar(ticket, result)?;
        if resolution == Resolution::Discarded {
            self.journal_discarded(ticket)?;
        } else {
            self.journal.emit("similar_completed", payload)?;
        }
        Ok(resolution)
    }

    pub fn similar_panel(&self) -> Option<&SimilarPanel> {
        self.state.result().map(|view| &view.similar)
    }

    /// Flips one report section. `None` when there is no result or no such section.
    pub fn toggle_section(&mut self, index: usize) -> Option<bool> {
        self.state.result_mut()?.card.toggle(index)
    }

    pub fn expand_all(&mut self) -> bool {
        match self.state.result_mut() {
            Some(view) => {
                view.card.expand_all();
                true
            }
            None => false,
        }
    }

    pub fn collapse_all(&mut self) -> bool {
        match self.state.result_mut() {
            Some(view) => {
                view.card.collapse_all();
                true
            }
            None => false,
        }
    }

    /// Hands the current report to the share sink. Returns the destination.
    pub fn share(&self) -> Result<String> {
        let Some(view) = self.state.result() else {
            return Err(TransitionError::InvalidTransition {
                action: "share",
                screen: self.state.kind(),
            }
            .into());
        };
        let payload = SharePayload::from_report(&view.report);
        let shared = self.share_sink.share(&payload);
        let mut event = map_object(json!({
            "sink": self.share_sink.name(),
            "title": payload.title,
            "ok": shared.is_ok(),
        }));
        match &shared {
            Ok(destination) => {
                event.insert("destination".to_string(), json!(destination));
            }
            Err(error) => {
                event.insert(
                    "error".to_string(),
                    json!({"code": error.code(), "message": error.to_string()}),
                );
            }
        }
        self.journal.emit("report_shared", event)?;
        Ok(shared?)
    }

    /// Back to `home` from any screen. Returns the screen that was left.
    pub fn reset(&mut self) -> Result<ScreenKind> {
        self.reset_with_trigger("reset")
    }

    /// The "try again" action of the not-found and error screens.
    pub fn retry(&mut self) -> Result<ScreenKind> {
        let screen = self.state.kind();
        if !matches!(screen, ScreenKind::NotFound | ScreenKind::Error) {
            return Err(TransitionError::InvalidTransition {
                action: "retry",
                screen,
            }
            .into());
        }
        self.reset_with_trigger("retry")
    }

    fn reset_with_trigger(&mut self, trigger: &str) -> Result<ScreenKind> {
        let previous = self.state.reset();
        self.illustration_path = None;
        self.journal.emit(
            "session_reset",
            map_object(json!({
                "from": previous.name(),
                "trigger": trigger,
                "generation": self.state.generation(),
            })),
        )?;
        Ok(previous)
    }

    /// Journals the start of `ticket`. If the write fails the ticket is resolved
    /// as failed so the screen never waits on a call that will not run.
    fn emit_or_abandon(
        &mut self,
        ticket: Ticket,
        event_type: &str,
        payload: EventPayload,
    ) -> Result<()> {
        let Err(err) = self.journal.emit(event_type, payload) else {
            return Ok(());
        };
        let failure =
            IdentifyError::NetworkOrPlatform(format!("Журнал сесії недоступний: {err:#}"));
        match ticket.scope() {
            TicketScope::Identification => {
                self.state
                    .resolve_identification(ticket, IdentifyOutcome::Failed(failure))?;
            }
            TicketScope::Similar => {
                self.state.resolve_similar(ticket, Err(failure))?;
            }
        }
        Err(err)
    }

    fn journal_discarded(&self, ticket: Ticket) -> Result<()> {
        let scope = match ticket.scope() {
            TicketScope::Identification => "identification",
            TicketScope::Similar => "similar",
        };
        self.journal.emit(
            "stale_completion_discarded",
            map_object(json!({
                "scope": scope,
                "generation": ticket.generation(),
                "current_generation": self.state.generation(),
            })),
        )?;
        Ok(())
    }
}

fn outcome_tag(screen: ScreenKind) -> &'static str {
    match screen {
        ScreenKind::Result => "identified",
        ScreenKind::NotFound => "not_recognized",
        _ => "failed",
    }
}

fn map_object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use aquavision_contracts::events::SessionJournal;
    use aquavision_contracts::image::{ImageData, ImageOrigin};
    use aquavision_contracts::outcome::{IdentifyError, IdentifyOutcome};
    use aquavision_contracts::report::fixtures::{fish_json, identified, plant_json, similar_json};
    use aquavision_contracts::report::{BadgeColor, ReportKind};
    use aquavision_contracts::session::{
        LoadingPhase, Resolution, Screen, ScreenKind, SimilarPanel, TransitionError,
    };
    use serde_json::{json, Map, Value};

    use super::SessionController;
    use crate::client::IdentificationClient;
    use crate::config::ClientConfig;
    use crate::share::FileShareSink;
    use crate::transport::scripted::ScriptedTransport;
    use crate::transport::TransportTimeout;

    type Controller = SessionController<IdentificationClient<ScriptedTransport>>;

    fn controller() -> Controller {
        let client =
            IdentificationClient::new(ScriptedTransport::new(), &ClientConfig::default()).unwrap();
        SessionController::new(client, SessionJournal::in_memory("session-test"), Map::new())
            .unwrap()
    }

    fn file_controller(events: &Path) -> Controller {
        let client =
            IdentificationClient::new(ScriptedTransport::new(), &ClientConfig::default()).unwrap();
        SessionController::new(client, SessionJournal::new(events, "session-test"), Map::new())
            .unwrap()
    }

    fn script(controller: &Controller) -> &ScriptedTransport {
        controller.client().transport()
    }

    fn photo() -> ImageData {
        ImageData::new(vec![0xff, 0xd8, 0xff, 0xe0], "image/jpeg")
    }

    fn illustration() -> ImageData {
        ImageData::new(vec![0x89, b'P', b'N', b'G', 1], "image/png")
    }

    fn last_event(controller: &Controller) -> Value {
        controller
            .journal()
            .recorded()
            .pop()
            .unwrap_or(Value::Null)
    }

    #[test]
    fn image_submission_reaches_result_with_uploaded_image() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller).push_json(identified(fish_json()));

        assert_eq!(controller.submit_image(photo(), Some("  "))?, ScreenKind::Result);
        let view = controller.state().result().unwrap();
        assert_eq!(view.report.kind(), ReportKind::Fish);
        assert_eq!(view.card.badge_color(), BadgeColor::Green);
        assert_eq!(view.image.origin, ImageOrigin::Uploaded);
        assert_eq!(view.image.data, photo());
        assert_eq!(
            controller.journal().recorded_types(),
            vec![
                "session_started",
                "identification_requested",
                "identification_completed"
            ]
        );
        let requested = &controller.journal().recorded()[1];
        assert_eq!(requested["input"], "image");
        assert_eq!(requested["hint"], Value::Null);
        assert_eq!(requested["sha256"].as_str().map(str::len), Some(64));
        let completed = last_event(&controller);
        assert_eq!(completed["outcome"], "identified");
        assert_eq!(completed["report"]["local_name"], "Неонова тетра");
        Ok(())
    }

    #[test]
    fn text_submission_generates_and_saves_illustration() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut controller = controller().with_artifacts_dir(temp.path());
        script(&controller)
            .push_json(identified(plant_json()))
            .push_image(illustration());

        assert_eq!(controller.submit_text(" анубіас ")?, ScreenKind::Result);
        let view = controller.state().result().unwrap();
        assert_eq!(view.report.kind(), ReportKind::Plant);
        assert_eq!(view.image.origin, ImageOrigin::Generated);
        assert_eq!(view.card.badge_color(), BadgeColor::Red);

        let saved = controller.illustration_path().unwrap().to_path_buf();
        assert_eq!(saved, temp.path().join("illustration-1.png"));
        assert_eq!(fs::read(&saved)?, illustration().bytes);

        let requests = script(&controller).requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1]
            .prompt_text()
            .contains("Анубіас Бартера (Anubias barteri)"));
        assert_eq!(
            controller.journal().recorded_types(),
            vec![
                "session_started",
                "identification_requested",
                "illustration_generated",
                "identification_completed"
            ]
        );
        Ok(())
    }

    #[test]
    fn failed_illustration_fails_the_whole_text_flow() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller)
            .push_json(identified(fish_json()))
            .push_empty();

        assert_eq!(controller.submit_text("неонова тетра")?, ScreenKind::Error);
        assert_eq!(
            controller.state().error(),
            Some(&IdentifyError::NoImageReturned)
        );
        assert!(controller.state().result().is_none());
        let completed = last_event(&controller);
        assert_eq!(completed["outcome"], "failed");
        assert_eq!(completed["error"]["code"], "no_image_returned");
        Ok(())
    }

    #[test]
    fn empty_model_reply_lands_on_error() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller).push_empty();
        assert_eq!(controller.submit_image(photo(), None)?, ScreenKind::Error);
        assert_eq!(controller.state().error(), Some(&IdentifyError::EmptyResponse));
        Ok(())
    }

    #[test]
    fn timeouts_land_on_error_with_message() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller).push_error(anyhow::Error::new(TransportTimeout { seconds: 90 }));
        assert_eq!(controller.submit_text("тетра")?, ScreenKind::Error);
        assert_eq!(
            controller.state().error().map(ToString::to_string).as_deref(),
            Some("Час очікування відповіді вичерпано (90 с).")
        );
        Ok(())
    }

    #[test]
    fn not_recognized_then_retry_returns_home() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller).push_json(json!({"status": "not_recognized"}));

        assert_eq!(controller.submit_image(photo(), None)?, ScreenKind::NotFound);
        assert_eq!(controller.retry()?, ScreenKind::NotFound);
        assert_eq!(*controller.state().screen(), Screen::Home);
        let reset = last_event(&controller);
        assert_eq!(reset["type"], "session_reset");
        assert_eq!(reset["trigger"], "retry");
        assert_eq!(reset["from"], "not_found");
        Ok(())
    }

    #[test]
    fn retry_is_only_offered_after_failure() {
        let mut controller = controller();
        let err = controller.retry().unwrap_err();
        assert_eq!(
            err.downcast_ref::<TransitionError>(),
            Some(&TransitionError::InvalidTransition {
                action: "retry",
                screen: ScreenKind::Home
            })
        );
    }

    #[test]
    fn submissions_outside_home_are_rejected_without_side_effects() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller).push_json(identified(fish_json()));
        controller.submit_image(photo(), None)?;
        let before = controller.state().clone();

        assert!(controller.submit_text("ще одна").is_err());
        assert_eq!(controller.state(), &before);
        assert_eq!(script(&controller).requests().len(), 1);
        assert!(controller.submit_text("   ").is_err());
        Ok(())
    }

    #[test]
    fn similar_lookup_stays_on_result() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller)
            .push_json(identified(fish_json()))
            .push_json(similar_json(3))
            .push_json(similar_json(2));
        controller.submit_image(photo(), None)?;

        assert_eq!(
            controller.find_similar()?,
            Resolution::Applied(ScreenKind::Result)
        );
        let Some(SimilarPanel::Loaded(entries)) = controller.similar_panel() else {
            panic!("expected loaded panel");
        };
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|entry| !entry.name.is_empty()));

        controller.find_similar()?;
        assert!(matches!(
            controller.similar_panel(),
            Some(SimilarPanel::Failed(message)) if message.contains("3")
        ));
        assert_eq!(controller.state().kind(), ScreenKind::Result);
        let completed = last_event(&controller);
        assert_eq!(completed["type"], "similar_completed");
        assert_eq!(completed["ok"], false);
        Ok(())
    }

    #[test]
    fn similar_lookup_needs_a_result() {
        let mut controller = controller();
        assert!(controller.find_similar().is_err());
        assert!(script(&controller).requests().is_empty());
    }

    #[test]
    fn completion_after_reset_is_discarded() -> anyhow::Result<()> {
        let mut controller = controller();
        let ticket = controller.begin_text("неонова тетра")?;
        assert_eq!(
            controller.state().loading_phase(),
            Some(LoadingPhase::SearchingByText)
        );
        assert_eq!(controller.reset()?, ScreenKind::Loading);

        let report = serde_json::from_value(fish_json())?;
        let screen = controller.complete_identification(ticket, IdentifyOutcome::Identified(report))?;
        assert_eq!(screen, ScreenKind::Home);
        assert!(script(&controller).requests().is_empty());
        let discarded = last_event(&controller);
        assert_eq!(discarded["type"], "stale_completion_discarded");
        assert_eq!(discarded["scope"], "identification");
        assert_eq!(discarded["generation"], 1);
        assert_eq!(discarded["current_generation"], 2);
        Ok(())
    }

    #[test]
    fn sections_toggle_only_on_result() -> anyhow::Result<()> {
        let mut controller = controller();
        assert_eq!(controller.toggle_section(0), None);
        assert!(!controller.expand_all());

        script(&controller).push_json(identified(fish_json()));
        controller.submit_image(photo(), None)?;
        assert_eq!(controller.toggle_section(1), Some(true));
        assert_eq!(controller.toggle_section(9), None);
        assert!(controller.expand_all());
        let view = controller.state().result().unwrap();
        assert!(view.card.sections.iter().all(|section| section.expanded));
        assert!(controller.collapse_all());
        Ok(())
    }

    #[test]
    fn share_defaults_to_unsupported() -> anyhow::Result<()> {
        let mut controller = controller();
        script(&controller).push_json(identified(fish_json()));
        controller.submit_image(photo(), None)?;

        let err = controller.share().unwrap_err();
        assert!(err.to_string().contains("не підтримується"));
        let shared = last_event(&controller);
        assert_eq!(shared["type"], "report_shared");
        assert_eq!(shared["ok"], false);
        assert_eq!(shared["error"]["code"], "network_or_platform");
        Ok(())
    }

    #[test]
    fn file_share_exports_title_and_overview() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut controller = controller().with_share_sink(FileShareSink::new(temp.path()));
        script(&controller).push_json(identified(fish_json()));
        controller.submit_image(photo(), None)?;

        let destination = controller.share()?;
        let text = fs::read_to_string(destination)?;
        assert!(text.starts_with("Неонова тетра\n\n"));
        assert!(text.contains("Невелика зграйна риба"));
        assert_eq!(last_event(&controller)["sink"], "file");
        Ok(())
    }

    #[test]
    fn share_requires_a_result() {
        let controller = controller();
        assert!(controller.share().is_err());
        assert!(controller
            .journal()
            .recorded_types()
            .iter()
            .all(|kind| kind != "report_shared"));
    }

    #[test]
    fn unwritable_artifacts_dir_keeps_the_illustrated_result() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let not_a_dir = temp.path().join("not-a-dir");
        fs::write(&not_a_dir, b"file")?;
        let mut controller = controller().with_artifacts_dir(not_a_dir.clone());
        script(&controller)
            .push_json(identified(plant_json()))
            .push_image(illustration());

        assert_eq!(controller.submit_text("анубіас")?, ScreenKind::Result);
        assert_eq!(controller.illustration_path(), None);
        let view = controller.state().result().unwrap();
        assert_eq!(view.image.data, illustration());
        assert_eq!(view.image.origin, ImageOrigin::Generated);

        let events = controller.journal().recorded();
        assert_eq!(events[2]["type"], "illustration_generated");
        assert_eq!(events[2]["path"], Value::Null);
        assert!(events[2]["save_error"]
            .as_str()
            .is_some_and(|message| message.contains("not-a-dir")));
        assert_eq!(last_event(&controller)["outcome"], "identified");
        Ok(())
    }

    #[test]
    fn journal_failure_on_submit_lands_on_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events = temp.path().join("events.jsonl");
        let mut controller = file_controller(&events);
        fs::remove_file(&events)?;
        fs::create_dir(&events)?;

        assert!(controller.submit_text("неонова тетра").is_err());
        assert_eq!(controller.state().kind(), ScreenKind::Error);
        assert!(matches!(
            controller.state().error(),
            Some(IdentifyError::NetworkOrPlatform(message)) if message.contains("Журнал сесії")
        ));
        assert!(script(&controller).requests().is_empty());

        fs::remove_dir(&events)?;
        assert_eq!(controller.retry()?, ScreenKind::Error);
        assert_eq!(controller.state().kind(), ScreenKind::Home);
        Ok(())
    }

    #[test]
    fn journal_failure_does_not_strand_similar_lookup() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let events = temp.path().join("events.jsonl");
        let mut controller = file_controller(&events);
        script(&controller)
            .push_json(identified(fish_json()))
            .push_json(similar_json(3));
        controller.submit_image(photo(), None)?;

        fs::remove_file(&events)?;
        fs::create_dir(&events)?;
        assert!(controller.find_similar().is_err());
        assert!(matches!(
            controller.similar_panel(),
            Some(SimilarPanel::Failed(_))
        ));
        assert_eq!(script(&controller).requests().len(), 1);

        fs::remove_dir(&events)?;
        assert_eq!(
            controller.find_similar()?,
            Resolution::Applied(ScreenKind::Result)
        );
        assert!(matches!(
            controller.similar_panel(),
            Some(SimilarPanel::Loaded(entries)) if entries.len() == 3
        ));
        Ok(())
    }
}
