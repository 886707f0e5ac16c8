//! Screen state machine for one identification session.
//!
//! The screen is a single enum and every transition is one method. Each
//! outer submission and each similar-species lookup gets a [`Ticket`] stamped
//! with the session generation; `reset` bumps the generation so completions
//! that arrive afterwards are discarded instead of overwriting newer state.

use std::fmt;

use crate::image::{ImageData, ImageOrigin, ReportImage};
use crate::outcome::{IdentifyError, IdentifyOutcome};
use crate::report::{IdentificationReport, ReportCard, SimilarSpeciesEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Home,
    Loading,
    Result,
    NotFound,
    Error,
}

impl ScreenKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Loading => "loading",
            Self::Result => "result",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    AnalyzingImage,
    SearchingByText,
    GeneratingImage,
}

impl LoadingPhase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::AnalyzingImage => "analyzing_image",
            Self::SearchingByText => "searching_by_text",
            Self::GeneratingImage => "generating_image",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::AnalyzingImage => "Аналізуємо зображення…",
            Self::SearchingByText => "Шукаємо вид за описом…",
            Self::GeneratingImage => "Генеруємо ілюстрацію…",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    Identification,
    Similar,
}

/// Handle for one in-flight operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    scope: TicketScope,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scope(&self) -> TicketScope {
        self.scope
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingView {
    pub phase: LoadingPhase,
    uploaded: Option<ImageData>,
    pending: Option<IdentificationReport>,
}

impl LoadingView {
    pub fn message(&self) -> &'static str {
        self.phase.message()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimilarPanel {
    Idle,
    Loading,
    Loaded(Vec<SimilarSpeciesEntry>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub report: IdentificationReport,
    pub card: ReportCard,
    pub image: ReportImage,
    pub similar: SimilarPanel,
}

impl ResultView {
    fn new(report: IdentificationReport, image: ReportImage) -> Self {
        Self {
            card: ReportCard::from_report(&report),
            report,
            image,
            similar: SimilarPanel::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    Loading(LoadingView),
    Result(Box<ResultView>),
    NotFound,
    Error(IdentifyError),
}

impl Screen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::Home => ScreenKind::Home,
            Self::Loading(_) => ScreenKind::Loading,
            Self::Result(_) => ScreenKind::Result,
            Self::NotFound => ScreenKind::NotFound,
            Self::Error(_) => ScreenKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied(ScreenKind),
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {action} on the {screen} screen")]
    InvalidTransition {
        action: &'static str,
        screen: ScreenKind,
    },
    #[error("a similar-species lookup is already running")]
    SimilarInFlight,
    #[error("ticket belongs to another operation ({expected:?} expected)")]
    WrongTicket { expected: TicketScope },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    screen: Screen,
    generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            generation: 0,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn kind(&self) -> ScreenKind {
        self.screen.kind()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> Option<&ResultView> {
        match &self.screen {
            Screen::Result(view) => Some(view.as_ref()),
            _ => None,
        }
    }

    pub fn result_mut(&mut self) -> Option<&mut ResultView> {
        match &mut self.screen {
            Screen::Result(view) => Some(view.as_mut()),
            _ => None,
        }
    }

    pub fn loading_phase(&self) -> Option<LoadingPhase> {
        match &self.screen {
            Screen::Loading(loading) => Some(loading.phase),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&IdentifyError> {
        match &self.screen {
            Screen::Error(error) => Some(error),
            _ => None,
        }
    }

    /// `home -> loading(analyzing image)`; the uploaded image is kept for the result.
    pub fn submit_image(&mut self, image: ImageData) -> Result<Ticket, TransitionError> {
        self.begin(LoadingPhase::AnalyzingImage, Some(image))
    }

    /// `home -> loading(searching by text)`.
    pub fn submit_text(&mut self) -> Result<Ticket, TransitionError> {
        self.begin(LoadingPhase::SearchingByText, None)
    }

    fn begin(
        &mut self,
        phase: LoadingPhase,
        uploaded: Option<ImageData>,
    ) -> Result<Ticket, TransitionError> {
        if !matches!(self.screen, Screen::Home) {
            return Err(TransitionError::InvalidTransition {
                action: "submit",
                screen: self.kind(),
            });
        }
        self.generation += 1;
        self.screen = Screen::Loading(LoadingView {
            phase,
            uploaded,
            pending: None,
        });
        Ok(Ticket {
            generation: self.generation,
            scope: TicketScope::Identification,
        })
    }

    /// Applies an identification outcome.
    ///
    /// Image submissions go straight to `result`. Text submissions move to the
    /// `generating image` phase and wait for [`ViewState::resolve_illustration`].
    pub fn resolve_identification(
        &mut self,
        ticket: Ticket,
        outcome: IdentifyOutcome,
    ) -> Result<Resolution, TransitionError> {
        expect_scope(ticket, TicketScope::Identification)?;
        if ticket.generation != self.generation {
            return Ok(Resolution::Discarded);
        }
        let loading = match std::mem::replace(&mut self.screen, Screen::Home) {
            Screen::Loading(loading) if loading.phase != LoadingPhase::GeneratingImage => loading,
            other => {
                let screen = other.kind();
                self.screen = other;
                return Err(TransitionError::InvalidTransition {
                    action: "resolve identification",
                    screen,
                });
            }
        };

        self.screen = match outcome {
            IdentifyOutcome::Identified(report) => match loading.uploaded {
                Some(image) => Screen::Result(Box::new(ResultView::new(
                    report,
                    ReportImage {
                        data: image,
                        origin: ImageOrigin::Uploaded,
                    },
                ))),
                None => Screen::Loading(LoadingView {
                    phase: LoadingPhase::GeneratingImage,
                    uploaded: None,
                    pending: Some(report),
                }),
            },
            IdentifyOutcome::NotRecognized => Screen::NotFound,
            IdentifyOutcome::Failed(error) => Screen::Error(error),
        };
        Ok(Resolution::Applied(self.kind()))
    }

    /// The report waiting for its illustration, if any.
    pub fn pending_report(&self) -> Option<&IdentificationReport> {
        match &self.screen {
            Screen::Loading(loading) => loading.pending.as_ref(),
            _ => None,
        }
    }

    /// Completes a text submission. A failed illustration fails the whole operation.
    pub fn resolve_illustration(
        &mut self,
        ticket: Ticket,
        illustration: Result<ImageData, IdentifyError>,
    ) -> Result<Resolution, TransitionError> {
        expect_scope(ticket, TicketScope::Identification)?;
        if ticket.generation != self.generation {
            return Ok(Resolution::Discarded);
        }
        let report = match std::mem::replace(&mut self.screen, Screen::Home) {
            Screen::Loading(LoadingView {
                phase: LoadingPhase::GeneratingImage,
                pending: Some(report),
                ..
            }) => report,
            other => {
                let screen = other.kind();
                self.screen = other;
                return Err(TransitionError::InvalidTransition {
                    action: "resolve illustration",
                    screen,
                });
            }
        };

        self.screen = match illustration {
            Ok(image) => Screen::Result(Box::new(ResultView::new(
                report,
                ReportImage {
                    data: image,
                    origin: ImageOrigin::Generated,
                },
            ))),
            Err(error) => Screen::Error(error),
        };
        Ok(Resolution::Applied(self.kind()))
    }

    /// Returns to `home` from any screen, dropping report, image and error.
    ///
    /// Any ticket issued before the reset becomes stale.
    pub fn reset(&mut self) -> ScreenKind {
        let previous = self.kind();
        self.generation += 1;
        self.screen = Screen::Home;
        previous
    }

    /// Starts the nested similar-species lookup. Only valid on `result`.
    pub fn begin_similar(&mut self) -> Result<Ticket, TransitionError> {
        let generation = self.generation;
        let screen = self.kind();
        let Some(view) = self.result_mut() else {
            return Err(TransitionError::InvalidTransition {
                action: "find similar species",
                screen,
            });
        };
        if view.similar == SimilarPanel::Loading {
            return Err(TransitionError::SimilarInFlight);
        }
        view.similar = SimilarPanel::Loading;
        Ok(Ticket {
            generation,
            scope: TicketScope::Similar,
        })
    }

    /// Stores the lookup result inline. The outer screen never changes here.
    pub fn resolve_similar(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<SimilarSpeciesEntry>, IdentifyError>,
    ) -> Result<Resolution, TransitionError> {
        expect_scope(ticket, TicketScope::Similar)?;
        if ticket.generation != self.generation {
            return Ok(Resolution::Discarded);
        }
        let screen = self.kind();
        let Some(view) = self.result_mut() else {
            return Err(TransitionError::InvalidTransition {
                action: "resolve similar species",
                screen,
            });
        };
        if view.similar != SimilarPanel::Loading {
            return Err(TransitionError::InvalidTransition {
                action: "resolve similar species",
                screen,
            });
        }
        view.similar = match result {
            Ok(entries) => SimilarPanel::Loaded(entries),
            Err(error) => SimilarPanel::Failed(error.to_string()),
        };
        Ok(Resolution::Applied(ScreenKind::Result))
    }
}

fn expect_scope(ticket: Ticket, expected: TicketScope) -> Result<(), TransitionError> {
    if ticket.scope != expected {
        return Err(TransitionError::WrongTicket { expected });
    }
    Ok(())
}
