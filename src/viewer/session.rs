//! Viewer session: the single writer of the interaction state.
//!
//! [`ViewerSession`] receives [`ViewerCommand`]s from the UI over a
//! `tokio::sync::mpsc` channel, drives the [`InteractionStateMachine`], runs
//! solve requests on spawned tasks and plays narrations.
//!
//! ```text
//! ViewerCommand (mpsc) ──▶ ViewerSession::run()  ← async tokio task
//!                               │
//!                               ├─ Submit     → machine.submit → spawn(solver.solve)
//!                               ├─ Cancel     → cancel in-flight token
//!                               ├─ Select / HoverEnter / HoverLeave / Acknowledge
//!                               ├─ PlayNarration / StopNarration → spawn_blocking(AudioNarrator)
//!                               │
//!                               └─ solve task done (mpsc) → on_success / on_failure
//!                                  (a panicked solve task reports SolveError::Internal)
//!
//! SharedViewer (Arc<Mutex<InteractionStateMachine>>) ←── read by the UI
//! ```
//!
//! The lock is never held across an `.await`.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::narration::{AudioNarrator, NarrationError};
use crate::solve::{CancelToken, ProblemQuery, SolutionSet, SolveError, Solver, DEFAULT_LANGUAGE};

use super::state::{InteractionStateMachine, SubmitOutcome, Ticket};

// ---------------------------------------------------------------------------
// ViewerCommand
// ---------------------------------------------------------------------------

/// UI events sent to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Submit a new problem.
    Submit {
        problem: String,
        language: Option<String>,
    },
    /// Cancel the in-flight request; the viewer ends up in `Failed`.
    Cancel,
    /// Select variant `0..4`.
    Select(usize),
    /// Pointer entered snippet line `n` of the selected variant.
    HoverEnter(usize),
    /// Pointer left the hovered line.
    HoverLeave,
    /// Dismiss the current error.
    Acknowledge,
    /// Narrate the selected variant's `audioText`.
    PlayNarration,
    /// Stop narrating.
    StopNarration,
}

// ---------------------------------------------------------------------------
// SharedViewer
// ---------------------------------------------------------------------------

/// Read handle on the interaction state.
///
/// Cheap to clone (`Arc` clone).  Lock for a short critical section; do
/// **not** hold the lock across `.await` points.
pub type SharedViewer = Arc<Mutex<InteractionStateMachine>>;

pub fn new_shared_viewer() -> SharedViewer {
    Arc::new(Mutex::new(InteractionStateMachine::new()))
}

type Completion = (Ticket, Result<SolutionSet, SolveError>);

// ---------------------------------------------------------------------------
// ViewerSession
// ---------------------------------------------------------------------------

pub struct ViewerSession {
    viewer: SharedViewer,
    solver: Arc<dyn Solver>,
    narrator: Arc<Mutex<AudioNarrator>>,
    default_language: String,
    in_flight: Option<CancelToken>,
}

impl ViewerSession {
    /// Create a new session.
    ///
    /// * `viewer`: shared state, also read by the UI.
    /// * `solver`: in-process `SolveService` or a remote `HttpSolver`.
    /// * `narrator`: narration lifecycle over the host speech engine.
    pub fn new(viewer: SharedViewer, solver: Arc<dyn Solver>, narrator: AudioNarrator) -> Self {
        Self {
            viewer,
            solver,
            narrator: Arc::new(Mutex::new(narrator)),
            default_language: DEFAULT_LANGUAGE.to_string(),
            in_flight: None,
        }
    }

    /// Language used when a `Submit` names none.
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `commands` is closed and no request is in flight.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ViewerCommand>) {
        let (done_tx, mut done_rx) = mpsc::channel::<Completion>(4);
        let mut closed = false;

        loop {
            if closed && self.in_flight.is_none() {
                break;
            }

            tokio::select! {
                command = commands.recv(), if !closed => match command {
                    Some(command) => self.handle(command, &done_tx).await,
                    None => closed = true,
                },
                Some((ticket, outcome)) = done_rx.recv() => self.complete(ticket, outcome),
            }
        }

        log::info!("viewer: command channel closed, session shutting down");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    async fn handle(&mut self, command: ViewerCommand, done_tx: &mpsc::Sender<Completion>) {
        log::debug!("viewer: {command:?}");
        match command {
            ViewerCommand::Submit { problem, language } => {
                self.submit(&problem, language.as_deref(), done_tx)
            }
            ViewerCommand::Cancel => {
                if let Some(cancel) = &self.in_flight {
                    cancel.cancel();
                }
            }
            ViewerCommand::Select(index) => {
                let result = self.viewer.lock().unwrap().select(index);
                if let Err(e) = result {
                    log::warn!("viewer: {e}");
                }
            }
            ViewerCommand::HoverEnter(line) => {
                let result = self.viewer.lock().unwrap().hover_enter(line);
                if let Err(e) = result {
                    log::debug!("viewer: {e}");
                }
            }
            ViewerCommand::HoverLeave => {
                let result = self.viewer.lock().unwrap().hover_leave();
                if let Err(e) = result {
                    log::debug!("viewer: {e}");
                }
            }
            ViewerCommand::Acknowledge => {
                let result = self.viewer.lock().unwrap().acknowledge();
                if let Err(e) = result {
                    log::debug!("viewer: {e}");
                }
            }
            ViewerCommand::PlayNarration => self.play_narration().await,
            ViewerCommand::StopNarration => self.with_narrator(AudioNarrator::stop).await,
        }
    }

    fn submit(&mut self, problem: &str, language: Option<&str>, done_tx: &mpsc::Sender<Completion>) {
        let query = match ProblemQuery::with_default_language(problem, language, &self.default_language)
        {
            Ok(query) => query,
            Err(e) => {
                log::warn!("viewer: submit rejected: {e}");
                return;
            }
        };

        let outcome = self.viewer.lock().unwrap().submit(query.clone());
        let ticket = match outcome {
            SubmitOutcome::Started(ticket) => ticket,
            SubmitOutcome::Ignored => return,
        };

        let cancel = CancelToken::new();
        self.in_flight = Some(cancel.clone());

        let solver = Arc::clone(&self.solver);
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let task = tokio::spawn(async move { solver.solve(&query, &cancel).await });
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("viewer: solve task for {ticket:?} died: {e}");
                    Err(SolveError::Internal(e.to_string()))
                }
            };
            let _ = done_tx.send((ticket, outcome)).await;
        });
    }

    fn complete(&mut self, ticket: Ticket, outcome: Result<SolutionSet, SolveError>) {
        self.in_flight = None;
        let mut viewer = self.viewer.lock().unwrap();
        match outcome {
            Ok(set) => viewer.on_success(ticket, set),
            Err(e) => viewer.on_failure(ticket, e),
        };
    }

    async fn play_narration(&self) {
        let text = {
            let viewer = self.viewer.lock().unwrap();
            viewer.selected_variant().map(|v| v.audio_text.clone())
        };
        match text {
            Some(text) => self.with_narrator(move |n| n.play(&text)).await,
            None => log::debug!("viewer: nothing selected to narrate"),
        }
    }

    /// Run a narrator call on the blocking pool; spawning and reaping the
    /// host speech process must not stall the event loop.
    async fn with_narrator<F>(&self, f: F)
    where
        F: FnOnce(&mut AudioNarrator) -> Result<(), NarrationError> + Send + 'static,
    {
        let narrator = Arc::clone(&self.narrator);
        let result = tokio::task::spawn_blocking(move || {
            let mut narrator = narrator.lock().unwrap();
            f(&mut *narrator)
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("narration: {e}"),
            Err(e) => log::error!("narration: task failed: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
