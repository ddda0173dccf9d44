//! Interaction state machine for inspecting a solution set.
//!
//! [`InteractionStateMachine`] correlates problem submission, variant
//! selection and line hover with the explanation shown to the user.  It is
//! single-writer: [`ViewerSession`](crate::viewer::ViewerSession) owns every
//! mutation, UIs only read.
//!
//! ```text
//! Idle / Ready / Selected / HoverActive / Failed ──submit──▶ Loading
//! Loading ──submit──▶ Loading                      (ignored, nothing queued)
//! Loading ──on_success(current ticket)──▶ Ready
//! Loading ──on_failure(current ticket)──▶ Failed(error)
//! Ready / Selected / HoverActive ──select(i)──▶ Selected(i)   (hover cleared)
//! Selected / HoverActive ──hover_enter(l)──▶ HoverActive(i, l)
//! HoverActive ──hover_leave──▶ Selected(i)
//! Failed ──acknowledge──▶ Idle
//! ```
//!
//! Every submission gets a [`Ticket`]; completions carrying anything but the
//! current ticket are dropped, so a late response can never overwrite a
//! newer one.

use thiserror::Error;

use crate::solve::{ProblemQuery, SolutionSet, SolutionVariant, SolveError};

use super::store::{SolutionStore, StoreError};

// ---------------------------------------------------------------------------
// ViewerState
// ---------------------------------------------------------------------------

/// States of the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerState {
    /// Nothing submitted yet, or a failure was acknowledged.
    Idle,

    /// A solve request is in flight.  Further submissions are ignored.
    Loading,

    /// Four variants are loaded, none selected.
    Ready,

    /// Variant `index` is selected.
    Selected { index: usize },

    /// Variant `index` is selected and snippet line `line` is hovered.
    HoverActive { index: usize, line: usize },

    /// The last request failed.  Cleared by `acknowledge` or a new submit.
    Failed(SolveError),
}

impl ViewerState {
    /// Returns `true` while a request is in flight.
    ///
    /// The UI uses this to disable the submit control.
    ///
    /// ```
    /// use algo_solver::viewer::ViewerState;
    ///
    /// assert!(ViewerState::Loading.is_busy());
    /// assert!(!ViewerState::Idle.is_busy());
    /// assert!(!ViewerState::Ready.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, ViewerState::Loading)
    }

    /// A short human-readable label suitable for a status bar.
    pub fn label(&self) -> &'static str {
        match self {
            ViewerState::Idle => "Idle",
            ViewerState::Loading => "Solving",
            ViewerState::Ready => "Ready",
            ViewerState::Selected { .. } => "Selected",
            ViewerState::HoverActive { .. } => "Inspecting",
            ViewerState::Failed(_) => "Error",
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        ViewerState::Idle
    }
}

// ---------------------------------------------------------------------------
// InteractionState
// ---------------------------------------------------------------------------

/// Selection and hover, as a flat pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub selected_index: Option<usize>,
    pub hovered_line: Option<usize>,
}

// ---------------------------------------------------------------------------
// Ticket / SubmitOutcome / TransitionError
// ---------------------------------------------------------------------------

/// Identifies one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The machine entered `Loading`; the solve result must be reported
    /// with this ticket.
    Started(Ticket),
    /// A request was already in flight.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// InteractionStateMachine
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InteractionStateMachine {
    state: ViewerState,
    store: SolutionStore,
    query: Option<ProblemQuery>,
    next_ticket: u64,
    in_flight: Option<Ticket>,
}

impl InteractionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start a new query.  Clears selection, hover and the stored set.
    pub fn submit(&mut self, query: ProblemQuery) -> SubmitOutcome {
        if self.state.is_busy() {
            log::debug!("viewer: submit ignored, request already in flight");
            return SubmitOutcome::Ignored;
        }

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.in_flight = Some(ticket);
        self.store.clear();
        self.query = Some(query);
        self.state = ViewerState::Loading;
        log::debug!("viewer: {:?} → Loading", ticket);
        SubmitOutcome::Started(ticket)
    }

    /// Apply a successful result.  Returns `false` when it was stale.
    pub fn on_success(&mut self, ticket: Ticket, set: SolutionSet) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.in_flight = None;
        self.store.replace(set);
        self.state = ViewerState::Ready;
        log::debug!("viewer: {:?} → Ready", ticket);
        true
    }

    /// Apply a failure.  Returns `false` when it was stale.
    pub fn on_failure(&mut self, ticket: Ticket, error: SolveError) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        log::warn!("viewer: {:?} failed: {error}", ticket);
        self.in_flight = None;
        self.store.clear();
        self.state = ViewerState::Failed(error);
        true
    }

    /// Select variant `index`, clearing any hover.
    pub fn select(&mut self, index: usize) -> Result<(), TransitionError> {
        match self.state {
            ViewerState::Ready | ViewerState::Selected { .. } | ViewerState::HoverActive { .. } => {
                self.store.get_by_index(index)?;
                self.state = ViewerState::Selected { index };
                Ok(())
            }
            _ => Err(self.invalid("select a solution")),
        }
    }

    /// Hover snippet line `line` of the selected variant.
    ///
    /// Any line number is accepted; lines without an explanation simply show
    /// nothing (see [`hovered_explanation`](Self::hovered_explanation)).
    pub fn hover_enter(&mut self, line: usize) -> Result<(), TransitionError> {
        match self.state {
            ViewerState::Selected { index } | ViewerState::HoverActive { index, .. } => {
                self.state = ViewerState::HoverActive { index, line };
                Ok(())
            }
            _ => Err(self.invalid("hover a line")),
        }
    }

    /// Leave the hovered line; the selection stays.
    pub fn hover_leave(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ViewerState::HoverActive { index, .. } => {
                self.state = ViewerState::Selected { index };
                Ok(())
            }
            _ => Err(self.invalid("leave a hovered line")),
        }
    }

    /// Dismiss a failure and return to `Idle`.
    pub fn acknowledge(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ViewerState::Failed(_) => {
                self.state = ViewerState::Idle;
                Ok(())
            }
            _ => Err(self.invalid("acknowledge an error")),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_busy()
    }

    pub fn store(&self) -> &SolutionStore {
        &self.store
    }

    pub fn solutions(&self) -> Option<&SolutionSet> {
        self.store.current()
    }

    /// The query of the most recent accepted submission.
    pub fn query(&self) -> Option<&ProblemQuery> {
        self.query.as_ref()
    }

    pub fn error(&self) -> Option<&SolveError> {
        match &self.state {
            ViewerState::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn interaction(&self) -> InteractionState {
        match self.state {
            ViewerState::Selected { index } => InteractionState {
                selected_index: Some(index),
                hovered_line: None,
            },
            ViewerState::HoverActive { index, line } => InteractionState {
                selected_index: Some(index),
                hovered_line: Some(line),
            },
            _ => InteractionState::default(),
        }
    }

    pub fn selected_variant(&self) -> Option<&SolutionVariant> {
        let index = self.interaction().selected_index?;
        self.store.get_by_index(index).ok()
    }

    /// Explanation for the hovered line, if the generator supplied one.
    pub fn hovered_explanation(&self) -> Option<&str> {
        let line = self.interaction().hovered_line?;
        self.selected_variant()?.explanation_for(line)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn accepts(&self, ticket: Ticket) -> bool {
        if self.state.is_busy() && self.in_flight == Some(ticket) {
            return true;
        }
        log::debug!(
            "viewer: dropping stale completion {:?} in state {}",
            ticket,
            self.state.label()
        );
        false
    }

    fn invalid(&self, action: &'static str) -> TransitionError {
        TransitionError::InvalidTransition {
            action,
            state: self.state.label(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::model::fixtures::solution_set;
    use crate::solve::{ApproachType, GenerationError};

    fn query(text: &str) -> ProblemQuery {
        ProblemQuery::new(text, Some("Python")).unwrap()
    }

    fn started(outcome: SubmitOutcome) -> Ticket {
        match outcome {
            SubmitOutcome::Started(ticket) => ticket,
            SubmitOutcome::Ignored => panic!("submit was ignored"),
        }
    }

    fn ready_machine() -> InteractionStateMachine {
        let mut m = InteractionStateMachine::new();
        let ticket = started(m.submit(query("Two Sum")));
        assert!(m.on_success(ticket, solution_set()));
        m
    }

    #[test]
    fn initial_state_is_idle() {
        let m = InteractionStateMachine::new();
        assert_eq!(m.state(), &ViewerState::Idle);
        assert_eq!(m.interaction(), InteractionState::default());
        assert!(m.solutions().is_none());
    }

    #[test]
    fn two_sum_walkthrough() {
        let mut m = ready_machine();
        assert_eq!(m.state(), &ViewerState::Ready);
        let order: Vec<_> = m.solutions().unwrap().iter().map(|v| v.approach_type).collect();
        assert_eq!(order, ApproachType::ORDER);

        m.select(2).unwrap();
        assert_eq!(m.state(), &ViewerState::Selected { index: 2 });

        m.hover_enter(0).unwrap();
        assert_eq!(m.state(), &ViewerState::HoverActive { index: 2, line: 0 });
        assert_eq!(m.hovered_explanation(), Some("Define the function."));
    }

    #[test]
    fn hover_beyond_explanations_shows_nothing() {
        let mut m = ready_machine();
        m.select(0).unwrap();

        m.hover_enter(2).unwrap();
        assert_eq!(m.hovered_explanation(), None);

        m.hover_enter(usize::MAX).unwrap();
        assert_eq!(m.hovered_explanation(), None);
    }

    #[test]
    fn hover_leave_returns_to_selected_not_ready() {
        let mut m = ready_machine();
        m.select(1).unwrap();
        m.hover_enter(1).unwrap();
        m.hover_leave().unwrap();
        assert_eq!(m.state(), &ViewerState::Selected { index: 1 });
        assert_eq!(m.hovered_explanation(), None);
    }

    #[test]
    fn select_clears_hover() {
        let mut m = ready_machine();
        m.select(0).unwrap();
        m.hover_enter(1).unwrap();
        m.select(3).unwrap();
        assert_eq!(
            m.interaction(),
            InteractionState {
                selected_index: Some(3),
                hovered_line: None
            }
        );
    }

    #[test]
    fn select_out_of_range_is_rejected() {
        let mut m = ready_machine();
        assert_eq!(
            m.select(4),
            Err(TransitionError::Store(StoreError::IndexOutOfRange(4)))
        );
        assert_eq!(m.state(), &ViewerState::Ready);
    }

    #[test]
    fn select_and_hover_need_loaded_solutions() {
        let mut m = InteractionStateMachine::new();
        assert!(matches!(
            m.select(0),
            Err(TransitionError::InvalidTransition { .. })
        ));
        assert!(m.hover_enter(0).is_err());
        assert!(m.hover_leave().is_err());

        let mut m = ready_machine();
        assert!(m.hover_enter(0).is_err(), "hover needs a selection");
    }

    #[test]
    fn resubmit_clears_selection_and_hover() {
        let mut m = ready_machine();
        m.select(2).unwrap();
        m.hover_enter(0).unwrap();

        let ticket = started(m.submit(query("Three Sum")));
        assert_eq!(m.state(), &ViewerState::Loading);
        assert_eq!(m.interaction(), InteractionState::default());
        assert!(m.solutions().is_none());
        assert_eq!(m.query().unwrap().text(), "Three Sum");

        assert!(m.on_success(ticket, solution_set()));
        assert_eq!(m.state(), &ViewerState::Ready);
        assert_eq!(m.interaction(), InteractionState::default());
    }

    #[test]
    fn submit_while_loading_is_ignored() {
        let mut m = InteractionStateMachine::new();
        let ticket = started(m.submit(query("Two Sum")));
        assert_eq!(m.submit(query("Other")), SubmitOutcome::Ignored);
        assert_eq!(m.query().unwrap().text(), "Two Sum");

        assert!(m.on_success(ticket, solution_set()));
        assert_eq!(m.state(), &ViewerState::Ready);
    }

    #[test]
    fn failure_is_observable_until_acknowledged() {
        let mut m = InteractionStateMachine::new();
        let ticket = started(m.submit(query("Two Sum")));
        let err = SolveError::Generation(GenerationError::EmptyResponse);

        assert!(m.on_failure(ticket, err.clone()));
        assert_eq!(m.state(), &ViewerState::Failed(err.clone()));
        assert_eq!(m.error(), Some(&err));
        assert!(m.select(0).is_err());

        m.acknowledge().unwrap();
        assert_eq!(m.state(), &ViewerState::Idle);
        assert!(m.acknowledge().is_err());
    }

    #[test]
    fn failed_accepts_new_submit() {
        let mut m = InteractionStateMachine::new();
        let ticket = started(m.submit(query("Two Sum")));
        m.on_failure(ticket, SolveError::MissingCredential);

        let ticket = started(m.submit(query("Two Sum")));
        assert!(m.on_success(ticket, solution_set()));
        assert_eq!(m.state(), &ViewerState::Ready);
    }

    #[test]
    fn stale_completions_are_dropped() {
        let mut m = InteractionStateMachine::new();
        let first = started(m.submit(query("Two Sum")));
        m.on_failure(first, SolveError::MissingCredential);
        let second = started(m.submit(query("Two Sum")));

        assert!(!m.on_success(first, solution_set()));
        assert_eq!(m.state(), &ViewerState::Loading);

        assert!(m.on_success(second, solution_set()));
        assert!(!m.on_failure(second, SolveError::MissingCredential));
        assert_eq!(m.state(), &ViewerState::Ready);
    }

    #[test]
    fn completion_without_submit_is_dropped() {
        let mut m = InteractionStateMachine::new();
        assert!(!m.on_success(Ticket(1), solution_set()));
        assert_eq!(m.state(), &ViewerState::Idle);
    }

    #[test]
    fn labels() {
        assert_eq!(ViewerState::Idle.label(), "Idle");
        assert_eq!(ViewerState::Loading.label(), "Solving");
        assert_eq!(ViewerState::Selected { index: 0 }.label(), "Selected");
        assert_eq!(
            ViewerState::Failed(SolveError::MissingCredential).label(),
            "Error"
        );
    }
}
