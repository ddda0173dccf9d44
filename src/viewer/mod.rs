//! Client-side viewer: the interaction state machine, the store it reads
//! from, and the session task that drives both.
//!
//! ```text
//! UI ──ViewerCommand──▶ ViewerSession ──▶ InteractionStateMachine ──▶ SolutionStore
//!                            │
//!                            └─▶ Solver (SolveService in-process, or HttpSolver)
//! ```

pub mod remote;
pub mod session;
pub mod state;
pub mod store;

pub use remote::HttpSolver;
pub use session::{new_shared_viewer, SharedViewer, ViewerCommand, ViewerSession};
pub use state::{
    InteractionState, InteractionStateMachine, SubmitOutcome, Ticket, TransitionError, ViewerState,
};
pub use store::{SolutionStore, StoreError};
