//! Narration of a variant's `audioText` through a host speech capability.
//!
//! # Lifecycle
//!
//! [`AudioNarrator`] owns at most one active [`Utterance`]:
//!
//! ```text
//! play(text) ── stop active (if any) ──▶ SpeechEngine::start(text) ──▶ Playing
//! stop()     ── Utterance::stop ──▶ Silent
//! utterance finishes on its own ──▶ is_playing() == false
//! ```
//!
//! A new `play` always cuts the previous narration off; nothing is queued.
//! Narration is independent of solution generation and may run while a
//! request is in flight.
//!
//! # Usage
//!
//! ```no_run
//! use algo_solver::config::NarrationConfig;
//! use algo_solver::narration::{AudioNarrator, CommandSpeechEngine};
//!
//! let engine = CommandSpeechEngine::from_config(&NarrationConfig::default());
//! let mut narrator = AudioNarrator::new(Box::new(engine));
//! narrator.play("Let's start with the brute force idea.").expect("speech failed");
//! narrator.stop().expect("stop failed");
//! ```

pub mod command;

pub use command::CommandSpeechEngine;

use thiserror::Error;

// ---------------------------------------------------------------------------
// NarrationError
// ---------------------------------------------------------------------------

/// All errors that can surface while narrating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrationError {
    /// There is nothing to say.
    #[error("narration text is empty")]
    EmptyText,

    /// The host speech capability could not be started.
    #[error("cannot start speech: {0}")]
    Start(String),

    /// The active narration could not be stopped.
    #[error("cannot stop speech: {0}")]
    Stop(String),
}

// ---------------------------------------------------------------------------
// Host capability traits
// ---------------------------------------------------------------------------

/// One narration in progress.
pub trait Utterance: Send {
    /// `true` once the host has finished speaking (or the utterance died).
    fn is_finished(&mut self) -> bool;

    /// Cut the narration off.  Stopping a finished utterance is a no-op.
    fn stop(&mut self) -> Result<(), NarrationError>;
}

/// Host text-to-speech capability: `speak(text)` with a handle back.
pub trait SpeechEngine: Send + Sync {
    fn start(&self, text: &str) -> Result<Box<dyn Utterance>, NarrationError>;
}

// ---------------------------------------------------------------------------
// AudioNarrator
// ---------------------------------------------------------------------------

/// Plays and stops narrations, one at a time.
pub struct AudioNarrator {
    engine: Box<dyn SpeechEngine>,
    active: Option<Box<dyn Utterance>>,
}

impl AudioNarrator {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            active: None,
        }
    }

    /// Start narrating `text`, interrupting any narration already playing.
    pub fn play(&mut self, text: &str) -> Result<(), NarrationError> {
        if text.trim().is_empty() {
            return Err(NarrationError::EmptyText);
        }

        if let Err(e) = self.stop() {
            // The old process is beyond our control; start the new one anyway.
            log::warn!("narration: could not interrupt previous narration: {e}");
        }

        let utterance = self.engine.start(text)?;
        log::debug!("narration: started ({} chars)", text.chars().count());
        self.active = Some(utterance);
        Ok(())
    }

    /// Stop the active narration, if any.
    pub fn stop(&mut self) -> Result<(), NarrationError> {
        match self.active.take() {
            Some(mut utterance) => {
                if utterance.is_finished() {
                    return Ok(());
                }
                log::debug!("narration: stopping");
                utterance.stop()
            }
            None => Ok(()),
        }
    }

    /// `true` while a narration is still being spoken.
    pub fn is_playing(&mut self) -> bool {
        let playing = self
            .active
            .as_mut()
            .map(|utterance| !utterance.is_finished())
            .unwrap_or(false);
        if !playing {
            self.active = None;
        }
        playing
    }
}

impl Drop for AudioNarrator {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::mock::MockSpeechEngine;
    use super::*;

    #[test]
    fn play_starts_and_stop_cancels() {
        let (engine, log) = MockSpeechEngine::new();
        let mut narrator = AudioNarrator::new(Box::new(engine));

        narrator.play("hello").unwrap();
        assert!(narrator.is_playing());

        narrator.stop().unwrap();
        assert!(!narrator.is_playing());

        let log = log.lock().unwrap();
        assert_eq!(log.started, vec!["hello"]);
        assert_eq!(log.stopped, 1);
    }

    #[test]
    fn new_play_interrupts_previous() {
        let (engine, log) = MockSpeechEngine::new();
        let mut narrator = AudioNarrator::new(Box::new(engine));

        narrator.play("first").unwrap();
        narrator.play("second").unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.started, vec!["first", "second"]);
        assert_eq!(log.stopped, 1, "first narration must be cut off");
    }

    #[test]
    fn finished_narration_is_not_stopped_again() {
        let (engine, log) = MockSpeechEngine::new();
        let mut narrator = AudioNarrator::new(Box::new(engine));

        narrator.play("short").unwrap();
        log.lock().unwrap().finish_all = true;

        assert!(!narrator.is_playing());
        narrator.stop().unwrap();
        assert_eq!(log.lock().unwrap().stopped, 0);
    }

    #[test]
    fn finished_narration_is_released_before_next_play() {
        let (engine, log) = MockSpeechEngine::new();
        let mut narrator = AudioNarrator::new(Box::new(engine));

        narrator.play("first").unwrap();
        log.lock().unwrap().finish_all = true;
        assert!(!narrator.is_playing());

        narrator.play("second").unwrap();
        assert!(narrator.is_playing());
        narrator.stop().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.started, vec!["first", "second"]);
        assert_eq!(log.stopped, 1, "only the live narration is stopped");
    }

    #[test]
    fn blank_text_is_rejected() {
        let (engine, log) = MockSpeechEngine::new();
        let mut narrator = AudioNarrator::new(Box::new(engine));

        assert_eq!(narrator.play("   "), Err(NarrationError::EmptyText));
        assert!(log.lock().unwrap().started.is_empty());
    }

    #[test]
    fn start_failure_leaves_narrator_silent() {
        let (mut engine, _log) = MockSpeechEngine::new();
        engine.fail_start = true;
        let mut narrator = AudioNarrator::new(Box::new(engine));

        assert!(matches!(narrator.play("hi"), Err(NarrationError::Start(_))));
        assert!(!narrator.is_playing());
    }

    #[test]
    fn drop_stops_active_narration() {
        let (engine, log) = MockSpeechEngine::new();
        {
            let mut narrator = AudioNarrator::new(Box::new(engine));
            narrator.play("bye").unwrap();
        }
        assert_eq!(log.lock().unwrap().stopped, 1);
    }
}
