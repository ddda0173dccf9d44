//! Speech engine backed by a host TTS command (`espeak`, `say`, `festival`).
//!
//! The text is written to the child's stdin from a short-lived writer thread
//! so a slow reader never blocks the caller.  Stopping kills the child.

use std::io::Write;
use std::process::{Child, Command, Stdio};

use crate::config::NarrationConfig;

use super::{NarrationError, SpeechEngine, Utterance};

// ---------------------------------------------------------------------------
// CommandSpeechEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandSpeechEngine {
    program: String,
    args: Vec<String>,
}

impl CommandSpeechEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &NarrationConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn start(&self, text: &str) -> Result<Box<dyn Utterance>, NarrationError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| NarrationError::Start(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let text = text.to_string();
            std::thread::spawn(move || {
                // A killed child closes the pipe; that error is expected.
                let _ = stdin.write_all(text.as_bytes());
            });
        }

        Ok(Box::new(ChildUtterance { child }))
    }
}

// ---------------------------------------------------------------------------
// ChildUtterance
// ---------------------------------------------------------------------------

struct ChildUtterance {
    child: Child,
}

impl Utterance for ChildUtterance {
    fn is_finished(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }

    fn stop(&mut self) -> Result<(), NarrationError> {
        if self.is_finished() {
            return Ok(());
        }
        self.child
            .kill()
            .map_err(|e| NarrationError::Stop(e.to_string()))?;
        // Reap so the process does not linger as a zombie.
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for ChildUtterance {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
