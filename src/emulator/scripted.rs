//! An emulator that replays canned states.

use super::{Breakpoint, EmulationError, Emulator, RunRequest};
use crate::input::Demo;
use crate::memory::Snapshot;
use std::collections::VecDeque;

/// A request as the scripted emulator saw it.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    /// State the run started from.
    pub snapshot: Snapshot,
    /// Stop conditions.
    pub breakpoints: Vec<Breakpoint>,
    /// Replayed input, if any.
    pub demo: Option<Demo>,
    /// Clip number, if recorded.
    pub clip: Option<u32>,
}

/// Returns queued states in order and records every request.
///
/// Running past the end of the queue is an [`EmulationError::ScriptExhausted`],
/// which makes "no further invocations" directly observable in tests.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEmulator {
    responses: VecDeque<Snapshot>,
    runs: Vec<RecordedRun>,
}

impl ScriptedEmulator {
    /// An emulator with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the state returned by the next unanswered run.
    pub fn push(&mut self, snapshot: Snapshot) -> &mut Self {
        self.responses.push_back(snapshot);
        self
    }

    /// Every run so far, oldest first.
    #[must_use]
    pub fn runs(&self) -> &[RecordedRun] {
        &self.runs
    }

    /// States still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl Emulator for ScriptedEmulator {
    fn run(&mut self, request: RunRequest<'_>) -> Result<Snapshot, EmulationError> {
        self.runs.push(RecordedRun {
            snapshot: request.snapshot.clone(),
            breakpoints: request.breakpoints.to_vec(),
            demo: request.demo.cloned(),
            clip: request.clip,
        });
        self.responses
            .pop_front()
            .ok_or(EmulationError::ScriptExhausted(self.runs.len()))
    }
}
