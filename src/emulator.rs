//! The emulator collaborator.
//!
//! The driver never talks to an emulator process directly. It hands an
//! [`Emulator`] a [`RunRequest`] (start state, stop conditions, optional
//! input script) and gets back the state at the moment emulation paused.
//! [`Bgb`] drives the real bgb executable; [`ScriptedEmulator`] returns
//! canned states for tests and dry runs.

mod bgb;
mod scripted;

pub use bgb::{Bgb, BgbPaths, Recording};
pub use scripted::{RecordedRun, ScriptedEmulator};

use crate::input::Demo;
use crate::memory::Snapshot;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of memory access an access breakpoint fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Fires on a read.
    Read,
    /// Fires on a write.
    Write,
}

/// A condition that pauses emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    /// Execution reaches `addr`, optionally only once the clock counter
    /// exceeds `after_clocks`.
    Exec {
        /// Program address.
        addr: u16,
        /// Minimum total clocks (exclusive).
        after_clocks: Option<u64>,
    },
    /// Memory at `addr` is accessed.
    Access {
        /// Data address.
        addr: u16,
        /// Access kind.
        access: Access,
    },
}

impl Breakpoint {
    /// An unconditional execution breakpoint.
    #[must_use]
    pub const fn exec(addr: u16) -> Self {
        Self::Exec {
            addr,
            after_clocks: None,
        }
    }

    /// An execution breakpoint that only fires once the clock passes `clocks`.
    #[must_use]
    pub const fn exec_after(addr: u16, clocks: u64) -> Self {
        Self::Exec {
            addr,
            after_clocks: Some(clocks),
        }
    }

    /// A read breakpoint.
    #[must_use]
    pub const fn read(addr: u16) -> Self {
        Self::Access {
            addr,
            access: Access::Read,
        }
    }

    /// A write breakpoint.
    #[must_use]
    pub const fn write(addr: u16) -> Self {
        Self::Access {
            addr,
            access: Access::Write,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec {
                addr,
                after_clocks: None,
            } => write!(f, "{addr:x}"),
            Self::Exec {
                addr,
                after_clocks: Some(clocks),
            } => write!(f, "{addr:x}/TOTALCLKS>${clocks:x}"),
            Self::Access {
                addr,
                access: Access::Read,
            } => write!(f, "{addr:x}//r"),
            Self::Access {
                addr,
                access: Access::Write,
            } => write!(f, "{addr:x}//w"),
        }
    }
}

/// One emulator invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    /// State to start from.
    pub snapshot: &'a Snapshot,
    /// Any of these pauses emulation.
    pub breakpoints: &'a [Breakpoint],
    /// Input to replay instead of live input.
    pub demo: Option<&'a Demo>,
    /// Record this run as the given clip number.
    pub clip: Option<u32>,
}

impl<'a> RunRequest<'a> {
    /// A run without input script or recording.
    #[must_use]
    pub fn new(snapshot: &'a Snapshot, breakpoints: &'a [Breakpoint]) -> Self {
        Self {
            snapshot,
            breakpoints,
            demo: None,
            clip: None,
        }
    }

    /// Replay `demo` during the run.
    #[must_use]
    pub fn with_demo(mut self, demo: &'a Demo) -> Self {
        self.demo = Some(demo);
        self
    }

    /// Record the run as clip `index`.
    #[must_use]
    pub fn with_clip(mut self, index: u32) -> Self {
        self.clip = Some(index);
        self
    }
}

/// An emulation step failed. Always fatal to the battle.
#[derive(Debug, Error)]
pub enum EmulationError {
    /// Writing the inputs or reading the output state failed.
    #[error("emulation step failed: {context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The emulator process could not be started.
    #[error("emulation step failed: could not start {}: {source}", .program.display())]
    Spawn {
        /// Executable path.
        program: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The emulator exited unsuccessfully.
    #[error("emulation step failed: emulator exited with {status}")]
    Exit {
        /// Exit status description.
        status: String,
    },
    /// The emulator exited without writing a state.
    #[error("emulation step failed: no state written to {}", .path.display())]
    MissingOutput {
        /// Expected output path.
        path: PathBuf,
    },
    /// The state it wrote is not a usable snapshot.
    #[error("emulation step failed: bad output state: {0}")]
    BadOutput(#[from] crate::error::LayoutError),
    /// A scripted emulator ran out of canned states.
    #[error("emulation step failed: script exhausted after {0} runs")]
    ScriptExhausted(usize),
}

/// Runs the game from a state until a breakpoint fires.
pub trait Emulator {
    /// Execute `request` and return the state at the pause.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] on any failure; callers do not retry.
    fn run(&mut self, request: RunRequest<'_>) -> Result<Snapshot, EmulationError>;
}

impl<E: Emulator + ?Sized> Emulator for &mut E {
    fn run(&mut self, request: RunRequest<'_>) -> Result<Snapshot, EmulationError> {
        (**self).run(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoint_syntax() {
        assert_eq!(Breakpoint::exec(0x4349).to_string(), "4349");
        assert_eq!(
            Breakpoint::exec_after(0x4EB6, 0x1A2B).to_string(),
            "4eb6/TOTALCLKS>$1a2b"
        );
        assert_eq!(Breakpoint::read(0xCF05).to_string(), "cf05//r");
        assert_eq!(Breakpoint::write(0xDA44).to_string(), "da44//w");
    }

    #[test]
    fn test_request_builder() {
        let snap = Snapshot::blank();
        let demo = Demo::default();
        let bps = [Breakpoint::exec(1)];
        let req = RunRequest::new(&snap, &bps).with_demo(&demo).with_clip(4);
        assert!(req.demo.is_some());
        assert_eq!(req.clip, Some(4));
        assert_eq!(req.breakpoints.len(), 1);
    }
}
