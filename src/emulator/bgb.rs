//! bgb command-line adapter.

use super::{Breakpoint, EmulationError, Emulator, RunRequest};
use crate::memory::Snapshot;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Flags passed on every invocation: hide the window, no warnings, no
/// battery save.
const BASE_FLAGS: [&str; 3] = ["-hf", "-nowarn", "-nobatt"];

/// Working files exchanged with bgb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgbPaths {
    /// State bgb starts from.
    pub state: PathBuf,
    /// State bgb writes on exit.
    pub output: PathBuf,
    /// Demo file bgb replays.
    pub demo: PathBuf,
}

/// AVI/WAV capture settings for recorded runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    /// Directory the clips go to.
    pub dir: PathBuf,
    /// Lossless (cscd) instead of X264 capture.
    pub lossless: bool,
}

impl Recording {
    /// File prefix of clip `index`; bgb appends the extensions.
    #[must_use]
    pub fn prefix(&self, index: u32) -> PathBuf {
        self.dir.join(format!("movie{index:05}"))
    }

    fn settings(&self, index: u32) -> Vec<String> {
        let four_cc = if self.lossless { "cscd" } else { "X264" };
        vec![
            "RecordAVI=1".to_string(),
            "WavFileOut=1".to_string(),
            format!("RecordAVIfourCC={four_cc}"),
            "RecordHalfSpeed=1".to_string(),
            format!("RecordPrefix={}", self.prefix(index).display()),
        ]
    }
}

/// Runs the bgb executable once per request.
#[derive(Debug, Clone)]
pub struct Bgb {
    program: PathBuf,
    paths: BgbPaths,
    recording: Option<Recording>,
}

impl Bgb {
    /// Create an adapter for the executable at `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, paths: BgbPaths) -> Self {
        Self {
            program: program.into(),
            paths,
            recording: None,
        }
    }

    /// Capture runs that carry a clip number.
    #[must_use]
    pub fn with_recording(mut self, recording: Recording) -> Self {
        self.recording = Some(recording);
        self
    }

    /// Command-line arguments for `request`.
    #[must_use]
    pub fn args(&self, request: &RunRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-rom".into(), self.paths.state.clone().into()];
        args.extend(BASE_FLAGS.iter().map(OsString::from));

        if let (Some(recording), Some(index)) = (&self.recording, request.clip) {
            for setting in recording.settings(index) {
                args.push("-set".into());
                args.push(setting.into());
            }
        }

        let exec = join(
            request
                .breakpoints
                .iter()
                .filter(|b| matches!(b, Breakpoint::Exec { .. })),
        );
        if !exec.is_empty() {
            args.push("-br".into());
            args.push(exec.into());
        }

        let access = join(
            request
                .breakpoints
                .iter()
                .filter(|b| matches!(b, Breakpoint::Access { .. })),
        );
        if !access.is_empty() {
            args.push("-ab".into());
            args.push(access.into());
        }

        if request.demo.is_some() {
            args.push("-demoplay".into());
            args.push(self.paths.demo.clone().into());
        }

        args.push("-stateonexit".into());
        args.push(self.paths.output.clone().into());
        args
    }
}

fn join<'a>(breakpoints: impl Iterator<Item = &'a Breakpoint>) -> String {
    breakpoints
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn io_context(context: &str, path: &Path) -> impl FnOnce(io::Error) -> EmulationError {
    let context = format!("{context} {}", path.display());
    move |source| EmulationError::Io { context, source }
}

impl Emulator for Bgb {
    fn run(&mut self, request: RunRequest<'_>) -> Result<Snapshot, EmulationError> {
        request
            .snapshot
            .save(&self.paths.state)
            .map_err(io_context("writing state", &self.paths.state))?;
        if let Some(demo) = request.demo {
            demo.save(&self.paths.demo)
                .map_err(io_context("writing demo", &self.paths.demo))?;
        }

        // A stale output would hide a run that never wrote one
        if self.paths.output != self.paths.state {
            match fs::remove_file(&self.paths.output) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_context("removing", &self.paths.output)(e)),
            }
        }

        let args = self.args(&request);
        log::debug!("{} {:?}", self.program.display(), args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|source| EmulationError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(EmulationError::Exit {
                status: status.to_string(),
            });
        }

        let bytes = match fs::read(&self.paths.output) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(EmulationError::MissingOutput {
                    path: self.paths.output.clone(),
                });
            }
            Err(e) => return Err(io_context("reading state", &self.paths.output)(e)),
        };
        Ok(Snapshot::from_bytes(bytes)?)
    }
}
