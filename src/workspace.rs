//! Per-run working directories.
//!
//! bgb reads and writes plain files, so every battle gets its own directory
//! under the configured base, named after the run id:
//!
//! ```text
//! <base>/<run id>/
//!     <rom file>          copy of the ROM bgb resolves the state against
//!     battlestate.sn1     state handed to bgb
//!     outstate.sn1        state bgb writes on exit
//!     outdemo.dem         input script
//!     movies/movieNNNNN.* recorded clips (only when recording)
//! ```

use crate::emulator::{BgbPaths, Recording};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// State handed to bgb.
pub const STATE_FILE: &str = "battlestate.sn1";
/// State bgb writes on exit.
pub const OUTPUT_FILE: &str = "outstate.sn1";
/// Input script.
pub const DEMO_FILE: &str = "outdemo.dem";
/// Clip directory.
pub const MOVIE_DIR: &str = "movies";

/// Errors managing a working directory.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A directory could not be created.
    #[error("failed to create {}: {source}", .path.display())]
    Create {
        /// Directory path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The ROM could not be copied in.
    #[error("failed to copy ROM {} to {}: {source}", .from.display(), .to.display())]
    CopyRom {
        /// Configured ROM.
        from: PathBuf,
        /// Destination in the working directory.
        to: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The directory could not be removed.
    #[error("failed to remove {}: {source}", .path.display())]
    Remove {
        /// Directory path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

/// A fresh random run id.
#[must_use]
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// One battle's working directory.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    run_id: String,
    rom: PathBuf,
    movies: Option<PathBuf>,
}

impl Workspace {
    /// Create `<base>/<run_id>`, copy `rom` into it and, if `with_movies`,
    /// create the clip directory.
    ///
    /// # Errors
    ///
    /// Returns a [`WorkspaceError`] if a directory cannot be created, the
    /// clip directory already exists, or the ROM cannot be copied.
    pub fn create(base: &Path, run_id: &str, rom: &Path, with_movies: bool) -> Result<Self, WorkspaceError> {
        let root = base.join(run_id);
        fs::create_dir_all(&root).map_err(|source| WorkspaceError::Create {
            path: root.clone(),
            source,
        })?;

        let rom_copy = root.join(rom.file_name().unwrap_or(rom.as_os_str()));
        fs::copy(rom, &rom_copy).map_err(|source| WorkspaceError::CopyRom {
            from: rom.to_path_buf(),
            to: rom_copy.clone(),
            source,
        })?;

        let movies = if with_movies {
            let dir = root.join(MOVIE_DIR);
            fs::create_dir(&dir).map_err(|source| WorkspaceError::Create {
                path: dir.clone(),
                source,
            })?;
            Some(dir)
        } else {
            None
        };

        log::debug!("working in {}", root.display());
        Ok(Self {
            root,
            run_id: run_id.to_string(),
            rom: rom_copy,
            movies,
        })
    }

    /// Directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run id the directory is named after.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The ROM copy.
    #[must_use]
    pub fn rom(&self) -> &Path {
        &self.rom
    }

    /// Clip directory, when recording.
    #[must_use]
    pub fn movie_dir(&self) -> Option<&Path> {
        self.movies.as_deref()
    }

    /// Files exchanged with bgb.
    #[must_use]
    pub fn bgb_paths(&self) -> BgbPaths {
        BgbPaths {
            state: self.root.join(STATE_FILE),
            output: self.root.join(OUTPUT_FILE),
            demo: self.root.join(DEMO_FILE),
        }
    }

    /// Capture settings, when recording.
    #[must_use]
    pub fn recording(&self, lossless: bool) -> Option<Recording> {
        self.movies.as_ref().map(|dir| Recording {
            dir: dir.clone(),
            lossless,
        })
    }

    /// Delete the directory and everything left in it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Remove`] if deletion fails.
    pub fn remove(self) -> Result<(), WorkspaceError> {
        fs::remove_dir_all(&self.root).map_err(|source| WorkspaceError::Remove {
            path: self.root.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rom(dir: &Path) -> PathBuf {
        let path = dir.join("red.gb");
        fs::write(&path, [0xC3, 0x50, 0x01]).unwrap();
        path
    }

    #[test]
    fn test_create_layout() {
        let dir = tempfile::tempdir().unwrap();
        let rom = rom(dir.path());
        let base = dir.path().join("scratch");

        let ws = Workspace::create(&base, "run-1", &rom, true).unwrap();
        assert_eq!(ws.root(), base.join("run-1"));
        assert_eq!(fs::read(ws.rom()).unwrap(), vec![0xC3, 0x50, 0x01]);
        assert!(ws.movie_dir().unwrap().is_dir());

        let paths = ws.bgb_paths();
        assert_eq!(paths.state, base.join("run-1").join(STATE_FILE));
        assert_eq!(paths.demo.file_name().unwrap(), DEMO_FILE);

        let recording = ws.recording(false).unwrap();
        assert!(!recording.lossless);
        assert_eq!(recording.dir, base.join("run-1").join(MOVIE_DIR));
    }

    #[test]
    fn test_without_movies() {
        let dir = tempfile::tempdir().unwrap();
        let rom = rom(dir.path());
        let ws = Workspace::create(dir.path(), "quiet", &rom, false).unwrap();
        assert!(ws.movie_dir().is_none());
        assert!(ws.recording(true).is_none());
        assert!(!ws.root().join(MOVIE_DIR).exists());
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let rom = rom(dir.path());
        let ws = Workspace::create(dir.path(), "gone", &rom, true).unwrap();
        fs::write(ws.bgb_paths().output, b"state").unwrap();
        let root = ws.root().to_path_buf();
        ws.remove().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_missing_rom() {
        let dir = tempfile::tempdir().unwrap();
        let err = Workspace::create(dir.path(), "r", &dir.path().join("none.gb"), false).unwrap_err();
        assert!(matches!(err, WorkspaceError::CopyRom { .. }));
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(new_run_id(), new_run_id());
    }
}
