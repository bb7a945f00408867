//! Movie assembly from recorded clips.
//!
//! bgb writes one AVI/WAV pair per recorded run. Once the battle is over the
//! pairs are concatenated in clip order with ffmpeg, the video slowed to
//! match the half-speed capture, and the clips are deleted.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Extension of recorded video clips.
pub const VIDEO_EXTENSION: &str = "avi";
/// Extension of recorded audio clips.
pub const AUDIO_EXTENSION: &str = "wav";

/// ffmpeg settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieConfig {
    /// ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// Output frame rate.
    pub frame_rate: u32,
    /// Factor applied to video timestamps, as an ffmpeg expression.
    pub time_stretch: String,
    /// Audio bitrate in bits per second.
    pub audio_bitrate: u32,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for MovieConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            frame_rate: 30,
            time_stretch: "5/3".to_string(),
            audio_bitrate: 64_000,
            sample_rate: 16_000,
        }
    }
}

/// Errors assembling a movie.
#[derive(Debug, Error)]
pub enum MovieError {
    /// Listing, creating or deleting files failed.
    #[error("{context} {}: {source}", .path.display())]
    Io {
        /// What was being done.
        context: &'static str,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The clip directory holds nothing to assemble.
    #[error("no clips in {}", .0.display())]
    NoClips(PathBuf),
    /// Video and audio clip counts differ.
    #[error("{videos} video clips but {audios} audio clips")]
    Unpaired {
        /// Number of video clips.
        videos: usize,
        /// Number of audio clips.
        audios: usize,
    },
    /// ffmpeg could not be started.
    #[error("could not start {}: {source}", .program.display())]
    Spawn {
        /// Executable path.
        program: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// ffmpeg exited unsuccessfully.
    #[error("ffmpeg exited with {0}")]
    Exit(String),
}

/// One recorded run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// Video track.
    pub video: PathBuf,
    /// Audio track.
    pub audio: PathBuf,
}

/// Final movie location for `run_id`.
#[must_use]
pub fn output_path(output_dir: &Path, run_id: &str) -> PathBuf {
    output_dir.join(format!("{run_id}.mp4"))
}

/// Pair up the clips in `dir`, in file-name order.
///
/// # Errors
///
/// Returns a [`MovieError`] if the directory cannot be listed or the video
/// and audio counts differ.
pub fn collect_clips(dir: &Path) -> Result<Vec<Clip>, MovieError> {
    let entries = fs::read_dir(dir).map_err(|source| MovieError::Io {
        context: "failed to list",
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MovieError::Io {
            context: "failed to list",
            path: dir.to_path_buf(),
            source,
        })?;
        files.push(entry.path());
    }
    files.sort();

    let with_extension = |ext: &str| -> Vec<PathBuf> {
        files
            .iter()
            .filter(|path| path.extension().is_some_and(|e| e == ext))
            .cloned()
            .collect()
    };
    let videos = with_extension(VIDEO_EXTENSION);
    let audios = with_extension(AUDIO_EXTENSION);
    if videos.len() != audios.len() {
        return Err(MovieError::Unpaired {
            videos: videos.len(),
            audios: audios.len(),
        });
    }

    Ok(videos
        .into_iter()
        .zip(audios)
        .map(|(video, audio)| Clip { video, audio })
        .collect())
}

/// ffmpeg arguments concatenating `clips` into `output`.
#[must_use]
pub fn ffmpeg_args(clips: &[Clip], output: &Path, config: &MovieConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into()];
    for clip in clips {
        args.push("-i".into());
        args.push(clip.video.clone().into());
        args.push("-i".into());
        args.push(clip.audio.clone().into());
    }

    let mut filter = String::new();
    for i in 0..clips.len() {
        filter.push_str(&format!(
            "[{}:v]setpts={}*PTS[v{i}];",
            2 * i,
            config.time_stretch
        ));
    }
    for i in 0..clips.len() {
        filter.push_str(&format!("[v{i}][{}:a]", 2 * i + 1));
    }
    filter.push_str(&format!("concat=n={}:v=1:a=1[outv][outa]", clips.len()));

    args.extend(
        [
            "-filter_complex".to_string(),
            filter,
            "-map".to_string(),
            "[outv]".to_string(),
            "-map".to_string(),
            "[outa]".to_string(),
            "-r".to_string(),
            config.frame_rate.to_string(),
            "-b:a".to_string(),
            config.audio_bitrate.to_string(),
            "-ar".to_string(),
            config.sample_rate.to_string(),
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

/// Concatenate the clips in `clip_dir` into `output`, then delete them and
/// the directory.
///
/// # Errors
///
/// Returns a [`MovieError`] if there are no clips, ffmpeg fails, or a file
/// operation fails.
pub fn assemble(clip_dir: &Path, output: &Path, config: &MovieConfig) -> Result<(), MovieError> {
    let clips = collect_clips(clip_dir)?;
    if clips.is_empty() {
        return Err(MovieError::NoClips(clip_dir.to_path_buf()));
    }
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|source| MovieError::Io {
            context: "failed to create",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let args = ffmpeg_args(&clips, output, config);
    log::info!("assembling {} clips into {}", clips.len(), output.display());
    log::debug!("{} {:?}", config.ffmpeg.display(), args);
    let status = Command::new(&config.ffmpeg)
        .args(&args)
        .status()
        .map_err(|source| MovieError::Spawn {
            program: config.ffmpeg.clone(),
            source,
        })?;
    if !status.success() {
        return Err(MovieError::Exit(status.to_string()));
    }

    fs::remove_dir_all(clip_dir).map_err(|source| MovieError::Io {
        context: "failed to remove",
        path: clip_dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_collect_pairs_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["movie00001.avi", "movie00000.wav", "movie00000.avi", "movie00001.wav"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let clips = collect_clips(dir.path()).unwrap();
        assert_eq!(clips.len(), 2);
        assert!(clips[0].video.ends_with("movie00000.avi"));
        assert!(clips[0].audio.ends_with("movie00000.wav"));
        assert!(clips[1].video.ends_with("movie00001.avi"));
    }

    #[test]
    fn test_unpaired_clips() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("movie00000.avi"), b"").unwrap();
        assert!(matches!(
            collect_clips(dir.path()),
            Err(MovieError::Unpaired {
                videos: 1,
                audios: 0
            })
        ));
    }

    #[test]
    fn test_ffmpeg_args() {
        let clips = vec![
            Clip {
                video: PathBuf::from("m/movie00000.avi"),
                audio: PathBuf::from("m/movie00000.wav"),
            },
            Clip {
                video: PathBuf::from("m/movie00001.avi"),
                audio: PathBuf::from("m/movie00001.wav"),
            },
        ];
        let args = strings(&ffmpeg_args(&clips, Path::new("out/run.mp4"), &MovieConfig::default()));
        assert_eq!(&args[..5], ["-y", "-i", "m/movie00000.avi", "-i", "m/movie00000.wav"]);
        let filter = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];
        assert_eq!(
            filter,
            "[0:v]setpts=5/3*PTS[v0];[2:v]setpts=5/3*PTS[v1];[v0][1:a][v1][3:a]concat=n=2:v=1:a=1[outv][outa]"
        );
        assert!(args.windows(2).any(|w| w == ["-r", "30"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "64000"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "16000"]));
        assert_eq!(args.last().unwrap(), "out/run.mp4");
    }

    #[test]
    fn test_assemble_without_clips() {
        let dir = tempfile::tempdir().unwrap();
        let err = assemble(dir.path(), &dir.path().join("x.mp4"), &MovieConfig::default()).unwrap_err();
        assert!(matches!(err, MovieError::NoClips(_)));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out"), "abc"),
            PathBuf::from("out").join("abc.mp4")
        );
    }
}
