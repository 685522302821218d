//! Loading session definitions and participant submissions.
//!
//! Sessions are read from a single JSON document. Submissions come from a
//! [`SubmissionSource`]; the file-backed source accepts either one JSON file
//! or a directory of exported submission documents.

use crate::models::{Session, Submission};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Read and validate a session definition.
pub fn load_session(path: &Path) -> Result<Session> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file: {}", path.display()))?;

    let session: Session = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse session file: {}", path.display()))?;

    session
        .validate()
        .with_context(|| format!("Invalid session definition: {}", path.display()))?;

    debug!(
        "Loaded session '{}' with {} cards and {} categories",
        session.id,
        session.cards.len(),
        session.categories.len()
    );

    Ok(session)
}

/// Supplies the submissions recorded for a session.
pub trait SubmissionSource {
    /// Returns a snapshot of all submissions for `session_id`.
    fn load(&self, session_id: &str) -> Result<Vec<Submission>>;
}

/// Submissions stored as JSON on disk.
#[derive(Debug, Clone)]
pub struct FileSubmissionSource {
    path: PathBuf,
    show_progress: bool,
}

/// A document holding either a list of submissions or just one.
#[derive(Deserialize)]
#[serde(untagged)]
enum SubmissionDocument {
    Many(Vec<Submission>),
    One(Submission),
}

impl SubmissionDocument {
    fn into_vec(self) -> Vec<Submission> {
        match self {
            SubmissionDocument::Many(submissions) => submissions,
            SubmissionDocument::One(submission) => vec![submission],
        }
    }
}

impl FileSubmissionSource {
    /// Create a source reading from a file or directory.
    pub fn new(path: PathBuf, show_progress: bool) -> Self {
        Self {
            path,
            show_progress,
        }
    }

    /// Read every `.json` file below the directory, in path order.
    ///
    /// Files that cannot be read or parsed are skipped with a warning.
    fn load_dir(&self) -> Result<Vec<Submission>> {
        let files: Vec<PathBuf> = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Failed to walk submissions directory: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_json(path))
            .collect();

        info!(
            "Reading {} submission files from {}",
            files.len(),
            self.path.display()
        );

        let pb = if self.show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let mut submissions = Vec::new();
        for file in &files {
            match read_submission_file(file) {
                Ok(mut found) => submissions.append(&mut found),
                Err(e) => warn!("Skipping {}: {:#}", file.display(), e),
            }
            if let Some(ref pb) = pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        Ok(submissions)
    }
}

impl SubmissionSource for FileSubmissionSource {
    fn load(&self, session_id: &str) -> Result<Vec<Submission>> {
        if !self.path.exists() {
            return Err(anyhow::anyhow!(
                "Submissions path not found: {}",
                self.path.display()
            ));
        }

        let submissions = if self.path.is_dir() {
            self.load_dir()?
        } else {
            read_submission_file(&self.path)?
        };

        let total = submissions.len();
        let matching: Vec<Submission> = submissions
            .into_iter()
            .filter(|s| belongs_to(s, session_id))
            .collect();

        if matching.len() < total {
            debug!(
                "Ignored {} submissions recorded for other sessions",
                total - matching.len()
            );
        }

        Ok(matching)
    }
}

/// Parse one file holding a submission or a list of them.
pub fn read_submission_file(path: &Path) -> Result<Vec<Submission>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read submissions file: {}", path.display()))?;

    let document: SubmissionDocument = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse submissions file: {}", path.display()))?;

    Ok(document.into_vec())
}

/// Untagged submissions (empty session id) are attributed to the requested session.
fn belongs_to(submission: &Submission, session_id: &str) -> bool {
    submission.session_id.is_empty() || submission.session_id == session_id
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
