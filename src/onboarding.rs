// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-local storage for the "onboarding shown" flag.
//!
//! The store is a small JSON object of string keys to string values. It is
//! read once at startup and written at most once, when onboarding finishes.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Storage key of the onboarding flag.
pub const ONBOARDING_KEY: &str = "taskbot_onboarding_complete";

/// What to show once the user is identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupScreen {
    /// First visit: walk through the intro slides.
    Onboarding,
    /// Returning user: show the quote of the day.
    DailyInspiration,
}

/// Persisted onboarding state.
#[derive(Debug)]
pub struct OnboardingStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl OnboardingStore {
    /// Read the storage file. A missing file means nothing was stored yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                AppError::Storage(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(AppError::Storage(format!("{}: {}", path.display(), e))),
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_complete(&self) -> bool {
        self.entries.get(ONBOARDING_KEY).map(String::as_str) == Some("true")
    }

    pub fn startup_screen(&self) -> StartupScreen {
        if self.is_complete() {
            StartupScreen::DailyInspiration
        } else {
            StartupScreen::Onboarding
        }
    }

    /// Record that onboarding was shown. Writes only on the first call.
    pub fn mark_complete(&mut self) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        self.entries
            .insert(ONBOARDING_KEY.to_string(), "true".to_string());
        let data = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| AppError::Storage(e.to_string()))?;
        atomic_write(&self.path, &data)?;

        tracing::info!(path = %self.path.display(), "Onboarding marked complete");
        Ok(())
    }
}

/// Write via a temp file in the same directory, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let storage_err = |e: std::io::Error| AppError::Storage(format!("{}: {}", path.display(), e));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(storage_err)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(storage_err)?;
    temp_file.write_all(data).map_err(storage_err)?;
    temp_file.flush().map_err(storage_err)?;
    temp_file.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}
