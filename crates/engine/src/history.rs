//! Snapshot-based undo/redo over the whole project list.
//!
//! Every history entry is a self-contained, zstd-compressed JSON encoding of
//! the full project list plus the active project id. Restoring replaces the
//! live value wholesale.
//!
//! # Invariants
//!
//! 1. `past_bytes` always equals the sum of `size` over the past stack.
//! 2. `past.len() <= config.max_depth` after any push.
//! 3. `past_bytes <= config.max_bytes` after any push, unless a single entry
//!    alone exceeds the budget (then exactly that entry remains).
//! 4. Recording a new action clears the future stack.
//! 5. A failed undo/redo leaves both stacks and the caller's state untouched.

use std::collections::VecDeque;
use std::fmt;
use std::io::{Read, Write};

use promptmania_core::{Project, ProjectId};

use crate::error::EngineError;

pub const DEFAULT_MAX_DEPTH: usize = 300;
pub const DEFAULT_MAX_BYTES: usize = 2_000_000;

const COMPRESSION_LEVEL: i32 = 3;

/// Bounds for the past stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of undo entries.
    pub max_depth: usize,
    /// Maximum cumulative compressed size of undo entries (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn new(max_depth: usize, max_bytes: usize) -> Self {
        Self {
            max_depth,
            max_bytes,
        }
    }
}

/// One undo/redo unit.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub data: Vec<u8>,
    pub active: Option<ProjectId>,
    /// Compressed length of `data` in bytes.
    pub size: usize,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("active", &self.active)
            .field("size", &self.size)
            .finish()
    }
}

/// The project list and active id recovered from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub projects: Vec<Project>,
    pub active: Option<ProjectId>,
}

fn compression_error(e: std::io::Error) -> EngineError {
    EngineError::Compression(e.to_string())
}

/// Serialize the project list to JSON and compress it.
pub fn compress_projects(
    projects: &[Project],
    active: Option<&ProjectId>,
) -> Result<Snapshot, EngineError> {
    let raw = serde_json::to_vec(projects)?;
    let mut encoder =
        zstd::Encoder::new(Vec::new(), COMPRESSION_LEVEL).map_err(compression_error)?;
    encoder.write_all(&raw).map_err(compression_error)?;
    let data = encoder.finish().map_err(compression_error)?;

    tracing::debug!(
        projects = projects.len(),
        raw_bytes = raw.len(),
        compressed_bytes = data.len(),
        "compressed history snapshot"
    );

    Ok(Snapshot {
        size: data.len(),
        data,
        active: active.cloned(),
    })
}

/// Inverse of [`compress_projects`].
pub fn decompress_projects(data: &[u8]) -> Result<Vec<Project>, EngineError> {
    let mut decoder = zstd::Decoder::new(data).map_err(compression_error)?;
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw).map_err(compression_error)?;
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&raw)?)
}

/// Decode `entry` and snapshot the current state. Nothing is mutated, so a
/// failure here leaves the history as it was.
fn exchange(
    entry: &Snapshot,
    projects: &[Project],
    active: Option<&ProjectId>,
) -> Result<(Restored, Snapshot), EngineError> {
    let restored = Restored {
        projects: decompress_projects(&entry.data)?,
        active: entry.active.clone(),
    };
    let current = compress_projects(projects, active)?;
    Ok((restored, current))
}

/// Bounded past/future stacks of compressed snapshots.
pub struct History {
    /// Entries available for undo (newest at back).
    past: VecDeque<Snapshot>,
    /// Entries available for redo (newest at back).
    future: VecDeque<Snapshot>,
    config: HistoryConfig,
    past_bytes: usize,
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.past.len())
            .field("redo_depth", &self.future.len())
            .field("past_bytes", &self.past_bytes)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl History {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            config,
            past_bytes: 0,
        }
    }

    /// Snapshot the pre-mutation state for a new action.
    ///
    /// Never fails to the caller: a compression error is logged and the
    /// history is left unchanged. Returns whether an entry was recorded.
    pub fn push(&mut self, projects: &[Project], active: Option<&ProjectId>) -> bool {
        match compress_projects(projects, active) {
            Ok(snapshot) => {
                self.push_snapshot(snapshot);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "history snapshot failed");
                false
            }
        }
    }

    /// Record an already-built snapshot as a new action.
    pub fn push_snapshot(&mut self, snapshot: Snapshot) {
        self.push_past(snapshot);
        self.future.clear();
    }

    /// Step back: returns the state to restore, or `None` when there is
    /// nothing to undo. The current state moves onto the future stack.
    pub fn undo(
        &mut self,
        projects: &[Project],
        active: Option<&ProjectId>,
    ) -> Result<Option<Restored>, EngineError> {
        let Some(entry) = self.past.back() else {
            return Ok(None);
        };
        let (restored, current) = exchange(entry, projects, active)?;
        if let Some(entry) = self.past.pop_back() {
            self.past_bytes = self.past_bytes.saturating_sub(entry.size);
        }
        self.future.push_back(current);
        Ok(Some(restored))
    }

    /// Step forward: symmetric to [`undo`](Self::undo).
    pub fn redo(
        &mut self,
        projects: &[Project],
        active: Option<&ProjectId>,
    ) -> Result<Option<Restored>, EngineError> {
        let Some(entry) = self.future.back() else {
            return Ok(None);
        };
        let (restored, current) = exchange(entry, projects, active)?;
        self.future.pop_back();
        self.push_past(current);
        Ok(Some(restored))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Cumulative compressed size of the past stack.
    #[must_use]
    pub fn past_bytes(&self) -> usize {
        self.past_bytes
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Past entries, oldest first.
    pub fn past(&self) -> impl Iterator<Item = &Snapshot> {
        self.past.iter()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.past_bytes = 0;
    }

    fn push_past(&mut self, snapshot: Snapshot) {
        self.past_bytes += snapshot.size;
        self.past.push_back(snapshot);
        self.enforce_limits();
    }

    /// Evict oldest entries until both bounds hold. The size budget never
    /// evicts the last remaining entry.
    fn enforce_limits(&mut self) {
        if self.config.max_bytes > 0 {
            while self.past_bytes > self.config.max_bytes && self.past.len() > 1 {
                self.evict_oldest();
            }
        }
        while self.past.len() > self.config.max_depth {
            self.evict_oldest();
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(entry) = self.past.pop_front() {
            self.past_bytes = self.past_bytes.saturating_sub(entry.size);
        }
    }
}
