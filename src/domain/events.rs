//! Build progress events.
//!
//! The pipeline reports what it is doing through a broadcast channel instead
//! of printing. Whoever drives the build (the CLI, a test) subscribes and
//! decides how to render them.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Pipeline stage, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preflight,
    Ratings,
    Movies,
    People,
    Links,
    Closure,
    Load,
    Index,
    Verify,
}

impl Stage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Ratings => "ratings",
            Self::Movies => "movies",
            Self::People => "people",
            Self::Links => "links",
            Self::Closure => "closure",
            Self::Load => "load",
            Self::Index => "index",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum BuildEvent {
    StageStarted {
        stage: Stage,
    },
    StageProgress {
        stage: Stage,
        rows: u64,
    },
    StageFinished {
        stage: Stage,
        kept: u64,
        skipped: u64,
    },
    TableLoaded {
        table: &'static str,
        rows: u64,
    },
    ArtifactReady {
        path: PathBuf,
        size_bytes: u64,
    },
    VerificationFailed {
        message: String,
    },
}

/// Sending half handed to every stage.
///
/// Sends never fail the build: with no subscriber the event is dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BuildEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BuildEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: BuildEvent) {
        let _ = self.tx.send(event);
    }

    pub fn started(&self, stage: Stage) {
        self.emit(BuildEvent::StageStarted { stage });
    }

    pub fn progress(&self, stage: Stage, rows: u64) {
        self.emit(BuildEvent::StageProgress { stage, rows });
    }

    pub fn finished(&self, stage: Stage, kept: u64, skipped: u64) {
        self.emit(BuildEvent::StageFinished {
            stage,
            kept,
            skipped,
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
