//! conveyor-cli
//!
//! Demo driver for `conveyor-core`: seed a queue from a JSON file, then walk
//! the full operation set (enqueue, by-id lookup/update/cancel, reposition,
//! ordered drain).

use std::env;
use std::fs;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use conveyor_core::{TaskId, TaskQueue};

/// Demo payload. The queue never looks inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Task {
    title: String,
    submitted_at: DateTime<Utc>,
}

impl Task {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("seed file is not a valid id -> task JSON object: {0}")]
    Seed(#[from] serde_json::Error),
}

/// Load a seed mapping from a JSON object file (`{"id": {..task..}, ...}`).
///
/// IndexMap は挿入順（= ファイルに書かれた順）で iterate するので、
/// seed ファイルの並びがそのまま初期のキュー順になる。
fn load_seed(path: &str) -> Result<IndexMap<TaskId, Task>, CliError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_target(false).init();

    // (A) seed ファイルがあれば、その並び順でキューを初期化
    let mut queue = match env::args().nth(1) {
        Some(path) => {
            let seed = load_seed(&path)?;
            info!(path = %path, tasks = seed.len(), "seeded queue from file");
            TaskQueue::with_tasks(seed)
        }
        None => TaskQueue::new(),
    };

    // (B) 採番した id でタスクを投入
    let build = TaskId::generate();
    queue.enqueue(build.clone(), Task::new("build artifacts"));
    let lint = TaskId::generate();
    queue.enqueue(lint.clone(), Task::new("run lints"));
    let deploy = TaskId::generate();
    queue.enqueue(deploy.clone(), Task::new("deploy to staging"));
    info!(size = queue.len(), "queue loaded");

    // (C) by-id の操作: 参照 / 差し替え / 末尾への再投入 / キャンセル
    if let Some(task) = queue.get(&build) {
        info!(id = %build, title = %task.title, "lookup");
    }
    queue.update(&lint, Task::new("run lints (strict)"));
    queue.enqueue(build.clone(), Task::new("build artifacts (rebuilt)"));
    let cancelled = queue.remove(&deploy);
    info!(id = %deploy, cancelled, "cancel requested");

    // (D) 先頭（最も古いタスク）から順に処理
    if let Some(next) = queue.peek() {
        info!(title = %next.title, "next up");
    }
    while let Some((id, task)) = queue.dequeue_entry() {
        info!(id = %id, title = %task.title, submitted_at = %task.submitted_at, "processing");
    }
    info!(size = queue.len(), "drained");

    Ok(())
}
