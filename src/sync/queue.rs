use crossbeam_channel::{Receiver, Sender, unbounded};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Work item for the override synchronizer.
pub enum SyncTask {
    /// Recompute and write overrides for one canvas.
    Apply(String),
    /// Recompute and write overrides for every canvas.
    ApplyAll,
    /// Erase overrides on every canvas.
    ClearAll,
}

/// Cloneable producer half of a [`TaskQueue`]; safe to move into host callbacks.
#[derive(Clone, Debug)]
pub struct TaskSender {
    tx: Sender<SyncTask>,
}

impl TaskSender {
    /// Enqueue a task. Never blocks.
    pub fn push(&self, task: SyncTask) {
        // The receiver lives as long as the engine; a closed queue means teardown.
        if self.tx.send(task).is_err() {
            tracing::debug!("task queue closed; dropping synchronizer task");
        }
    }
}

/// Single-consumer queue of synchronizer work, drained on the host's UI context.
#[derive(Debug)]
pub struct TaskQueue {
    tx: Sender<SyncTask>,
    rx: Receiver<SyncTask>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Producer handle.
    pub fn sender(&self) -> TaskSender {
        TaskSender {
            tx: self.tx.clone(),
        }
    }

    /// Enqueue a task.
    pub fn push(&self, task: SyncTask) {
        self.sender().push(task);
    }

    /// Number of tasks waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// `true` when nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Take every pending task, coalesced.
    pub fn drain(&self) -> Vec<SyncTask> {
        coalesce(self.rx.try_iter())
    }
}

/// Collapse a burst of tasks into the minimal equivalent sequence.
///
/// Every task of one drain runs against the same table state, so only the position relative to
/// `ClearAll` matters: a `ClearAll` discards everything queued before it, an `ApplyAll` subsumes
/// earlier and later single-canvas applies, and duplicate applies collapse.
pub fn coalesce(tasks: impl IntoIterator<Item = SyncTask>) -> Vec<SyncTask> {
    let mut out: Vec<SyncTask> = Vec::new();
    for task in tasks {
        match task {
            SyncTask::ClearAll => {
                out.clear();
                out.push(SyncTask::ClearAll);
            }
            SyncTask::ApplyAll => {
                out.retain(|t| *t == SyncTask::ClearAll);
                out.push(SyncTask::ApplyAll);
            }
            SyncTask::Apply(canvas) => {
                let covered = out.iter().any(|t| match t {
                    SyncTask::ApplyAll => true,
                    SyncTask::Apply(c) => *c == canvas,
                    SyncTask::ClearAll => false,
                });
                if !covered {
                    out.push(SyncTask::Apply(canvas));
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/sync/queue.rs"]
mod tests;
