//! Progress reporting and cooperative cancellation.
//!
//! Each phase receives a `&mut dyn ProgressMonitor`, calls [`begin`](ProgressMonitor::begin)
//! and [`done`](ProgressMonitor::done) around its work and may [`log`](ProgressMonitor::log)
//! along the way. The driver asks [`is_cancelled`](ProgressMonitor::is_cancelled) only between
//! phases.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

pub trait ProgressMonitor {
    fn begin(&mut self, task: &str, total_work: f64);

    fn log(&mut self, message: &str);

    /// A child monitor accounting for `work` units of this monitor's total.
    fn subtask(&mut self, work: f64) -> Box<dyn ProgressMonitor + '_>;

    fn done(&mut self);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMonitor;

impl ProgressMonitor for NullMonitor {
    fn begin(&mut self, _task: &str, _total_work: f64) {}

    fn log(&mut self, _message: &str) {}

    fn subtask(&mut self, _work: f64) -> Box<dyn ProgressMonitor + '_> {
        Box::new(NullMonitor)
    }

    fn done(&mut self) {}
}

/// Forwards progress to `tracing` at info level, with elapsed time on `done`.
#[derive(Debug, Default)]
pub struct TracingMonitor {
    depth: usize,
    task: Option<String>,
    started: Option<Instant>,
}

impl TracingMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressMonitor for TracingMonitor {
    fn begin(&mut self, task: &str, total_work: f64) {
        tracing::info!(depth = self.depth, total_work, "{task}");
        self.task = Some(task.to_string());
        self.started = Some(Instant::now());
    }

    fn log(&mut self, message: &str) {
        let task = self.task.as_deref().unwrap_or("");
        tracing::info!(depth = self.depth, task, "{message}");
    }

    fn subtask(&mut self, _work: f64) -> Box<dyn ProgressMonitor + '_> {
        Box::new(TracingMonitor {
            depth: self.depth + 1,
            task: None,
            started: None,
        })
    }

    fn done(&mut self) {
        let elapsed_ms = self
            .started
            .map(|t| t.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        let task = self.task.as_deref().unwrap_or("");
        tracing::info!(depth = self.depth, task, elapsed_ms, "done");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Begin { depth: usize, task: String },
    Log { depth: usize, message: String },
    Done { depth: usize },
}

/// Keeps every event in memory; handy for tests and debugging tools.
#[derive(Debug, Default)]
pub struct RecordingMonitor {
    pub events: Vec<ProgressEvent>,
}

impl RecordingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Begin { task, .. } => Some(task.as_str()),
                _ => None,
            })
            .collect()
    }
}

struct RecordingChild<'a> {
    events: &'a mut Vec<ProgressEvent>,
    depth: usize,
}

impl ProgressMonitor for RecordingChild<'_> {
    fn begin(&mut self, task: &str, _total_work: f64) {
        self.events.push(ProgressEvent::Begin {
            depth: self.depth,
            task: task.to_string(),
        });
    }

    fn log(&mut self, message: &str) {
        self.events.push(ProgressEvent::Log {
            depth: self.depth,
            message: message.to_string(),
        });
    }

    fn subtask(&mut self, _work: f64) -> Box<dyn ProgressMonitor + '_> {
        Box::new(RecordingChild {
            events: self.events,
            depth: self.depth + 1,
        })
    }

    fn done(&mut self) {
        self.events.push(ProgressEvent::Done { depth: self.depth });
    }
}

impl ProgressMonitor for RecordingMonitor {
    fn begin(&mut self, task: &str, total_work: f64) {
        RecordingChild {
            events: &mut self.events,
            depth: 0,
        }
        .begin(task, total_work);
    }

    fn log(&mut self, message: &str) {
        RecordingChild {
            events: &mut self.events,
            depth: 0,
        }
        .log(message);
    }

    fn subtask(&mut self, _work: f64) -> Box<dyn ProgressMonitor + '_> {
        Box::new(RecordingChild {
            events: &mut self.events,
            depth: 1,
        })
    }

    fn done(&mut self) {
        self.events.push(ProgressEvent::Done { depth: 0 });
    }
}

/// Wraps another monitor and reports cancellation once the shared flag is raised.
#[derive(Debug)]
pub struct CancellableMonitor<M> {
    inner: M,
    flag: Arc<AtomicBool>,
}

impl<M: ProgressMonitor> CancellableMonitor<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that can cancel the run from anywhere, including other threads.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: ProgressMonitor> ProgressMonitor for CancellableMonitor<M> {
    fn begin(&mut self, task: &str, total_work: f64) {
        self.inner.begin(task, total_work);
    }

    fn log(&mut self, message: &str) {
        self.inner.log(message);
    }

    fn subtask(&mut self, work: f64) -> Box<dyn ProgressMonitor + '_> {
        self.inner.subtask(work)
    }

    fn done(&mut self) {
        self.inner.done();
    }

    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.inner.is_cancelled()
    }
}
