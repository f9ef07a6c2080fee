//! Reactive task list loader.
//!
//! The loader observes the session credential and the filter set. Whenever the
//! credential appears or changes, or the filters change while signed in, it
//! starts a new load generation:
//!
//! 1. The generation counter is bumped and any in-flight fetch is aborted
//! 2. Non-empty filters become the query parameters
//! 3. The fetch runs under the request timeout
//! 4. A completion is applied only if it belongs to the latest generation
//!
//! A successful load replaces the task list wholesale. A failed load keeps the
//! last good list and records a non-fatal error on the view.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::api::{ApiError, ApiResult, Task, TaskService};
use crate::filters::FilterSet;

/// Shown when a failed load carries no `detail`.
pub const FETCH_FALLBACK_MESSAGE: &str = "Failed to load tasks";

/// Snapshot published by the loader after every state change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskView {
    /// Tasks from the most recent successful load, in service order.
    pub tasks: Vec<Task>,
    /// Generation that produced the current `tasks`/`error` (0 = never loaded).
    pub generation: u64,
    pub loading: bool,
    pub error: Option<String>,
}

enum Command {
    Refresh,
    Settle(oneshot::Sender<()>),
}

struct Completion {
    generation: u64,
    result: ApiResult<Vec<Task>>,
}

/// Handle to a running loader. Dropping it stops the loader.
pub struct TaskLoader {
    view: watch::Receiver<TaskView>,
    commands: mpsc::UnboundedSender<Command>,
    handle: JoinHandle<()>,
}

impl TaskLoader {
    /// Start observing `credential` and `filters`.
    ///
    /// If a credential is already present, a first load starts immediately.
    pub fn spawn(
        api: Arc<dyn TaskService>,
        credential: watch::Receiver<Option<String>>,
        filters: watch::Receiver<FilterSet>,
        request_timeout: Duration,
    ) -> Self {
        let (view_tx, view) = watch::channel(TaskView::default());
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let worker = LoaderLoop {
            api,
            credential,
            filters,
            request_timeout,
            view: view_tx,
            commands: command_rx,
            done_tx,
            done_rx,
            generation: 0,
            in_flight: None,
            waiters: Vec::new(),
        };
        let handle = tokio::spawn(worker.run());

        Self {
            view,
            commands,
            handle,
        }
    }

    /// Current view snapshot.
    pub fn view(&self) -> TaskView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskView> {
        self.view.clone()
    }

    /// Re-run the load with the current credential and filters.
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    /// Wait until every change observed so far has finished loading.
    pub async fn settle(&self) {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Settle(tx)).is_err() {
            return;
        }
        let _ = rx.await;
    }
}

impl Drop for TaskLoader {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct LoaderLoop {
    api: Arc<dyn TaskService>,
    credential: watch::Receiver<Option<String>>,
    filters: watch::Receiver<FilterSet>,
    request_timeout: Duration,
    view: watch::Sender<TaskView>,
    commands: mpsc::UnboundedReceiver<Command>,
    done_tx: mpsc::UnboundedSender<Completion>,
    done_rx: mpsc::UnboundedReceiver<Completion>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    waiters: Vec<oneshot::Sender<()>>,
}

impl LoaderLoop {
    async fn run(mut self) {
        if self.credential.borrow_and_update().is_some() {
            self.start_load("initial credential");
        }

        loop {
            // State changes are drained before commands so that `settle`
            // always observes mutations made before it was called.
            tokio::select! {
                biased;

                changed = self.credential.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.credential.borrow_and_update();
                    self.start_load("credential changed");
                }
                changed = self.filters.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.filters.borrow_and_update();
                    self.start_load("filters changed");
                }
                Some(done) = self.done_rx.recv() => {
                    self.finish_load(done);
                }
                command = self.commands.recv() => match command {
                    Some(Command::Refresh) => self.start_load("refresh requested"),
                    Some(Command::Settle(tx)) => {
                        if self.in_flight.is_none() {
                            let _ = tx.send(());
                        } else {
                            self.waiters.push(tx);
                        }
                    }
                    None => break,
                },
            }
        }
    }

    fn start_load(&mut self, reason: &str) {
        let Some(credential) = self.credential.borrow().clone() else {
            tracing::debug!("Skipping task load ({}): not signed in", reason);
            return;
        };

        self.generation += 1;
        let generation = self.generation;

        if let Some(previous) = self.in_flight.take() {
            previous.abort();
            tracing::debug!("Load generation {} superseded", generation - 1);
        }

        let params = self.filters.borrow().query_params();
        tracing::debug!(
            "Starting task load generation {} ({}), {} filter(s)",
            generation,
            reason,
            params.len()
        );

        self.view.send_modify(|view| view.loading = true);

        let api = Arc::clone(&self.api);
        let done_tx = self.done_tx.clone();
        let timeout = self.request_timeout;
        self.in_flight = Some(tokio::spawn(async move {
            let fetch = api.fetch_tasks(&credential, &params);
            let result = match tokio::time::timeout(timeout, fetch).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout(format!("task load exceeded {:?}", timeout))),
            };
            let _ = done_tx.send(Completion { generation, result });
        }));
    }

    fn finish_load(&mut self, done: Completion) {
        if done.generation != self.generation {
            tracing::debug!(
                "Discarding stale task load generation {} (latest is {})",
                done.generation,
                self.generation
            );
            return;
        }

        self.in_flight = None;

        match done.result {
            Ok(tasks) => {
                tracing::info!("Loaded {} task(s) (generation {})", tasks.len(), done.generation);
                self.view.send_modify(|view| {
                    view.tasks = tasks;
                    view.generation = done.generation;
                    view.loading = false;
                    view.error = None;
                });
            }
            Err(e) => {
                tracing::warn!("Task load generation {} failed: {}", done.generation, e);
                let message = e.user_message(FETCH_FALLBACK_MESSAGE);
                self.view.send_modify(|view| {
                    view.generation = done.generation;
                    view.loading = false;
                    view.error = Some(message);
                });
            }
        }

        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}

impl Drop for LoaderLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
