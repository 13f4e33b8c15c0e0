//! Screen state: folding `Resource` emissions into what a list or detail
//! screen shows.
//!
//! # Design
//! `ScreenState` is a plain value with a pure `apply` step, so the folding
//! rules are testable without a runtime. `ScreenModel` wraps it in a
//! `watch` channel for the UI and owns the tasks that drive repository
//! streams into it. Those tasks live in a `JoinSet`, so dropping the model
//! aborts them and nothing is delivered after teardown.
//!
//! Re-triggering a load while an earlier one is still in flight bumps a
//! generation counter; emissions from the superseded load are discarded.
//! `ScreenState::apply` on its own has no such guard and is last-write-wins.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::debug;

use crate::envelope::{best_effort, Resource, ResourceStream};

/// An error as the screen shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub code: Option<u16>,
}

/// Stale-while-revalidate state for one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState<T> {
    data: Option<T>,
    loading: bool,
    full_error: Option<ErrorInfo>,
    notice: Option<ErrorInfo>,
}

impl<T> Default for ScreenState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            full_error: None,
            notice: None,
        }
    }
}

/// What to render for a `ScreenState`.
#[derive(Debug, PartialEq, Eq)]
pub enum View<'a, T> {
    /// Nothing requested yet.
    Idle,
    /// First load in flight, nothing cached.
    Placeholder,
    /// Failed with nothing cached; offer retry.
    FullError(&'a ErrorInfo),
    Content {
        data: &'a T,
        refreshing: bool,
        notice: Option<&'a ErrorInfo>,
    },
}

impl<T> ScreenState<T> {
    pub fn apply(&mut self, resource: Resource<T>) {
        match resource {
            Resource::Loading => {
                self.loading = true;
                if self.data.is_none() {
                    self.full_error = None;
                }
            }
            Resource::Success(data) => {
                self.data = Some(data);
                self.loading = false;
                self.full_error = None;
                self.notice = None;
            }
            Resource::Error { message, code } => {
                self.loading = false;
                let info = ErrorInfo { message, code };
                if self.data.is_some() {
                    self.notice = Some(info);
                } else {
                    self.full_error = Some(info);
                }
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notice(&self) -> Option<&ErrorInfo> {
        self.notice.as_ref()
    }

    pub fn full_error(&self) -> Option<&ErrorInfo> {
        self.full_error.as_ref()
    }

    pub fn view(&self) -> View<'_, T> {
        match (&self.data, &self.full_error) {
            (Some(data), _) => View::Content {
                data,
                refreshing: self.loading,
                notice: self.notice.as_ref(),
            },
            (None, _) if self.loading => View::Placeholder,
            (None, Some(err)) => View::FullError(err),
            (None, None) => View::Idle,
        }
    }
}

/// Multi-select for batch actions, keyed by entity id.
///
/// Independent of the list's `Resource` stream. Refreshing the list after a
/// batch is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<i64>,
}

impl Selection {
    /// Flip `id`; returns whether it is now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select_all(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.ids.extend(ids);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    /// Settle the selection after a batch call. Cleared only on success;
    /// returns whether it was cleared.
    pub fn finish_batch<A>(&mut self, outcome: &Resource<A>) -> bool {
        match outcome {
            Resource::Success(_) => {
                self.ids.clear();
                true
            }
            _ => false,
        }
    }
}

type Source<T> = Arc<dyn Fn() -> ResourceStream<T> + Send + Sync>;

/// Observable state holder for one screen.
///
/// Must be used from within a tokio runtime.
pub struct ScreenModel<T> {
    state: Arc<watch::Sender<ScreenState<T>>>,
    generation: Arc<AtomicU64>,
    source: Option<Source<T>>,
    tasks: JoinSet<()>,
}

impl<T> Default for ScreenModel<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScreenModel<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (state, _) = watch::channel(ScreenState::default());
        Self {
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            source: None,
            tasks: JoinSet::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState<T>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ScreenState<T> {
        self.state.borrow().clone()
    }

    /// Start the call produced by `source` and remember it for `reload`.
    ///
    /// Any load still in flight is superseded. Returns the new generation.
    pub fn load<F>(&mut self, source: F) -> u64
    where
        F: Fn() -> ResourceStream<T> + Send + Sync + 'static,
    {
        let source: Source<T> = Arc::new(source);
        self.source = Some(source.clone());
        self.start(source())
    }

    /// Re-run the last `load` (pull-to-refresh, retry after a full error).
    /// Returns `None` when nothing has been loaded yet.
    pub fn reload(&mut self) -> Option<u64> {
        let source = self.source.clone()?;
        Some(self.start(source()))
    }

    pub fn dismiss_notice(&self) {
        self.state.send_if_modified(|state| {
            let had_notice = state.notice.is_some();
            state.dismiss_notice();
            had_notice
        });
    }

    /// Drive a side-effecting call within this screen's lifetime without
    /// folding its outcome into the state.
    pub fn fire_and_forget<A: Send + 'static>(
        &mut self,
        op: &'static str,
        stream: ResourceStream<A>,
    ) {
        self.tasks.spawn(best_effort(op, stream));
    }

    /// Wait until every task spawned so far has finished.
    pub async fn idle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    fn start(&mut self, mut stream: ResourceStream<T>) -> u64 {
        while self.tasks.try_join_next().is_some() {}

        // Bump under the channel lock so a superseded task cannot slip an
        // emission in between the bump and its own check.
        let mut generation = 0;
        self.state.send_if_modified(|_| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            false
        });

        let state = self.state.clone();
        let current = self.generation.clone();
        self.tasks.spawn(async move {
            while let Some(item) = stream.next().await {
                let applied = state.send_if_modified(|s| {
                    if current.load(Ordering::SeqCst) != generation {
                        return false;
                    }
                    s.apply(item);
                    true
                });
                if !applied {
                    debug!(generation, "superseded load; dropping emission");
                    return;
                }
            }
        });
        generation
    }
}
