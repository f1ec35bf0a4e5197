//! State behind the media detail screen.

use crate::generation::GenerationCounter;
use reelscout_models::{MediaDetails, MediaKind};
use reelscout_sources::{CatalogError, CatalogSource};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct DetailView {
    pub target: Option<(MediaKind, u64)>,
    pub details: Option<MediaDetails>,
    pub loading: bool,
    pub error: Option<Arc<CatalogError>>,
}

struct DetailInner {
    view: DetailView,
    generation: GenerationCounter,
}

struct Shared {
    source: Arc<dyn CatalogSource>,
    state: Mutex<DetailInner>,
    updates: watch::Sender<DetailView>,
}

/// Loads one title at a time. Its error slot is separate from the feed's.
#[derive(Clone)]
pub struct DetailController {
    shared: Arc<Shared>,
}

impl DetailController {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        let (updates, _) = watch::channel(DetailView::default());
        Self {
            shared: Arc::new(Shared {
                source,
                state: Mutex::new(DetailInner {
                    view: DetailView::default(),
                    generation: GenerationCounter::new(),
                }),
                updates,
            }),
        }
    }

    pub fn view(&self) -> DetailView {
        self.lock().view.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailView> {
        self.shared.updates.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, DetailInner> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, inner: &DetailInner) {
        self.shared.updates.send_replace(inner.view.clone());
    }

    /// Navigate to `id`. A load still outstanding for a previous id is
    /// ignored when it resolves.
    pub async fn load(&self, kind: MediaKind, id: u64) {
        let generation = {
            let mut inner = self.lock();
            let generation = inner.generation.issue();
            inner.view.target = Some((kind, id));
            inner.view.loading = true;
            inner.view.error = None;
            if inner.view.details.as_ref().map(|d| (d.kind, d.id)) != Some((kind, id)) {
                inner.view.details = None;
            }
            self.publish(&inner);
            generation
        };
        info!("Loading {} {}", kind, id);

        let result = self.shared.source.details(kind, id).await;

        let mut inner = self.lock();
        if !inner.generation.is_current(generation) {
            debug!(id, "Discarding stale details response");
            return;
        }
        match result {
            Ok(details) => inner.view.details = Some(details),
            Err(e) => {
                warn!("Failed to load details for {} {}: {}", kind, id, e);
                inner.view.details = None;
                inner.view.error = Some(Arc::new(e));
            }
        }
        inner.view.loading = false;
        self.publish(&inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedSource;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_load_details() {
        let controller = DetailController::new(Arc::new(ScriptedSource::new()));
        controller.load(MediaKind::Movie, 42).await;

        let view = controller.view();
        assert_eq!(view.target, Some((MediaKind::Movie, 42)));
        assert!(!view.loading);
        assert!(view.error.is_none());
        let details = view.details.unwrap();
        assert_eq!(details.title, "Title 42");
        assert_eq!(details.runtime_label(), "2h 0m");
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_error_clears_details() {
        let controller = DetailController::new(Arc::new(ScriptedSource::new()));
        controller.load(MediaKind::Movie, 42).await;
        controller.load(MediaKind::Movie, 0).await;

        let view = controller.view();
        assert!(view.details.is_none());
        assert!(!view.loading);
        assert_eq!(view.error.unwrap().status(), Some(404));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_details_are_discarded() {
        let source = ScriptedSource::new().with_details_delay(1, Duration::from_millis(500));
        let controller = DetailController::new(Arc::new(source));

        tokio::join!(controller.load(MediaKind::Movie, 1), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            controller.load(MediaKind::Movie, 2).await;
        });

        let view = controller.view();
        assert_eq!(view.target, Some((MediaKind::Movie, 2)));
        assert_eq!(view.details.unwrap().id, 2);
        assert!(!view.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_error_does_not_leak_into_later_load() {
        let controller = DetailController::new(Arc::new(ScriptedSource::new()));
        controller.load(MediaKind::Series, 0).await;
        assert!(controller.view().error.is_some());

        controller.load(MediaKind::Series, 7).await;
        let view = controller.view();
        assert!(view.error.is_none());
        assert_eq!(view.details.unwrap().kind, MediaKind::Series);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_loading_then_details() {
        let controller = DetailController::new(Arc::new(ScriptedSource::new()));
        let mut updates = controller.subscribe();
        assert!(!updates.has_changed().unwrap());

        let load = controller.clone();
        let handle = tokio::spawn(async move { load.load(MediaKind::Movie, 42).await });

        updates.changed().await.unwrap();
        let first = updates.borrow_and_update().clone();
        assert_eq!(first.target, Some((MediaKind::Movie, 42)));
        assert!(first.loading);

        handle.await.unwrap();
        let last = updates.borrow_and_update().clone();
        assert!(!last.loading);
        assert_eq!(last.details.unwrap().id, 42);
    }
}
