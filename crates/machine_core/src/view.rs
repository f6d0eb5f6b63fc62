use async_trait::async_trait;
use shared::domain::ViewName;
use tokio::sync::Mutex;

/// Active-view switcher for the fixed set of machine views.
///
/// Exactly one view is active at any time. Implementations deactivate all
/// views before activating the target, with a synchronization point in
/// between, so that re-entering the same view on the next cycle restarts
/// its entry transition instead of inheriting stale state. The controller
/// re-enters the Slip and Ballot views on every cycle.
#[async_trait]
pub trait ViewPresenter: Send + Sync {
    async fn show(&self, view: ViewName);
}

/// Presenter that tracks the active view without rendering anything.
/// Suitable for headless embedding and tests.
#[derive(Default)]
pub struct NullPresenter {
    active: Mutex<Option<ViewName>>,
}

impl NullPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn active(&self) -> Option<ViewName> {
        *self.active.lock().await
    }
}

#[async_trait]
impl ViewPresenter for NullPresenter {
    async fn show(&self, view: ViewName) {
        *self.active.lock().await = Some(view);
    }
}
