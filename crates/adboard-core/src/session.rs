use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    domain::{Category, District, ListingId, PhotoRef, UserId},
    errors::Error,
    Result,
};

/// Dialogue states. A user with no session is idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogState {
    // Creation flow (linear).
    Title,
    Description,
    Price,
    Category,
    District,
    Photo,
    // Edit flow (branching).
    ChoosingField,
    EditingTitle,
    EditingDescription,
    EditingPrice,
    EditingCategory,
    EditingPhoto,
}

/// Fields collected so far during a creation flow.
#[derive(Clone, Debug, Default)]
pub struct ListingDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub category: Option<Category>,
    pub district: Option<District>,
    pub photo: Option<PhotoRef>,
}

/// Per-user in-progress conversation state.
#[derive(Clone, Debug)]
pub struct Session {
    pub state: DialogState,
    pub draft: ListingDraft,
    /// Set while editing: the listing the flow operates on.
    pub edit_target: Option<ListingId>,
}

impl Session {
    pub fn new(state: DialogState) -> Self {
        Self {
            state,
            draft: ListingDraft::default(),
            edit_target: None,
        }
    }
}

/// In-memory session map with a defined lifecycle, injected as a dependency.
///
/// At most one live session per user; `start` overwrites. Sessions are
/// ephemeral and acceptably lost on restart.
#[derive(Default)]
pub struct SessionManager {
    inner: Mutex<HashMap<UserId, Session>>,
}

impl SessionManager {
    pub async fn start(&self, user: UserId, state: DialogState) {
        self.inner.lock().await.insert(user, Session::new(state));
    }

    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.inner.lock().await.get(&user).cloned()
    }

    /// Apply a patch to the live session. Fails if the user has none.
    pub async fn update(&self, user: UserId, patch: impl FnOnce(&mut Session)) -> Result<()> {
        let mut map = self.inner.lock().await;
        let session = map.get_mut(&user).ok_or(Error::NoActiveSession)?;
        patch(session);
        Ok(())
    }

    /// Drop the user's session. Returns whether one existed.
    pub async fn clear(&self, user: UserId) -> bool {
        self.inner.lock().await.remove(&user).is_some()
    }
}

/// Per-user mutex map: one inbound event is fully processed before the next
/// event for the same user is accepted. Different users are independent.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub async fn lock_user(&self, user: UserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(user)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_without_session_fails() {
        let mgr = SessionManager::default();
        let err = mgr
            .update(UserId(1), |s| s.state = DialogState::Price)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoActiveSession));
    }

    #[tokio::test]
    async fn start_overwrites_existing_session() {
        let mgr = SessionManager::default();
        mgr.start(UserId(1), DialogState::Title).await;
        mgr.update(UserId(1), |s| s.draft.title = Some("Bike".to_string()))
            .await
            .unwrap();

        mgr.start(UserId(1), DialogState::Title).await;
        let session = mgr.get(UserId(1)).await.unwrap();
        assert!(session.draft.title.is_none(), "draft must be discarded");
    }

    #[tokio::test]
    async fn sessions_are_per_user() {
        let mgr = SessionManager::default();
        mgr.start(UserId(1), DialogState::Title).await;
        assert!(mgr.get(UserId(2)).await.is_none());

        assert!(mgr.clear(UserId(1)).await);
        assert!(!mgr.clear(UserId(1)).await);
    }
}
