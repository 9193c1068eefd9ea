//! 会话状态持有者
//!
//! 会话状态只能通过 [`SessionStore::commit`] 修改：转换函数在写锁内读取
//! 提交时刻的最新状态并返回新状态。读者拿到的快照永远是完整提交过的版本。

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Commit, SessionState};

#[derive(Clone, Default)]
pub struct SessionStore {
    state: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前状态的完整副本
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// 在最新状态上执行一次转换
    pub async fn commit<R, F>(&self, transition: F) -> R
    where
        F: FnOnce(&SessionState) -> Commit<R>,
    {
        let mut guard = self.state.write().await;
        match transition(&*guard) {
            Commit::Apply(mut next, result) => {
                next.revision = guard.revision + 1;
                debug!("会话状态提交 revision={}", next.revision);
                *guard = next;
                result
            }
            Commit::Discard(result) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatTurn, SectionKind};

    #[tokio::test]
    async fn test_revision_advances_only_on_apply() {
        let store = SessionStore::new();
        let request = store.commit(|s| s.begin_drafting(SectionKind::Title)).await;
        assert_eq!(store.snapshot().await.revision, 1);

        store.commit(|s| s.begin_drafting(SectionKind::Title)).await;
        let applied = store
            .commit(|s| s.finish_drafting(SectionKind::Title, request, "stale".to_string()))
            .await;
        assert!(!applied);
        assert_eq!(store.snapshot().await.revision, 2);
    }

    #[tokio::test]
    async fn test_commits_read_latest_state() {
        let store = SessionStore::new();
        let request = store.commit(|s| s.begin_drafting(SectionKind::Results)).await;

        // 撰写期间的其他修改
        store
            .commit(|s| s.edit_section(SectionKind::Discussion, "edited".to_string()))
            .await;
        store
            .commit(|s| s.append_exchange(ChatTurn::user("hi"), ChatTurn::assistant("hello")))
            .await;

        store
            .commit(|s| s.finish_drafting(SectionKind::Results, request, "results".to_string()))
            .await;

        let state = store.snapshot().await;
        assert_eq!(state.section(SectionKind::Results).content, "results");
        assert_eq!(state.section(SectionKind::Discussion).content, "edited");
        assert_eq!(state.chat.len(), 2);
    }
}
