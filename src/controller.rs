use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::AppError;
use crate::models::entry::Entry;
use crate::models::folder_node::FolderNode;
use crate::remote_path;
use crate::services::remote_store::RemoteStore;
use crate::services::tree_service;

/// One rendered folder: the listing partitioned into files and directories,
/// plus the breadcrumb trail derived from the path.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderView {
    pub path: String,
    pub files: Vec<Entry>,
    pub directories: Vec<Entry>,
    pub breadcrumb: Vec<Crumb>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub name: String,
    pub path: String,
}

#[derive(Default)]
struct NamespaceState {
    current_path: String,
    view: Option<FolderView>,
    tree: FolderNode,
}

/// Orchestrates the remote namespace view. Every successful mutation is
/// followed by a refetch from the store; the cached listing is never patched
/// locally. Locks are short-held and never span an await.
pub struct NamespaceController<S> {
    store: S,
    state: Mutex<NamespaceState>,
    navigation: AtomicU64,
}

impl<S: RemoteStore> NamespaceController<S> {
    pub fn new(store: S) -> Self {
        NamespaceController {
            store,
            state: Mutex::new(NamespaceState::default()),
            navigation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_path(&self) -> String {
        self.lock_state().current_path.clone()
    }

    pub fn view(&self) -> Option<FolderView> {
        self.lock_state().view.clone()
    }

    pub fn tree(&self) -> FolderNode {
        self.lock_state().tree.clone()
    }

    /// Moves to `path` and lists it. Each call gets a fresh generation; a
    /// response belonging to a superseded navigation is discarded and
    /// reported as `Ok(None)` so overlapping navigations cannot apply stale
    /// state out of order.
    pub async fn navigate(&self, path: &str) -> Result<Option<FolderView>, AppError> {
        // The generation claim and the current_path write stay inside one
        // critical section so their orders cannot diverge across threads.
        let generation = {
            let mut state = self.lock_state();
            state.current_path = path.to_string();
            self.navigation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let entries = self.store.list(path).await?;

        let (directories, files): (Vec<Entry>, Vec<Entry>) =
            entries.into_iter().partition(Entry::is_directory);
        let view = FolderView {
            path: path.to_string(),
            files,
            directories,
            breadcrumb: breadcrumb(path),
        };

        let mut state = self.lock_state();
        if self.navigation.load(Ordering::SeqCst) != generation {
            tracing::debug!(path = %path, "discarding stale navigation response");
            return Ok(None);
        }
        state.view = Some(view.clone());
        Ok(Some(view))
    }

    /// Rebuilds the folder tree snapshot from the store.
    pub async fn reload_tree(&self) -> Result<FolderNode, AppError> {
        let tree = tree_service::load_full_tree(&self.store).await?;
        self.lock_state().tree = tree.clone();
        Ok(tree)
    }

    /// Tree reload followed by a re-navigation to the current folder, in
    /// that order.
    pub async fn refresh(&self) -> Result<(), AppError> {
        self.reload_tree().await?;
        let current = self.current_path();
        self.navigate(&current).await?;
        Ok(())
    }

    pub async fn create_folder(&self, path: &str) -> Result<(), AppError> {
        let path = remote_path::normalize(path);
        if path.is_empty() {
            return Err(AppError::Validation("folder name must not be empty".to_string()));
        }
        self.store.create_folder(&path).await?;
        // Not necessarily the new folder: the refresh reflects any newly
        // visible siblings of the folder the user is looking at.
        self.refresh().await
    }

    pub async fn delete_folder(&self, path: &str) -> Result<(), AppError> {
        self.store.delete_folder(path).await?;
        self.reload_tree().await?;
        let current = self.current_path();
        if remote_path::is_descendant_or_self(&current, path) {
            self.navigate(remote_path::parent(path)).await?;
        }
        Ok(())
    }

    pub async fn rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), AppError> {
        self.store.rename_folder(old_path, new_path).await?;
        self.reload_tree().await?;
        let current = self.current_path();
        if remote_path::is_descendant_or_self(&current, old_path) {
            let target = format!("{new_path}{}", &current[old_path.len()..]);
            self.navigate(&target).await?;
        }
        Ok(())
    }

    pub async fn rename_file(&self, path: &str, new_name: &str) -> Result<(), AppError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::Validation("file name must not be empty".to_string()));
        }
        self.store.rename_file(path, new_name).await?;
        let current = self.current_path();
        self.navigate(&current).await?;
        Ok(())
    }

    pub async fn delete_file(&self, path: &str) -> Result<(), AppError> {
        self.store.delete_file(path).await?;
        let current = self.current_path();
        self.navigate(&current).await?;
        Ok(())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, NamespaceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn breadcrumb(path: &str) -> Vec<Crumb> {
    remote_path::ancestors(path)
        .into_iter()
        .map(|(name, path)| Crumb { name, path })
        .collect()
}
