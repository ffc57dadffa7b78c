//! Task list.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::Backend;
use crate::error::{CoreError, Result, StoreError};
use crate::model::{collections, Task};
use crate::repo::TaskRepo;
use crate::storage::{fields, Subscription};
use crate::validation::required;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TasksView {
    pub tasks: Vec<Task>,
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub empty: bool,
}

/// The signed-in user's tasks, kept current by a live query.
pub struct TasksScreen {
    repo: TaskRepo,
    subscription: Option<Subscription>,
    tasks: Vec<Task>,
    last_error: Option<String>,
}

impl TasksScreen {
    pub fn open(backend: &Backend) -> Result<Self> {
        let uid = backend.user()?;
        let repo = TaskRepo::new(backend.store.clone(), uid);
        let subscription = repo.listen()?;
        let mut screen = Self {
            repo,
            subscription: Some(subscription),
            tasks: Vec::new(),
            last_error: None,
        };
        screen.sync();
        Ok(screen)
    }

    /// Apply pending snapshots. Returns how many arrived.
    pub fn sync(&mut self) -> usize {
        let Some(subscription) = self.subscription.as_mut() else {
            return 0;
        };
        let deliveries = subscription.drain();
        let count = deliveries.len();
        for delivery in deliveries {
            match delivery {
                Ok(snapshot) => self.tasks = self.repo.map(&snapshot),
                Err(e) => {
                    warn!(error = %e, "task listener failed");
                    self.last_error = Some("Error loading tasks".to_string());
                }
            }
        }
        count
    }

    pub fn render(&self) -> TasksView {
        let completed = self.tasks.iter().filter(|t| t.is_completed).count();
        TasksView {
            tasks: self.tasks.clone(),
            total: self.tasks.len(),
            completed,
            pending: self.tasks.len() - completed,
            empty: self.tasks.is_empty(),
        }
    }

    /// Last listener failure, cleared on read.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn add(&mut self, title: &str, description: &str) -> Result<String> {
        let title = required("Title", title)?;
        let task = Task::new(self.repo.user_id(), title, description.trim());
        let id = self.repo.add(&task)?;
        info!(%id, "task added");
        self.sync();
        Ok(id)
    }

    /// Change title and description of a listed task the user owns.
    pub fn edit(&mut self, id: &str, title: &str, description: &str) -> Result<()> {
        let title = required("Title", title)?;
        let index = self.position(id)?;
        if self.tasks[index].user_id != self.repo.user_id() {
            return Err(CoreError::Unauthorized("edit task".to_string()));
        }
        self.repo.update(
            id,
            fields([
                ("title", json!(title)),
                ("description", json!(description.trim())),
            ]),
        )?;
        self.sync();
        Ok(())
    }

    /// Flip completion. Returns the new flag.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let index = self.position(id)?;
        let done = !self.tasks[index].is_completed;
        self.repo
            .update(id, fields([("isCompleted", json!(done))]))?;
        self.tasks[index].is_completed = done;
        self.sync();
        Ok(done)
    }

    /// Delete a task the current user owns.
    ///
    /// Refused locally when the listed owner is someone else. When the
    /// store rejects the delete, the task is read back to tell "gone" from
    /// "not yours".
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let index = self.position(id)?;
        if self.tasks[index].user_id != self.repo.user_id() {
            return Err(CoreError::Unauthorized("delete task".to_string()));
        }

        if let Err(e) = self.repo.delete(id) {
            warn!(%id, error = %e, "task delete failed");
            return Err(self.diagnose_delete(id, e));
        }
        info!(%id, "task deleted");
        if let Some(i) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(i);
        }
        self.sync();
        Ok(())
    }

    fn diagnose_delete(&self, id: &str, cause: StoreError) -> CoreError {
        match self.repo.get_document(id) {
            Err(StoreError::PermissionDenied { .. }) => {
                CoreError::Unauthorized("delete other user's task".to_string())
            }
            Ok(None) => CoreError::Store(StoreError::NotFound {
                collection: collections::TASKS.to_string(),
                id: id.to_string(),
            }),
            _ => CoreError::Store(cause),
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.tasks.iter().position(|t| t.id == id).ok_or_else(|| {
            CoreError::Store(StoreError::NotFound {
                collection: collections::TASKS.to_string(),
                id: id.to_string(),
            })
        })
    }

    /// Stop listening.
    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}
