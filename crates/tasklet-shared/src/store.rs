use std::rc::Rc;

use chrono::{
  DateTime,
  Utc
};
use tracing::{
  debug,
  error,
  info
};

use crate::storage::{
  KeyValueStore,
  TaskStorage
};
use crate::task::{
  Task,
  TaskId,
  normalize_title
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub struct TaskCounts {
  pub total:     usize,
  pub completed: usize,
  pub pending:   usize
}

/// Owns the task collection for one session and mirrors every change
/// to its storage backend.
///
/// Invalid input (unknown ids, blank titles) is ignored rather than
/// reported. A failed write keeps the in-memory collection and parks
/// the error for [`TaskStore::take_save_error`].
#[derive(Debug, Clone)]
pub struct TaskStore<S> {
  storage:    TaskStorage<S>,
  tasks:      Rc<[Task]>,
  revision:   u64,
  save_error: Option<String>
}

impl<S: KeyValueStore> TaskStore<S> {
  #[tracing::instrument(skip(backend))]
  pub fn open(backend: S) -> Self {
    let storage = TaskStorage::new(backend);
    let tasks: Rc<[Task]> =
      storage.load().into();
    info!(
      count = tasks.len(),
      "opened task store"
    );
    Self {
      storage,
      tasks,
      revision: 0,
      save_error: None
    }
  }

  /// Current collection. The slice is replaced, never edited, so a
  /// handle taken earlier keeps showing the old state.
  pub fn tasks(&self) -> Rc<[Task]> {
    Rc::clone(&self.tasks)
  }

  pub fn get(
    &self,
    id: &TaskId
  ) -> Option<&Task> {
    self
      .tasks
      .iter()
      .find(|task| &task.id == id)
  }

  /// Tasks whose id starts with `prefix`, in collection order.
  pub fn find_by_prefix(
    &self,
    prefix: &str
  ) -> Vec<&Task> {
    self
      .tasks
      .iter()
      .filter(|task| {
        task.id.as_str().starts_with(prefix)
      })
      .collect()
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  /// Bumped on every applied mutation.
  pub fn revision(&self) -> u64 {
    self.revision
  }

  pub fn counts(&self) -> TaskCounts {
    let completed = self
      .tasks
      .iter()
      .filter(|task| task.completed)
      .count();
    TaskCounts {
      total: self.tasks.len(),
      completed,
      pending: self.tasks.len() - completed
    }
  }

  pub fn take_save_error(
    &mut self
  ) -> Option<String> {
    self.save_error.take()
  }

  #[tracing::instrument(skip(self))]
  pub fn add(&mut self, title: &str) {
    self.add_at(title, Utc::now());
  }

  /// [`TaskStore::add`] with an explicit creation time.
  #[tracing::instrument(skip(self, title))]
  pub fn add_at(
    &mut self,
    title: &str,
    now: DateTime<Utc>
  ) {
    let Some(title) = normalize_title(title)
    else {
      debug!("ignoring blank title");
      return;
    };

    let task = Task::new(title, now);
    debug!(id = %task.id, "adding task");
    let mut next = self.tasks.to_vec();
    next.push(task);
    self.commit(next);
  }

  #[tracing::instrument(skip(self, id), fields(id = %id))]
  pub fn toggle(&mut self, id: &TaskId) {
    let Some(idx) = self.position(id)
    else {
      debug!("no task to toggle");
      return;
    };

    let mut next = self.tasks.to_vec();
    next[idx] = next[idx].toggled();
    self.commit(next);
  }

  #[tracing::instrument(skip(self, id), fields(id = %id))]
  pub fn delete(&mut self, id: &TaskId) {
    let Some(idx) = self.position(id)
    else {
      debug!("no task to delete");
      return;
    };

    let mut next = self.tasks.to_vec();
    next.remove(idx);
    self.commit(next);
  }

  #[tracing::instrument(skip(self, id, title), fields(id = %id))]
  pub fn update(
    &mut self,
    id: &TaskId,
    title: &str
  ) {
    let Some(title) = normalize_title(title)
    else {
      debug!("ignoring blank title");
      return;
    };
    let Some(idx) = self.position(id)
    else {
      debug!("no task to update");
      return;
    };

    let mut next = self.tasks.to_vec();
    next[idx] = next[idx].renamed(title);
    self.commit(next);
  }

  fn position(
    &self,
    id: &TaskId
  ) -> Option<usize> {
    self
      .tasks
      .iter()
      .position(|task| &task.id == id)
  }

  fn commit(&mut self, next: Vec<Task>) {
    self.tasks = next.into();
    self.revision += 1;

    if let Err(err) =
      self.storage.save(&self.tasks)
    {
      let message = format!("{err:#}");
      error!(
        error = %message,
        revision = self.revision,
        "failed to persist tasks"
      );
      self.save_error = Some(message);
    }
  }
}
