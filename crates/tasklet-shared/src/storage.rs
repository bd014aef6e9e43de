use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Context;
use tracing::{
  debug,
  warn
};

use crate::task::Task;

/// Slot holding the serialized task collection.
pub const TASKS_STORAGE_KEY: &str =
  "tasks-manager-tasks";

/// Synchronous string key-value storage supplied by the host.
pub trait KeyValueStore {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>>;

  fn set(
    &self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()>;
}

/// In-process storage. Clones share the same map, so a test can keep a
/// handle and inspect what a store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  entries:
    Rc<RefCell<BTreeMap<String, String>>>
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn raw(
    &self,
    key: &str
  ) -> Option<String> {
    self.entries.borrow().get(key).cloned()
  }

  pub fn put_raw(
    &self,
    key: &str,
    value: &str
  ) {
    self.entries.borrow_mut().insert(
      key.to_string(),
      value.to_string()
    );
  }
}

impl KeyValueStore for MemoryStorage {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    Ok(self.raw(key))
  }

  fn set(
    &self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self.put_raw(key, value);
    Ok(())
  }
}

/// Reads and writes the whole task collection under
/// [`TASKS_STORAGE_KEY`].
#[derive(Debug, Clone)]
pub struct TaskStorage<S> {
  backend: S
}

impl<S: KeyValueStore> TaskStorage<S> {
  pub fn new(backend: S) -> Self {
    Self { backend }
  }

  /// Never fails: a missing slot, a backend read error and an
  /// unparseable blob all come back as an empty collection.
  #[tracing::instrument(skip(self))]
  pub fn load(&self) -> Vec<Task> {
    let raw = match self
      .backend
      .get(TASKS_STORAGE_KEY)
    {
      | Ok(Some(raw)) => raw,
      | Ok(None) => {
        debug!("no stored tasks");
        return Vec::new();
      }
      | Err(error) => {
        warn!(
          error = %format!("{error:#}"),
          "failed reading stored tasks"
        );
        return Vec::new();
      }
    };

    if raw.trim().is_empty() {
      return Vec::new();
    }

    match serde_json::from_str::<Vec<Task>>(
      &raw
    ) {
      | Ok(tasks) => {
        debug!(
          count = tasks.len(),
          "loaded stored tasks"
        );
        tasks
      }
      | Err(error) => {
        warn!(
          %error,
          "stored tasks are not valid; \
           starting empty"
        );
        Vec::new()
      }
    }
  }

  /// Overwrites the slot with the full collection.
  #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
  pub fn save(
    &self,
    tasks: &[Task]
  ) -> anyhow::Result<()> {
    let json = serde_json::to_string(
      tasks
    )
    .context("failed to serialize tasks")?;
    self
      .backend
      .set(TASKS_STORAGE_KEY, &json)
      .context(
        "failed to write stored tasks"
      )?;
    debug!("saved tasks");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use anyhow::anyhow;
  use chrono::{
    TimeZone,
    Utc
  };

  use super::*;
  use crate::task::TaskId;

  fn task(
    id: &str,
    title: &str,
    completed: bool
  ) -> Task {
    Task {
      id: TaskId::from(id),
      title: title.to_string(),
      completed,
      created_at: Utc
        .with_ymd_and_hms(
          2024, 1, 1, 0, 0, 0
        )
        .unwrap()
    }
  }

  struct BrokenStorage;

  impl KeyValueStore for BrokenStorage {
    fn get(
      &self,
      _key: &str
    ) -> anyhow::Result<Option<String>>
    {
      Err(anyhow!("storage unavailable"))
    }

    fn set(
      &self,
      _key: &str,
      _value: &str
    ) -> anyhow::Result<()> {
      Err(anyhow!("quota exceeded"))
    }
  }

  #[test]
  fn load_returns_empty_when_slot_missing()
  {
    let storage =
      TaskStorage::new(MemoryStorage::new());
    assert!(storage.load().is_empty());
  }

  #[test]
  fn load_returns_empty_for_invalid_json()
  {
    let backend = MemoryStorage::new();
    backend.put_raw(
      TASKS_STORAGE_KEY,
      "invalid json"
    );
    let storage = TaskStorage::new(backend);
    assert!(storage.load().is_empty());
  }

  #[test]
  fn load_returns_empty_for_wrong_shape()
  {
    let backend = MemoryStorage::new();
    backend.put_raw(
      TASKS_STORAGE_KEY,
      r#"{"tasks":[1,2,3]}"#
    );
    let storage = TaskStorage::new(backend);
    assert!(storage.load().is_empty());
  }

  #[test]
  fn load_returns_empty_when_backend_fails()
  {
    let storage =
      TaskStorage::new(BrokenStorage);
    assert!(storage.load().is_empty());
  }

  #[test]
  fn save_writes_json_array() {
    let backend = MemoryStorage::new();
    let storage =
      TaskStorage::new(backend.clone());
    storage
      .save(&[task("1", "Test task", false)])
      .unwrap();

    let raw = backend
      .raw(TASKS_STORAGE_KEY)
      .expect("slot written");
    let parsed: serde_json::Value =
      serde_json::from_str(&raw).unwrap();
    assert_eq!(
      parsed.as_array().unwrap().len(),
      1
    );
    assert_eq!(parsed[0]["id"], "1");
    assert_eq!(
      parsed[0]["title"],
      "Test task"
    );
    assert_eq!(
      parsed[0]["completed"],
      false
    );
  }

  #[test]
  fn load_after_save_round_trips() {
    let storage =
      TaskStorage::new(MemoryStorage::new());
    let tasks = vec![
      task("1", "Task 1", false),
      task("2", "Task 2", true),
    ];
    storage.save(&tasks).unwrap();
    assert_eq!(storage.load(), tasks);
  }

  #[test]
  fn save_overwrites_previous_blob() {
    let storage =
      TaskStorage::new(MemoryStorage::new());
    storage
      .save(&[task("1", "Original", false)])
      .unwrap();
    storage
      .save(&[task("2", "New", false)])
      .unwrap();

    let loaded = storage.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id.as_str(), "2");
    assert_eq!(loaded[0].title, "New");
  }

  #[test]
  fn save_reports_backend_failure() {
    let storage =
      TaskStorage::new(BrokenStorage);
    let err = storage
      .save(&[task("1", "x", false)])
      .unwrap_err();
    assert!(
      format!("{err:#}")
        .contains("quota exceeded")
    );
  }
}
