//! Task model, persistence gateway, task store and view filter shared by
//! the terminal and browser front ends.

pub mod filter;
pub mod storage;
pub mod store;
pub mod task;

pub use filter::{
  FilterMemo,
  TaskFilter,
  filter_tasks
};
pub use storage::{
  KeyValueStore,
  MemoryStorage,
  TASKS_STORAGE_KEY,
  TaskStorage
};
pub use store::{
  TaskCounts,
  TaskStore
};
pub use task::{
  Task,
  TaskId,
  normalize_title
};
