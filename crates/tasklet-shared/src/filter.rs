use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use serde::{
  Deserialize,
  Serialize
};
use tracing::trace;

use crate::task::Task;

/// Which subset of the collection a view shows.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
  #[default]
  All,
  Completed,
  Pending
}

impl TaskFilter {
  pub const VARIANTS: [TaskFilter; 3] = [
    TaskFilter::All,
    TaskFilter::Completed,
    TaskFilter::Pending
  ];

  /// Parses a selector value. Anything unrecognized selects
  /// [`TaskFilter::All`].
  pub fn from_selector(
    selector: &str
  ) -> Self {
    match selector
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "completed" => Self::Completed,
      | "pending" => Self::Pending,
      | _ => Self::All
    }
  }

  /// True when `selector` names one of the three filters exactly.
  pub fn is_known_selector(
    selector: &str
  ) -> bool {
    Self::VARIANTS.iter().any(|f| {
      f.as_key().eq_ignore_ascii_case(
        selector.trim()
      )
    })
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::All => "all",
      | Self::Completed => "completed",
      | Self::Pending => "pending"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::All => "All",
      | Self::Completed => "Completed",
      | Self::Pending => "Pending"
    }
  }

  pub fn matches(
    self,
    task: &Task
  ) -> bool {
    match self {
      | Self::All => true,
      | Self::Completed => task.completed,
      | Self::Pending => !task.completed
    }
  }
}

impl fmt::Display for TaskFilter {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

/// Derives the visible subset. `All` hands back the input untouched;
/// the other selectors keep the relative order of what they retain.
pub fn filter_tasks(
  tasks: &[Task],
  filter: TaskFilter
) -> Cow<'_, [Task]> {
  match filter {
    | TaskFilter::All => {
      Cow::Borrowed(tasks)
    }
    | TaskFilter::Completed
    | TaskFilter::Pending => {
      let kept: Vec<Task> = tasks
        .iter()
        .filter(|task| {
          filter.matches(task)
        })
        .cloned()
        .collect();
      trace!(
        %filter,
        total = tasks.len(),
        kept = kept.len(),
        "filtered tasks"
      );
      Cow::Owned(kept)
    }
  }
}

#[derive(Debug)]
struct MemoEntry {
  source: Rc<[Task]>,
  filter: TaskFilter,
  view:   Rc<[Task]>
}

/// Caches the last [`filter_tasks`] result keyed on the identity of the
/// source collection and the selector.
#[derive(Debug, Default)]
pub struct FilterMemo {
  cached: Option<MemoEntry>
}

impl FilterMemo {
  pub fn view(
    &mut self,
    tasks: &Rc<[Task]>,
    filter: TaskFilter
  ) -> Rc<[Task]> {
    if let Some(entry) = &self.cached
      && entry.filter == filter
      && Rc::ptr_eq(&entry.source, tasks)
    {
      return Rc::clone(&entry.view);
    }

    let view: Rc<[Task]> =
      match filter_tasks(tasks, filter) {
        | Cow::Borrowed(_) => {
          Rc::clone(tasks)
        }
        | Cow::Owned(kept) => kept.into()
      };

    self.cached = Some(MemoEntry {
      source: Rc::clone(tasks),
      filter,
      view: Rc::clone(&view)
    });
    view
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use chrono::{
    TimeZone,
    Utc
  };

  use super::*;
  use crate::task::TaskId;

  fn task(
    id: &str,
    completed: bool
  ) -> Task {
    Task {
      id: TaskId::from(id),
      title: format!("Task {id}"),
      completed,
      created_at: Utc
        .with_ymd_and_hms(
          2024, 1, 1, 0, 0, 0
        )
        .unwrap()
    }
  }

  fn sample() -> Vec<Task> {
    vec![
      task("1", false),
      task("2", true),
      task("3", false),
      task("4", true),
    ]
  }

  fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks
      .iter()
      .map(|t| t.id.as_str())
      .collect()
  }

  #[test]
  fn all_returns_input_unchanged() {
    let tasks = sample();
    let view =
      filter_tasks(&tasks, TaskFilter::All);
    assert!(matches!(
      view,
      Cow::Borrowed(_)
    ));
    assert_eq!(view.as_ref(), &tasks[..]);
  }

  #[test]
  fn completed_and_pending_keep_order() {
    let tasks = sample();
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        TaskFilter::Completed
      )),
      vec!["2", "4"]
    );
    assert_eq!(
      ids(&filter_tasks(
        &tasks,
        TaskFilter::Pending
      )),
      vec!["1", "3"]
    );
  }

  #[test]
  fn completed_and_pending_partition_ids()
  {
    let tasks = sample();
    let done: BTreeSet<_> = filter_tasks(
      &tasks,
      TaskFilter::Completed
    )
    .iter()
    .map(|t| t.id.clone())
    .collect();
    let open: BTreeSet<_> = filter_tasks(
      &tasks,
      TaskFilter::Pending
    )
    .iter()
    .map(|t| t.id.clone())
    .collect();
    let every: BTreeSet<_> = tasks
      .iter()
      .map(|t| t.id.clone())
      .collect();

    assert!(
      done.is_disjoint(&open)
    );
    assert_eq!(
      done
        .union(&open)
        .cloned()
        .collect::<BTreeSet<_>>(),
      every
    );
  }

  #[test]
  fn empty_input_yields_empty_views() {
    for filter in TaskFilter::VARIANTS {
      assert!(
        filter_tasks(&[], filter)
          .is_empty()
      );
    }
  }

  #[test]
  fn no_matches_yields_empty_view() {
    let tasks =
      vec![task("1", false), task("2", false)];
    assert!(
      filter_tasks(
        &tasks,
        TaskFilter::Completed
      )
      .is_empty()
    );
  }

  #[test]
  fn unknown_selector_falls_back_to_all()
  {
    assert_eq!(
      TaskFilter::from_selector("done"),
      TaskFilter::All
    );
    assert_eq!(
      TaskFilter::from_selector(""),
      TaskFilter::All
    );
    assert_eq!(
      TaskFilter::from_selector(
        " Pending "
      ),
      TaskFilter::Pending
    );
    assert!(
      !TaskFilter::is_known_selector(
        "done"
      )
    );
    assert!(
      TaskFilter::is_known_selector(
        "COMPLETED"
      )
    );
  }

  #[test]
  fn filter_serializes_lowercase() {
    assert_eq!(
      serde_json::to_string(
        &TaskFilter::Pending
      )
      .unwrap(),
      "\"pending\""
    );
  }

  #[test]
  fn memo_reuses_result_for_same_inputs()
  {
    let tasks: Rc<[Task]> =
      sample().into();
    let mut memo = FilterMemo::default();

    let first = memo
      .view(&tasks, TaskFilter::Pending);
    let second = memo
      .view(&tasks, TaskFilter::Pending);
    assert!(Rc::ptr_eq(&first, &second));

    let all =
      memo.view(&tasks, TaskFilter::All);
    assert!(Rc::ptr_eq(&all, &tasks));
  }

  #[test]
  fn memo_recomputes_for_new_collection()
  {
    let tasks: Rc<[Task]> =
      sample().into();
    let mut memo = FilterMemo::default();
    let first = memo.view(
      &tasks,
      TaskFilter::Completed
    );

    let replaced: Rc<[Task]> =
      tasks.to_vec().into();
    let second = memo.view(
      &replaced,
      TaskFilter::Completed
    );
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(first, second);
  }
}
