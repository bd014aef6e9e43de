use std::fmt;

use chrono::{
  DateTime,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};
use uuid::Uuid;

/// Opaque task identifier. Freshly created tasks get a random v4 UUID,
/// but stored ids are kept as-is whatever their shape.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
  pub fn generate() -> Self {
    Self(Uuid::new_v4().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// First `len` characters, for compact listings.
  pub fn short(
    &self,
    len: usize
  ) -> &str {
    match self.0.char_indices().nth(len)
    {
      | Some((idx, _)) => &self.0[..idx],
      | None => &self.0
    }
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for TaskId {
  fn from(value: &str) -> Self {
    Self(value.to_string())
  }
}

impl From<String> for TaskId {
  fn from(value: String) -> Self {
    Self(value)
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id:         TaskId,
  pub title:      String,
  pub completed:  bool,
  pub created_at: DateTime<Utc>
}

impl Task {
  /// Builds a pending task. The caller passes a title that already went
  /// through [`normalize_title`].
  pub fn new(
    title: String,
    now: DateTime<Utc>
  ) -> Self {
    Self {
      id: TaskId::generate(),
      title,
      completed: false,
      created_at: now
    }
  }

  pub fn toggled(&self) -> Self {
    Self {
      completed: !self.completed,
      ..self.clone()
    }
  }

  pub fn renamed(
    &self,
    title: String
  ) -> Self {
    Self {
      title,
      ..self.clone()
    }
  }
}

/// Trims `raw` and rejects titles that are empty afterwards.
pub fn normalize_title(
  raw: &str
) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_string())
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    TimeZone,
    Utc
  };

  use super::*;

  #[test]
  fn new_task_is_pending_with_fresh_id()
  {
    let now = Utc
      .with_ymd_and_hms(
        2026, 3, 1, 9, 30, 0
      )
      .unwrap();
    let a = Task::new(
      "Buy milk".to_string(),
      now
    );
    let b = Task::new(
      "Buy milk".to_string(),
      now
    );

    assert!(!a.completed);
    assert_eq!(a.created_at, now);
    assert_ne!(a.id, b.id);
    assert!(
      Uuid::parse_str(a.id.as_str())
        .is_ok()
    );
  }

  #[test]
  fn serializes_with_camel_case_fields()
  {
    let now = Utc
      .with_ymd_and_hms(
        2024, 1, 1, 0, 0, 0
      )
      .unwrap();
    let task = Task {
      id:         TaskId::from("1"),
      title:      "Test task"
        .to_string(),
      completed:  false,
      created_at: now
    };

    let value =
      serde_json::to_value(&task)
        .unwrap();
    assert_eq!(value["id"], "1");
    assert_eq!(
      value["title"],
      "Test task"
    );
    assert_eq!(
      value["completed"],
      false
    );
    assert!(
      value["createdAt"]
        .as_str()
        .unwrap()
        .starts_with("2024-01-01T00:00:00")
    );
  }

  #[test]
  fn parses_millisecond_timestamps() {
    let raw = r#"{"id":"abc","title":"t","completed":true,"createdAt":"2024-01-01T00:00:00.000Z"}"#;
    let task: Task =
      serde_json::from_str(raw).unwrap();
    assert!(task.completed);
    assert_eq!(
      task.created_at,
      Utc
        .with_ymd_and_hms(
          2024, 1, 1, 0, 0, 0
        )
        .unwrap()
    );
  }

  #[test]
  fn normalize_title_trims_and_rejects_blank()
   {
    assert_eq!(
      normalize_title("  Buy milk \n"),
      Some("Buy milk".to_string())
    );
    assert_eq!(normalize_title(""), None);
    assert_eq!(
      normalize_title(" \t  "),
      None
    );
  }

  #[test]
  fn short_id_handles_short_values() {
    let id = TaskId::from("abc");
    assert_eq!(id.short(8), "abc");
    let id = TaskId::from(
      "0123456789abcdef"
    );
    assert_eq!(id.short(8), "01234567");
  }
}
