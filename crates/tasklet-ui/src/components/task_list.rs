use std::rc::Rc;

use tasklet_shared::{
  Task,
  TaskId
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

use super::TaskItem;

#[derive(Properties, PartialEq)]
pub struct TaskListProps {
  pub tasks:     Rc<[Task]>,
  pub on_toggle: Callback<TaskId>,
  pub on_delete: Callback<TaskId>,
  pub on_update:
    Callback<(TaskId, String)>
}

fn list_label(count: usize) -> String {
  let noun = if count == 1 {
    "task"
  } else {
    "tasks"
  };
  format!("Task list, {count} {noun}")
}

#[function_component(TaskList)]
pub fn task_list(
  props: &TaskListProps
) -> Html {
  if props.tasks.is_empty() {
    return html! {
        <div class="empty-state" role="status" aria-live="polite">
            <p>{ "No tasks yet" }</p>
            <p>{ "Add a new task to get started." }</p>
        </div>
    };
  }

  html! {
      <ul class="task-list" aria-label={list_label(props.tasks.len())}>
          {
              for props.tasks.iter().cloned().map(|task| html! {
                  <TaskItem
                      key={task.id.to_string()}
                      task={task.clone()}
                      on_toggle={props.on_toggle.clone()}
                      on_delete={props.on_delete.clone()}
                      on_update={props.on_update.clone()}
                  />
              })
          }
      </ul>
  }
}

#[cfg(test)]
mod tests {
  use super::list_label;

  #[test]
  fn label_pluralizes() {
    assert_eq!(
      list_label(1),
      "Task list, 1 task"
    );
    assert_eq!(
      list_label(3),
      "Task list, 3 tasks"
    );
  }
}
