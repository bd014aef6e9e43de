use std::rc::Rc;

use tasklet_shared::{
  FilterMemo,
  KeyValueStore,
  TaskFilter,
  TaskId,
  TaskStore
};
use yew::{
  Callback,
  Html,
  Reducible,
  function_component,
  html,
  use_mut_ref,
  use_reducer,
  use_state
};

use crate::components::{
  AppHeader,
  TaskFilterBar,
  TaskForm,
  TaskList
};
use crate::storage::BrowserStorage;

pub enum TaskAction {
  Add(String),
  Toggle(TaskId),
  Delete(TaskId),
  Update(TaskId, String)
}

/// Reducer wrapper: each action runs against a copy of the store and
/// the copy becomes the new state.
pub struct TasksState<S = BrowserStorage> {
  pub store: TaskStore<S>
}

impl<S> TasksState<S>
where
  S: KeyValueStore + Clone
{
  pub fn open(backend: S) -> Self {
    Self {
      store: TaskStore::open(backend)
    }
  }
}

impl<S> Reducible for TasksState<S>
where
  S: KeyValueStore + Clone
{
  type Action = TaskAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut store = self.store.clone();
    match action {
      | TaskAction::Add(title) => {
        store.add(&title)
      }
      | TaskAction::Toggle(id) => {
        store.toggle(&id)
      }
      | TaskAction::Delete(id) => {
        store.delete(&id)
      }
      | TaskAction::Update(id, title) => {
        store.update(&id, &title)
      }
    }

    if let Some(error) =
      store.take_save_error()
    {
      tracing::error!(
        %error,
        "tasks kept in memory only"
      );
    }

    if store.revision()
      == self.store.revision()
    {
      return self;
    }
    tracing::debug!(
      revision = store.revision(),
      "task collection changed"
    );
    Rc::new(Self { store })
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let state = use_reducer(|| {
    TasksState::open(BrowserStorage)
  });
  let filter =
    use_state(TaskFilter::default);
  let memo =
    use_mut_ref(FilterMemo::default);

  let tasks = state.store.tasks();
  let visible = memo
    .borrow_mut()
    .view(&tasks, *filter);
  let counts = state.store.counts();

  let on_add = {
    let state = state.clone();
    Callback::from(
      move |title: String| {
        state.dispatch(TaskAction::Add(
          title
        ))
      }
    )
  };
  let on_toggle = {
    let state = state.clone();
    Callback::from(move |id: TaskId| {
      state.dispatch(TaskAction::Toggle(
        id
      ))
    })
  };
  let on_delete = {
    let state = state.clone();
    Callback::from(move |id: TaskId| {
      state.dispatch(TaskAction::Delete(
        id
      ))
    })
  };
  let on_update = {
    let state = state.clone();
    Callback::from(
      move |(id, title): (
        TaskId,
        String
      )| {
        state.dispatch(
          TaskAction::Update(id, title)
        )
      }
    )
  };
  let on_filter = {
    let filter = filter.clone();
    Callback::from(
      move |next: TaskFilter| {
        filter.set(next)
      }
    )
  };

  html! {
      <main>
          <AppHeader counts={counts} />
          <section aria-label="Add task">
              <TaskForm on_submit={on_add} />
          </section>
          <section aria-label="Filter tasks">
              <TaskFilterBar current={*filter} on_change={on_filter} />
          </section>
          <section aria-label="Task list">
              <TaskList
                  tasks={visible}
                  on_toggle={on_toggle}
                  on_delete={on_delete}
                  on_update={on_update}
              />
          </section>
      </main>
  }
}

#[cfg(test)]
mod tests {
  use tasklet_shared::{
    MemoryStorage,
    TASKS_STORAGE_KEY
  };

  use super::*;

  fn reduce(
    state: Rc<TasksState<MemoryStorage>>,
    action: TaskAction
  ) -> Rc<TasksState<MemoryStorage>> {
    state.reduce(action)
  }

  #[test]
  fn actions_produce_new_state_and_persist()
  {
    let backend = MemoryStorage::new();
    let state = Rc::new(TasksState::open(
      backend.clone()
    ));

    let state = reduce(
      state,
      TaskAction::Add(
        "Buy milk".to_string()
      )
    );
    assert_eq!(state.store.len(), 1);
    let id =
      state.store.tasks()[0].id.clone();

    let state = reduce(
      state,
      TaskAction::Toggle(id.clone())
    );
    assert!(
      state.store.tasks()[0].completed
    );

    let state = reduce(
      state,
      TaskAction::Update(
        id.clone(),
        "Buy oat milk".to_string()
      )
    );
    assert_eq!(
      state.store.tasks()[0].title,
      "Buy oat milk"
    );

    let state =
      reduce(state, TaskAction::Delete(id));
    assert!(state.store.is_empty());
    assert_eq!(
      backend
        .raw(TASKS_STORAGE_KEY)
        .as_deref(),
      Some("[]")
    );
  }

  #[test]
  fn no_op_actions_keep_the_same_state() {
    let state = Rc::new(TasksState::open(
      MemoryStorage::new()
    ));
    let next = reduce(
      Rc::clone(&state),
      TaskAction::Toggle(TaskId::from(
        "missing"
      ))
    );
    assert!(Rc::ptr_eq(&state, &next));

    let next = reduce(
      Rc::clone(&state),
      TaskAction::Add("   ".to_string())
    );
    assert!(Rc::ptr_eq(&state, &next));
  }
}
