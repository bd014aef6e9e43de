use tasklet_shared::{
  Task,
  TaskId,
  normalize_title
};
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Event,
  FocusEvent,
  Html,
  InputEvent,
  KeyboardEvent,
  MouseEvent,
  Properties,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_node_ref,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct TaskItemProps {
  pub task:      Task,
  pub on_toggle: Callback<TaskId>,
  pub on_delete: Callback<TaskId>,
  pub on_update:
    Callback<(TaskId, String)>
}

/// New title to submit when leaving edit mode, if any.
fn edited_title(
  current: &str,
  draft: &str
) -> Option<String> {
  normalize_title(draft)
    .filter(|title| title != current)
}

#[function_component(TaskItem)]
pub fn task_item(
  props: &TaskItemProps
) -> Html {
  let editing = use_state(|| false);
  let draft = use_state(String::new);
  let input_ref = use_node_ref();

  {
    let input_ref = input_ref.clone();
    use_effect_with(
      *editing,
      move |editing| {
        if *editing
          && let Some(input) = input_ref
            .cast::<HtmlInputElement>()
        {
          let _ = input.focus();
          input.select();
        }
        || ()
      }
    );
  }

  let start_edit = {
    let editing = editing.clone();
    let draft = draft.clone();
    let title = props.task.title.clone();
    Callback::from(move |_: ()| {
      draft.set(title.clone());
      editing.set(true);
    })
  };

  let save = {
    let editing = editing.clone();
    let draft = draft.clone();
    let id = props.task.id.clone();
    let title = props.task.title.clone();
    let on_update =
      props.on_update.clone();
    Callback::from(move |_: ()| {
      if !*editing {
        return;
      }
      if let Some(next) =
        edited_title(&title, &draft)
      {
        on_update
          .emit((id.clone(), next));
      }
      editing.set(false);
    })
  };

  let cancel = {
    let editing = editing.clone();
    let draft = draft.clone();
    let title = props.task.title.clone();
    Callback::from(move |_: ()| {
      draft.set(title.clone());
      editing.set(false);
    })
  };

  let on_toggle = {
    let id = props.task.id.clone();
    let on_toggle =
      props.on_toggle.clone();
    Callback::from(move |_: Event| {
      on_toggle.emit(id.clone())
    })
  };

  let on_delete = {
    let id = props.task.id.clone();
    let on_delete =
      props.on_delete.clone();
    Callback::from(
      move |_: MouseEvent| {
        on_delete.emit(id.clone())
      }
    )
  };

  let title = &props.task.title;
  let completed = props.task.completed;
  let toggle_label = format!(
    "Mark \"{title}\" as {}",
    if completed {
      "pending"
    } else {
      "completed"
    }
  );

  let body = if *editing {
    let oninput = {
      let draft = draft.clone();
      Callback::from(
        move |e: InputEvent| {
          let input: HtmlInputElement =
            e.target_unchecked_into();
          draft.set(input.value());
        }
      )
    };
    let onkeydown = {
      let save = save.clone();
      let cancel = cancel.clone();
      Callback::from(
        move |e: KeyboardEvent| {
          match e.key().as_str() {
            | "Enter" => save.emit(()),
            | "Escape" => cancel.emit(()),
            | _ => {}
          }
        }
      )
    };
    let onblur = {
      let save = save.clone();
      Callback::from(
        move |_: FocusEvent| {
          save.emit(())
        }
      )
    };

    html! {
        <input
            ref={input_ref.clone()}
            type="text"
            class="task-edit"
            value={(*draft).clone()}
            aria-label={format!("Edit task: {title}")}
            oninput={oninput}
            onkeydown={onkeydown}
            onblur={onblur}
        />
    }
  } else {
    let ondblclick = {
      let start_edit = start_edit.clone();
      Callback::from(
        move |_: MouseEvent| {
          start_edit.emit(())
        }
      )
    };
    let onkeydown = {
      let start_edit = start_edit.clone();
      Callback::from(
        move |e: KeyboardEvent| {
          if matches!(
            e.key().as_str(),
            "Enter" | "F2"
          ) {
            e.prevent_default();
            start_edit.emit(());
          }
        }
      )
    };

    html! {
        <span
            class={if completed { "task-title done" } else { "task-title" }}
            role="button"
            tabindex="0"
            aria-label={format!("{title}. Double-click or press Enter to edit")}
            ondblclick={ondblclick}
            onkeydown={onkeydown}
        >
            { title.clone() }
        </span>
    }
  };

  html! {
      <li class="task-item">
          <input
              type="checkbox"
              checked={completed}
              aria-label={toggle_label}
              onchange={on_toggle}
          />
          { body }
          <button
              type="button"
              class="danger"
              aria-label={format!("Delete \"{title}\"")}
              onclick={on_delete}
          >
              { "Delete" }
          </button>
      </li>
  }
}
