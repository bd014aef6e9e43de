use tasklet_shared::normalize_title;
use web_sys::HtmlInputElement;
use yew::{
  Callback,
  Html,
  InputEvent,
  Properties,
  SubmitEvent,
  TargetCast,
  function_component,
  html,
  use_state
};

pub const TITLE_REQUIRED: &str =
  "Title is required";

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
  pub on_submit: Callback<String>
}

fn validate_submission(
  raw: &str
) -> Result<String, &'static str> {
  normalize_title(raw)
    .ok_or(TITLE_REQUIRED)
}

#[function_component(TaskForm)]
pub fn task_form(
  props: &TaskFormProps
) -> Html {
  let title = use_state(String::new);
  let error =
    use_state(|| None::<&'static str>);

  let onsubmit = {
    let title = title.clone();
    let error = error.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        match validate_submission(&title)
        {
          | Ok(clean) => {
            on_submit.emit(clean);
            title.set(String::new());
          }
          | Err(message) => {
            error.set(Some(message));
          }
        }
      }
    )
  };

  let oninput = {
    let title = title.clone();
    let error = error.clone();
    Callback::from(
      move |e: InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        title.set(input.value());
        if error.is_some() {
          error.set(None);
        }
      }
    )
  };

  html! {
      <form class="task-form" onsubmit={onsubmit}>
          <div class="field">
              <input
                  type="text"
                  placeholder="New task"
                  aria-label="New task"
                  value={(*title).clone()}
                  oninput={oninput}
                  aria-invalid={error.is_some().then_some("true")}
              />
              {
                  if let Some(message) = *error {
                      html! { <p class="form-error" role="alert">{ message }</p> }
                  } else {
                      html! {}
                  }
              }
          </div>
          <button type="submit">{ "Add" }</button>
      </form>
  }
}
