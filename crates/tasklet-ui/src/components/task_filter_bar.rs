use tasklet_shared::TaskFilter;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct TaskFilterBarProps {
  pub current:   TaskFilter,
  pub on_change: Callback<TaskFilter>
}

#[function_component(TaskFilterBar)]
pub fn task_filter_bar(
  props: &TaskFilterBarProps
) -> Html {
  html! {
      <fieldset class="filters" role="group" aria-label="Filter tasks by status">
          {
              for TaskFilter::VARIANTS.into_iter().map(|filter| {
                  let active = props.current == filter;
                  let on_change = props.on_change.clone();
                  html! {
                      <button
                          type="button"
                          class={if active { "filter active" } else { "filter" }}
                          aria-pressed={if active { "true" } else { "false" }}
                          onclick={move |_| on_change.emit(filter)}
                      >
                          { filter.label() }
                      </button>
                  }
              })
          }
      </fieldset>
  }
}
