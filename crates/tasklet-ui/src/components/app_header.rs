use tasklet_shared::TaskCounts;
use yew::{
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct AppHeaderProps {
  pub counts: TaskCounts
}

#[function_component(AppHeader)]
pub fn app_header(
  props: &AppHeaderProps
) -> Html {
  let counts = props.counts;
  html! {
      <header>
          <h1>{ "Tasklet" }</h1>
          <p class="summary">
              { format!("{} pending · {} completed", counts.pending, counts.completed) }
          </p>
      </header>
  }
}
