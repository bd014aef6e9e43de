mod app_header;
mod task_filter_bar;
mod task_form;
mod task_item;
mod task_list;

pub use app_header::AppHeader;
pub use task_filter_bar::TaskFilterBar;
pub use task_form::TaskForm;
pub use task_item::TaskItem;
pub use task_list::TaskList;
