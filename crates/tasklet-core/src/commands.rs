use anyhow::{anyhow, bail};
use tasklet_shared::{KeyValueStore, TaskFilter, TaskId, TaskStore, filter_tasks, normalize_title};
use tracing::{debug, info, warn};

use crate::cli::Command;
use crate::config::Config;
use crate::render::{Renderer, SHORT_ID_LEN};

#[tracing::instrument(skip(store, cfg, renderer))]
pub fn dispatch<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    cfg: &Config,
    renderer: &Renderer,
    command: Option<Command>,
) -> anyhow::Result<()> {
    let command = command.unwrap_or(Command::List { filter: None });
    debug!(?command, "dispatching command");

    match command {
        Command::Add { words } => cmd_add(store, &words.join(" ")),
        Command::List { filter } => cmd_list(store, cfg, renderer, filter.as_deref()),
        Command::Toggle { id } => cmd_toggle(store, &id),
        Command::Delete { id } => cmd_delete(store, &id),
        Command::Edit { id, words } => cmd_edit(store, &id, &words.join(" ")),
        Command::Info { id } => {
            let id = resolve_task_id(store, &id)?;
            let task = store
                .get(&id)
                .ok_or_else(|| anyhow!("task disappeared: {id}"))?;
            renderer.print_task_info(task)
        }
    }
}

/// Finds the single task whose id equals or starts with `needle`.
pub fn resolve_task_id<S: KeyValueStore>(
    store: &TaskStore<S>,
    needle: &str,
) -> anyhow::Result<TaskId> {
    let needle = needle.trim();
    if needle.is_empty() {
        bail!("task id cannot be empty");
    }

    let exact = TaskId::from(needle);
    if store.get(&exact).is_some() {
        return Ok(exact);
    }

    let hits = store.find_by_prefix(needle);
    match hits.as_slice() {
        [] => bail!("no task matches id {needle}"),
        [task] => Ok(task.id.clone()),
        many => bail!("id prefix {needle} is ambiguous ({} tasks match)", many.len()),
    }
}

fn resolve_filter(cfg: &Config, arg: Option<&str>) -> TaskFilter {
    let selector = arg
        .map(str::to_string)
        .or_else(|| cfg.get("default.filter"))
        .unwrap_or_default();

    if !selector.trim().is_empty() && !TaskFilter::is_known_selector(&selector) {
        warn!(selector = %selector, "unknown filter; showing all tasks");
    }
    TaskFilter::from_selector(&selector)
}

fn ensure_saved<S: KeyValueStore>(store: &mut TaskStore<S>) -> anyhow::Result<()> {
    match store.take_save_error() {
        Some(err) => Err(anyhow!(err).context("tasks were not saved")),
        None => Ok(()),
    }
}

#[tracing::instrument(skip(store))]
fn cmd_add<S: KeyValueStore>(store: &mut TaskStore<S>, title: &str) -> anyhow::Result<()> {
    let Some(title) = normalize_title(title) else {
        bail!("title is required");
    };

    store.add(&title);
    ensure_saved(store)?;

    let task = store
        .tasks()
        .last()
        .cloned()
        .ok_or_else(|| anyhow!("task was not added"))?;
    info!(id = %task.id, "added task");
    println!("Created task {}.", task.id.short(SHORT_ID_LEN));
    Ok(())
}

#[tracing::instrument(skip(store, cfg, renderer))]
fn cmd_list<S: KeyValueStore>(
    store: &TaskStore<S>,
    cfg: &Config,
    renderer: &Renderer,
    filter: Option<&str>,
) -> anyhow::Result<()> {
    let filter = resolve_filter(cfg, filter);
    let tasks = store.tasks();
    let visible = filter_tasks(&tasks, filter);
    debug!(%filter, visible = visible.len(), total = tasks.len(), "listing tasks");
    renderer.print_task_table(&visible, store.counts(), filter)
}

#[tracing::instrument(skip(store))]
fn cmd_toggle<S: KeyValueStore>(store: &mut TaskStore<S>, id: &str) -> anyhow::Result<()> {
    let id = resolve_task_id(store, id)?;
    store.toggle(&id);
    ensure_saved(store)?;

    if let Some(task) = store.get(&id) {
        let state = if task.completed { "completed" } else { "pending" };
        info!(id = %id, state, "toggled task");
        println!("Task {} is now {state}.", id.short(SHORT_ID_LEN));
    }
    Ok(())
}

#[tracing::instrument(skip(store))]
fn cmd_delete<S: KeyValueStore>(store: &mut TaskStore<S>, id: &str) -> anyhow::Result<()> {
    let id = resolve_task_id(store, id)?;
    store.delete(&id);
    ensure_saved(store)?;

    info!(id = %id, "deleted task");
    println!("Deleted task {}.", id.short(SHORT_ID_LEN));
    Ok(())
}

#[tracing::instrument(skip(store))]
fn cmd_edit<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    id: &str,
    title: &str,
) -> anyhow::Result<()> {
    let id = resolve_task_id(store, id)?;
    let Some(title) = normalize_title(title) else {
        bail!("title is required");
    };

    store.update(&id, &title);
    ensure_saved(store)?;

    info!(id = %id, "renamed task");
    println!("Renamed task {}.", id.short(SHORT_ID_LEN));
    Ok(())
}
