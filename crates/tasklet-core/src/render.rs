use std::io::{self, IsTerminal, Write};

use chrono::Local;
use tasklet_shared::{Task, TaskCounts, TaskFilter};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

pub const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        let color = cfg.get_bool("color").unwrap_or(true);
        Self {
            color: color && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, tasks, counts))]
    pub fn print_task_table(
        &self,
        tasks: &[Task],
        counts: TaskCounts,
        filter: TaskFilter,
    ) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_task_table(out, tasks, counts, filter)
    }

    pub fn write_task_table<W: Write>(
        &self,
        mut out: W,
        tasks: &[Task],
        counts: TaskCounts,
        filter: TaskFilter,
    ) -> anyhow::Result<()> {
        if tasks.is_empty() {
            if counts.total == 0 {
                writeln!(out, "No tasks.")?;
            } else {
                writeln!(out, "No {filter} tasks.")?;
            }
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Created".to_string(),
            "Title".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let id = self.paint(task.id.short(SHORT_ID_LEN), "33");
            let done = if task.completed { "[x]" } else { "[ ]" }.to_string();
            let created = task
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string();
            let title = escape_controls(&task.title);
            let title = if task.completed {
                self.paint(&title, "2")
            } else {
                title
            };
            rows.push(vec![id, done, created, title]);
        }

        write_table(&mut out, headers, rows)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} {} ({} completed, {} pending)",
            counts.total,
            if counts.total == 1 { "task" } else { "tasks" },
            counts.completed,
            counts.pending
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self, task))]
    pub fn print_task_info(&self, task: &Task) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_task_info(out, task)
    }

    pub fn write_task_info<W: Write>(&self, mut out: W, task: &Task) -> anyhow::Result<()> {
        writeln!(out, "id        {}", task.id)?;
        writeln!(out, "title     {}", escape_controls(&task.title))?;
        writeln!(
            out,
            "status    {}",
            if task.completed { "completed" } else { "pending" }
        )?;
        writeln!(out, "created   {}", task.created_at.to_rfc3339())?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let last = column_count.saturating_sub(1);

    for idx in 0..column_count {
        if idx == last {
            write!(writer, "{}", headers[idx])?;
        } else {
            write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
        }
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        let sep = if idx == last { "" } else { " " };
        write!(writer, "{:-<width$}{sep}", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            if idx == last {
                write!(writer, "{cell}")?;
                continue;
            }
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Control characters in stored text are shown escaped so they never reach
/// the terminal.
fn escape_controls(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_control() {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    out
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
