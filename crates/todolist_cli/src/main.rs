//! `todolist` command-line host.
//!
//! # Responsibility
//! - Bootstrap config, logging and the SQLite store.
//! - Mount the list into a headless document and replay one user gesture
//!   through the real event path.
//! - Print the rendered list.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::rc::Rc;
use todolist_core::{
    init_logging, AppConfig, ClockIdGenerator, Document, Filter, SqliteTodoStore,
    TemplateRegistry, Todo, TodoId, TodoList,
};

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Local single-user task list", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite store file (default: $TODOLIST_DB_PATH or the temp dir).
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Absolute log directory (default: $TODOLIST_LOG_DIR or the temp dir).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a task.
    Add { title: String },
    /// Flip a task between open and done.
    Toggle { id: TodoId },
    /// Delete a task.
    Delete { id: TodoId },
    /// Show tasks, newest first.
    List {
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for Filter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Filter::All,
            FilterArg::Active => Filter::ActiveOnly,
            FilterArg::Completed => Filter::CompletedOnly,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = log_dir;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let store = Rc::new(
        SqliteTodoStore::open(&config.db_path)
            .with_context(|| format!("failed to open store `{}`", config.db_path.display()))?,
    );
    let list = TodoList::load_from(store, Box::new(ClockIdGenerator::new()))?;
    let document = Document::new();
    let host = document.tree_mut().create_element("body", &[]);
    list.mount(&document, host, &TemplateRegistry::default())?;

    match cli.command {
        Command::Add { title } => {
            let input = list.title_input().ok_or_else(|| anyhow!("layout has no title field"))?;
            document.tree_mut().set_value(input, &title)?;
            let before = list.len();
            document.submit(list.form_node().ok_or_else(|| anyhow!("layout has no form"))?);
            if list.len() == before {
                println!("nothing added: title is empty");
            }
        }
        Command::Toggle { id } => {
            let view = list.item_view(id).ok_or_else(|| anyhow!("no task with id {id}"))?;
            document.toggle_checkbox(view.checkbox());
        }
        Command::Delete { id } => {
            let view = list.item_view(id).ok_or_else(|| anyhow!("no task with id {id}"))?;
            document.click(view.delete_button());
        }
        Command::List { filter } => {
            let filter = Filter::from(filter);
            let button = list
                .filter_button(filter)
                .ok_or_else(|| anyhow!("layout has no `{filter}` filter button"))?;
            document.click(button);
        }
    }

    if let Some(err) = list.take_persist_error() {
        return Err(err).context("changes were not saved");
    }

    for todo in list.visible_todos() {
        println!("{}", render_line(&todo));
    }
    Ok(())
}

fn render_line(todo: &Todo) -> String {
    let mark = if todo.is_completed() { 'x' } else { ' ' };
    format!("[{mark}] {:>13}  {}", todo.id(), todo.title())
}

#[cfg(test)]
mod tests {
    use super::{render_line, Cli, FilterArg};
    use clap::{CommandFactory, Parser};
    use todolist_core::{Filter, Todo};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_filter_parses_to_core_filter() {
        let cli = Cli::try_parse_from(["todolist", "list", "--filter", "active"]).unwrap();
        let super::Command::List { filter } = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(Filter::from(filter), Filter::ActiveOnly);
        assert_eq!(Filter::from(FilterArg::Completed), Filter::CompletedOnly);
    }

    #[test]
    fn render_line_marks_completed_tasks() {
        let done = Todo::with_state(42, "ship it", true).unwrap();
        let open = Todo::new(7, "plan").unwrap();
        assert_eq!(render_line(&done), "[x]            42  ship it");
        assert!(render_line(&open).starts_with("[ ]"));
    }
}
