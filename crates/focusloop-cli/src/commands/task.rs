use clap::Subcommand;
use focusloop_core::storage::{load_tasks, save_tasks};
use focusloop_core::Priority;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        text: String,
        /// Priority (high, medium, low)
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
    },
    /// List tasks
    List {
        /// Only tasks not yet completed
        #[arg(long)]
        pending: bool,
    },
    /// Flip a task between done and not done
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CommandResult {
    let store = open_store()?;
    let mut tasks = load_tasks(&store);

    match action {
        TaskAction::Add { text, priority } => {
            let task = tasks.append(&text, priority)?.clone();
            save_tasks(&store, &tasks)?;
            print_json(&task)?;
        }
        TaskAction::List { pending } => {
            let listed: Vec<_> = tasks.iter().filter(|t| !pending || !t.completed).collect();
            print_json(&listed)?;
        }
        TaskAction::Toggle { id } => {
            let task = tasks.toggle(&id)?.clone();
            save_tasks(&store, &tasks)?;
            print_json(&task)?;
        }
        TaskAction::Delete { id } => {
            let task = tasks.delete(&id)?;
            save_tasks(&store, &tasks)?;
            print_json(&task)?;
        }
    }
    Ok(())
}
