use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use taskbot_db::TaskPage;
use taskbot_logging::record_usage;

use crate::bot::Bot;

#[derive(Subcommand, Debug)]
pub enum TodoAction {
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks, one page at a time
    List {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Mark a task as done
    Done {
        /// Task id
        id: i64,
    },
}

pub async fn handle_todo_command(
    bot: &Bot,
    user_id: i64,
    action: TodoAction,
    json: bool,
) -> Result<()> {
    match action {
        TodoAction::Add { text } => {
            let text = text.join(" ");
            if json {
                record_usage(user_id, "todo", Some("add"));
                let task = bot.tasks().add(user_id, text).await?;
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                println!("{}", bot.todo_add(user_id, &text).await?);
            }
        }
        TodoAction::List { page } => {
            record_usage(user_id, "todo", Some("list"));
            let page = bot
                .tasks()
                .list_page(user_id, page, bot.settings().page_size)
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_page(&page);
            }
        }
        TodoAction::Done { id } => {
            let found = bot.mark_done(user_id, id).await?;

            if json {
                let task = bot.tasks().get(user_id, id).await?;
                let body = serde_json::json!({ "found": found, "task": task });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else if found {
                println!("{} {}", "Done:".bright_green(), id);
            } else {
                println!("{}", "Task not found.".bright_red());
            }
        }
    }

    Ok(())
}

fn print_page(page: &TaskPage) {
    println!(
        "{}",
        format!("Tasks {}/{}", page.page, page.total_pages())
            .bright_blue()
            .bold()
    );

    if page.items.is_empty() {
        println!("{}", "No tasks on this page.".dimmed());
    }

    for task in &page.items {
        let status = if task.done {
            "[+]".bright_green().to_string()
        } else {
            "[ ]".dimmed().to_string()
        };
        println!(
            "{:>5} {} {}  {}",
            task.id,
            status,
            task.text,
            task.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }

    println!(
        "{}",
        format!("{} task(s) in total", page.total_count).dimmed()
    );
}
