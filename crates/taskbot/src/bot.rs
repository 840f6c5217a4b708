//! Bot-style command handling: turns `/todo`, `/stats`, `/help` and
//! `/start` messages into text replies.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use taskbot_db::TaskPage;
use taskbot_logging::record_usage;
use taskbot_stats::LogStats;

use crate::config::Settings;
use crate::service::{scan_logs, TaskService};

const HELP_TEXT: &str = "\
/todo add <text> - Add a task
/todo list [page] - Show your tasks
/todo done <id> - Mark a task as done
/stats - Uptime, unique users, command counts and log size
/help - This message";

const TODO_USAGE: &str = "Available commands:\n/todo list\n/todo add <text>\n/todo done <id>";

pub struct Bot {
    tasks: TaskService,
    settings: Settings,
    started_at: DateTime<Utc>,
}

impl Bot {
    pub fn new(tasks: TaskService, settings: Settings) -> Self {
        Self {
            tasks,
            settings,
            started_at: Utc::now(),
        }
    }

    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Answer one message such as `/todo add buy milk` from `user_id`.
    pub async fn handle(&self, user_id: i64, message: &str) -> Result<String> {
        let mut words = message.split_whitespace();
        let command = match words.next() {
            Some(c) => c.trim_start_matches('/').to_lowercase(),
            None => return Ok(self.help(user_id)),
        };
        let args: Vec<&str> = words.collect();

        match command.as_str() {
            "start" => Ok(self.start(user_id)),
            "help" => Ok(self.help(user_id)),
            "todo" => self.todo(user_id, &args).await,
            "stats" => self.stats(user_id).await,
            other => Ok(format!("Unknown command /{}. Use /help for the list.", other)),
        }
    }

    pub fn start(&self, user_id: i64) -> String {
        record_usage(user_id, "start", None);
        "Hi! I keep your to-do list. Use /help to see the commands.".to_string()
    }

    pub fn help(&self, user_id: i64) -> String {
        record_usage(user_id, "help", None);
        HELP_TEXT.to_string()
    }

    async fn todo(&self, user_id: i64, args: &[&str]) -> Result<String> {
        let Some(sub) = args.first() else {
            return Ok(TODO_USAGE.to_string());
        };

        match sub.to_lowercase().as_str() {
            "list" => {
                let page = match args.get(1) {
                    Some(raw) => match raw.parse::<u32>() {
                        Ok(page) => page,
                        Err(_) => return Ok("Usage: /todo list [page]".to_string()),
                    },
                    None => 1,
                };
                self.todo_list(user_id, page).await
            }
            "add" => self.todo_add(user_id, &args[1..].join(" ")).await,
            "done" => self.todo_done(user_id, args.get(1).copied()).await,
            _ => Ok(TODO_USAGE.to_string()),
        }
    }

    pub async fn todo_list(&self, user_id: i64, page: u32) -> Result<String> {
        record_usage(user_id, "todo", Some("list"));
        let page = self
            .tasks
            .list_page(user_id, page, self.settings.page_size)
            .await?;
        Ok(render_page(&page))
    }

    pub async fn todo_add(&self, user_id: i64, text: &str) -> Result<String> {
        record_usage(user_id, "todo", Some("add"));
        let text = text.trim();
        if text.is_empty() {
            return Ok("Usage: /todo add <task>".to_string());
        }
        let task = self.tasks.add(user_id, text.to_string()).await?;
        Ok(format!("Added task {}: {}", task.id, task.text))
    }

    /// Mark a task done, then record the usage line once the store has
    /// answered.
    pub async fn mark_done(&self, user_id: i64, id: i64) -> Result<bool> {
        let done = self.tasks.mark_done(user_id, id).await?;
        record_usage(user_id, "todo", Some("done"));
        tracing::debug!(user_id, task_id = id, found = done, "mark done");
        Ok(done)
    }

    pub async fn todo_done(&self, user_id: i64, raw_id: Option<&str>) -> Result<String> {
        let id = match raw_id.map(str::parse::<i64>) {
            Some(Ok(id)) if id > 0 => id,
            _ => return Ok("Usage: /todo done <id>".to_string()),
        };

        Ok(if self.mark_done(user_id, id).await? {
            "Done.".to_string()
        } else {
            "Task not found.".to_string()
        })
    }

    pub async fn stats(&self, user_id: i64) -> Result<String> {
        record_usage(user_id, "stats", None);
        let stats = scan_logs(self.settings.log_pattern.clone()).await?;
        Ok(render_stats(
            &stats,
            Utc::now() - self.started_at,
            self.settings.top_commands,
        ))
    }
}

/// Render one page of tasks with navigation hints.
pub fn render_page(page: &TaskPage) -> String {
    let mut lines = vec![format!("Tasks {}/{}:", page.page, page.total_pages())];

    if page.items.is_empty() {
        if page.total_count == 0 {
            lines.push("No tasks yet. Add one: /todo add <task>".to_string());
        } else {
            lines.push("Nothing on this page.".to_string());
        }
    } else {
        for task in &page.items {
            let status = if task.done { "[+]" } else { "[ ]" };
            lines.push(format!("{}. {} {}", task.id, status, task.text));
        }
    }

    let mut nav = Vec::new();
    if page.has_previous() {
        nav.push(format!("Back: /todo list {}", page.page - 1));
    }
    if page.has_next() {
        nav.push(format!("Next: /todo list {}", page.page + 1));
    }
    if !nav.is_empty() {
        lines.push(String::new());
        lines.push(nav.join(" | "));
    }

    lines.join("\n")
}

/// Render the `/stats` reply.
pub fn render_stats(stats: &LogStats, uptime: Duration, top: usize) -> String {
    let mut lines = vec![
        format!("Uptime: {}", format_uptime(uptime)),
        format!("Unique users: {}", stats.unique_users.len()),
        format!("Log size: {:.2} KB", stats.total_kb()),
    ];

    let top_commands = stats.top_commands(top);
    if !top_commands.is_empty() {
        lines.push(String::new());
        lines.push("Commands:".to_string());
        for c in top_commands {
            lines.push(format!("/{} - {}", c.command, c.count));
        }
    }

    lines.join("\n")
}

/// Format as `1d 2h 3m 4s`. Days only appear when non-zero and hours when
/// hours or days are non-zero; minutes and seconds always appear.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{}h", hours));
    }
    parts.push(format!("{}m", minutes));
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}
