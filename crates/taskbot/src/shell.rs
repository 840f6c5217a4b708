//! Line-oriented bot session over stdin.
//!
//! Each line is `[<user_id>] /command args...`. Lines that start with `/`
//! use the default user given on the command line.

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::bot::Bot;

/// Split a shell line into the acting user and the message.
pub fn parse_shell_line(line: &str, default_user: Option<i64>) -> Result<(i64, &str), String> {
    let line = line.trim();
    if line.starts_with('/') {
        return default_user
            .map(|user| (user, line))
            .ok_or_else(|| "No user given; start the line with a user id or pass --user".to_string());
    }

    let (first, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let user = first
        .parse::<i64>()
        .map_err(|_| format!("Invalid user id: {}", first))?;
    Ok((user, rest.trim_start()))
}

pub async fn run_shell(bot: &Bot, default_user: Option<i64>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_shell_line(&line, default_user) {
            Ok((user_id, message)) => match bot.handle(user_id, message).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!("Command failed for user {}: {:#}", user_id, e);
                    format!("{} {:#}", "error:".bright_red(), e)
                }
            },
            Err(msg) => format!("{} {}", "error:".bright_red(), msg),
        };

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
