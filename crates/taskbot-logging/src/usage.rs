/// Tracing target for usage events.
pub const USAGE_TARGET: &str = "taskbot::usage";

/// Build the usage line body: `STATS user_id=<id> command=/<name>`, plus
/// ` action=<action>` when given. Leading slashes on `command` are
/// normalized to exactly one.
pub fn usage_message(user_id: i64, command: &str, action: Option<&str>) -> String {
    let command = command.trim_start_matches('/');
    match action {
        Some(action) => format!("STATS user_id={} command=/{} action={}", user_id, command, action),
        None => format!("STATS user_id={} command=/{}", user_id, command),
    }
}

/// Record that `user_id` ran `command`.
pub fn record_usage(user_id: i64, command: &str, action: Option<&str>) {
    tracing::info!(target: USAGE_TARGET, "{}", usage_message(user_id, command, action));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::sync::Mutex;

    use taskbot_stats::{parse_line, LogScanner};
    use tempfile::TempDir;

    #[test]
    fn test_usage_message_shape() {
        assert_eq!(
            usage_message(42, "/todo", Some("add")),
            "STATS user_id=42 command=/todo action=add"
        );
        assert_eq!(usage_message(7, "help", None), "STATS user_id=7 command=/help");
    }

    #[test]
    fn test_usage_message_round_trips_through_parser() {
        let event = parse_line(&usage_message(42, "/weather", None)).unwrap();
        assert_eq!(event.user_ids, vec![42]);
        assert_eq!(event.commands, vec!["weather"]);
    }

    #[test]
    fn test_recorded_lines_are_counted_by_scanner() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskbot.log");
        let file = File::create(&path).unwrap();

        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            record_usage(1, "/todo", Some("list"));
            record_usage(2, "/todo", Some("add"));
            record_usage(1, "/stats", None);
            tracing::info!("unrelated line");
        });

        let stats = LogScanner::with_pattern(format!("{}/taskbot.log*", dir.path().display()))
            .scan()
            .unwrap();

        assert_eq!(stats.unique_users.len(), 2);
        assert_eq!(stats.count("todo"), 2);
        assert_eq!(stats.count("stats"), 1);
        assert_eq!(stats.total_bytes, std::fs::metadata(&path).unwrap().len());
    }
}
