use crate::types::UsageEvent;

/// Substring that marks a line as a structured usage event.
pub const STATS_MARKER: &str = "STATS user_id=";

const USER_ID_KEY: &str = "user_id=";
const COMMAND_KEY: &str = "command=";

/// Extract a usage event from one log line.
///
/// Lines without [`STATS_MARKER`] yield `None`. On marker lines every
/// whitespace-separated `user_id=` token that parses as an integer and every
/// non-empty `command=` token is kept, in line order. A token that does not
/// parse is dropped on its own.
pub fn parse_line(line: &str) -> Option<UsageEvent> {
    if !line.contains(STATS_MARKER) {
        return None;
    }

    let mut event = UsageEvent::default();

    for token in line.split_whitespace() {
        if let Some(value) = token.strip_prefix(USER_ID_KEY) {
            if let Ok(user_id) = value.parse::<i64>() {
                event.user_ids.push(user_id);
            }
        } else if let Some(value) = token.strip_prefix(COMMAND_KEY) {
            event.commands.extend(normalize_command(value));
        }
    }

    Some(event)
}

/// Drop one leading `/`; empty names are not commands.
fn normalize_command(raw: &str) -> Option<String> {
    let name = raw.strip_prefix('/').unwrap_or(raw);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands(line: &str) -> Vec<String> {
        parse_line(line).unwrap().commands
    }

    #[test]
    fn test_parse_full_line() {
        let line = "2026-01-20 10:00:00,123 | INFO | STATS user_id=42 command=/todo action=add";
        let event = parse_line(line).unwrap();
        assert_eq!(event.user_ids, vec![42]);
        assert_eq!(event.commands, vec!["todo"]);
    }

    #[test]
    fn test_line_without_marker_is_ignored() {
        assert_eq!(parse_line("INFO | Created forward button user_id=1"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_bad_user_id_keeps_command() {
        let event = parse_line("STATS user_id=abc command=/weather").unwrap();
        assert!(event.user_ids.is_empty());
        assert_eq!(event.commands, vec!["weather"]);
    }

    #[test]
    fn test_every_valid_token_is_collected() {
        let event = parse_line("STATS user_id=x1 user_id=5 user_id=6").unwrap();
        assert_eq!(event.user_ids, vec![5, 6]);

        let event = parse_line("STATS user_id=1 user_id=2 command=/todo command= command=/help").unwrap();
        assert_eq!(event.user_ids, vec![1, 2]);
        assert_eq!(event.commands, vec!["todo", "help"]);
    }

    #[test]
    fn test_missing_command() {
        let event = parse_line("STATS user_id=7").unwrap();
        assert_eq!(event.user_ids, vec![7]);
        assert!(event.commands.is_empty());
    }

    #[test]
    fn test_command_normalization() {
        assert_eq!(commands("STATS user_id=1 command=help"), vec!["help"]);
        // Only one slash is stripped
        assert_eq!(commands("STATS user_id=1 command=//odd"), vec!["/odd"]);
        assert!(commands("STATS user_id=1 command=/").is_empty());
        assert!(commands("STATS user_id=1 command=").is_empty());
    }

    #[test]
    fn test_negative_user_id() {
        let event = parse_line("STATS user_id=-1001234 command=/stats").unwrap();
        assert_eq!(event.user_ids, vec![-1001234]);
    }
}
