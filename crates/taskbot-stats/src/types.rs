use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Fields pulled out of one structured usage line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub user_ids: Vec<i64>,
    /// Command names with the leading `/` removed. Never empty.
    pub commands: Vec<String>,
}

/// Occurrences of one command across a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandCount {
    pub command: String,
    pub count: usize,
}

/// Aggregate usage statistics over a set of log files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub unique_users: BTreeSet<i64>,
    /// Commands in the order they were first seen.
    pub commands: Vec<CommandCount>,
    /// Sum of the on-disk sizes of every matched file.
    pub total_bytes: u64,
    pub files_matched: usize,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LogStats {
    /// Fold one extracted event into the summary.
    pub fn record(&mut self, event: &UsageEvent) {
        self.unique_users.extend(event.user_ids.iter().copied());
        for command in &event.commands {
            self.record_command(command);
        }
    }

    pub fn record_command(&mut self, command: &str) {
        match self.index.get(command) {
            Some(&i) => self.commands[i].count += 1,
            None => {
                self.index.insert(command.to_string(), self.commands.len());
                self.commands.push(CommandCount {
                    command: command.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn count(&self, command: &str) -> usize {
        self.index
            .get(command)
            .map(|&i| self.commands[i].count)
            .unwrap_or(0)
    }

    pub fn command_counts(&self) -> BTreeMap<String, usize> {
        self.commands
            .iter()
            .map(|c| (c.command.clone(), c.count))
            .collect()
    }

    /// The `n` most used commands, highest count first. Equal counts keep
    /// the order in which the commands were first seen.
    pub fn top_commands(&self, n: usize) -> Vec<CommandCount> {
        let mut sorted = self.commands.clone();
        // sort_by is stable
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.truncate(n);
        sorted
    }

    pub fn total_kb(&self) -> f64 {
        self.total_bytes as f64 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_from(commands: &[&str]) -> LogStats {
        let mut stats = LogStats::default();
        for c in commands {
            stats.record_command(c);
        }
        stats
    }

    #[test]
    fn test_top_commands_breaks_ties_by_first_seen() {
        let stats = stats_from(&["weather", "todo", "rate", "todo", "rate", "help"]);

        let top = stats.top_commands(10);
        let names: Vec<&str> = top.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(names, vec!["todo", "rate", "weather", "help"]);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[2].count, 1);
    }

    #[test]
    fn test_top_commands_truncates() {
        let stats = stats_from(&["a", "b", "b", "c"]);
        let top = stats.top_commands(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].command, "b");
        assert_eq!(top[1].command, "a");
    }

    #[test]
    fn test_record_event() {
        let mut stats = LogStats::default();
        stats.record(&UsageEvent {
            user_ids: vec![1],
            commands: vec!["todo".to_string()],
        });
        stats.record(&UsageEvent {
            user_ids: vec![1, 4],
            commands: Vec::new(),
        });
        stats.record(&UsageEvent {
            user_ids: Vec::new(),
            commands: vec!["todo".to_string(), "help".to_string()],
        });

        assert_eq!(stats.unique_users.iter().copied().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(stats.count("todo"), 2);
        assert_eq!(stats.count("help"), 1);
    }
}
