use chrono::{DateTime, Local};

/// One line of the calculation log.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub input: String,
    pub result: Result<String, String>,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(input: impl Into<String>, result: Result<String, String>) -> Self {
        HistoryEntry {
            input: input.into(),
            result,
            timestamp: Local::now(),
        }
    }

    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Append-only log; the engine never touches it.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_clear() {
        let mut history = History::new();
        history.push(HistoryEntry::new("1 + 1", Ok("2".to_string())));
        history.push(HistoryEntry::new("1 / 0", Err("division by zero".to_string())));
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].input, "1 + 1");
        assert_eq!(history.last().map(|e| e.result.is_err()), Some(true));

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut history = History::new();
        for i in 0..5 {
            history.push(HistoryEntry::new(i.to_string(), Ok(i.to_string())));
        }
        let inputs: Vec<&str> = history.entries().iter().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, vec!["0", "1", "2", "3", "4"]);
        assert!(history.entries()[0].timestamp <= history.entries()[4].timestamp);
    }

    #[test]
    fn test_time_label_shape() {
        let entry = HistoryEntry::new("2", Ok("2".to_string()));
        assert_eq!(entry.time_label().len(), 8);
    }
}
