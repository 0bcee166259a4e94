//! Issue filtering and the buffering collector.
//!
//! Filters are composable predicates over [`IssueInstance`]; the collector
//! buffers everything that passes its filter chain and flushes in a
//! deterministic order keyed by `(file, zero-padded line, type, message)`.

use crate::config::Config;
use crate::issue::{IssueCategory, IssueInstance};
use std::collections::BTreeMap;

/// A predicate over issue instances.
pub trait IssueFilter: Send + Sync {
    fn accepts(&self, instance: &IssueInstance) -> bool;
}

/// Passes issues at or above a minimum severity.
pub struct MinimumSeverityFilter {
    pub minimum: u8,
}

impl IssueFilter for MinimumSeverityFilter {
    fn accepts(&self, instance: &IssueInstance) -> bool {
        instance.issue.severity.as_u8() >= self.minimum
    }
}

/// Passes issues whose category intersects a mask.
pub struct CategoryFilter {
    pub mask: IssueCategory,
}

impl IssueFilter for CategoryFilter {
    fn accepts(&self, instance: &IssueInstance) -> bool {
        self.mask.intersects(instance.issue.category)
    }
}

/// Passes issues from an allow-listed set of files.
pub struct FileFilter {
    pub files: Vec<String>,
}

impl IssueFilter for FileFilter {
    fn accepts(&self, instance: &IssueInstance) -> bool {
        self.files.iter().any(|f| f == &instance.file)
    }
}

/// Global suppress-list / whitelist filter from the configuration.
///
/// A non-empty whitelist means only whitelisted types pass; the suppress
/// list is consulted independently of it.
pub struct SuppressionFilter {
    suppress: Vec<String>,
    whitelist: Vec<String>,
}

impl SuppressionFilter {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            suppress: config.suppress_issue_types.clone(),
            whitelist: config.whitelist_issue_types.clone(),
        }
    }
}

impl IssueFilter for SuppressionFilter {
    fn accepts(&self, instance: &IssueInstance) -> bool {
        let name = instance.issue.name;
        if self.suppress.iter().any(|s| s == name) {
            return false;
        }
        if !self.whitelist.is_empty() && !self.whitelist.iter().any(|s| s == name) {
            return false;
        }
        true
    }
}

/// A buffering collector.
///
/// Instances that pass every filter are stored under a sort key of
/// `(file, line zero-padded to 5 digits, issue type, rendered message)`;
/// flushing therefore yields the lexicographic order and collapses exact
/// duplicates.
#[derive(Default)]
pub struct Collector {
    filters: Vec<Box<dyn IssueFilter>>,
    buffer: BTreeMap<String, IssueInstance>,
}

impl Collector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Box<dyn IssueFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn add_filter(&mut self, filter: Box<dyn IssueFilter>) {
        self.filters.push(filter);
    }

    pub fn collect(&mut self, instance: IssueInstance) {
        if !self.filters.iter().all(|f| f.accepts(&instance)) {
            return;
        }
        let key = format!(
            "{}|{:05}|{}|{}",
            instance.file,
            instance.line,
            instance.issue.name,
            instance.message()
        );
        self.buffer.entry(key).or_insert(instance);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Drain the buffer in sorted order.
    pub fn flush(&mut self) -> Vec<IssueInstance> {
        std::mem::take(&mut self.buffer).into_values().collect()
    }

    /// Merge another collector's buffered issues into this one, re-applying
    /// this collector's filters. Used when joining per-worker results.
    pub fn absorb(&mut self, other: &mut Collector) {
        for instance in other.flush() {
            self.collect(instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::catalog;

    fn instance(file: &str, line: u32, issue: &'static crate::issue::Issue) -> IssueInstance {
        IssueInstance::new(issue, file, line, vec!["\\X".into()])
    }

    #[test]
    fn flush_is_sorted_by_file_line_type_message() {
        let mut collector = Collector::new();
        collector.collect(instance("b.php", 3, &catalog::UNDECLARED_CLASS));
        collector.collect(instance("a.php", 20, &catalog::UNDECLARED_CLASS));
        collector.collect(instance("a.php", 3, &catalog::UNDECLARED_CLASS));
        let flushed = collector.flush();
        let order: Vec<(String, u32)> = flushed.iter().map(|i| (i.file.clone(), i.line)).collect();
        assert_eq!(
            order,
            vec![
                ("a.php".to_owned(), 3),
                ("a.php".to_owned(), 20),
                ("b.php".to_owned(), 3)
            ]
        );
    }

    #[test]
    fn line_padding_keeps_numeric_order() {
        let mut collector = Collector::new();
        collector.collect(instance("a.php", 100, &catalog::UNDECLARED_CLASS));
        collector.collect(instance("a.php", 9, &catalog::UNDECLARED_CLASS));
        let flushed = collector.flush();
        assert_eq!(flushed[0].line, 9);
        assert_eq!(flushed[1].line, 100);
    }

    #[test]
    fn duplicates_collapse() {
        let mut collector = Collector::new();
        collector.collect(instance("a.php", 1, &catalog::UNDECLARED_CLASS));
        collector.collect(instance("a.php", 1, &catalog::UNDECLARED_CLASS));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn severity_filter_drops_low() {
        let mut collector = Collector::new().with_filter(Box::new(MinimumSeverityFilter {
            minimum: 5,
        }));
        collector.collect(instance("a.php", 1, &catalog::NOOP_ARRAY));
        collector.collect(instance("a.php", 2, &catalog::UNDECLARED_CLASS));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn whitelist_only_passes_whitelisted() {
        let filter = SuppressionFilter {
            suppress: vec![],
            whitelist: vec!["PhanUndeclaredClass".to_owned()],
        };
        assert!(filter.accepts(&instance("a.php", 1, &catalog::UNDECLARED_CLASS)));
        assert!(!filter.accepts(&instance("a.php", 1, &catalog::NOOP_ARRAY)));
    }

    #[test]
    fn suppress_list_wins_over_whitelist() {
        let filter = SuppressionFilter {
            suppress: vec!["PhanUndeclaredClass".to_owned()],
            whitelist: vec!["PhanUndeclaredClass".to_owned()],
        };
        assert!(!filter.accepts(&instance("a.php", 1, &catalog::UNDECLARED_CLASS)));
    }
}
