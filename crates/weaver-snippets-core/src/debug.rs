//! Diagnostic report for the manually invoked debug entry point.

use std::fmt;

use crate::dictionary::SnippetDictionary;
use crate::types::Snippet;

/// Snapshot of expander state for printing.
#[derive(Clone, Debug)]
pub struct DebugReport {
    pub snippets: Vec<Snippet>,
    /// Nodes currently matching the candidate selector.
    pub candidate_count: usize,
    /// Surfaces with listeners attached.
    pub registered_count: usize,
}

impl DebugReport {
    pub fn new(dictionary: &SnippetDictionary, candidate_count: usize, registered_count: usize) -> Self {
        Self {
            snippets: dictionary.snippets().to_vec(),
            candidate_count,
            registered_count,
        }
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Weaver Snippets Debug Info ===")?;
        writeln!(f, "Snippets loaded: {}", self.snippets.len())?;
        for snippet in &self.snippets {
            if snippet.name.is_empty() {
                writeln!(f, "  {} -> {:?}", snippet.shortcut, snippet.text)?;
            } else {
                writeln!(f, "  {} ({}) -> {:?}", snippet.shortcut, snippet.name, snippet.text)?;
            }
        }
        writeln!(
            f,
            "Candidate surfaces: {} ({} registered)",
            self.candidate_count, self.registered_count
        )?;
        match self.snippets.first() {
            Some(first) => writeln!(f, "Test this: type {:?} followed by space", first.shortcut.as_str())?,
            None => writeln!(f, "No snippets found. Add some in the extension popup first.")?,
        }
        write!(f, "==================================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_with_snippets() {
        let dictionary: SnippetDictionary = vec![
            Snippet::new(";br", "Best regards,\nJane").with_name("Sign-off"),
            Snippet::new(";ty", "Thank you!"),
        ]
        .into();
        let report = DebugReport::new(&dictionary, 4, 3);
        insta::assert_snapshot!(report.to_string(), @r#"
        === Weaver Snippets Debug Info ===
        Snippets loaded: 2
          ;br (Sign-off) -> "Best regards,\nJane"
          ;ty -> "Thank you!"
        Candidate surfaces: 4 (3 registered)
        Test this: type ";br" followed by space
        ==================================
        "#);
    }

    #[test]
    fn test_report_without_snippets() {
        let report = DebugReport::new(&SnippetDictionary::new(), 0, 0);
        insta::assert_snapshot!(report.to_string(), @r"
        === Weaver Snippets Debug Info ===
        Snippets loaded: 0
        Candidate surfaces: 0 (0 registered)
        No snippets found. Add some in the extension popup first.
        ==================================
        ");
    }
}
