//! Finding types collected during a scan run.
//!
//! Every non-fatal problem discovered while scanning is recorded as a
//! [`Finding`] and flushed together at the end of the run, so output ordering
//! does not depend on how files were processed. Each finding is self-contained
//! with all information needed by the reporter (CLI) and the advisory
//! artifact writers.

use enum_dispatch::enum_dispatch;

// ============================================================
// Severity and location
// ============================================================

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Extraction of a call or file was abandoned.
    Error,
    /// Extraction continued, possibly with degraded output.
    Warning,
    /// Purely advisory, produced by the linter.
    Advice,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Advice => write!(f, "advice"),
        }
    }
}

/// A position in a scanned source file (1-indexed line and column).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file_path, self.line, self.column)
    }
}

// ============================================================
// Finding types
// ============================================================

/// Two different sentences hashed to the same key.
///
/// The earlier sentence stays in the registry; both occurrences are still
/// emitted under the shared key. The file path arrives after the hash was
/// computed, so it may be absent for collisions raised outside a file scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollisionFinding {
    /// File being scanned when the collision surfaced, when known.
    pub file_path: Option<String>,
    pub key: String,
    /// Sentence that first claimed the key.
    pub first_text: String,
    /// Sentence that collided and was not recorded.
    pub new_text: String,
}

impl Report for KeyCollisionFinding {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn classifier(&self) -> &'static str {
        "key-collision"
    }

    fn location(&self) -> Option<&SourceLocation> {
        None
    }

    fn message(&self) -> String {
        let place = self.file_path.as_deref().unwrap_or("<unknown file>");
        format!(
            "same sentence in different forms found in {} for key {}:\n    \"{}\"\n    \"{}\"",
            place, self.key, self.first_text, self.new_text
        )
    }
}

/// An interpolation or options argument was not a statically analyzable
/// literal, template, or flat object literal. It contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedExpressionFinding {
    pub location: SourceLocation,
}

impl Report for UnsupportedExpressionFinding {
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn classifier(&self) -> &'static str {
        "unsupported-expression"
    }

    fn location(&self) -> Option<&SourceLocation> {
        Some(&self.location)
    }

    fn message(&self) -> String {
        "unsupported expression, only static values or {{interpolation}} blocks are supported"
            .to_string()
    }
}

/// A source file or an isolated options fragment failed to parse.
/// The surrounding scan continues; only this call or file is abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailureFinding {
    pub location: SourceLocation,
    /// The offending fragment, when the failure came from an options object.
    pub snippet: Option<String>,
    pub detail: String,
}

impl Report for ParseFailureFinding {
    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn classifier(&self) -> &'static str {
        "parse-failure"
    }

    fn location(&self) -> Option<&SourceLocation> {
        Some(&self.location)
    }

    fn message(&self) -> String {
        match &self.snippet {
            Some(snippet) => format!("unable to parse code \"{}\": {}", snippet, self.detail),
            None => format!("unable to parse file: {}", self.detail),
        }
    }
}

/// Classifier for advisory linter findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LintKind {
    BareTextInScript,
    BareTextInMarkup,
    BareTextInTemplate,
    HardCodedDomain,
    StringConcatenation,
}

impl LintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LintKind::BareTextInScript => "bare-text-in-script",
            LintKind::BareTextInMarkup => "bare-text-in-markup",
            LintKind::BareTextInTemplate => "bare-text-in-template",
            LintKind::HardCodedDomain => "hard-coded-domain",
            LintKind::StringConcatenation => "string-concatenation",
        }
    }

    /// Bare-text classifiers count toward the "unmarked" statistic.
    pub fn is_bare_text(self) -> bool {
        matches!(
            self,
            LintKind::BareTextInScript | LintKind::BareTextInMarkup | LintKind::BareTextInTemplate
        )
    }
}

/// A single advisory finding from the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub location: SourceLocation,
    pub kind: LintKind,
    /// The offending source text.
    pub text: String,
}

impl Report for LintFinding {
    fn severity(&self) -> Severity {
        Severity::Advice
    }

    fn classifier(&self) -> &'static str {
        self.kind.as_str()
    }

    fn location(&self) -> Option<&SourceLocation> {
        Some(&self.location)
    }

    fn message(&self) -> String {
        format!("{}: \"{}\"", self.kind.as_str(), self.text)
    }
}

// ============================================================
// Dispatch
// ============================================================

/// Common reporting interface over all finding types.
#[enum_dispatch]
pub trait Report {
    fn severity(&self) -> Severity;
    fn classifier(&self) -> &'static str;
    fn location(&self) -> Option<&SourceLocation>;
    fn message(&self) -> String;
}

/// Any finding produced during a run.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    KeyCollision(KeyCollisionFinding),
    UnsupportedExpression(UnsupportedExpressionFinding),
    ParseFailure(ParseFailureFinding),
    Lint(LintFinding),
}

// ============================================================
// Collector
// ============================================================

/// Per-run finding collector.
///
/// Owned by the scan session and passed explicitly through the pipeline so
/// the engine stays reentrant. Findings are only ever appended.
#[derive(Debug, Default)]
pub struct Diagnostics {
    findings: Vec<Finding>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: impl Into<Finding>) {
        self.findings.push(finding.into());
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    /// Findings ordered by file, line, column, then classifier, for
    /// reproducible end-of-run output. Findings without a location sort first.
    pub fn sorted(&self) -> Vec<&Finding> {
        let mut sorted: Vec<&Finding> = self.findings.iter().collect();
        sorted.sort_by(|a, b| {
            (a.location().cloned(), a.classifier()).cmp(&(b.location().cloned(), b.classifier()))
        });
        sorted
    }

    /// All advisory findings of the given kind, in sorted order.
    pub fn lint_findings(&self, kind: LintKind) -> Vec<&LintFinding> {
        self.lint_findings_where(|k| k == kind)
    }

    /// All advisory findings matching a kind predicate, in sorted order.
    pub fn lint_findings_where(&self, pred: impl Fn(LintKind) -> bool) -> Vec<&LintFinding> {
        let mut found: Vec<&LintFinding> = self
            .findings
            .iter()
            .filter_map(|f| match f {
                Finding::Lint(l) if pred(l.kind) => Some(l),
                _ => None,
            })
            .collect();
        found.sort_by(|a, b| (&a.location, a.kind).cmp(&(&b.location, b.kind)));
        found
    }

    /// Number of bare-text advisory findings (the "unmarked" statistic).
    pub fn unmarked_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::Lint(l) if l.kind.is_bare_text()))
            .count()
    }

    /// Number of findings with the given severity.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity() == severity)
            .count()
    }
}
