//! Path pattern matching
//!
//! Patterns are regular expressions matched against the start of the request
//! path: a pattern matches when it matches some prefix of the path, it does
//! not have to consume the whole path.

use crate::error::{AlbatrossError, AlbatrossResult, ErrorContext, PatternKind};
use regex::RegexSet;

/// An immutable, ordered set of compiled path patterns
#[derive(Debug, Clone)]
pub struct PatternSet {
    sources: Vec<String>,
    set: RegexSet,
}

impl PatternSet {
    /// Compile every pattern eagerly; the first malformed one aborts compilation.
    pub fn compile<I, S>(patterns: I, kind: PatternKind) -> AlbatrossResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        // Validate one by one so the error names the offending entry. The bare
        // pattern is checked too: wrapping can make an unbalanced one parse.
        for (index, pattern) in sources.iter().enumerate() {
            let checked = regex::Regex::new(pattern).and_then(|_| regex::Regex::new(&anchored(pattern)));
            if let Err(e) = checked {
                return Err(AlbatrossError::InvalidPattern {
                    pattern: pattern.clone(),
                    kind,
                    index,
                    source: Box::new(e),
                    context: ErrorContext::new("pattern")
                        .with_operation("compile")
                        .with_suggestion("Patterns use Rust regex syntax; look-around is unsupported"),
                });
            }
        }

        let set = RegexSet::new(sources.iter().map(|p| anchored(p))).map_err(|e| {
            AlbatrossError::InvalidPattern {
                pattern: sources.join(", "),
                kind,
                index: 0,
                source: Box::new(e),
                context: ErrorContext::new("pattern").with_operation("compile_set"),
            }
        })?;

        Ok(Self { sources, set })
    }

    /// A set that matches nothing
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    /// True iff any pattern matches at the start of `path`
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// The first configured pattern (in configuration order) matching `path`
    pub fn first_match(&self, path: &str) -> Option<&str> {
        self.set
            .matches(path)
            .iter()
            .next()
            .map(|index| self.sources[index].as_str())
    }

    /// Source patterns in configuration order
    pub fn patterns(&self) -> &[String] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::empty()
    }
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})")
}
