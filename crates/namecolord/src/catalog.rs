use std::path::Path;

use anyhow::Context;

/// Ordered list of role names eligible to act as name colors.
///
/// The backing file is one role per line. The first line is a header kept
/// for humans and skipped here; a trailing newline leaves one empty tail
/// entry, which is dropped. Order matters: it drives listing order and the
/// random-assignment index. Names are case-sensitive and taken verbatim.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    names: Vec<String>,
}

impl RoleCatalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read roles file {}", path.display()))?;
        Ok(Self::parse(&s))
    }

    pub fn parse(s: &str) -> Self {
        let mut names = s
            .split('\n')
            .skip(1)
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect::<Vec<_>>();
        if names.last().is_some_and(|l| l.is_empty()) {
            names.pop();
        }
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}
