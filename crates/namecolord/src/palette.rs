use std::collections::{HashMap, HashSet};
use std::fmt;

use hostproto::RoleDef;

use crate::catalog::RoleCatalog;

#[derive(Debug, Clone)]
pub enum ResolveError {
    /// Catalog entries with no matching host role, in catalog order.
    CatalogMismatch { missing: Vec<String> },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::CatalogMismatch { missing } => {
                write!(
                    f,
                    "roles file does not match host role setup; unmatched: {}",
                    missing.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {}

/// Immutable name -> hex color mapping, plus the host roles that exist but
/// are not color targets (staff roles and the like).
///
/// Color lookup is exact: a catalog entry is spelled one way. The
/// restricted set is case-folded: a protected role is refused however the
/// requester types it. The two comparisons differ on purpose.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: HashMap<String, String>, // name -> "rrggbb"
    non_color_lc: HashSet<String>,   // name_lc
}

impl Palette {
    /// Cross-reference the catalog against the host's live role setup.
    ///
    /// Fails when any catalog entry has no host counterpart; the palette
    /// is only usable when every listed color actually exists on the host.
    pub fn resolve(catalog: &RoleCatalog, host_roles: &[RoleDef]) -> Result<Self, ResolveError> {
        let mut colors = HashMap::new();
        let mut non_color_lc = HashSet::new();

        for role in host_roles {
            if catalog.contains(&role.name) {
                colors.insert(role.name.clone(), role.color.hex());
            } else {
                non_color_lc.insert(role.name.to_ascii_lowercase());
            }
        }

        if colors.len() != catalog.len() {
            let missing = catalog
                .names()
                .iter()
                .filter(|n| !colors.contains_key(*n))
                .cloned()
                .collect();
            return Err(ResolveError::CatalogMismatch { missing });
        }

        Ok(Self {
            colors,
            non_color_lc,
        })
    }

    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(|s| s.as_str())
    }

    pub fn is_restricted(&self, name: &str) -> bool {
        self.non_color_lc.contains(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
