//! Structured CPE 2.3 identifiers.
//!
//! A formatted-string CPE looks like
//! `cpe:2.3:a:vendor:product:version:update:edition:language:sw_edition:target_sw:target_hw:other`.
//! Only the positions up to `version` are required for grouping; the rest are
//! kept verbatim so a wildcard-normalized identifier can be re-rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CatalogError, ParseErrorKind};

/// Marker used for "any value" in a CPE component.
pub const WILDCARD: &str = "*";

/// Minimum number of colon-separated fields for a usable identifier
/// (`cpe`, format version, part, vendor, product, version).
pub const MIN_COMPONENTS: usize = 6;

const VERSION_INDEX: usize = 5;

/// A parsed CPE identifier.
///
/// Components are split on `:` positionally; escaped `\:` sequences are not
/// treated specially.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CpeName {
    components: Vec<String>,
}

impl CpeName {
    /// Parse an identifier, rejecting anything with fewer than six fields.
    pub fn parse(raw: &str) -> crate::error::Result<Self> {
        let components: Vec<String> = raw.split(':').map(str::to_string).collect();
        if components.len() < MIN_COMPONENTS {
            return Err(CatalogError::parse(
                "splitting CPE name",
                ParseErrorKind::InvalidCpe {
                    name: raw.to_string(),
                    reason: format!(
                        "expected at least {MIN_COMPONENTS} components, found {}",
                        components.len()
                    ),
                },
            ));
        }
        Ok(Self { components })
    }

    /// Part (`a`, `o` or `h`)
    pub fn part(&self) -> &str {
        &self.components[2]
    }

    pub fn vendor(&self) -> &str {
        &self.components[3]
    }

    pub fn product(&self) -> &str {
        &self.components[4]
    }

    pub fn version(&self) -> &str {
        &self.components[VERSION_INDEX]
    }

    /// Component at an arbitrary position, if present.
    pub fn component(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    /// Number of colon-separated fields.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always false; a parsed name has at least [`MIN_COMPONENTS`] fields.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns true when the version component is exactly `*`.
    pub fn is_wildcard_version(&self) -> bool {
        self.version() == WILDCARD
    }

    /// Copy of this identifier with the version component replaced by `*`.
    #[must_use]
    pub fn with_wildcard_version(&self) -> Self {
        let mut components = self.components.clone();
        components[VERSION_INDEX] = WILDCARD.to_string();
        Self { components }
    }

    /// (vendor, product) pair used to bucket hits.
    pub fn vendor_product(&self) -> (&str, &str) {
        (self.vendor(), self.product())
    }
}

impl fmt::Display for CpeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join(":"))
    }
}

impl FromStr for CpeName {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CpeName {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CpeName> for String {
    fn from(value: CpeName) -> Self {
        value.to_string()
    }
}
