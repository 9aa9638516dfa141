//! Semantic version encoding: canonical display string plus a sortable
//! 64-bit code.
//!
//! The code packs the version fields into decimal bands
//! (`major*10^12 + minor*10^9 + patch*10^6 + ordinal*10^5 + build_number`),
//! so numeric ordering of codes matches version precedence as long as each
//! field stays inside its band. [`Semantic::new`] and
//! [`Semantic::with_metadata`] reject out-of-band fields up front rather
//! than letting a silently corrupt code escape.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VersionError};
use crate::provenance::Provenance;

const MAJOR_MULTIPLIER: i64 = 1_000_000_000_000;
const MINOR_MULTIPLIER: i64 = 1_000_000_000;
const PATCH_MULTIPLIER: i64 = 1_000_000;
const IDENTIFIER_MULTIPLIER: i64 = 100_000;

/// Everything the bands below major can contribute to a code: minor and
/// patch at 999, the Snapshot ordinal, the build number at 99 999.
const MAX_LOWER_FIELDS: i64 = MAX_MINOR as i64 * MINOR_MULTIPLIER
    + MAX_PATCH as i64 * PATCH_MULTIPLIER
    + (Identifier::Snapshot as i64) * IDENTIFIER_MULTIPLIER
    + MAX_BUILD_NUMBER as i64;

/// Largest major that keeps the code inside `i64` even with every lower
/// field at its band maximum (9_223_371).
pub const MAX_MAJOR: u64 = ((i64::MAX - MAX_LOWER_FIELDS) / MAJOR_MULTIPLIER) as u64;

/// Largest minor that stays under the patch band.
pub const MAX_MINOR: u64 = 999;

/// Largest patch that stays under the identifier band.
pub const MAX_PATCH: u64 = 999;

/// Largest build number that stays under the identifier band.
pub const MAX_BUILD_NUMBER: u32 = 99_999;

/// Branch names omitted from build metadata unless the caller overrides
/// the denylist: auto-built trunk versions carry no useful branch signal.
pub const DEFAULT_BRANCH_DENYLIST: &[&str] = &["main"];

/// Pre-release stage of a version. Declaration order is the ordinal used
/// by [`Semantic::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Identifier {
    Alpha,
    Beta,
    Rc,
    Release,
    Snapshot,
}

impl Identifier {
    /// Zero-based position in the declared enumeration order.
    pub fn ordinal(self) -> i64 {
        self as i64
    }

    /// Lowercase name, as used in the pre-release suffix and by `FromStr`.
    pub fn lowercase(self) -> &'static str {
        match self {
            Identifier::Alpha => "alpha",
            Identifier::Beta => "beta",
            Identifier::Rc => "rc",
            Identifier::Release => "release",
            Identifier::Snapshot => "snapshot",
        }
    }
}

impl FromStr for Identifier {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "alpha" => Ok(Identifier::Alpha),
            "beta" => Ok(Identifier::Beta),
            "rc" => Ok(Identifier::Rc),
            "release" => Ok(Identifier::Release),
            "snapshot" => Ok(Identifier::Snapshot),
            other => Err(VersionError::UnknownIdentifier(other.to_string())),
        }
    }
}

/// Build metadata attached to a version. Every field is optional and the
/// value itself carries no invariants; bounds are enforced where the
/// metadata meets the encoder, in [`Semantic::with_metadata`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Incremental build sequence number.
    pub build_number: Option<u32>,

    /// Short git commit sha the build was produced from.
    pub git_sha: Option<String>,

    /// Git branch the build was produced from.
    pub git_branch: Option<String>,

    /// Hour-granularity build timestamp, `YYYYMMDDHH`.
    pub build_time: Option<String>,
}

impl Metadata {
    /// Metadata carrying resolved provenance plus a build number.
    pub fn from_provenance(provenance: &Provenance, build_number: Option<u32>) -> Self {
        Self {
            build_number,
            git_sha: Some(provenance.sha.clone()),
            git_branch: Some(provenance.branch.clone()),
            build_time: None,
        }
    }

    /// Set the build timestamp to the current local hour.
    pub fn with_build_time_now(mut self) -> Self {
        self.build_time = Some(build_time_now());
        self
    }
}

/// Current local time at hour granularity, the format build timestamps use.
pub fn build_time_now() -> String {
    chrono::Local::now().format("%Y%m%d%H").to_string()
}

/// An immutable semantic version.
///
/// Constructed through [`Semantic::new`] so out-of-band fields are rejected
/// before they can corrupt [`Semantic::code`] ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semantic {
    major: u64,
    minor: u64,
    patch: u64,
    identifier: Option<Identifier>,
    metadata: Option<Metadata>,
}

impl Semantic {
    /// Create a version from its numeric triple.
    ///
    /// Rejects `major > 9_223_371`, `minor > 999` or `patch > 999` with
    /// [`VersionError::FieldOutOfRange`].
    pub fn new(major: u64, minor: u64, patch: u64) -> Result<Self> {
        if major > MAX_MAJOR {
            return Err(VersionError::FieldOutOfRange {
                field: "major",
                value: major,
                max: MAX_MAJOR,
            });
        }
        if minor > MAX_MINOR {
            return Err(VersionError::FieldOutOfRange {
                field: "minor",
                value: minor,
                max: MAX_MINOR,
            });
        }
        if patch > MAX_PATCH {
            return Err(VersionError::FieldOutOfRange {
                field: "patch",
                value: patch,
                max: MAX_PATCH,
            });
        }
        Ok(Self {
            major,
            minor,
            patch,
            identifier: None,
            metadata: None,
        })
    }

    /// Attach a pre-release identifier.
    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Attach build metadata.
    ///
    /// Rejects `build_number > 99_999`, which would overflow the
    /// identifier band of the code.
    pub fn with_metadata(mut self, metadata: Metadata) -> Result<Self> {
        if let Some(n) = metadata.build_number {
            if n > MAX_BUILD_NUMBER {
                return Err(VersionError::FieldOutOfRange {
                    field: "build_number",
                    value: n as u64,
                    max: MAX_BUILD_NUMBER as u64,
                });
            }
        }
        self.metadata = Some(metadata);
        Ok(self)
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn identifier(&self) -> Option<Identifier> {
        self.identifier
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Canonical display string, using [`DEFAULT_BRANCH_DENYLIST`].
    pub fn name(&self) -> String {
        self.format_with_denylist(DEFAULT_BRANCH_DENYLIST)
    }

    /// Canonical display string with a caller-supplied branch denylist.
    ///
    /// `"{major}.{minor}.{patch}"`, then a pre-release suffix (empty for
    /// Release or no identifier, the literal `-SNAPSHOT` for Snapshot,
    /// `-{lowercase}` otherwise), then build metadata. Metadata is only
    /// emitted for Alpha, Beta, Rc and Snapshot: `+` then the present
    /// entries joined by `.`, in the order build number (if > 0), build
    /// time, branch (if not denylisted and without a `/`), sha.
    pub fn format_with_denylist(&self, denylist: &[&str]) -> String {
        format!(
            "{}.{}.{}{}{}",
            self.major,
            self.minor,
            self.patch,
            self.pre_release(),
            self.build_metadata(denylist)
        )
    }

    /// Unique, sortable numeric code.
    ///
    /// Ordering matches version precedence by (major, minor, patch,
    /// identifier ordinal, build number) given the construction bounds.
    pub fn code(&self) -> i64 {
        let ordinal = self.identifier.map_or(0, Identifier::ordinal);
        let build_number = self
            .metadata
            .as_ref()
            .and_then(|m| m.build_number)
            .unwrap_or(0) as i64;
        self.major as i64 * MAJOR_MULTIPLIER
            + self.minor as i64 * MINOR_MULTIPLIER
            + self.patch as i64 * PATCH_MULTIPLIER
            + ordinal * IDENTIFIER_MULTIPLIER
            + build_number
    }

    fn pre_release(&self) -> String {
        match self.identifier {
            None | Some(Identifier::Release) => String::new(),
            // Fixed literal, not the lowercase rule.
            Some(Identifier::Snapshot) => "-SNAPSHOT".to_string(),
            Some(id) => format!("-{}", id.lowercase()),
        }
    }

    fn build_metadata(&self, denylist: &[&str]) -> String {
        match self.identifier {
            Some(Identifier::Alpha)
            | Some(Identifier::Beta)
            | Some(Identifier::Rc)
            | Some(Identifier::Snapshot) => {}
            // Release and absent never emit metadata.
            _ => return String::new(),
        }
        let Some(meta) = &self.metadata else {
            return String::new();
        };

        let build_number = meta.build_number.filter(|n| *n > 0).map(|n| n.to_string());
        let branch = meta
            .git_branch
            .as_deref()
            .filter(|b| !denylist.contains(b) && !b.contains('/'));

        let mut out = String::new();
        let mut separator = '+';
        let segments = [
            build_number.as_deref(),
            meta.build_time.as_deref(),
            branch,
            meta.git_sha.as_deref(),
        ];
        for segment in segments.into_iter().flatten() {
            out.push(separator);
            out.push_str(segment);
            separator = '.';
        }
        out
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
