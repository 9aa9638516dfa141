//! verstamp Core Library
//!
//! Build-identity resolution: determines the branch and commit a build was
//! produced from (CI environment variables first, git fallbacks second) and
//! encodes semantic versions as a canonical string plus a sortable 64-bit
//! code.

pub mod ci;
pub mod error;
pub mod exec;
pub mod provenance;
pub mod version;

pub use ci::CiProvider;
pub use error::{Result, VersionError};
pub use exec::{CommandOutput, CommandRunner, ShellRunner};
pub use provenance::{resolve, resolve_with, Provenance, UNKNOWN};
pub use version::{
    build_time_now, Identifier, Metadata, Semantic, DEFAULT_BRANCH_DENYLIST, MAX_BUILD_NUMBER,
    MAX_MAJOR, MAX_MINOR, MAX_PATCH,
};
