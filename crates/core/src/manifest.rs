//! Manifest version handling
//!
//! Reads and rewrites the JSON manifests that carry the project's semantic
//! version. Only the `version` field is touched; the other fields and their
//! order are preserved, though formatting is normalized to pretty-printed
//! JSON on save.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::types::{SluiceError, SluiceResult};

/// The three supported increment categories. There are no arbitrary version
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

/// A parsed semantic version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn bump(self, kind: BumpKind) -> Version {
        match kind {
            BumpKind::Patch => Version {
                patch: self.patch + 1,
                ..self
            },
            BumpKind::Minor => Version {
                minor: self.minor + 1,
                patch: 0,
                ..self
            },
            BumpKind::Major => Version {
                major: self.major + 1,
                minor: 0,
                patch: 0,
            },
        }
    }
}

impl FromStr for Version {
    type Err = SluiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let mut next = |label: &str| -> SluiceResult<u64> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| SluiceError::Version(format!("Invalid {label} in version '{s}'")))
        };
        Ok(Version {
            major: next("major")?,
            minor: next("minor")?,
            patch: next("patch")?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One manifest file with a top-level `version` string.
pub struct Manifest {
    path: PathBuf,
    document: serde_json::Value,
}

impl Manifest {
    pub fn load(path: &Path) -> SluiceResult<Self> {
        let contents = fs::read_to_string(path)?;
        let document = serde_json::from_str(&contents)?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn version(&self) -> SluiceResult<Version> {
        self.document
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SluiceError::Version(format!(
                    "Manifest {} has no version field",
                    self.path.display()
                ))
            })?
            .parse()
    }

    pub fn set_version(&mut self, version: &Version) -> SluiceResult<()> {
        let object = self.document.as_object_mut().ok_or_else(|| {
            SluiceError::Version(format!(
                "Manifest {} is not a JSON object",
                self.path.display()
            ))
        })?;
        object.insert(
            "version".to_string(),
            serde_json::Value::String(version.to_string()),
        );
        Ok(())
    }

    /// Rewrite the manifest in place.
    pub fn save(&self) -> SluiceResult<()> {
        let mut contents = serde_json::to_string_pretty(&self.document)?;
        contents.push('\n');
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
