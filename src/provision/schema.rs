//! Baseline schema script loading.

use super::ProvisionError;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

/// Where the baseline schema script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// A script file on disk, read when provisioning starts.
    File(Utf8PathBuf),
    /// A script already held in memory.
    Script(String),
}

impl SchemaSource {
    /// Returns the script text.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::SchemaFileMissing`] when the file cannot be
    /// opened or read.
    pub fn load(&self) -> Result<String, ProvisionError> {
        match self {
            Self::File(path) => read_script(path).map_err(|source| {
                ProvisionError::SchemaFileMissing {
                    path: path.clone(),
                    source,
                }
            }),
            Self::Script(sql) => Ok(sql.clone()),
        }
    }
}

impl From<Utf8PathBuf> for SchemaSource {
    fn from(path: Utf8PathBuf) -> Self {
        Self::File(path)
    }
}

fn read_script(path: &Utf8Path) -> std::io::Result<String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::other("schema path must include a file name"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}
