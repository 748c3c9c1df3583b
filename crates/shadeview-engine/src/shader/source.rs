use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use super::validate::{FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Pipeline stage a shader file provides.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderRole {
    Vertex,
    Fragment,
}

impl ShaderRole {
    /// Both roles, in the order they are checked for changes.
    pub const ALL: [ShaderRole; 2] = [ShaderRole::Vertex, ShaderRole::Fragment];

    /// WGSL entry point expected for this role.
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderRole::Vertex => VERTEX_ENTRY,
            ShaderRole::Fragment => FRAGMENT_ENTRY,
        }
    }

    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderRole::Vertex => naga::ShaderStage::Vertex,
            ShaderRole::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderRole::Vertex => f.write_str("vertex"),
            ShaderRole::Fragment => f.write_str("fragment"),
        }
    }
}

/// A tracked shader file and the modification time of its last good load.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    role: ShaderRole,
    path: PathBuf,

    /// `None` until the first successful load.
    last_modified: Option<SystemTime>,
}

impl ShaderSource {
    pub fn new(role: ShaderRole, path: impl Into<PathBuf>) -> Self {
        Self {
            role,
            path: path.into(),
            last_modified: None,
        }
    }

    pub fn role(&self) -> ShaderRole {
        self.role
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time recorded at the last successful load.
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// Reads the shader text from disk.
    pub fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {} shader {}", self.role, self.path.display()))
    }

    /// Stats the file and returns its current modification time.
    pub fn modified_time(&self) -> Result<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .with_context(|| format!("failed to stat {}", self.path.display()))
    }

    /// True when the file's modification time differs from the recorded one.
    pub fn is_stale(&self) -> Result<bool> {
        Ok(Some(self.modified_time()?) != self.last_modified)
    }

    pub(crate) fn stamp(&mut self, modified: SystemTime) {
        self.last_modified = Some(modified);
    }
}
