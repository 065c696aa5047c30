use std::collections::HashMap;
use std::fmt::Debug;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::ZigguratError;
use crate::ZigguratResult;

/// Reads template source for a path.
pub trait Loader: Debug {
	fn load(&self, path: &Path) -> ZigguratResult<String>;
}

/// Loads UTF-8 templates from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl Loader for FileLoader {
	fn load(&self, path: &Path) -> ZigguratResult<String> {
		std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == io::ErrorKind::NotFound {
				ZigguratError::TemplateNotFound {
					path: path.display().to_string(),
				}
			} else {
				ZigguratError::Io(e)
			}
		})
	}
}

/// Serves templates from memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
	templates: HashMap<PathBuf, String>,
}

impl MemoryLoader {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
		self.insert(path, source);
		self
	}

	pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) {
		self.templates.insert(path.into(), source.into());
	}
}

impl Loader for MemoryLoader {
	fn load(&self, path: &Path) -> ZigguratResult<String> {
		self.templates.get(path).cloned().ok_or_else(|| {
			ZigguratError::TemplateNotFound {
				path: path.display().to_string(),
			}
		})
	}
}
