//! Loader for configurations split across several files.
//!
//! A configuration may pull in other files with `include = [...]`. Every
//! top-level section must come from exactly one file so that merging never
//! silently overrides a value.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Configuration loader that handles multi-file configurations with includes.
pub struct ConfigLoader {
	/// Base path for resolving relative includes
	base_path: PathBuf,
	/// Canonical paths already read, to catch include cycles
	loaded_files: HashSet<PathBuf>,
	/// Which file each top-level section came from
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads a configuration file and all its includes, then parses and
	/// validates the merged result.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let config_path = self.resolve_path(config_path)?;
		let main_content = self.load_file(&config_path).await?;
		let mut main_toml: toml::Table = toml::from_str(&main_content)?;

		let includes = extract_includes(&main_toml)?;
		if includes.is_empty() {
			return main_content.parse();
		}

		main_toml.remove("include");
		for key in main_toml.keys() {
			self.section_sources.insert(key.clone(), config_path.clone());
		}

		for include_path in includes {
			let resolved_path = self.resolve_path(&include_path)?;
			let include_content = self.load_file(&resolved_path).await?;
			let include_toml: toml::Table = toml::from_str(&include_content)?;

			for (key, value) in include_toml {
				if let Some(existing_source) = self.section_sources.get(&key) {
					return Err(ConfigError::Validation(format!(
						"Duplicate section '{}' found in {} and {}. \
						Each top-level section must be unique across all configuration files.",
						key,
						existing_source.display(),
						resolved_path.display()
					)));
				}
				self.section_sources.insert(key.clone(), resolved_path.clone());
				main_toml.insert(key, value);
			}
		}

		let combined = toml::to_string(&main_toml).map_err(|e| {
			ConfigError::Parse(format!("Failed to serialize combined config: {}", e))
		})?;
		combined.parse()
	}

	/// Reads a file once and resolves environment variables in it.
	async fn load_file(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical_path = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;

		if !self.loaded_files.insert(canonical_path.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical_path.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		resolve_env_vars(&content)
	}

	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();
		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}

		Ok(resolved)
	}
}

/// Reads `include` as either a single path or an array of paths.
fn extract_includes(table: &toml::Table) -> Result<Vec<PathBuf>, ConfigError> {
	match table.get("include") {
		None => Ok(Vec::new()),
		Some(toml::Value::String(path)) => Ok(vec![PathBuf::from(path)]),
		Some(toml::Value::Array(items)) => items
			.iter()
			.map(|item| {
				item.as_str().map(PathBuf::from).ok_or_else(|| {
					ConfigError::Validation("Include array must contain only strings".into())
				})
			})
			.collect(),
		Some(_) => Err(ConfigError::Validation(
			"Include must be a string or array of strings".into(),
		)),
	}
}
