//! Configuration loader for modular configuration files.
//!
//! Loads a main TOML file plus any files named by its `include` directive,
//! rejecting circular includes and duplicate top-level sections so two files
//! can never silently fight over the same table.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Configuration loader that handles multi-file configurations with includes.
pub struct ConfigLoader {
	/// Base path for resolving relative includes.
	base_path: PathBuf,
	/// Files already loaded, to prevent circular includes.
	loaded_files: HashSet<PathBuf>,
	/// Which file each top-level section came from, for error reporting.
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	/// Creates a new ConfigLoader with the given base path.
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads a configuration file and all its includes.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let config_path = self.base_path.join(config_path.as_ref());

		let main_content = self.load_file(&config_path).await?;
		let mut main_toml: toml::Value = toml::from_str(&main_content)?;

		let includes = extract_includes(&main_toml)?;
		if includes.is_empty() {
			return main_content.parse();
		}

		// Record the main file's sections, then fold each include in.
		if let Some(table) = main_toml.as_table_mut() {
			table.remove("include");
			for section in table.keys() {
				self.section_sources
					.insert(section.clone(), config_path.clone());
			}
		}

		for include in includes {
			let include_path = self.base_path.join(&include);
			let content = self.load_file(&include_path).await?;
			let value: toml::Value = toml::from_str(&content)?;

			let include_table = value.as_table().ok_or_else(|| {
				ConfigError::Validation(format!(
					"Included file {} must contain a TOML table",
					include_path.display()
				))
			})?;

			let main_table = main_toml.as_table_mut().ok_or_else(|| {
				ConfigError::Validation("Main configuration must be a TOML table".into())
			})?;

			for (section, section_value) in include_table {
				if let Some(previous) = self.section_sources.get(section) {
					return Err(ConfigError::Validation(format!(
						"Duplicate section '{}' in {} (already defined in {})",
						section,
						include_path.display(),
						previous.display()
					)));
				}
				self.section_sources
					.insert(section.clone(), include_path.clone());
				main_table.insert(section.clone(), section_value.clone());
			}
		}

		let combined = toml::to_string(&main_toml)
			.map_err(|e| ConfigError::Parse(format!("Failed to serialize combined config: {}", e)))?;
		combined.parse()
	}

	/// Loads a file and resolves environment variables.
	async fn load_file(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical_path = path.canonicalize().map_err(|e| {
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
}

/// Extracts include directives from the configuration.
///
/// `include` may be a single path string or an array of path strings.
fn extract_includes(toml: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	let mut includes = Vec::new();

	if let Some(include_value) = toml.get("include") {
		if let Some(include_array) = include_value.as_array() {
			for item in include_array {
				match item.as_str() {
					Some(path_str) => includes.push(PathBuf::from(path_str)),
					None => {
						return Err(ConfigError::Validation(
							"Include array must contain only strings".into(),
						))
					},
				}
			}
		} else if let Some(path_str) = include_value.as_str() {
			includes.push(PathBuf::from(path_str));
		} else {
			return Err(ConfigError::Validation(
				"Include must be a string or array of strings".into(),
			));
		}
	}

	Ok(includes)
}
