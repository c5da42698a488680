//! File-based storage backend implementation.
//!
//! Stores each document as one binary file on the filesystem, providing
//! simple persistence without external dependencies. Files carry a fixed
//! header with TTL information so expired documents can be dropped on read
//! and swept by the periodic cleanup task.

use crate::{StorageError, StorageFactory, StorageInterface};
use async_trait::async_trait;
use fixmate_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, StoreNamespace,
	ValidationError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Fixed-size file header for TTL support.
///
/// Binary layout (32 bytes total):
/// bytes 0-3 magic "FXMS", 4-5 version (u16 LE), 6-13 expiration timestamp
/// (u64 LE unix seconds, 0 = never), 14-31 reserved.
#[derive(Debug, Clone)]
struct FileHeader {
	expires_at: u64,
}

impl FileHeader {
	const MAGIC: &'static [u8; 4] = b"FXMS";
	const VERSION: u16 = 1;
	const SIZE: usize = 32;

	/// Creates a new header with the given TTL. A zero TTL means permanent.
	fn new(ttl: Duration) -> Self {
		let expires_at = if ttl.is_zero() {
			0
		} else {
			SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.map(|d| d.as_secs())
				.unwrap_or(0)
				.saturating_add(ttl.as_secs())
		};
		Self { expires_at }
	}

	/// Serializes the header to bytes.
	fn serialize(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(Self::MAGIC);
		bytes[4..6].copy_from_slice(&Self::VERSION.to_le_bytes());
		bytes[6..14].copy_from_slice(&self.expires_at.to_le_bytes());
		bytes
	}

	/// Deserializes a header from bytes.
	fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("File too small for header".into()));
		}
		if &bytes[0..4] != Self::MAGIC {
			return Err(StorageError::Backend("Unrecognized file format".into()));
		}

		let version = u16::from_le_bytes([bytes[4], bytes[5]]);
		if version > Self::VERSION {
			return Err(StorageError::Backend(format!(
				"Unsupported file version: {}",
				version
			)));
		}

		let mut expires_bytes = [0u8; 8];
		expires_bytes.copy_from_slice(&bytes[6..14]);
		Ok(Self {
			expires_at: u64::from_le_bytes(expires_bytes),
		})
	}

	/// Checks if the data has expired.
	fn is_expired(&self) -> bool {
		if self.expires_at == 0 {
			return false;
		}
		let now = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or(0);
		now >= self.expires_at
	}
}

/// TTL configuration per storage namespace.
#[derive(Debug, Clone)]
pub struct TtlConfig {
	ttls: HashMap<StoreNamespace, Duration>,
}

impl TtlConfig {
	/// Reads `ttl_<namespace>` keys (seconds) from the backend's TOML table.
	fn from_config(config: &toml::Value) -> Self {
		let mut ttls = HashMap::new();

		if let Some(table) = config.as_table() {
			for namespace in StoreNamespace::all() {
				let config_key = format!("ttl_{}", namespace.as_str());
				if let Some(secs) = table
					.get(&config_key)
					.and_then(|v| v.as_integer())
					.map(|v| v as u64)
				{
					ttls.insert(namespace, Duration::from_secs(secs));
				}
			}
		}

		Self { ttls }
	}

	fn get_ttl(&self, namespace: StoreNamespace) -> Duration {
		self.ttls
			.get(&namespace)
			.copied()
			.unwrap_or(Duration::ZERO)
	}
}

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
	/// TTL configuration per namespace.
	ttl_config: TtlConfig,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path and TTL config.
	pub fn new(base_path: PathBuf, ttl_config: TtlConfig) -> Self {
		Self {
			base_path,
			ttl_config,
		}
	}

	/// Converts a storage key to a filesystem-safe file path.
	fn file_path(&self, key: &str) -> PathBuf {
		let safe_key = sanitize(key);
		self.base_path.join(format!("{}.bin", safe_key))
	}

	/// Gets the TTL for a given key based on its namespace prefix.
	fn ttl_for_key(&self, key: &str) -> Duration {
		let namespace = key.split(':').next().unwrap_or("");
		namespace
			.parse::<StoreNamespace>()
			.map(|ns| self.ttl_config.get_ttl(ns))
			.unwrap_or(Duration::ZERO)
	}

	/// Removes all expired files from storage.
	async fn cleanup_expired_files(&self) -> Result<usize, StorageError> {
		let mut removed = 0;
		let mut entries = fs::read_dir(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("bin")) {
				continue;
			}
			match fs::read(&path).await {
				Ok(data) => {
					if let Ok(header) = FileHeader::deserialize(&data) {
						if header.is_expired() {
							match fs::remove_file(&path).await {
								Ok(_) => removed += 1,
								Err(e) => {
									tracing::warn!(
										"Failed to remove expired file {:?}: {}",
										path,
										e
									);
								},
							}
						}
					}
				},
				Err(e) => {
					tracing::debug!("Skipping file {:?}: could not be read: {}", path, e);
				},
			}
		}
		Ok(removed)
	}
}

/// Replaces path-hostile characters so keys map onto flat file names.
fn sanitize(key: &str) -> String {
	key.replace(['/', ':'], "_")
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key);

		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			},
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let header = FileHeader::deserialize(&data)?;
		if header.is_expired() {
			return Err(StorageError::NotFound);
		}

		Ok(data[FileHeader::SIZE..].to_vec())
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let path = self.file_path(key);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Explicit TTL wins, otherwise the namespace default applies.
		let ttl = ttl.unwrap_or_else(|| self.ttl_for_key(key));
		let header = FileHeader::new(ttl);

		let mut file_data = Vec::with_capacity(FileHeader::SIZE + value.len());
		file_data.extend_from_slice(&header.serialize());
		file_data.extend_from_slice(&value);

		// Write atomically by writing to a temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, file_data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.file_path(key);
		Ok(path.exists())
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let safe_prefix = sanitize(prefix);
		let mut keys = Vec::new();

		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// An empty store has no directory yet
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("bin")) {
				continue;
			}
			let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
				continue;
			};
			if let Some(rest) = stem.strip_prefix(&safe_prefix) {
				// Ids never contain sanitized characters, so the original
				// key is the prefix plus the remainder.
				keys.push(format!("{}{}", prefix, rest));
			}
		}
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		self.cleanup_expired_files().await
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let mut optional_fields = vec![Field::new("storage_path", FieldType::String)];

		// TTL fields per namespace
		for namespace in StoreNamespace::all() {
			optional_fields.push(Field::new(
				format!("ttl_{}", namespace.as_str()),
				FieldType::Integer {
					min: Some(0),
					max: None,
				},
			));
		}

		let schema = Schema::new(vec![], optional_fields);
		schema.validate(config)
	}
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/storage")
/// - `ttl_<namespace>`: TTL in seconds per namespace (default: no expiry)
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage")
		.to_string();

	let ttl_config = TtlConfig::from_config(config);

	Ok(Box::new(FileStorage::new(
		PathBuf::from(storage_path),
		ttl_config,
	)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	fn storage(dir: &std::path::Path) -> FileStorage {
		FileStorage::new(
			dir.to_path_buf(),
			TtlConfig {
				ttls: HashMap::new(),
			},
		)
	}

	#[tokio::test]
	async fn roundtrip_through_disk() {
		let dir = tempdir().unwrap();
		let store = storage(dir.path());

		store
			.set_bytes("supply_orders:abc", b"payload".to_vec(), None)
			.await
			.unwrap();
		let data = store.get_bytes("supply_orders:abc").await.unwrap();
		assert_eq!(data, b"payload".to_vec());

		store.delete("supply_orders:abc").await.unwrap();
		assert!(matches!(
			store.get_bytes("supply_orders:abc").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn expired_entries_are_invisible_and_swept() {
		let dir = tempdir().unwrap();
		let store = storage(dir.path());

		store
			.set_bytes(
				"supply_orders:old",
				b"stale".to_vec(),
				Some(Duration::from_secs(1)),
			)
			.await
			.unwrap();

		// Rewrite the header with an expiry in the past instead of sleeping.
		let path = store.file_path("supply_orders:old");
		let mut data = std::fs::read(&path).unwrap();
		data[6..14].copy_from_slice(&1u64.to_le_bytes());
		std::fs::write(&path, data).unwrap();

		assert!(matches!(
			store.get_bytes("supply_orders:old").await,
			Err(StorageError::NotFound)
		));
		let removed = store.cleanup_expired().await.unwrap();
		assert_eq!(removed, 1);
		assert!(!path.exists());
	}

	#[tokio::test]
	async fn list_keys_reconstructs_namespace_keys() {
		let dir = tempdir().unwrap();
		let store = storage(dir.path());

		store
			.set_bytes("supply_orders:a1", b"x".to_vec(), None)
			.await
			.unwrap();
		store
			.set_bytes("supply_orders:b2", b"y".to_vec(), None)
			.await
			.unwrap();
		store
			.set_bytes("products:p1", b"z".to_vec(), None)
			.await
			.unwrap();

		let mut keys = store.list_keys("supply_orders:").await.unwrap();
		keys.sort();
		assert_eq!(
			keys,
			vec![
				"supply_orders:a1".to_string(),
				"supply_orders:b2".to_string()
			]
		);
	}

	#[tokio::test]
	async fn listing_an_empty_store_is_not_an_error() {
		let dir = tempdir().unwrap();
		let store = FileStorage::new(
			dir.path().join("never-created"),
			TtlConfig {
				ttls: HashMap::new(),
			},
		);
		assert!(store.list_keys("supply_orders:").await.unwrap().is_empty());
	}
}
