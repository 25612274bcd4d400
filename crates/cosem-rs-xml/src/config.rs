// crates/cosem-rs-xml/src/config.rs

//! Adapter configuration and the fixed storage layout below its root.

use crate::error::AdapterError;
use cosem_rs::ParameterValue;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Directory holding `Types`, `XML_devices` and `Templates`.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub pool: PoolConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            pool: PoolConfig::default(),
        }
    }
}

impl AdapterConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, AdapterError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, AdapterError> {
        info!("Loading adapter configuration from {}", path.display());
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(&self.root)
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Adapter names tried for each operation, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_route")]
    pub create_type: Vec<String>,
    #[serde(default = "default_route")]
    pub keep_data: Vec<String>,
    #[serde(default = "default_route")]
    pub get_data: Vec<String>,
    #[serde(default = "default_route")]
    pub get_collection: Vec<String>,
    #[serde(default = "default_route")]
    pub create_template: Vec<String>,
    #[serde(default = "default_route")]
    pub get_template: Vec<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            create_type: default_route(),
            keep_data: default_route(),
            get_data: default_route(),
            get_collection: default_route(),
            create_template: default_route(),
            get_template: default_route(),
        }
    }
}

fn default_route() -> Vec<String> {
    vec!["xml50".to_string()]
}

/// Paths of the stored documents.
///
/// Directories are not created here; writers create them on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn types_dir(&self) -> PathBuf {
        self.root.join("Types")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("XML_devices")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("Templates")
    }

    /// `Types/<manufacturer>/<firmware id>/<firmware version>.xml`, all hex.
    pub fn type_path(
        &self,
        manufacturer: &[u8],
        firm_id: &ParameterValue,
        firm_ver: &ParameterValue,
    ) -> PathBuf {
        self.types_dir()
            .join(hex::encode(manufacturer))
            .join(hex::encode(&firm_id.value))
            .join(format!("{}.xml", hex::encode(&firm_ver.value)))
    }

    pub fn data_path(&self, ldn: &[u8]) -> PathBuf {
        self.data_dir().join(format!("{}.xml", hex::encode(ldn)))
    }

    /// A name without an extension is stored as `<name>.xml`.
    pub fn template_path(&self, name: &str) -> PathBuf {
        if name.contains('.') {
            self.templates_dir().join(name)
        } else {
            self.templates_dir().join(format!("{name}.xml"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosem_rs::types::{FIRMWARE_ID_PAR, FIRMWARE_VERSION_PAR};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AdapterConfig::from_toml_str("").unwrap();
        assert_eq!(config, AdapterConfig::default());
        assert_eq!(config.pool.get_template, vec!["xml50".to_string()]);
    }

    #[test]
    fn test_partial_pool_config() {
        let config = AdapterConfig::from_toml_str(
            r#"
            root = "/var/lib/meters"

            [pool]
            get_collection = ["xml50", "archive"]
            "#,
        )
        .unwrap();
        assert_eq!(config.root, PathBuf::from("/var/lib/meters"));
        assert_eq!(config.pool.get_collection, vec!["xml50", "archive"]);
        assert_eq!(config.pool.keep_data, vec!["xml50"]);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        assert!(matches!(
            AdapterConfig::from_toml_str("root = 3"),
            Err(AdapterError::Config(_))
        ));
    }

    #[test]
    fn test_layout_paths() {
        let layout = StorageLayout::new("/data");
        let firm_id = ParameterValue::from_text(FIRMWARE_ID_PAR, "M2M_1");
        let firm_ver = ParameterValue::from_text(FIRMWARE_VERSION_PAR, "1.7.3");
        assert_eq!(
            layout.type_path(b"KPZ", &firm_id, &firm_ver),
            PathBuf::from("/data/Types/4b505a/09054d324d5f31/0905312e372e33.xml")
        );
        assert_eq!(
            layout.data_path(&[0x4b, 0x50, 0x5a, 0x01]),
            PathBuf::from("/data/XML_devices/4b505a01.xml")
        );
        assert_eq!(layout.template_path("base"), PathBuf::from("/data/Templates/base.xml"));
        assert_eq!(layout.template_path("old.tmp"), PathBuf::from("/data/Templates/old.tmp"));
    }
}
