use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{defaults::ObjectDefaults, error::ForgeError};

fn default_source_path() -> String {
    "source.rdb".to_string()
}

fn default_dest_path() -> String {
    "dest.rdb".to_string()
}

/// Describes one promotion run: which caches to read and write and which
/// instances to promote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteLayoutFile {
    #[serde(default = "default_source_path")]
    pub source: String,
    #[serde(default = "default_dest_path")]
    pub dest: String,
    /// Name of the scenario tag in the source cache.
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub structure_bsp: usize,
    #[serde(default)]
    pub instances: Vec<String>,
    /// Promote every instance of the structure BSP.
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub object_defaults: ObjectDefaults,
}

impl Default for PromoteLayoutFile {
    fn default() -> Self {
        Self {
            source: default_source_path(),
            dest: default_dest_path(),
            scenario: String::new(),
            structure_bsp: 0,
            instances: Vec::new(),
            all: false,
            object_defaults: ObjectDefaults::default(),
        }
    }
}

impl PromoteLayoutFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ForgeError> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

pub fn validate_layout(layout: &PromoteLayoutFile) -> Result<(), ForgeError> {
    if layout.scenario.is_empty() {
        return Err(ForgeError::Layout("no scenario tag given".to_string()));
    }
    if layout.instances.is_empty() && !layout.all {
        return Err(ForgeError::Layout(
            "no instances listed and `all` is not set".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DEFAULT_REDUCE_TO_L2_LOW;

    #[test]
    fn missing_fields_take_defaults() {
        let layout: PromoteLayoutFile = serde_json::from_str(
            r#"{ "scenario": "levels/test/box/box", "instances": ["rock_01"],
                 "object_defaults": { "spawn_time": 5 } }"#,
        )
        .unwrap();

        assert_eq!(layout.source, "source.rdb");
        assert_eq!(layout.structure_bsp, 0);
        assert_eq!(layout.object_defaults.spawn_time, 5);
        assert_eq!(
            layout.object_defaults.reduce_to_l2_low,
            DEFAULT_REDUCE_TO_L2_LOW
        );
        assert!(validate_layout(&layout).is_ok());
    }

    #[test]
    fn rejects_layout_without_work() {
        let mut layout = PromoteLayoutFile {
            scenario: "levels/test/box/box".to_string(),
            ..Default::default()
        };
        assert!(validate_layout(&layout).is_err());

        layout.all = true;
        assert!(validate_layout(&layout).is_ok());

        layout.scenario.clear();
        assert!(validate_layout(&layout).is_err());
    }

    #[test]
    fn reads_layout_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("promote.json");
        std::fs::write(&path, r#"{ "scenario": "s", "all": true, "dest": "out.rdb" }"#).unwrap();

        let layout = PromoteLayoutFile::from_file(&path).unwrap();
        assert_eq!(layout.dest, "out.rdb");
        assert!(layout.all);
    }
}
