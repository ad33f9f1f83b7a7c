use crate::error::LocksmithResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Locations and limits for the external NFC tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ToolsCfg {
    /// Explicit path to the `nfc-list` binary.
    #[serde(default)]
    pub nfc_list_path: Option<String>,

    /// Explicit path to the `mfoc` binary.
    #[serde(default)]
    pub mfoc_path: Option<String>,

    /// Explicit path to the `nfc-mfclassic` binary.
    #[serde(default)]
    pub nfc_mfclassic_path: Option<String>,

    /// Upper bound on any single tool invocation, in seconds.
    /// Unset means wait forever; `mfoc` can legitimately run for a
    /// very long time while cracking sector keys.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LocksmithConfig {
    /// Explicit candidate keys, each an 8-hex-character shorthand.
    #[serde(default)]
    pub keys: Vec<String>,

    /// Directory every dump and key file path is resolved against.
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Name of the key file loaded from the workspace at startup.
    #[serde(default = "default_keys_file")]
    pub default_keys_file: String,

    #[serde(default)]
    pub tools: ToolsCfg,

    #[serde(skip)]
    pub path: PathBuf,
}

fn default_workspace() -> PathBuf {
    PathBuf::from(".")
}

fn default_keys_file() -> String {
    "keys.txt".to_string()
}

impl Default for LocksmithConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            workspace: default_workspace(),
            default_keys_file: default_keys_file(),
            tools: ToolsCfg::default(),
            path: PathBuf::new(),
        }
    }
}

impl LocksmithConfig {
    /// Parse a configuration file, choosing TOML or YAML by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> LocksmithResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut cfg = if matches!(path.extension().and_then(|ext| ext.to_str()), Some(ext) if ext.eq_ignore_ascii_case("toml"))
        {
            toml::from_str::<Self>(&contents)?
        } else {
            serde_yaml::from_str::<Self>(&contents)?
        };

        cfg.path = path.to_path_buf();
        Ok(cfg)
    }

    /// Collect human-readable problems without failing hard.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for key in &self.keys {
            if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
                issues.push(format!(
                    "keys entry `{key}` is not an 8-hex-character shorthand"
                ));
            }
        }
        if self.default_keys_file.is_empty() {
            issues.push("default_keys_file must not be empty".to_string());
        }
        if let Some(0) = self.tools.timeout_secs {
            issues.push("tools.timeout_secs of 0 would kill every invocation".to_string());
        }
        issues
    }

    /// Resolve a workspace-relative filename into an absolute path.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        let joined = self.workspace.join(filename);
        std::path::absolute(&joined).unwrap_or(joined)
    }

    /// Absolute path of the default key file.
    pub fn default_keys_path(&self) -> PathBuf {
        self.resolve(&self.default_keys_file)
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tools.timeout_secs.map(Duration::from_secs)
    }

    pub fn nfc_list_path(&self) -> Option<PathBuf> {
        self.tools.nfc_list_path.as_ref().map(PathBuf::from)
    }

    pub fn mfoc_path(&self) -> Option<PathBuf> {
        self.tools.mfoc_path.as_ref().map(PathBuf::from)
    }

    pub fn nfc_mfclassic_path(&self) -> Option<PathBuf> {
        self.tools.nfc_mfclassic_path.as_ref().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_documented_contract() {
        let cfg = LocksmithConfig::default();
        assert!(cfg.keys.is_empty());
        assert_eq!(cfg.workspace, PathBuf::from("."));
        assert_eq!(cfg.default_keys_file, "keys.txt");
        assert!(cfg.tool_timeout().is_none());
    }

    #[test]
    fn load_toml_with_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locksmith.toml");
        fs::write(
            &path,
            r#"
keys = ["a1b2c3d4"]
workspace = "/tags"
default_keys_file = "extra.txt"

[tools]
mfoc_path = "/opt/mfoc"
timeout_secs = 30
"#,
        )
        .unwrap();

        let cfg = LocksmithConfig::load(&path).unwrap();
        assert_eq!(cfg.keys, vec!["a1b2c3d4".to_string()]);
        assert_eq!(cfg.workspace, PathBuf::from("/tags"));
        assert_eq!(cfg.default_keys_path(), PathBuf::from("/tags/extra.txt"));
        assert_eq!(cfg.mfoc_path(), Some(PathBuf::from("/opt/mfoc")));
        assert_eq!(cfg.tool_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.path, path);
    }

    #[test]
    fn resolve_produces_absolute_paths() {
        let cfg = LocksmithConfig {
            workspace: PathBuf::from("/workspace"),
            ..LocksmithConfig::default()
        };
        assert_eq!(cfg.resolve("dump.mfd"), PathBuf::from("/workspace/dump.mfd"));

        let relative = LocksmithConfig::default();
        assert!(relative.resolve("dump.mfd").is_absolute());
    }

    #[test]
    fn validate_flags_bad_keys() {
        let cfg = LocksmithConfig {
            keys: vec!["00000000".to_string(), "nope".to_string()],
            ..LocksmithConfig::default()
        };
        let issues = cfg.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("nope"));
    }
}
