//! The `LockSmith` facade: per-instance configuration plus the merged
//! key material handed to each dump invocation.

use crate::config::LocksmithConfig;
use crate::error::LocksmithResult;
use crate::keystore;
use crate::provider::{CloneRequest, DumpRequest, NfcProvider};
use log::warn;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;

/// Composes the key store with a concrete NFC provider.
///
/// Construction validates the explicit keys synchronously and kicks off
/// the default key-file load in the background without awaiting it, so
/// it must happen inside a Tokio runtime. The load result is awaited
/// (once) by the first `dump` call; later calls reuse the same result.
#[derive(Debug)]
pub struct LockSmith<P: NfcProvider> {
    config: Arc<LocksmithConfig>,
    provider: P,
    explicit_keys: Vec<String>,
    default_keys: OnceCell<Vec<String>>,
    pending_load: Mutex<Option<JoinHandle<Vec<String>>>>,
}

impl<P: NfcProvider> LockSmith<P> {
    /// Build a facade over shared configuration and a provider.
    ///
    /// Fails atomically with `InvalidKey` when any explicit key does
    /// not match the 8-hex-character shorthand form; no partially
    /// constructed instance is ever observable.
    pub fn new(config: Arc<LocksmithConfig>, provider: P) -> LocksmithResult<Self> {
        let validated = keystore::validate(&config.keys)?;
        let explicit_keys = keystore::format(&validated);

        let keys_path = config.default_keys_path();
        let load = tokio::spawn(async move { keystore::load_from_file(&keys_path).await });

        Ok(Self {
            config,
            provider,
            explicit_keys,
            default_keys: OnceCell::new(),
            pending_load: Mutex::new(Some(load)),
        })
    }

    /// Formatted flags for the explicit constructor keys.
    pub fn explicit_keys(&self) -> &[String] {
        &self.explicit_keys
    }

    pub fn config(&self) -> &LocksmithConfig {
        &self.config
    }

    /// Await the one-shot default-key load. Every caller observes the
    /// same result; the load is never restarted.
    async fn default_keys(&self) -> &[String] {
        self.default_keys
            .get_or_init(|| async {
                let handle = self.pending_load.lock().await.take();
                match handle {
                    Some(handle) => handle.await.unwrap_or_else(|err| {
                        warn!("default key load task failed ({err}); using no default keys");
                        Vec::new()
                    }),
                    None => Vec::new(),
                }
            })
            .await
    }

    /// Dump a tag's memory to `filename`, resolved against the
    /// workspace. Default keys come first, explicit keys after; extra
    /// options pass through to the tool untouched. Returns the
    /// parameter list the provider used.
    pub async fn dump(
        &self,
        filename: &str,
        extra_options: &[String],
    ) -> LocksmithResult<Vec<String>> {
        let mut key_flags = self.default_keys().await.to_vec();
        key_flags.extend_from_slice(&self.explicit_keys);

        let request = DumpRequest {
            output_path: self.config.resolve(filename),
            key_flags,
            extra_options: extra_options.to_vec(),
        };
        self.provider.dump(request).await
    }

    /// Clone `source` onto a connected tag via `target`, both resolved
    /// against the workspace. Cloning a raw image needs no key
    /// authentication, so the key store is not consulted.
    pub async fn clone_tag(
        &self,
        source: &str,
        target: &str,
        unlock_sector_zero: bool,
    ) -> LocksmithResult<()> {
        let request = CloneRequest {
            source_path: self.config.resolve(source),
            target_path: self.config.resolve(target),
            unlock_sector_zero,
        };
        self.provider.clone_tag(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocksmithError;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex as StdMutex;
    use tempfile::tempdir;

    #[derive(Debug, Default)]
    struct MockProvider {
        dumps: StdMutex<Vec<DumpRequest>>,
        clones: StdMutex<Vec<CloneRequest>>,
    }

    impl NfcProvider for MockProvider {
        async fn read_uid(&self) -> LocksmithResult<String> {
            Ok("33c7766c".to_string())
        }

        async fn dump(&self, request: DumpRequest) -> LocksmithResult<Vec<String>> {
            let params = request.key_flags.clone();
            self.dumps.lock().unwrap().push(request);
            Ok(params)
        }

        async fn clone_tag(&self, request: CloneRequest) -> LocksmithResult<()> {
            self.clones.lock().unwrap().push(request);
            Ok(())
        }
    }

    fn config_in(workspace: PathBuf, keys: Vec<&str>) -> Arc<LocksmithConfig> {
        Arc::new(LocksmithConfig {
            keys: keys.into_iter().map(String::from).collect(),
            workspace,
            ..LocksmithConfig::default()
        })
    }

    #[tokio::test]
    async fn construction_rejects_bad_keys_atomically() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path().to_path_buf(), vec!["00000000", "short"]);
        let err = LockSmith::new(config, MockProvider::default()).unwrap_err();
        assert!(matches!(err, LocksmithError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn dump_merges_defaults_before_explicit_keys() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("keys.txt"), "ffffffffffff\n").unwrap();

        let config = config_in(dir.path().to_path_buf(), vec!["00000000"]);
        let smith = LockSmith::new(config, MockProvider::default()).unwrap();
        smith.dump("dump.mfd", &[]).await.unwrap();

        let dumps = smith.provider.dumps.lock().unwrap();
        assert_eq!(
            dumps[0].key_flags,
            vec!["-k ffffffffffff".to_string(), "-k 00000000".to_string()]
        );
        assert_eq!(dumps[0].output_path, dir.path().join("dump.mfd"));
        assert!(dumps[0].output_path.is_absolute());
    }

    #[tokio::test]
    async fn dump_with_no_keys_file_uses_explicit_keys_only() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path().to_path_buf(), vec!["00000000"]);
        let smith = LockSmith::new(config, MockProvider::default()).unwrap();

        let extras = vec!["-P 500".to_string()];
        smith.dump("dump.mfd", &extras).await.unwrap();

        let dumps = smith.provider.dumps.lock().unwrap();
        assert_eq!(dumps[0].key_flags, vec!["-k 00000000".to_string()]);
        assert_eq!(dumps[0].extra_options, extras);
    }

    #[tokio::test]
    async fn default_key_load_is_not_restarted() {
        let dir = tempdir().unwrap();
        let keys_path = dir.path().join("keys.txt");
        fs::write(&keys_path, "a22ae129c013").unwrap();

        let config = config_in(dir.path().to_path_buf(), vec![]);
        let smith = LockSmith::new(config, MockProvider::default()).unwrap();
        smith.dump("first.mfd", &[]).await.unwrap();

        // Rewriting the file after the load resolved must not change
        // the keys later dumps observe.
        fs::write(&keys_path, "484558414354").unwrap();
        smith.dump("second.mfd", &[]).await.unwrap();

        let dumps = smith.provider.dumps.lock().unwrap();
        assert_eq!(dumps[0].key_flags, vec!["-k a22ae129c013".to_string()]);
        assert_eq!(dumps[1].key_flags, dumps[0].key_flags);
    }

    #[tokio::test]
    async fn clone_resolves_paths_and_carries_unlock_flag() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path().to_path_buf(), vec![]);
        let smith = LockSmith::new(config, MockProvider::default()).unwrap();

        smith.clone_tag("source.mfd", "target.mfd", true).await.unwrap();
        smith.clone_tag("source.mfd", "target.mfd", false).await.unwrap();

        let clones = smith.provider.clones.lock().unwrap();
        assert_eq!(clones[0].source_path, dir.path().join("source.mfd"));
        assert_eq!(clones[0].target_path, dir.path().join("target.mfd"));
        assert!(clones[0].unlock_sector_zero);
        assert!(!clones[1].unlock_sector_zero);
    }
}
