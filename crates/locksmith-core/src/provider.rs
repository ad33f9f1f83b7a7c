use crate::error::LocksmithResult;
use std::future::Future;
use std::path::PathBuf;

/// Parameters for one dump invocation. Built per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRequest {
    /// Absolute path the external tool writes the binary dump to.
    pub output_path: PathBuf,
    /// Formatted `-k <key>` tokens, defaults first, explicit keys after.
    pub key_flags: Vec<String>,
    /// Passthrough options appended verbatim after the key flags.
    pub extra_options: Vec<String>,
}

/// Parameters for one clone invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    /// When set, the write includes sector zero (`W X` mode). Leave
    /// unset for second-generation tags whose sector zero is fused.
    pub unlock_sector_zero: bool,
}

/// Abstraction over the external Mifare tooling.
///
/// Implementations provide a thin, testable surface over the real
/// binaries so the facade can be exercised without NFC hardware.
pub trait NfcProvider {
    /// Discover a tag and return its UID as an 8-hex-character string.
    fn read_uid(&self) -> impl Future<Output = LocksmithResult<String>> + Send;

    /// Authenticate to a tag with the candidate keys and dump its memory
    /// to `request.output_path`. Returns the exact parameter list passed
    /// to the tool, for observability.
    fn dump(&self, request: DumpRequest)
        -> impl Future<Output = LocksmithResult<Vec<String>>> + Send;

    /// Write one dump's contents onto a connected tag.
    fn clone_tag(&self, request: CloneRequest) -> impl Future<Output = LocksmithResult<()>> + Send;
}
