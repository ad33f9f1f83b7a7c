pub mod config;
pub mod error;
pub mod facade;
pub mod hexdump;
pub mod keystore;
pub mod logging;
pub mod provider;

pub use config::{LocksmithConfig, ToolsCfg};
pub use error::{LocksmithError, LocksmithResult};
pub use facade::LockSmith;
pub use hexdump::HexTable;
pub use provider::{CloneRequest, DumpRequest, NfcProvider};
