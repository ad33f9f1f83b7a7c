//! System integration layer for the LockSmith stack. The provider in
//! `system` drives the real Mifare tooling, while `command` and `parse`
//! cover shell and output-format details.

mod command;
mod parse;
mod system;

pub use system::{
    SystemNfcProvider, DEFAULT_MFOC_PATHS, DEFAULT_NFC_LIST_PATHS, DEFAULT_NFC_MFCLASSIC_PATHS,
};
