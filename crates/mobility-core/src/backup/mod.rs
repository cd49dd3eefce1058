//! Backups and the restore-code protocol.
//!
//! An Administrator may not restore a backup on its own. It asks for a
//! restore code bound to one backup; a SuperAdministrator mints the code;
//! the Administrator redeems it exactly once to run the restore.
//!
//! ```text
//! Administrator          SuperAdministrator
//! request_restore  --->  pending_requests
//!                        issue_code  (clear code shown once)
//! redeem_code      <---  code handed over out of band
//! restore
//! ```
//!
//! A SuperAdministrator may also restore directly, without a code. The two
//! paths clean up differently: a code restore deletes only the backup it
//! used, a direct restore deletes every backup older than the restored one.

pub mod artifact;
mod protocol;

pub use protocol::{IssuedCode, RestoreReport};
