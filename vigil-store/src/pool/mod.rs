//! Connection handling for the single SQLite writer.
//!
//! All mutation flows through one mutex-guarded connection; WAL mode
//! keeps the occasional ad-hoc reader from blocking it. Reconciliation
//! is transaction-shaped and serialized upstream, so a read pool buys
//! nothing here.

pub mod pragmas;
pub mod write_connection;

pub use write_connection::WriteConnection;
