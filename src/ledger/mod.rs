pub mod client;
pub mod codec;
pub mod memory;

pub use client::{LedgerClient, PageFilter, ReadOp, Receipt, RecordPage, WriteOp};
pub use memory::InMemoryLedger;
