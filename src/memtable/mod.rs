//! MemTable Module
//!
//! In-memory ordered table backing the bundled store.
//!
//! ## Responsibilities
//! - Fast point reads and writes
//! - Many concurrent readers, one writer at a time
//! - Ordered positioning for `seek_ge` / `next`
//! - Approximate size tracking
//!
//! ## Data Structure Choice
//! `BTreeMap` behind a `parking_lot::RwLock`: ordered keys for seeks, and a
//! batch is applied under one write guard so readers see all of it or none.

mod table;

pub use table::MemTable;
