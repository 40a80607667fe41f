//! Guarded memory for the processor
//!
//! This module provides the self-verifying storage the interpreter runs on:
//! - [`stack`]: [`stack::GuardedStack`], a growable LIFO container
//! - [`checksum`]: incremental Adler-32 used by both stack checksums
//! - [`value`]: the [`value::StackValue`] trait and poison patterns
//! - [`fault`]: corruption fault kinds and the dump captured at detection
//!
//! # Layout
//!
//! ```text
//! control block:  [canary | buffer | offset | size | checksums | canary]
//! buffer:         [canary | live slots ... | poisoned slots ... | canary]
//! ```
//!
//! The control checksum covers the control block canaries, the buffer
//! address, `offset` and `size`. The data checksum covers the buffer
//! canaries and every slot, live or reserved.

pub mod checksum;
pub mod fault;
pub mod stack;
pub mod value;

/// Sentinel word type
pub type Canary = u64;

/// Value every canary must hold
pub const CANARY: Canary = 0xBADC_0FFE_E0DD_F00D;

/// 32-bit pattern written into reserved slots
pub const POISON_WORD: u32 = 0xDEAD_BEEF;

/// Capacity of a freshly created stack
pub const INITIAL_CAPACITY: usize = 4;

/// Capacity multiplier applied when a push finds the buffer full
pub const GROWTH_FACTOR: usize = 2;

/// Buffers up to this many slots are dumped in full
pub const DUMP_FULL_LIMIT: usize = 32;

/// Slots shown from each end of a capped dump
pub const DUMP_EDGE_SLOTS: usize = 10;
