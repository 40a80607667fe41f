//! Self-verifying LIFO container
//!
//! [`GuardedStack`] brackets both its control block and its element buffer
//! with canaries and keeps two running Adler-32 checksums, one over the
//! control fields and one over the buffer. Every public call re-verifies
//! all of it before touching any element and again before returning.
//!
//! # Failure model
//!
//! A failed self-check is never handed back as "try again". The stack
//! captures a [`StackDump`], drops its buffer and stays failed: every later
//! call returns the same [`StackFault`]. Callers are expected to stop.
//!
//! # Growth
//!
//! When a push finds the buffer full, a new buffer of twice the capacity is
//! built, live elements are copied over, the reserved tail is poisoned and
//! both checksums are recomputed before the push proceeds. The old buffer is
//! released only once the new one is complete.

use super::checksum::Adler32;
use super::fault::{FaultKind, SlotView, StackDump, StackFault};
use super::value::StackValue;
use super::{Canary, CANARY, GROWTH_FACTOR, INITIAL_CAPACITY};

/// Element storage bracketed by sentinels
#[derive(Debug)]
struct Buffer<T> {
    header: Canary,
    slots: Vec<T>,
    footer: Canary,
}

impl<T: StackValue> Buffer<T> {
    /// Build a buffer holding `live` followed by poisoned slots up to `capacity`
    fn with_live(live: &[T], capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.extend_from_slice(live);
        slots.resize(capacity, T::POISON);
        Buffer {
            header: CANARY,
            slots,
            footer: CANARY,
        }
    }

    fn released() -> Self {
        Buffer {
            header: 0,
            slots: Vec::new(),
            footer: 0,
        }
    }

    fn address(&self) -> usize {
        self.slots.as_ptr() as usize
    }

    fn digest(&self) -> u32 {
        let mut sum = Adler32::new();
        sum.update_u64(self.header);
        for slot in &self.slots {
            slot.digest(&mut sum);
        }
        sum.update_u64(self.footer);
        sum.finish()
    }
}

/// Growable stack that detects out-of-band writes to its own state
#[derive(Debug)]
pub struct GuardedStack<T: StackValue> {
    header_canary: Canary,
    buffer: Buffer<T>,
    offset: usize,
    size: usize,
    control_checksum: u32,
    data_checksum: u32,
    failure: Option<StackFault>,
    footer_canary: Canary,
}

impl<T: StackValue> GuardedStack<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an empty stack with room for `capacity` elements (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut stack = GuardedStack {
            header_canary: CANARY,
            buffer: Buffer::with_live(&[], capacity),
            offset: 0,
            size: capacity,
            control_checksum: 0,
            data_checksum: 0,
            failure: None,
            footer_canary: CANARY,
        };
        stack.update_checksums();
        stack
    }

    /// Append a value, doubling capacity first if the buffer is full
    pub fn push(&mut self, value: T) -> Result<(), StackFault> {
        self.guard()?;
        self.ensure_capacity();
        self.buffer.slots[self.offset] = value;
        self.offset += 1;
        self.update_checksums();
        self.guard()
    }

    /// Remove and return the top value; `None` when empty
    pub fn pop(&mut self) -> Result<Option<T>, StackFault> {
        self.guard()?;
        if self.offset == 0 {
            return Ok(None);
        }
        self.offset -= 1;
        let value = self.buffer.slots[self.offset];
        self.buffer.slots[self.offset] = T::POISON;
        self.update_checksums();
        self.guard()?;
        Ok(Some(value))
    }

    /// Remove the top value without returning it; `false` when empty
    pub fn discard(&mut self) -> Result<bool, StackFault> {
        Ok(self.pop()?.is_some())
    }

    /// Read the top value without removing it; `None` when empty.
    ///
    /// Like the other `&self` observers this runs [`verify`](Self::verify),
    /// which reports corruption but does not latch it. Call
    /// [`check`](Self::check) first to release the buffer on failure.
    pub fn top(&self) -> Result<Option<T>, StackFault> {
        self.verify()?;
        Ok(self
            .offset
            .checked_sub(1)
            .map(|index| self.buffer.slots[index]))
    }

    pub fn is_empty(&self) -> Result<bool, StackFault> {
        self.verify()?;
        Ok(self.offset == 0)
    }

    /// Number of live elements
    pub fn len(&self) -> Result<usize, StackFault> {
        self.verify()?;
        Ok(self.offset)
    }

    /// Number of slots in the current buffer
    pub fn capacity(&self) -> Result<usize, StackFault> {
        self.verify()?;
        Ok(self.size)
    }

    /// Copy of the live elements, bottom first
    pub fn contents(&self) -> Result<Vec<T>, StackFault> {
        self.verify()?;
        Ok(self.buffer.slots[..self.offset].to_vec())
    }

    /// Whether a fault has already been raised and the buffer released
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Run the full self-check without mutating anything. A detected fault
    /// is not latched; repeated calls rebuild the dump each time.
    pub fn verify(&self) -> Result<(), StackFault> {
        if let Some(fault) = &self.failure {
            return Err(fault.clone());
        }
        self.inspect()
            .map_err(|kind| StackFault::new(self.dump(kind)))
    }

    /// Self-check that, on corruption, releases the buffer and latches the
    /// fault like any mutating call would
    pub fn check(&mut self) -> Result<(), StackFault> {
        self.guard()
    }

    /// Self-check for mutating calls: a failure releases the buffer
    fn guard(&mut self) -> Result<(), StackFault> {
        if let Some(fault) = &self.failure {
            return Err(fault.clone());
        }
        match self.inspect() {
            Ok(()) => Ok(()),
            Err(kind) => Err(self.fail(kind)),
        }
    }

    fn inspect(&self) -> Result<(), FaultKind> {
        if self.header_canary != CANARY {
            return Err(FaultKind::HeaderCanary);
        }
        if self.footer_canary != CANARY {
            return Err(FaultKind::FooterCanary);
        }
        if self.control_checksum != self.compute_control_checksum() {
            return Err(FaultKind::ControlChecksum);
        }
        if self.buffer.header != CANARY {
            return Err(FaultKind::BufferHeaderCanary);
        }
        if self.buffer.footer != CANARY {
            return Err(FaultKind::BufferFooterCanary);
        }
        if self.data_checksum != self.buffer.digest() {
            return Err(FaultKind::DataChecksum);
        }
        if self.offset > self.size || self.size != self.buffer.slots.len() {
            return Err(FaultKind::Overflow);
        }
        Ok(())
    }

    fn fail(&mut self, kind: FaultKind) -> StackFault {
        let fault = StackFault::new(self.dump(kind));
        self.buffer = Buffer::released();
        self.offset = 0;
        self.size = 0;
        self.failure = Some(fault.clone());
        fault
    }

    fn compute_control_checksum(&self) -> u32 {
        let mut sum = Adler32::new();
        sum.update_u64(self.header_canary);
        sum.update_usize(self.buffer.address());
        sum.update_usize(self.offset);
        sum.update_usize(self.size);
        sum.update_u64(self.footer_canary);
        sum.finish()
    }

    fn update_checksums(&mut self) {
        self.data_checksum = self.buffer.digest();
        self.control_checksum = self.compute_control_checksum();
    }

    fn ensure_capacity(&mut self) {
        if self.offset < self.size {
            return;
        }
        self.reallocate(self.size * GROWTH_FACTOR);
    }

    fn reallocate(&mut self, new_size: usize) {
        let replacement = Buffer::with_live(&self.buffer.slots[..self.offset], new_size);
        self.buffer = replacement;
        self.size = new_size;
        self.update_checksums();
    }

    fn dump(&self, kind: FaultKind) -> StackDump {
        let slots = &self.buffer.slots;
        let view = |index: usize| {
            let value = slots[index];
            let reserved = index >= self.offset;
            SlotView {
                index,
                rendered: if reserved {
                    value.to_hex()
                } else {
                    format!("{:?}", value)
                },
                reserved,
            }
        };

        StackDump {
            kind,
            type_name: std::any::type_name::<T>(),
            header_canary: self.header_canary,
            buffer_header_canary: self.buffer.header,
            buffer_footer_canary: self.buffer.footer,
            footer_canary: self.footer_canary,
            offset: self.offset,
            size: self.size,
            control_checksum: self.control_checksum,
            data_checksum: self.data_checksum,
            slots: (0..slots.len()).map(view).collect(),
        }
    }
}

impl<T: StackValue> Default for GuardedStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl<T: StackValue> GuardedStack<T> {
    /// Overwrite a raw slot behind the stack's back
    pub(crate) fn scribble(&mut self, index: usize, value: T) {
        self.buffer.slots[index] = value;
    }
}
