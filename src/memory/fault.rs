//! Corruption faults raised by the guarded stack
//!
//! A fault is never recoverable: once raised, the stack has already released
//! its buffer. The [`StackDump`] captured at the moment of detection is the
//! only trustworthy record of what the container looked like.

use super::{Canary, CANARY, DUMP_EDGE_SLOTS, DUMP_FULL_LIMIT};
use std::fmt;

/// Which self-check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Sentinel in front of the control block was overwritten
    HeaderCanary,
    /// Sentinel behind the control block was overwritten
    FooterCanary,
    /// Sentinel in front of the element buffer was overwritten
    BufferHeaderCanary,
    /// Sentinel behind the element buffer was overwritten
    BufferFooterCanary,
    /// Control fields no longer match their checksum
    ControlChecksum,
    /// Buffer contents no longer match their checksum
    DataChecksum,
    /// Live count exceeds capacity
    Overflow,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FaultKind::HeaderCanary => "header canary of the control block was overwritten",
            FaultKind::FooterCanary => "footer canary of the control block was overwritten",
            FaultKind::BufferHeaderCanary => "header canary of the buffer was overwritten",
            FaultKind::BufferFooterCanary => "footer canary of the buffer was overwritten",
            FaultKind::ControlChecksum => "control checksum has unexpectedly changed",
            FaultKind::DataChecksum => "data checksum has unexpectedly changed",
            FaultKind::Overflow => "stack is overflowed",
        };
        f.write_str(text)
    }
}

/// One buffer slot as rendered in a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub index: usize,
    pub rendered: String,
    pub reserved: bool,
}

/// Snapshot of a stack's control block and buffer taken at fault time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDump {
    pub kind: FaultKind,
    pub type_name: &'static str,
    pub header_canary: Canary,
    pub buffer_header_canary: Canary,
    pub buffer_footer_canary: Canary,
    pub footer_canary: Canary,
    pub offset: usize,
    pub size: usize,
    pub control_checksum: u32,
    pub data_checksum: u32,
    /// Every buffer slot, live and reserved
    pub slots: Vec<SlotView>,
}

impl StackDump {
    /// Whether `Display` elides the middle of the buffer
    pub fn is_capped(&self) -> bool {
        self.slots.len() > DUMP_FULL_LIMIT
    }

    /// Slots shown before the elision (all of them when not capped)
    pub fn head(&self) -> &[SlotView] {
        if self.is_capped() {
            &self.slots[..DUMP_EDGE_SLOTS]
        } else {
            &self.slots
        }
    }

    /// Slots shown after the elision, empty when not capped
    pub fn tail(&self) -> &[SlotView] {
        if self.is_capped() {
            &self.slots[self.slots.len() - DUMP_EDGE_SLOTS..]
        } else {
            &[]
        }
    }

    /// Rendering that lists every slot regardless of buffer size
    pub fn full(&self) -> FullDump<'_> {
        FullDump(self)
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, capped: bool) -> fmt::Result {
        writeln!(f, "Dump ({}):", self.kind)?;
        writeln!(f, "GuardedStack<{}> {{", self.type_name)?;
        canary_line(f, "\t", "header canary", self.header_canary)?;
        writeln!(f, "\tbuffer {{")?;
        canary_line(f, "\t\t", "header canary", self.buffer_header_canary)?;
        writeln!(f, "\t\tdata [{}/{}] {{", self.offset, self.size)?;
        if capped && self.is_capped() {
            for slot in self.head() {
                slot_line(f, slot)?;
            }
            writeln!(f, "\t\t\t...")?;
            for slot in self.tail() {
                slot_line(f, slot)?;
            }
        } else {
            for slot in &self.slots {
                slot_line(f, slot)?;
            }
        }
        writeln!(f, "\t\t}}")?;
        canary_line(f, "\t\t", "footer canary", self.buffer_footer_canary)?;
        writeln!(f, "\t}}")?;

        let mark = |failed: bool| if failed { " (FAILED!)" } else { "" };
        writeln!(
            f,
            "\toffset: {}{};",
            self.offset,
            mark(self.kind == FaultKind::Overflow)
        )?;
        writeln!(f, "\tsize: {};", self.size)?;
        writeln!(
            f,
            "\tchecksum: {:#010x}{};",
            self.control_checksum,
            mark(self.kind == FaultKind::ControlChecksum)
        )?;
        writeln!(
            f,
            "\tdata checksum: {:#010x}{};",
            self.data_checksum,
            mark(self.kind == FaultKind::DataChecksum)
        )?;
        canary_line(f, "\t", "footer canary", self.footer_canary)?;
        write!(f, "}}")
    }
}

/// Uncapped view of a [`StackDump`]
pub struct FullDump<'a>(&'a StackDump);

impl fmt::Display for FullDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render(f, false)
    }
}

fn canary_line(f: &mut fmt::Formatter<'_>, indent: &str, label: &str, value: Canary) -> fmt::Result {
    write!(f, "{}{}: {:#x}", indent, label, value)?;
    if value != CANARY {
        write!(f, " (FAILED!)")?;
    }
    writeln!(f, ";")
}

fn slot_line(f: &mut fmt::Formatter<'_>, slot: &SlotView) -> fmt::Result {
    write!(f, "\t\t\t[{}]: {}", slot.index, slot.rendered)?;
    if slot.reserved {
        write!(f, " (reserved & poisoned)")?;
    }
    writeln!(f, ";")
}

impl fmt::Display for StackDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, true)
    }
}

/// Fatal corruption detected by a stack self-check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFault {
    pub kind: FaultKind,
    pub dump: Box<StackDump>,
}

impl StackFault {
    pub fn new(dump: StackDump) -> Self {
        StackFault {
            kind: dump.kind,
            dump: Box::new(dump),
        }
    }
}

impl fmt::Display for StackFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stack corrupted: {}", self.kind)
    }
}

impl std::error::Error for StackFault {}
