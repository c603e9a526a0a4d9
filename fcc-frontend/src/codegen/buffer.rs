//! Append-only instruction buffer with backpatching
//!
//! Branch targets that are not known yet are emitted as a reserved
//! placeholder character. Every placeholder is registered as an open
//! [`PatchRecord`] and must be closed by exactly one [`CodeBuffer::backpatch`]
//! before the buffer can be rendered.

use super::naming::IrNamer;
use fcc_common::ice;
use log::{debug, trace};
use std::collections::HashSet;

/// Marks an unresolved label operand inside an emitted line
///
/// Never produced by string constant encoding, which hex-escapes every
/// non-ASCII byte.
pub const PLACEHOLDER: char = '§';

/// Which placeholder of a line a patch record refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// leftmost placeholder
    First,
    /// rightmost placeholder
    Second,
}

/// Coordinates of one unresolved placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchRecord {
    pub line: usize,
    pub slot: Slot,
}

impl PatchRecord {
    pub fn new(line: usize, slot: Slot) -> Self {
        Self { line, slot }
    }
}

/// Ordered set of placeholders awaiting the same label
pub type PatchList = Vec<PatchRecord>;

/// Concatenate two patch lists, keeping encounter order
pub fn merge(mut first: PatchList, second: PatchList) -> PatchList {
    first.extend(second);
    first
}

#[derive(Debug, Clone)]
pub struct CodeBuffer {
    lines: Vec<String>,
    globals: Vec<String>,
    indent: usize,
    indent_width: usize,
    open: HashSet<PatchRecord>,
}

impl CodeBuffer {
    pub fn new(indent_width: usize) -> Self {
        Self {
            lines: Vec::new(),
            globals: Vec::new(),
            indent: 0,
            indent_width,
            open: HashSet::new(),
        }
    }

    /// Append one instruction line and return its position
    pub fn emit(&mut self, line: impl AsRef<str>) -> usize {
        let line = line.as_ref();
        if line.contains(PLACEHOLDER) {
            ice!("placeholder emitted without registering a patch slot: {line}");
        }
        self.push_line(line)
    }

    /// Append a line whose placeholders become open patch slots
    ///
    /// Returns the records for the placeholders, leftmost first. A line may
    /// hold at most two placeholders.
    pub fn emit_with_holes(&mut self, line: impl AsRef<str>) -> Vec<PatchRecord> {
        let line = line.as_ref();
        let holes = line.matches(PLACEHOLDER).count();
        let index = self.push_line(line);

        let records: Vec<PatchRecord> = match holes {
            1 => vec![PatchRecord::new(index, Slot::First)],
            2 => vec![
                PatchRecord::new(index, Slot::First),
                PatchRecord::new(index, Slot::Second),
            ],
            n => ice!("line {index} carries {n} placeholders: {line}"),
        };
        self.open.extend(records.iter().copied());
        records
    }

    /// Emit `br label <placeholder>` and return its patch record
    pub fn jump(&mut self) -> PatchRecord {
        let records = self.emit_with_holes(format!("br label {PLACEHOLDER}"));
        records[0]
    }

    /// Emit a two-way branch on `condition` and return (true, false) records
    pub fn branch(&mut self, condition: &str) -> (PatchRecord, PatchRecord) {
        let records = self.emit_with_holes(format!(
            "br i1 {condition}, label {PLACEHOLDER}, label {PLACEHOLDER}"
        ));
        (records[0], records[1])
    }

    pub fn emit_global(&mut self, line: impl Into<String>) -> usize {
        let line = line.into();
        trace!("global: {line}");
        self.globals.push(line);
        self.globals.len() - 1
    }

    /// Allocate a fresh label and define it at the current position
    pub fn emit_label(&mut self, namer: &mut IrNamer) -> String {
        let label = namer.fresh_label();
        trace!("{label}:");
        self.lines.push(format!("{label}:"));
        label
    }

    /// Point every record of `list` at `label`
    pub fn backpatch(&mut self, list: &[PatchRecord], label: &str) {
        if !list.is_empty() {
            debug!("backpatch {} slot(s) to {label}", list.len());
        }

        let target = format!("%{label}");
        for record in list {
            if !self.open.remove(record) {
                ice!(
                    "backpatch of line {} slot {:?} which is not open",
                    record.line,
                    record.slot
                );
            }

            let line = &mut self.lines[record.line];
            let found = match record.slot {
                Slot::First => line.find(PLACEHOLDER),
                Slot::Second => line.rfind(PLACEHOLDER),
            };
            match found {
                Some(at) => line.replace_range(at..at + PLACEHOLDER.len_utf8(), &target),
                None => ice!("no placeholder left on line {}", record.line),
            }
        }
    }

    pub fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Number of placeholders still waiting for a label
    pub fn open_slots(&self) -> usize {
        self.open.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn globals(&self) -> &[String] {
        &self.globals
    }

    /// Produce the final text: globals, a blank line, then instructions
    pub fn render(&self) -> String {
        if !self.open.is_empty() {
            let mut lines: Vec<usize> = self.open.iter().map(|r| r.line).collect();
            lines.sort_unstable();
            ice!("unresolved placeholders on lines {lines:?}");
        }

        let mut out = String::new();
        for global in &self.globals {
            out.push_str(global);
            out.push('\n');
        }
        if !self.globals.is_empty() {
            out.push('\n');
        }
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    fn push_line(&mut self, line: &str) -> usize {
        let text = format!("{}{}", " ".repeat(self.indent * self.indent_width), line);
        trace!("{text}");
        self.lines.push(text);
        self.lines.len() - 1
    }
}
