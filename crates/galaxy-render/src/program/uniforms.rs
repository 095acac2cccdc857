//! Reflected uniform layout and its CPU-side staging block
//!
//! The layout is read from the shader, so adding a uniform to the WGSL
//! struct is enough to make it settable by name.

use std::collections::HashMap;

use tracing::{trace, warn};

/// Scalar or vector shape of a uniform member
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    F32,
    U32,
    I32,
    Vec2,
    Vec3,
    Vec4,
}

impl UniformKind {
    /// Size of the value in bytes
    pub fn size(self) -> usize {
        match self {
            UniformKind::F32 | UniformKind::U32 | UniformKind::I32 => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
        }
    }
}

/// A value destined for one uniform member
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    F32(f32),
    U32(u32),
    I32(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Stored as a `u32` flag (uniform blocks carry no booleans)
    Bool(bool),
}

impl UniformValue {
    /// Kind of slot this value can be written to
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::F32(_) => UniformKind::F32,
            UniformValue::U32(_) | UniformValue::Bool(_) => UniformKind::U32,
            UniformValue::I32(_) => UniformKind::I32,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
        }
    }

    fn write(&self, out: &mut [u8]) {
        let mut put = |i: usize, bytes: [u8; 4]| out[i * 4..i * 4 + 4].copy_from_slice(&bytes);
        match *self {
            UniformValue::F32(v) => put(0, v.to_le_bytes()),
            UniformValue::U32(v) => put(0, v.to_le_bytes()),
            UniformValue::I32(v) => put(0, v.to_le_bytes()),
            UniformValue::Bool(v) => put(0, u32::from(v).to_le_bytes()),
            UniformValue::Vec2(v) => v.iter().enumerate().for_each(|(i, c)| put(i, c.to_le_bytes())),
            UniformValue::Vec3(v) => v.iter().enumerate().for_each(|(i, c)| put(i, c.to_le_bytes())),
            UniformValue::Vec4(v) => v.iter().enumerate().for_each(|(i, c)| put(i, c.to_le_bytes())),
        }
    }

    fn read(kind: UniformKind, bytes: &[u8]) -> Option<UniformValue> {
        let word = |i: usize| -> Option<[u8; 4]> { bytes.get(i * 4..i * 4 + 4)?.try_into().ok() };
        let f = |i: usize| word(i).map(f32::from_le_bytes);
        Some(match kind {
            UniformKind::F32 => UniformValue::F32(f(0)?),
            UniformKind::U32 => UniformValue::U32(u32::from_le_bytes(word(0)?)),
            UniformKind::I32 => UniformValue::I32(i32::from_le_bytes(word(0)?)),
            UniformKind::Vec2 => UniformValue::Vec2([f(0)?, f(1)?]),
            UniformKind::Vec3 => UniformValue::Vec3([f(0)?, f(1)?, f(2)?]),
            UniformKind::Vec4 => UniformValue::Vec4([f(0)?, f(1)?, f(2)?, f(3)?]),
        })
    }
}

/// Location of a named uniform inside the block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSlot {
    /// Byte offset from the start of the block
    pub offset: u32,
    pub kind: UniformKind,
}

/// Uniform-location cache keyed by member name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformLayout {
    /// Total block size in bytes, including trailing padding
    pub span: u32,
    pub slots: HashMap<String, UniformSlot>,
}

impl UniformLayout {
    pub fn slot(&self, name: &str) -> Option<UniformSlot> {
        self.slots.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Staging bytes for the uniform buffer
///
/// Writes are validated against the reflected layout; unknown names and
/// mismatched kinds are ignored rather than treated as errors.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
}

impl UniformBlock {
    /// Create a zero-filled block for a layout
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.span as usize];
        Self { layout, bytes }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Whether the shader declares a uniform with this name
    pub fn has_uniform(&self, name: &str) -> bool {
        self.layout.slots.contains_key(name)
    }

    /// Write a uniform by name
    ///
    /// Returns `false` when the uniform is absent or the value kind does not
    /// match the declared member.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> bool {
        let Some(slot) = self.layout.slot(name) else {
            trace!(uniform = name, "uniform not present in program, skipped");
            return false;
        };
        if slot.kind != value.kind() {
            warn!(uniform = name, "expected {:?}, got {:?}; write ignored", slot.kind, value.kind());
            return false;
        }
        let start = slot.offset as usize;
        let end = start + slot.kind.size();
        match self.bytes.get_mut(start..end) {
            Some(dst) => {
                value.write(dst);
                true
            }
            None => {
                warn!(uniform = name, "slot outside block span, write ignored");
                false
            }
        }
    }

    /// Read back the current value of a uniform
    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let slot = self.layout.slot(name)?;
        let start = slot.offset as usize;
        UniformValue::read(slot.kind, self.bytes.get(start..start + slot.kind.size())?)
    }

    /// Raw bytes ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> UniformLayout {
        let mut slots = HashMap::new();
        slots.insert("resolution".to_string(), UniformSlot { offset: 0, kind: UniformKind::Vec3 });
        slots.insert("time".to_string(), UniformSlot { offset: 12, kind: UniformKind::F32 });
        slots.insert("mouse".to_string(), UniformSlot { offset: 16, kind: UniformKind::Vec2 });
        slots.insert("transparent".to_string(), UniformSlot { offset: 24, kind: UniformKind::U32 });
        UniformLayout { span: 32, slots }
    }

    #[test]
    fn test_block_zero_filled() {
        let block = UniformBlock::new(layout());
        assert_eq!(block.as_bytes().len(), 32);
        assert!(block.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_set_and_get_uniform() {
        let mut block = UniformBlock::new(layout());
        assert!(block.set_uniform("time", UniformValue::F32(1.5)));
        assert!(block.set_uniform("mouse", UniformValue::Vec2([0.25, 0.75])));
        assert_eq!(block.get("time"), Some(UniformValue::F32(1.5)));
        assert_eq!(block.get("mouse"), Some(UniformValue::Vec2([0.25, 0.75])));
        assert_eq!(&block.as_bytes()[12..16], &1.5f32.to_le_bytes());
    }

    #[test]
    fn test_missing_uniform_is_noop() {
        let mut block = UniformBlock::new(layout());
        assert!(!block.set_uniform("nope", UniformValue::F32(1.0)));
        assert!(block.as_bytes().iter().all(|b| *b == 0));
        assert_eq!(block.get("nope"), None);
    }

    #[test]
    fn test_kind_mismatch_ignored() {
        let mut block = UniformBlock::new(layout());
        assert!(!block.set_uniform("time", UniformValue::Vec2([1.0, 2.0])));
        assert_eq!(block.get("time"), Some(UniformValue::F32(0.0)));
    }

    #[test]
    fn test_bool_written_as_flag() {
        let mut block = UniformBlock::new(layout());
        assert!(block.set_uniform("transparent", UniformValue::Bool(true)));
        assert_eq!(block.get("transparent"), Some(UniformValue::U32(1)));
        assert!(block.set_uniform("transparent", UniformValue::Bool(false)));
        assert_eq!(block.get("transparent"), Some(UniformValue::U32(0)));
    }

    #[test]
    fn test_slot_past_span_rejected() {
        let mut l = layout();
        l.slots.insert("bad".to_string(), UniformSlot { offset: 30, kind: UniformKind::F32 });
        let mut block = UniformBlock::new(l);
        assert!(!block.set_uniform("bad", UniformValue::F32(1.0)));
    }
}
