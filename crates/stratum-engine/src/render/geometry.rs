//! Per-batch geometry storage.
//!
//! A batch draws one shared footprint (a small quad) instanced once per member.
//! Each member owns a fixed-stride record of floats in `instances`; the record of
//! member `i` starts at `i * stride`.
//!
//! Removal policy: compaction. Removing a member shifts the following records
//! down (O(n)) so record order keeps matching paint order. Field patches are O(1)
//! in buffer size.

use core::ops::Range;

use crate::error::GeometryError;

/// Named per-instance field.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FieldId {
    /// Object offset + reference origin (2).
    Translate,
    /// Line endpoints relative to the reference origin (4).
    Points,
    /// Line cap code (1).
    Cap,
    /// Dash offset, segment percent, ratio in first segment (3).
    Dash,
    /// Primary premultiplied color (4).
    Color,
    /// Stroke width of a line (1).
    Width,
    /// Circle center relative to the reference origin (2).
    Center,
    /// Circle radius (1).
    Radius,
    /// Rect origin relative to the reference origin, then size (4).
    Extent,
    /// Outline color (4).
    StrokeColor,
    /// Outline width (1).
    StrokeWidth,
}

impl FieldId {
    /// Shader attribute name bound to this field.
    pub const fn attribute_name(self) -> &'static str {
        match self {
            FieldId::Translate => "a_Translate",
            FieldId::Points => "a_Points",
            FieldId::Cap => "a_Cap",
            FieldId::Dash => "a_Dash",
            FieldId::Color => "a_Color",
            FieldId::Width => "a_Width",
            FieldId::Center => "a_Center",
            FieldId::Radius => "a_Radius",
            FieldId::Extent => "a_Extent",
            FieldId::StrokeColor => "a_StrokeColor",
            FieldId::StrokeWidth => "a_StrokeWidth",
        }
    }
}

/// Placement of one field inside an instance record, in floats.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FieldDesc {
    pub id: FieldId,
    pub offset: usize,
    pub components: usize,
}

impl FieldDesc {
    #[inline]
    pub const fn new(id: FieldId, offset: usize, components: usize) -> Self {
        Self { id, offset, components }
    }

    #[inline]
    pub const fn byte_offset(&self) -> usize {
        self.offset * 4
    }

    #[inline]
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.components
    }
}

/// Instance record layout. Fixed once a batch selects its program.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InstanceLayout {
    fields: &'static [FieldDesc],
    stride: usize,
}

impl InstanceLayout {
    /// Stride is the end of the furthest field.
    pub const fn new(fields: &'static [FieldDesc]) -> Self {
        let mut stride = 0;
        let mut i = 0;
        while i < fields.len() {
            let end = fields[i].offset + fields[i].components;
            if end > stride {
                stride = end;
            }
            i += 1;
        }
        Self { fields, stride }
    }

    #[inline]
    pub fn fields(&self) -> &'static [FieldDesc] {
        self.fields
    }

    /// Record size in floats.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn byte_stride(&self) -> usize {
        self.stride * 4
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> Option<&'static FieldDesc> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Vertex attribute of the shared footprint, in floats.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FootprintAttr {
    pub name: &'static str,
    pub offset: usize,
    pub components: usize,
}

/// Geometry shared by every instance of a batch.
#[derive(Debug, PartialEq)]
pub struct Footprint {
    pub vertices: &'static [f32],
    /// Vertex size in floats.
    pub vertex_stride: usize,
    pub attributes: &'static [FootprintAttr],
    pub indices: &'static [u32],
}

impl Footprint {
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    #[cfg(test)]
    pub(crate) fn vertex_count(&self) -> usize {
        self.vertices.len() / self.vertex_stride
    }
}

/// Interleaved instance storage + shared footprint for one batch.
///
/// Invariant: `instances.len() == layout.stride() * len()`.
#[derive(Debug, Clone)]
pub struct GeometryBuffer {
    layout: InstanceLayout,
    footprint: &'static Footprint,
    instances: Vec<f32>,
    count: usize,
    /// Set by the first patch; blocks `set_layout` until the next rebuild.
    locked: bool,
    /// Float range written since the last `take_dirty`.
    dirty: Option<Range<usize>>,
    /// Record count changed since the last `take_dirty`.
    resized: bool,
}

impl GeometryBuffer {
    pub fn new(layout: InstanceLayout, footprint: &'static Footprint) -> Self {
        Self {
            layout,
            footprint,
            instances: Vec::new(),
            count: 0,
            locked: false,
            dirty: None,
            resized: false,
        }
    }

    #[inline]
    pub fn layout(&self) -> &InstanceLayout {
        &self.layout
    }

    #[inline]
    pub fn footprint(&self) -> &'static Footprint {
        self.footprint
    }

    /// Member count.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn vertex_data(&self) -> &'static [f32] {
        self.footprint.vertices
    }

    #[inline]
    pub fn index_data(&self) -> &'static [u32] {
        self.footprint.indices
    }

    #[inline]
    pub fn instance_data(&self) -> &[f32] {
        &self.instances
    }

    #[inline]
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn record(&self, member: usize) -> Option<&[f32]> {
        if member >= self.count {
            return None;
        }
        let stride = self.layout.stride();
        Some(&self.instances[member * stride..(member + 1) * stride])
    }

    pub fn field(&self, member: usize, id: FieldId) -> Option<&[f32]> {
        let desc = self.layout.field(id)?;
        let record = self.record(member)?;
        Some(&record[desc.range()])
    }

    /// Replaces the layout. Allowed only while no member has been patched since the
    /// last rebuild; existing records are discarded.
    pub fn set_layout(&mut self, layout: InstanceLayout) -> Result<(), GeometryError> {
        if self.locked && layout != self.layout {
            return Err(GeometryError::LayoutLocked);
        }
        if layout != self.layout {
            self.layout = layout;
            self.instances.clear();
            self.count = 0;
            self.resized = true;
            self.mark_dirty(0..0);
        }
        Ok(())
    }

    /// Full rebuild: `write(i, record)` fills member `i`'s zeroed record.
    ///
    /// Linear in `count`. Unlocks the layout.
    pub fn rebuild<F>(&mut self, count: usize, mut write: F)
    where
        F: FnMut(usize, &mut [f32]),
    {
        let stride = self.layout.stride();
        self.instances.clear();
        self.instances.resize(stride * count, 0.0);
        if stride > 0 {
            for (i, record) in self.instances.chunks_exact_mut(stride).enumerate() {
                write(i, record);
            }
        }
        self.resized |= self.count != count;
        self.count = count;
        self.locked = false;
        self.dirty = Some(0..self.instances.len());
    }

    /// Rebuild under a new layout. Always permitted.
    pub fn rebuild_with_layout<F>(&mut self, layout: InstanceLayout, count: usize, write: F)
    where
        F: FnMut(usize, &mut [f32]),
    {
        self.layout = layout;
        self.rebuild(count, write);
    }

    /// Appends one member and returns its index.
    pub fn push_record<F>(&mut self, write: F) -> usize
    where
        F: FnOnce(&mut [f32]),
    {
        let stride = self.layout.stride();
        let start = self.instances.len();
        self.instances.resize(start + stride, 0.0);
        write(&mut self.instances[start..]);
        self.count += 1;
        self.resized = true;
        self.mark_dirty(start..start + stride);
        self.count - 1
    }

    /// Removes a member, shifting later records down. O(n).
    pub fn remove_record(&mut self, member: usize) -> Result<(), GeometryError> {
        if member >= self.count {
            return Err(GeometryError::MemberOutOfRange { index: member, count: self.count });
        }
        let stride = self.layout.stride();
        let start = member * stride;
        self.instances.drain(start..start + stride);
        self.count -= 1;
        self.resized = true;
        self.mark_dirty(start..self.instances.len());
        Ok(())
    }

    /// Rewrites every field of one member.
    pub fn write_record<F>(&mut self, member: usize, write: F) -> Result<(), GeometryError>
    where
        F: FnOnce(&mut [f32]),
    {
        if member >= self.count {
            return Err(GeometryError::MemberOutOfRange { index: member, count: self.count });
        }
        let stride = self.layout.stride();
        let range = member * stride..(member + 1) * stride;
        write(&mut self.instances[range.clone()]);
        self.mark_dirty(range);
        Ok(())
    }

    /// Overwrites one field of one member. Touches exactly `values.len()` floats.
    pub fn patch_field(
        &mut self,
        member: usize,
        id: FieldId,
        values: &[f32],
    ) -> Result<(), GeometryError> {
        let desc = self.layout.field(id).ok_or(GeometryError::UnknownField(id))?;
        if values.len() != desc.components {
            return Err(GeometryError::ComponentMismatch {
                field: id,
                expected: desc.components,
                got: values.len(),
            });
        }
        if member >= self.count {
            return Err(GeometryError::MemberOutOfRange { index: member, count: self.count });
        }

        let start = member * self.layout.stride() + desc.offset;
        let range = start..start + desc.components;
        self.instances[range.clone()].copy_from_slice(values);
        self.locked = true;
        self.mark_dirty(range);
        Ok(())
    }

    #[inline]
    pub fn is_layout_locked(&self) -> bool {
        self.locked
    }

    /// Float range written since the previous call (union of all writes).
    /// Also clears the [`resized`](Self::resized) flag.
    #[inline]
    pub fn take_dirty(&mut self) -> Option<Range<usize>> {
        self.resized = false;
        self.dirty.take()
    }

    /// True when the record count changed since the last `take_dirty`.
    #[inline]
    pub fn resized(&self) -> bool {
        self.resized
    }

    #[inline]
    pub fn dirty(&self) -> Option<Range<usize>> {
        self.dirty.clone()
    }

    fn mark_dirty(&mut self, range: Range<usize>) {
        self.dirty = Some(match self.dirty.take() {
            None => range,
            Some(d) => d.start.min(range.start)..d.end.max(range.end),
        });
    }
}
