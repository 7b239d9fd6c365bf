//! Field storage for the solver
//!
//! Single-buffered fields ([`Field`]) hold derived quantities that are fully
//! recomputed every step. Double-buffered fields ([`DoubleBuffer`]) hold state
//! that a stage reads in full while writing a new version: two arenas and one
//! parity bit choosing which arena is "current". Swapping flips the bit and
//! never moves memory.

use super::GridDims;
use crate::core_types::Vec4;
use std::borrow::Cow;
use std::ops::Deref;

/// Value stored in one grid cell
pub trait FieldElement: Copy + Send + Sync + 'static {
    /// The value every cell holds after allocation
    fn zero() -> Self;
}

impl FieldElement for f32 {
    #[inline]
    fn zero() -> Self {
        0.0
    }
}

impl FieldElement for Vec4 {
    #[inline]
    fn zero() -> Self {
        Vec4::zeros()
    }
}

/// Single-buffered field
#[derive(Debug, Clone)]
pub struct Field<T> {
    data: Vec<T>,
    dims: GridDims,
}

impl<T: FieldElement> Field<T> {
    /// Allocate a zeroed field covering `dims`
    #[must_use]
    pub fn new(dims: GridDims) -> Self {
        Self {
            data: vec![T::zero(); dims.total()],
            dims,
        }
    }

    /// Grid dimensions
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Get reference to field data
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get mutable reference to field data
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Value at `(x, y, z)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        assert!(
            x < self.dims.width && y < self.dims.height && z < self.dims.depth,
            "Coordinates out of bounds"
        );
        self.data[self.dims.index(x, y, z)]
    }

    /// Fill entire field with a value
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

/// Ping-pong pair of buffers with a parity bit
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    buffers: [Vec<T>; 2],
    current: usize,
    dims: GridDims,
}

impl<T: FieldElement> DoubleBuffer<T> {
    /// Allocate both buffers, zeroed, with buffer 0 current
    #[must_use]
    pub fn new(dims: GridDims) -> Self {
        Self {
            buffers: [vec![T::zero(); dims.total()], vec![T::zero(); dims.total()]],
            current: 0,
            dims,
        }
    }

    /// Grid dimensions
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Index (0 or 1) of the current buffer
    pub fn parity(&self) -> usize {
        self.current
    }

    /// Current buffer
    pub fn read(&self) -> &[T] {
        &self.buffers[self.current]
    }

    /// Current buffer, for stages that update each cell from its own value only
    pub fn read_mut(&mut self) -> &mut [T] {
        &mut self.buffers[self.current]
    }

    /// Write target of the next full-state stage
    pub fn write(&mut self) -> &mut [T] {
        &mut self.buffers[self.current ^ 1]
    }

    /// Borrow the current buffer for reading and the other for writing
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        let (front, back) = self.buffers.split_at_mut(1);
        if self.current == 0 {
            (front[0].as_slice(), back[0].as_mut_slice())
        } else {
            (back[0].as_slice(), front[0].as_mut_slice())
        }
    }

    /// Make the write target current
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Fill both buffers with a value
    pub fn fill(&mut self, value: T) {
        for buffer in &mut self.buffers {
            buffer.fill(value);
        }
    }
}

/// Read-only handle to a field's current contents
///
/// This is what external collaborators (renderers, exporters) receive. The CPU
/// backend lends its buffer directly; other backends may hand out a copy.
#[derive(Debug, Clone)]
pub struct FieldView<'a, T: Clone> {
    data: Cow<'a, [T]>,
    dims: GridDims,
}

impl<'a, T: FieldElement> FieldView<'a, T> {
    /// Wrap field data with its dimensions
    pub fn new(data: Cow<'a, [T]>, dims: GridDims) -> Self {
        debug_assert_eq!(data.len(), dims.total());
        Self { data, dims }
    }

    /// Grid dimensions
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Value at `(x, y, z)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        assert!(
            x < self.dims.width && y < self.dims.height && z < self.dims.depth,
            "Coordinates out of bounds"
        );
        self.data[self.dims.index(x, y, z)]
    }

    /// Field data in flat index order
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: FieldElement + bytemuck::Pod> FieldView<'_, T> {
    /// Raw bytes for uploading into a texture or storage buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

impl<T: Clone> Deref for FieldView<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> GridDims {
        GridDims::new(3, 2, 2).unwrap()
    }

    #[test]
    fn test_field_creation() {
        let field: Field<f32> = Field::new(dims());
        assert_eq!(field.as_slice().len(), 12);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_field_get_and_fill() {
        let mut field: Field<f32> = Field::new(dims());
        field.as_mut_slice()[dims().index(2, 1, 1)] = 7.5;
        assert_eq!(field.get(2, 1, 1), 7.5);
        field.fill(1.0);
        assert!(field.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_field_bounds_check() {
        let field: Field<f32> = Field::new(dims());
        let _ = field.get(3, 0, 0);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_view_bounds_check() {
        let field: Field<f32> = Field::new(dims());
        let view = FieldView::new(Cow::Borrowed(field.as_slice()), dims());
        let _ = view.get(3, 0, 0);
    }

    #[test]
    fn test_swap_alternates_between_two_arenas() {
        let mut buffer: DoubleBuffer<f32> = DoubleBuffer::new(dims());
        let first = buffer.read().as_ptr();
        let second = buffer.write().as_ptr();
        assert_ne!(first, second);

        buffer.swap();
        assert_eq!(buffer.parity(), 1);
        assert_eq!(buffer.read().as_ptr(), second);

        buffer.swap();
        assert_eq!(buffer.parity(), 0);
        assert_eq!(buffer.read().as_ptr(), first);
    }

    #[test]
    fn test_split_writes_become_current_after_swap() {
        let mut buffer: DoubleBuffer<f32> = DoubleBuffer::new(dims());
        buffer.read_mut().fill(2.0);
        {
            let (read, write) = buffer.split();
            for (dst, src) in write.iter_mut().zip(read) {
                *dst = src * 3.0;
            }
        }
        assert!(buffer.read().iter().all(|&v| v == 2.0));
        buffer.swap();
        assert!(buffer.read().iter().all(|&v| v == 6.0));
    }

    #[test]
    fn test_view_exposes_bytes() {
        let mut field: Field<Vec4> = Field::new(dims());
        field.fill(Vec4::new(1.0, 2.0, 3.0, 4.0));
        let view = FieldView::new(Cow::Borrowed(field.as_slice()), field.dims());
        assert_eq!(view.as_bytes().len(), 12 * 16);
        assert_eq!(view.get(1, 1, 1).w, 4.0);
        assert_eq!(view.len(), 12);
    }
}
