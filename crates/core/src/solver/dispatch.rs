//! Per-cell kernel dispatch over the whole grid
//!
//! Every stage is an embarrassingly parallel per-cell function. Work is split
//! into rows of `width` contiguous cells and handed to Rayon; a dispatch returns
//! only once every row has been written, so consecutive dispatches are strictly
//! ordered.

use crate::grid::GridDims;
use rayon::prelude::*;

#[inline]
fn row_coords(row: usize, dims: &GridDims) -> (usize, usize) {
    (row % dims.height, row / dims.height)
}

/// Evaluate `kernel` for every cell and store the result in `out`
pub fn dispatch<T, F>(dims: &GridDims, out: &mut [T], kernel: F)
where
    T: Send,
    F: Fn(usize, usize, usize) -> T + Sync,
{
    debug_assert_eq!(out.len(), dims.total());
    out.par_chunks_mut(dims.width)
        .enumerate()
        .for_each(|(row, cells)| {
            let (y, z) = row_coords(row, dims);
            for (x, cell) in cells.iter_mut().enumerate() {
                *cell = kernel(x, y, z);
            }
        });
}

/// Evaluate a three-output kernel for every cell
pub fn dispatch3<A, B, C, F>(dims: &GridDims, a: &mut [A], b: &mut [B], c: &mut [C], kernel: F)
where
    A: Send,
    B: Send,
    C: Send,
    F: Fn(usize, usize, usize) -> (A, B, C) + Sync,
{
    debug_assert_eq!(a.len(), dims.total());
    debug_assert_eq!(b.len(), dims.total());
    debug_assert_eq!(c.len(), dims.total());
    let width = dims.width;
    a.par_chunks_mut(width)
        .zip(b.par_chunks_mut(width))
        .zip(c.par_chunks_mut(width))
        .enumerate()
        .for_each(|(row, ((row_a, row_b), row_c))| {
            let (y, z) = row_coords(row, dims);
            for x in 0..width {
                let (va, vb, vc) = kernel(x, y, z);
                row_a[x] = va;
                row_b[x] = vb;
                row_c[x] = vc;
            }
        });
}

/// Update every cell in place from its own value
pub fn dispatch_in_place<T, F>(dims: &GridDims, data: &mut [T], kernel: F)
where
    T: Send,
    F: Fn(usize, usize, usize, &mut T) + Sync,
{
    debug_assert_eq!(data.len(), dims.total());
    data.par_chunks_mut(dims.width)
        .enumerate()
        .for_each(|(row, cells)| {
            let (y, z) = row_coords(row, dims);
            for (x, cell) in cells.iter_mut().enumerate() {
                kernel(x, y, z, cell);
            }
        });
}

/// Update three fields in place, cell by cell
pub fn dispatch3_in_place<A, B, C, F>(
    dims: &GridDims,
    a: &mut [A],
    b: &mut [B],
    c: &mut [C],
    kernel: F,
) where
    A: Send,
    B: Send,
    C: Send,
    F: Fn(usize, usize, usize, &mut A, &mut B, &mut C) + Sync,
{
    let width = dims.width;
    a.par_chunks_mut(width)
        .zip(b.par_chunks_mut(width))
        .zip(c.par_chunks_mut(width))
        .enumerate()
        .for_each(|(row, ((row_a, row_b), row_c))| {
            let (y, z) = row_coords(row, dims);
            for x in 0..width {
                kernel(x, y, z, &mut row_a[x], &mut row_b[x], &mut row_c[x]);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_visits_every_cell_with_matching_coords() {
        let dims = GridDims::new(5, 3, 4).unwrap();
        let mut out = vec![0_usize; dims.total()];
        dispatch(&dims, &mut out, |x, y, z| dims.index(x, y, z));
        assert!(out.iter().enumerate().all(|(i, &v)| i == v));
    }

    #[test]
    fn test_dispatch3_writes_all_outputs() {
        let dims = GridDims::new(2, 2, 2).unwrap();
        let mut a = vec![0.0_f32; 8];
        let mut b = vec![0_u32; 8];
        let mut c = vec![false; 8];
        dispatch3(&dims, &mut a, &mut b, &mut c, |x, y, z| {
            (x as f32, (y + z) as u32, x == 1)
        });
        assert_eq!(a[dims.index(1, 0, 1)], 1.0);
        assert_eq!(b[dims.index(0, 1, 1)], 2);
        assert!(c[dims.index(1, 1, 1)]);
        assert!(!c[dims.index(0, 1, 1)]);
    }

    #[test]
    fn test_in_place_sees_previous_value() {
        let dims = GridDims::new(3, 3, 1).unwrap();
        let mut data = vec![2.0_f32; dims.total()];
        dispatch_in_place(&dims, &mut data, |x, _, _, v| *v += x as f32);
        assert_eq!(data[dims.index(2, 1, 0)], 4.0);
    }
}
