//! Voxel coordinates and the per-grid cell map.
//!
//! A voxel coordinate is the floor of a world position divided by the grid's
//! cell dimension, per axis. The map stores which primitives touch which
//! cell, and tracks the extremum voxel: the largest absolute coordinate seen
//! on each axis across all insertions. The extremum grows incrementally as
//! cells are inserted; it is what bounds ray traversal later.

use std::collections::HashMap;

use raygrid_math::{Aabb, IVec3, Vec3};

use crate::primitive::PrimitiveRef;

/// World position to voxel coordinate.
#[inline]
pub fn to_voxel(pos: Vec3, dimension: f32) -> IVec3 {
    (pos / dimension).floor().as_ivec3()
}

/// Every voxel coordinate a box overlaps: the inclusive integer cuboid
/// between the voxels of its min and max corners.
pub fn to_voxels(bounds: &Aabb, dimension: f32) -> Vec<IVec3> {
    let lo = to_voxel(bounds.min, dimension);
    let hi = to_voxel(bounds.max, dimension);

    if lo == hi {
        return vec![lo];
    }

    let mut voxels = Vec::with_capacity(
        ((hi.x - lo.x + 1) * (hi.y - lo.y + 1) * (hi.z - lo.z + 1)) as usize,
    );
    for x in lo.x..=hi.x {
        for y in lo.y..=hi.y {
            for z in lo.z..=hi.z {
                voxels.push(IVec3::new(x, y, z));
            }
        }
    }
    voxels
}

/// Mapping from voxel coordinate to the primitives located there.
///
/// Built once during space initialization; read-only afterwards.
#[derive(Default)]
pub struct VoxelMap {
    cells: HashMap<IVec3, Vec<PrimitiveRef>>,
    extremum: IVec3,
}

impl VoxelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a primitive in a cell and grow the extremum to cover it.
    pub fn insert(&mut self, voxel: IVec3, primitive: PrimitiveRef) {
        self.extremum = self.extremum.max(voxel.abs());
        self.cells.entry(voxel).or_default().push(primitive);
    }

    /// Primitives in a cell, if the cell is populated.
    pub fn get(&self, voxel: IVec3) -> Option<&[PrimitiveRef]> {
        self.cells.get(&voxel).map(|v| v.as_slice())
    }

    /// Largest absolute coordinate observed per axis.
    #[inline]
    pub fn extremum(&self) -> IVec3 {
        self.extremum
    }

    /// Number of populated cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
