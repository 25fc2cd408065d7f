//! Grid line traversal (Amanatides & Woo).
//!
//! Walks the ordered sequence of voxel cells a ray passes through. Per axis
//! the stepper keeps the time to the next cell boundary; each step advances
//! whichever axis crosses first. Progress is bounded by `t_max` and by the
//! grid's extremum voxel, so the sequence is always finite.
//!
//! The stepper keeps a one-item lookahead: `peek()` exposes the next cell's
//! entry time without consuming it, which is what the multi-grid scheduler
//! keys its priority queue on.

use raygrid_math::{IVec3, Ray, Vec3};

use crate::voxel::to_voxel;

/// One cell of a traversal: the voxel plus the ray's entry and exit times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelStep {
    pub voxel: IVec3,
    /// Ray parameter at which the ray enters this cell (0 for the origin's
    /// cell).
    pub enter: f32,
    /// Ray parameter of the next boundary crossing out of this cell.
    pub exit: f32,
}

/// Stepping state for one ray through one uniform grid.
pub struct GridTraversal {
    /// Voxel of the pending step.
    voxel: IVec3,
    /// Per-axis voxel increment; signum of the ray direction.
    step: IVec3,
    /// Time to cross one full cell along each axis; infinite where the
    /// direction component is zero.
    t_delta: Vec3,
    /// Time of the next boundary crossing along each axis.
    t_next: Vec3,
    t_max: f32,
    extremum: IVec3,
    pending: Option<VoxelStep>,
}

impl GridTraversal {
    /// Set up a traversal starting in the voxel containing the ray origin.
    pub fn new(ray: &Ray, t_max: f32, dimension: f32, extremum: IVec3) -> Self {
        let origin_voxel = to_voxel(ray.origin, dimension);

        let mut step = IVec3::ZERO;
        let mut t_delta = Vec3::INFINITY;
        let mut t_next = Vec3::INFINITY;

        for axis in 0..3 {
            let dir = ray.direction[axis];
            if dir > 0.0 {
                step[axis] = 1;
                t_delta[axis] = dimension / dir;
                let far_face = (origin_voxel[axis] + 1) as f32 * dimension;
                t_next[axis] = (far_face - ray.origin[axis]) / dir;
            } else if dir < 0.0 {
                step[axis] = -1;
                t_delta[axis] = dimension / -dir;
                let near_face = origin_voxel[axis] as f32 * dimension;
                t_next[axis] = (near_face - ray.origin[axis]) / dir;
            }
        }

        let pending = (t_max >= 0.0).then(|| VoxelStep {
            voxel: origin_voxel,
            enter: 0.0,
            exit: t_next.min_element(),
        });

        Self {
            voxel: origin_voxel,
            step,
            t_delta,
            t_next,
            t_max,
            extremum,
            pending,
        }
    }

    /// The step `next()` would return, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<&VoxelStep> {
        self.pending.as_ref()
    }

    /// Compute the step after the one just emitted, if traversal continues.
    fn advance(&mut self) -> Option<VoxelStep> {
        let axis = min_axis(self.t_next);
        let boundary = self.t_next[axis];

        if boundary > self.t_max || !boundary.is_finite() {
            return None;
        }

        let mut voxel = self.voxel;
        voxel[axis] += self.step[axis];
        // Stop once the walk has left the populated coordinate range in its
        // travel direction; a walk heading back toward the grid keeps going.
        if voxel[axis] * self.step[axis] > self.extremum[axis] {
            return None;
        }

        self.voxel = voxel;
        self.t_next[axis] += self.t_delta[axis];

        Some(VoxelStep {
            voxel,
            enter: boundary,
            exit: self.t_next.min_element(),
        })
    }
}

impl Iterator for GridTraversal {
    type Item = VoxelStep;

    fn next(&mut self) -> Option<VoxelStep> {
        let current = self.pending.take()?;
        self.pending = self.advance();
        Some(current)
    }
}

/// Axis with the smallest component; ties resolve x before y before z.
#[inline]
fn min_axis(v: Vec3) -> usize {
    if v.x <= v.y {
        if v.x <= v.z {
            0
        } else {
            2
        }
    } else if v.y <= v.z {
        1
    } else {
        2
    }
}
