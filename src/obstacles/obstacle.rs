use crate::rrt::state::RealVectorState;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A static obstacle with exact containment and segment intersection tests.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Obstacle<F: Float, const N: usize> {
    /// Axis-aligned box, boundary included.
    Aabb {
        min_corner: RealVectorState<F, N>,
        max_corner: RealVectorState<F, N>,
    },
    /// Open ball.
    Ball {
        center: RealVectorState<F, N>,
        radius: F,
    },
}

impl<F: Float, const N: usize> Obstacle<F, N> {
    pub fn aabb(min_corner: RealVectorState<F, N>, max_corner: RealVectorState<F, N>) -> Self {
        Obstacle::Aabb {
            min_corner,
            max_corner,
        }
    }

    pub fn ball(center: RealVectorState<F, N>, radius: F) -> Self {
        Obstacle::Ball { center, radius }
    }

    pub fn contains(&self, state: &RealVectorState<F, N>) -> bool {
        match self {
            Obstacle::Aabb {
                min_corner,
                max_corner,
            } => (0..N).all(|i| state[i] >= min_corner[i] && state[i] <= max_corner[i]),
            Obstacle::Ball { center, radius } => {
                center.euclidean_distance_squared(state) < *radius * *radius
            }
        }
    }

    /// Checks if the segment `[start, end]` touches the obstacle.
    pub fn intersects_segment(
        &self,
        start: &RealVectorState<F, N>,
        end: &RealVectorState<F, N>,
    ) -> bool {
        match self {
            Obstacle::Aabb {
                min_corner,
                max_corner,
            } => segment_hits_aabb(start, end, min_corner, max_corner),
            Obstacle::Ball { center, radius } => {
                segment_hits_ball(start, end, center, *radius)
            }
        }
    }
}

/// Slab test: clip the segment parameter range `[0, 1]` against every axis.
fn segment_hits_aabb<F: Float, const N: usize>(
    start: &RealVectorState<F, N>,
    end: &RealVectorState<F, N>,
    min_corner: &RealVectorState<F, N>,
    max_corner: &RealVectorState<F, N>,
) -> bool {
    let dir = end - start;
    let mut t_enter = F::zero();
    let mut t_exit = F::one();

    for i in 0..N {
        if dir[i] == F::zero() {
            if start[i] < min_corner[i] || start[i] > max_corner[i] {
                return false;
            }
            continue;
        }

        let mut t0 = (min_corner[i] - start[i]) / dir[i];
        let mut t1 = (max_corner[i] - start[i]) / dir[i];
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return false;
        }
    }

    true
}

/// Distance from the center to the closest point of the segment.
fn segment_hits_ball<F: Float, const N: usize>(
    start: &RealVectorState<F, N>,
    end: &RealVectorState<F, N>,
    center: &RealVectorState<F, N>,
    radius: F,
) -> bool {
    let dir = end - start;
    let length_squared = dir.dot(&dir);
    let t = if length_squared > F::zero() {
        ((center - start).dot(&dir) / length_squared)
            .max(F::zero())
            .min(F::one())
    } else {
        F::zero()
    };
    let closest = start.lerp(end, t);
    closest.euclidean_distance_squared(center) < radius * radius
}
