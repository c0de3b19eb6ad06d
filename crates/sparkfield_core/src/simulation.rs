//! CPU reference of the compute kernel.
//!
//! Same arithmetic as `cs_main` in the WGSL update shader, in the same order,
//! so golden values computed here match what the GPU writes.

use crate::config::BOUND;

/// Scale applied to the overshooting position when a particle is recycled.
pub const RECENTER_SCALE: f32 = 0.05;

/// Advances one particle by one step.
///
/// `p' = p + v`; if either component of `p'` is strictly beyond `±BOUND`,
/// both components become `-2v + 0.05 p'`. A component sitting exactly on
/// the bound is in-bounds.
#[inline]
#[must_use]
pub fn step_particle(position: [f32; 2], velocity: [f32; 2]) -> [f32; 2] {
    let moved = [position[0] + velocity[0], position[1] + velocity[1]];
    if moved[0].abs() > BOUND || moved[1].abs() > BOUND {
        [
            -2.0 * velocity[0] + moved[0] * RECENTER_SCALE,
            -2.0 * velocity[1] + moved[1] * RECENTER_SCALE,
        ]
    } else {
        moved
    }
}

/// Applies [`step_particle`] to every index in place.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn simulate_step(positions: &mut [[f32; 2]], velocities: &[[f32; 2]]) {
    assert_eq!(
        positions.len(),
        velocities.len(),
        "position and velocity arrays must be index-aligned"
    );
    for (position, velocity) in positions.iter_mut().zip(velocities) {
        *position = step_particle(*position, *velocity);
    }
}
