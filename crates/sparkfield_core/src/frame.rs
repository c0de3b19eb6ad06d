//! Per-frame recording entry point.

use crate::config::FieldConfig;
use crate::error::SparkResult;
use crate::sync::{BarrierCoordinator, CommandContext, DispatchCommand, DrawCommand};

/// The two commands every frame records. Fixed for the life of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    /// Compute dispatch over all particles.
    pub dispatch: DispatchCommand,
    /// Point draw over all particles.
    pub draw: DrawCommand,
}

impl FramePlan {
    /// Builds the plan for a validated configuration.
    ///
    /// # Errors
    ///
    /// Any error from [`FieldConfig::validate`].
    pub fn for_config(config: &FieldConfig) -> SparkResult<Self> {
        config.validate()?;
        Ok(Self {
            dispatch: DispatchCommand {
                workgroups: config.workgroup_count(),
            },
            draw: DrawCommand {
                vertex_count: config.particle_count,
            },
        })
    }
}

/// Records one frame: barrier A, dispatch, barrier B, draw.
///
/// The caller has already begun its command context (and, for a real GPU,
/// the render pass target). Returns the index of the recorded frame.
///
/// # Errors
///
/// Any protocol violation reported by the coordinator. Nothing after the
/// failing step is recorded.
pub fn record_frame<C: CommandContext>(
    coordinator: &mut BarrierCoordinator,
    ctx: &mut C,
    plan: &FramePlan,
) -> SparkResult<u64> {
    coordinator.issue_pre_compute(ctx)?;
    coordinator.record_dispatch(ctx, plan.dispatch)?;
    coordinator.issue_post_compute(ctx)?;
    coordinator.record_draw(ctx, plan.draw)?;
    let frame = coordinator.finish_frame()?;
    tracing::trace!("recorded frame {}", frame);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{verify_frame_sequence, FrameState, RecordingContext};
    use crate::SparkError;

    #[test]
    fn test_plan_for_default_config() {
        let plan = FramePlan::for_config(&FieldConfig::default()).unwrap();
        assert_eq!(plan.dispatch.workgroups, 256);
        assert_eq!(plan.draw.vertex_count, 65_536);
    }

    #[test]
    fn test_plan_rejects_indivisible_count() {
        let config = FieldConfig {
            particle_count: 1000,
            ..FieldConfig::default()
        };
        assert!(matches!(
            FramePlan::for_config(&config),
            Err(SparkError::IndivisibleParticleCount { .. })
        ));
    }

    #[test]
    fn test_record_frame_sequence() {
        let plan = FramePlan::for_config(&FieldConfig::default()).unwrap();
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        for expected in 0..3 {
            assert_eq!(record_frame(&mut coordinator, &mut ctx, &plan).unwrap(), expected);
        }
        assert_eq!(verify_frame_sequence(ctx.ops()).unwrap(), 3);
        assert_eq!(coordinator.state(), FrameState::Idle);
    }

    #[test]
    fn test_record_frame_mid_frame_fails() {
        let plan = FramePlan::for_config(&FieldConfig::default()).unwrap();
        let mut coordinator = BarrierCoordinator::new();
        let mut ctx = RecordingContext::new();
        coordinator.issue_pre_compute(&mut ctx).unwrap();
        assert!(record_frame(&mut coordinator, &mut ctx, &plan).is_err());
        assert_eq!(ctx.ops().len(), 1);
    }
}
