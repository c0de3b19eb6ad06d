//! Blend state for the point draw.
//!
//! ```text
//! color_blend:
//!   src_factor: SRC_ALPHA
//!   dst_factor: ONE
//!   operation: ADD
//!
//! alpha_blend:
//!   src_factor: SRC_ALPHA
//!   dst_factor: ONE
//!   operation: ADD
//!
//! write_mask: ALL
//! ```
//!
//! Additive blending is commutative, so the draw needs no sorting and the
//! order particles land in the vertex buffer never matters.

/// Blend factor (mirrors WGPU)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    /// 1
    One,
    /// src.a
    SrcAlpha,
}

impl BlendFactor {
    const fn to_wgpu(self) -> wgpu::BlendFactor {
        match self {
            Self::One => wgpu::BlendFactor::One,
            Self::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        }
    }
}

/// Blend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    /// src + dst
    Add,
}

impl BlendOp {
    const fn to_wgpu(self) -> wgpu::BlendOperation {
        match self {
            Self::Add => wgpu::BlendOperation::Add,
        }
    }
}

/// Complete blend state configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendStateConfig {
    /// Source factor for color
    pub color_src: BlendFactor,
    /// Destination factor for color
    pub color_dst: BlendFactor,
    /// Operation for color
    pub color_op: BlendOp,
    /// Source factor for alpha
    pub alpha_src: BlendFactor,
    /// Destination factor for alpha
    pub alpha_dst: BlendFactor,
    /// Operation for alpha
    pub alpha_op: BlendOp,
}

impl BlendStateConfig {
    /// `src * src.a + dst * 1` on color and alpha.
    pub const ADDITIVE: Self = Self {
        color_src: BlendFactor::SrcAlpha,
        color_dst: BlendFactor::One,
        color_op: BlendOp::Add,
        alpha_src: BlendFactor::SrcAlpha,
        alpha_dst: BlendFactor::One,
        alpha_op: BlendOp::Add,
    };

    /// Converts to the wgpu pipeline blend state.
    #[must_use]
    pub const fn to_wgpu(&self) -> wgpu::BlendState {
        wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: self.color_src.to_wgpu(),
                dst_factor: self.color_dst.to_wgpu(),
                operation: self.color_op.to_wgpu(),
            },
            alpha: wgpu::BlendComponent {
                src_factor: self.alpha_src.to_wgpu(),
                dst_factor: self.alpha_dst.to_wgpu(),
                operation: self.alpha_op.to_wgpu(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_additive_is_src_alpha_plus_one() {
        let state = BlendStateConfig::ADDITIVE.to_wgpu();
        let expected = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };
        assert_eq!(state.color, expected);
        assert_eq!(state.alpha, expected);
    }

    #[test]
    fn test_additive_differs_from_alpha_blending() {
        let state = BlendStateConfig::ADDITIVE.to_wgpu();
        assert_ne!(state, wgpu::BlendState::ALPHA_BLENDING);
    }
}
