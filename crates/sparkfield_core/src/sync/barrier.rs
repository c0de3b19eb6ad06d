//! Barrier tokens.
//!
//! A barrier is a per-frame assertion `(src stage, dst stage, src access,
//! dst access)`. Two are issued every frame, always the same two.

use std::fmt;
use std::ops::BitOr;

/// Pipeline stage mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageMask(u32);

impl StageMask {
    /// Vertex attribute fetch.
    pub const VERTEX_INPUT: Self = Self(1 << 0);
    /// Compute shading.
    pub const COMPUTE_SHADER: Self = Self(1 << 1);
}

impl BitOr for StageMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for StageMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(StageMask, &str); 2] = [
            (StageMask::VERTEX_INPUT, "VERTEX_INPUT"),
            (StageMask::COMPUTE_SHADER, "COMPUTE_SHADER"),
        ];
        write_flags(f, self.0, &NAMES.map(|(mask, name)| (mask.0, name)))
    }
}

/// Memory access mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessMask(u32);

impl AccessMask {
    /// No memory visibility requirement (execution-only dependency).
    pub const NONE: Self = Self(0);
    /// Reads of vertex attributes during vertex input.
    pub const VERTEX_ATTRIBUTE_READ: Self = Self(1 << 0);
    /// Shader storage writes.
    pub const SHADER_WRITE: Self = Self(1 << 1);

    /// True if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AccessMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for AccessMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(AccessMask, &str); 2] = [
            (AccessMask::VERTEX_ATTRIBUTE_READ, "VERTEX_ATTRIBUTE_READ"),
            (AccessMask::SHADER_WRITE, "SHADER_WRITE"),
        ];
        write_flags(f, self.0, &NAMES.map(|(mask, name)| (mask.0, name)))
    }
}

fn write_flags(f: &mut fmt::Formatter<'_>, bits: u32, names: &[(u32, &str)]) -> fmt::Result {
    if bits == 0 {
        return f.write_str("NONE");
    }
    let mut first = true;
    for (bit, name) in names {
        if bits & bit != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
    }
    Ok(())
}

/// Which of the two per-frame barriers a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierKind {
    /// Barrier A: before the dispatch. Write-after-read.
    PreCompute,
    /// Barrier B: after the dispatch, before the draw. Read-after-write.
    PostCompute,
}

/// A declared execution (and optionally memory) dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Barrier {
    /// Which protocol barrier this is.
    pub kind: BarrierKind,
    /// Stages that must finish first.
    pub src_stage: StageMask,
    /// Stages that wait.
    pub dst_stage: StageMask,
    /// Writes that must be made available.
    pub src_access: AccessMask,
    /// Reads that must see them.
    pub dst_access: AccessMask,
}

impl Barrier {
    /// Barrier A.
    ///
    /// The compute kernel may not start until prior vertex fetches of the
    /// shared position buffer are done. Ordering only: no access flags.
    pub const PRE_COMPUTE: Self = Self {
        kind: BarrierKind::PreCompute,
        src_stage: StageMask::VERTEX_INPUT,
        dst_stage: StageMask::COMPUTE_SHADER,
        src_access: AccessMask::NONE,
        dst_access: AccessMask::NONE,
    };

    /// Barrier B.
    ///
    /// Vertex fetch may not start until the compute kernel is done, and its
    /// storage writes must be visible to vertex attribute reads.
    pub const POST_COMPUTE: Self = Self {
        kind: BarrierKind::PostCompute,
        src_stage: StageMask::COMPUTE_SHADER,
        dst_stage: StageMask::VERTEX_INPUT,
        src_access: AccessMask::SHADER_WRITE,
        dst_access: AccessMask::VERTEX_ATTRIBUTE_READ,
    };

    /// True if this barrier carries a memory-visibility requirement.
    #[must_use]
    pub const fn has_memory_dependency(&self) -> bool {
        !self.src_access.is_empty() || !self.dst_access.is_empty()
    }

    /// Short label used for logs and GPU debug markers.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self.kind {
            BarrierKind::PreCompute => "barrier A: vertex input -> compute",
            BarrierKind::PostCompute => "barrier B: compute write -> vertex read",
        }
    }
}
