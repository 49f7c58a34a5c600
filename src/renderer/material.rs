// renderer/material.rs
use bitflags::bitflags;

/// Which purpose a render queue serves; selects the technique a material
/// expands into operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderPhase {
    /// Forward shading or G-buffer fill.
    #[default]
    Default,
    ShadowMap,
}

impl RenderPhase {
    pub const ALL: [RenderPhase; 2] = [RenderPhase::Default, RenderPhase::ShadowMap];

    const fn slot(self) -> usize {
        match self {
            RenderPhase::Default => 0,
            RenderPhase::ShadowMap => 1,
        }
    }
}

/// Stable identity of a pass, used as the state field of opaque sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassId(u16);

impl PassId {
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// Hands out unique pass ids and takes released ones back.
///
/// The renderer only rebinds state when the pass id changes, so every pass
/// drawn through one queue must get its id from the same pool. Ids handed
/// out by different pools overlap.
#[derive(Debug, Default)]
pub struct PassIdPool {
    next: u32,
    released: Vec<PassId>,
}

impl PassIdPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` once all 65536 ids are in use.
    pub fn allocate(&mut self) -> Option<PassId> {
        if let Some(id) = self.released.pop() {
            return Some(id);
        }

        let id = u16::try_from(self.next).ok()?;
        self.next += 1;
        Some(PassId(id))
    }

    /// Consumes `pass` and makes its id available again.
    ///
    /// Clones of `pass` keep the id, so they must be dropped first; a live
    /// clone sharing an id with a newly allocated pass would be drawn with
    /// the wrong state.
    pub fn release(&mut self, pass: Pass) {
        let id = pass.id;
        debug_assert!(!self.released.contains(&id), "pass id {id:?} released twice");
        self.released.push(id);
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PassFlags: u32 {
        const DEPTH_TESTING = 1 << 0;
        const DEPTH_WRITING = 1 << 1;
        const COLOR_WRITING = 1 << 2;
        const CULLING = 1 << 3;
        const WIREFRAME = 1 << 4;
        const STENCIL_TESTING = 1 << 5;
    }
}

impl Default for PassFlags {
    fn default() -> Self {
        Self::DEPTH_TESTING | Self::DEPTH_WRITING | Self::COLOR_WRITING | Self::CULLING
    }
}

/// One GPU state configuration applied before a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    id: PassId,
    pub program: Option<String>,
    pub src_factor: wgpu::BlendFactor,
    pub dst_factor: wgpu::BlendFactor,
    pub flags: PassFlags,
}

impl Pass {
    pub fn new(id: PassId) -> Self {
        Self {
            id,
            program: None,
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::Zero,
            flags: PassFlags::default(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_blend_factors(mut self, src: wgpu::BlendFactor, dst: wgpu::BlendFactor) -> Self {
        self.src_factor = src;
        self.dst_factor = dst;
        self
    }

    /// Standard alpha blending without depth writes.
    pub fn with_alpha(self) -> Self {
        let mut pass = self.with_blend_factors(
            wgpu::BlendFactor::SrcAlpha,
            wgpu::BlendFactor::OneMinusSrcAlpha,
        );
        pass.flags.remove(PassFlags::DEPTH_WRITING);
        pass
    }

    pub fn with_flags(mut self, flags: PassFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn id(&self) -> PassId {
        self.id
    }

    /// Anything other than replace-blending (`One`, `Zero`) composites with
    /// the framebuffer and must be drawn back to front.
    pub fn is_blending(&self) -> bool {
        self.src_factor != wgpu::BlendFactor::One || self.dst_factor != wgpu::BlendFactor::Zero
    }

    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        self.is_blending().then(|| {
            let component = wgpu::BlendComponent {
                src_factor: self.src_factor,
                dst_factor: self.dst_factor,
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: component,
                alpha: component,
            }
        })
    }
}

/// Ordered passes of a material for one phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Technique {
    passes: Vec<Pass>,
}

impl Technique {
    pub fn new(passes: Vec<Pass>) -> Self {
        Self { passes }
    }

    pub fn push(&mut self, pass: Pass) {
        self.passes.push(pass);
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    techniques: [Technique; 2],
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            techniques: Default::default(),
        }
    }

    pub fn with_technique(mut self, phase: RenderPhase, technique: Technique) -> Self {
        self.techniques[phase.slot()] = technique;
        self
    }

    pub fn technique(&self, phase: RenderPhase) -> &Technique {
        &self.techniques[phase.slot()]
    }

    pub fn technique_mut(&mut self, phase: RenderPhase) -> &mut Technique {
        &mut self.techniques[phase.slot()]
    }
}
