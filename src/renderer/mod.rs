pub mod bucket;
pub mod buffer;
pub mod camera;
pub mod key;
pub mod lights;
pub mod material;
pub mod op;
pub mod pool;
pub mod queue;
pub mod range;
pub mod renderable;
pub mod renderer;
pub mod sprite;
pub mod vertex;
pub mod wgpu_buffer;

pub use bucket::RenderBucket;
pub use buffer::{BufferError, BufferFactory, BufferUsage, GpuBuffer, IndexType};
pub use camera::Camera;
pub use key::RenderOpKey;
pub use lights::{LightData, LightKind, LightRaw};
pub use material::{Material, Pass, PassFlags, PassId, PassIdPool, RenderPhase, Technique};
pub use op::RenderOp;
pub use pool::{GeometryPool, PoolError, PoolStats};
pub use queue::RenderQueue;
pub use range::{BufferId, IndexRange, PrimitiveRange, PrimitiveType, VertexRange};
pub use renderable::{EnqueueContext, Renderable, StaticMesh};
pub use renderer::{RenderBackend, RenderStats, Renderer};
pub use sprite::Sprite;
pub use vertex::{SpriteVertex, Vertex, VertexComponent, VertexFormat};
pub use wgpu_buffer::{WgpuBuffer, WgpuBufferFactory};
