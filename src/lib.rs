#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod environment;
pub mod errors;
pub mod gpu;
pub mod graph;
pub mod pipeline;
pub mod scene;
pub mod settings;

pub use environment::EnvironmentMap;
pub use errors::{Result, UmbraError};
pub use gpu::GpuContext;
pub use graph::{ExtractedFrame, Frustum, LightingParameters, RenderGraph, RenderNode};
pub use pipeline::ForwardPipeline;
pub use scene::{
    Aabb, Camera, DirectionalLight, LightingOverrides, Material, MaterialCaps, Mesh, RenderQueue,
    Renderer, Scene, SceneView, Vertex,
};
pub use settings::{InstancerSettings, LightingDefaults, PipelineSettings, StaleShadowPolicy};
