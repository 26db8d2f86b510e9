//! Frame Render Graph
//!
//! Provides:
//! - `RenderGraph`: linear node executor, one encoder per frame
//! - `RenderNode`: pass trait with prepare/run/release phases
//! - `FrameState` / contexts: frame-scoped cross-pass publication
//! - `ExtractedFrame`: the single-walk scene snapshot
//! - `Frustum`: camera plane extraction + sphere culling
//! - `light_fit`: pure light-space ortho-fit math
//! - `LightingParameters`: override/default resolution

pub mod context;
pub mod extracted;
pub mod frustum;
pub mod graph;
pub mod light_fit;
pub mod node;
pub mod passes;
pub mod resolve;

pub use context::{ExecuteContext, FrameState, PrepareContext, PreparedFrameBindings, ViewData};
pub use extracted::{DrawItem, ExtractedFrame, RenderKey};
pub use frustum::Frustum;
pub use graph::RenderGraph;
pub use light_fit::{fit_directional, OrthoFit};
pub use node::RenderNode;
pub use resolve::LightingParameters;
