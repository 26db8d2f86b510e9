//! Render Node Trait
//!
//! Each node is one pass or compute task in the frame. Nodes follow a strict
//! phase split:
//!
//! - `prepare` receives a mutable [`PrepareContext`]: allocate resources,
//!   compile pipelines, upload uniforms, publish into the frame state.
//! - `run` receives a read-only [`ExecuteContext`] plus the shared command
//!   encoder: record GPU commands only, no allocation.
//!
//! `release` drops a node's GPU resources. It must be idempotent: calling it
//! on a node that never prepared, or twice, is a no-op.

use crate::errors::Result;
use crate::graph::context::{ExecuteContext, PrepareContext};

/// A pass in the render graph.
pub trait RenderNode {
    /// Node name, used for the encoder debug group.
    fn name(&self) -> &str;

    /// Prepare phase: resource allocation, uniform upload, publication.
    ///
    /// Runs in graph order, so a node may read frame state published by the
    /// nodes before it.
    fn prepare(&mut self, _ctx: &mut PrepareContext) -> Result<()> {
        Ok(())
    }

    /// Execute phase: record GPU commands.
    fn run(&self, ctx: &ExecuteContext, encoder: &mut wgpu::CommandEncoder);

    /// Drops GPU resources. Idempotent.
    fn release(&mut self) {}
}
