//! Render Graph Executor
//!
//! `RenderGraph` runs its nodes in insertion order: a prepare sweep first,
//! then one command encoder shared by every node's execute phase, finished
//! with a single queue submission. The linear order is the explicit pass
//! dependency list: shadow before forward before the instanced draw.

use smallvec::SmallVec;

use crate::errors::Result;
use crate::graph::context::{ExecuteContext, PrepareContext};
use crate::graph::node::RenderNode;

/// Ordered list of render nodes.
pub struct RenderGraph {
    nodes: SmallVec<[Box<dyn RenderNode>; 4]>,
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderGraph {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SmallVec::new(),
        }
    }

    /// Adds a node. Nodes run in insertion order.
    #[inline]
    pub fn add_node(&mut self, node: Box<dyn RenderNode>) {
        self.nodes.push(node);
    }

    /// Adds a node, chainable.
    #[inline]
    #[must_use]
    pub fn with_node(mut self, node: Box<dyn RenderNode>) -> Self {
        self.nodes.push(node);
        self
    }

    /// Runs every node's prepare phase in order.
    ///
    /// Stops at the first failing node; nothing has been recorded yet at
    /// that point, so the frame is simply dropped.
    pub fn prepare(&mut self, ctx: &mut PrepareContext) -> Result<()> {
        for node in &mut self.nodes {
            node.prepare(ctx)?;
        }
        Ok(())
    }

    /// Records every node into one encoder and submits it.
    pub fn execute(&self, ctx: &ExecuteContext) {
        let mut encoder = ctx
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Graph Encoder"),
            });

        for node in &self.nodes {
            encoder.push_debug_group(node.name());
            node.run(ctx, &mut encoder);
            encoder.pop_debug_group();
        }

        ctx.gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Releases every node's GPU resources. Idempotent.
    pub fn release(&mut self) {
        for node in &mut self.nodes {
            node.release();
        }
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
