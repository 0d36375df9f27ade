//! Function-level IR: parameters, basic blocks, and reverse-post-order
//! traversal over the block successor graph.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::instruction::{BasicBlock, BlockId, ValueId};
use crate::types::IrType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: IrType,
    pub id: ValueId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: IrType,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Parameter>, return_type: IrType) -> Self {
        Self { name: name.into(), params, return_type, blocks: Vec::new() }
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Reverse post order over the block successor graph, starting from the
    /// entry block. Blocks unreachable from entry are appended afterwards in
    /// declaration order so every block still gets seeded and analyzed.
    pub fn reverse_post_order(&self) -> Vec<BlockId> {
        let Some(entry) = self.entry_block().map(|b| b.id) else {
            return Vec::new();
        };
        let mut visited = HashSet::new();
        let mut post_order = Vec::new();
        self.dfs_post_order(entry, &mut visited, &mut post_order);
        post_order.reverse();
        for b in &self.blocks {
            if !visited.contains(&b.id) {
                post_order.push(b.id);
            }
        }
        post_order
    }

    fn dfs_post_order(&self, id: BlockId, visited: &mut HashSet<BlockId>, out: &mut Vec<BlockId>) {
        if !visited.insert(id) {
            return;
        }
        if let Some(block) = self.block(id) {
            for succ in block.successors() {
                self.dfs_post_order(succ, visited, out);
            }
        }
        out.push(id);
    }

    /// Predecessor map derived from every block's terminator.
    pub fn predecessors(&self) -> std::collections::HashMap<BlockId, Vec<BlockId>> {
        let mut preds: std::collections::HashMap<BlockId, Vec<BlockId>> = std::collections::HashMap::new();
        for b in &self.blocks {
            for succ in b.successors() {
                preds.entry(succ).or_default().push(b.id);
            }
        }
        preds
    }
}
