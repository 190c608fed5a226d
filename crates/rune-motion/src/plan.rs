//! Splitting a collected phase sequence into execution blocks.

use std::sync::Arc;

use crate::collector::PhaseContribution;
use crate::effects::Effect;

/// Effects of one transition, grouped into blocks that run one after another.
///
/// Every wait marker closes the current block and opens a new one, so a
/// sequence with `n` markers always has `n + 1` blocks, some possibly empty.
/// Effects keep their collected order both in [`effects`](Self::effects) and
/// within each block.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    effects: Vec<Arc<dyn Effect>>,
    /// Indices into `effects`, one list per block.
    blocks: Vec<Vec<usize>>,
}

impl ExecutionPlan {
    pub fn from_phases(phases: &[PhaseContribution]) -> Self {
        let mut effects = Vec::new();
        let mut blocks = vec![Vec::new()];

        for phase in phases {
            match phase {
                PhaseContribution::Effect(effect) => {
                    if let Some(block) = blocks.last_mut() {
                        block.push(effects.len());
                    }
                    effects.push(effect.clone());
                }
                PhaseContribution::Wait => blocks.push(Vec::new()),
            }
        }

        Self { effects, blocks }
    }

    /// All effects, in collected order.
    pub fn effects(&self) -> &[Arc<dyn Effect>] {
        &self.effects
    }

    pub fn blocks(&self) -> &[Vec<usize>] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects of block `index`.
    pub fn block(&self, index: usize) -> impl Iterator<Item = (usize, &Arc<dyn Effect>)> + '_ {
        self.blocks
            .get(index)
            .into_iter()
            .flatten()
            .map(|&i| (i, &self.effects[i]))
    }
}
