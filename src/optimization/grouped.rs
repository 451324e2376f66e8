use log::{debug, info};

use super::{Optimizer, OptimizerSpec};
use crate::{
    LrErr, Result,
    assign::GroupBinding,
    params::{ParamId, ParamStore},
};

struct GroupState {
    name: String,
    lr: f32,
    members: Vec<(ParamId, Box<dyn Optimizer>)>,
}

/// Applies each binding's learning rate independently to the parameters it holds.
///
/// Every bound parameter gets its own optimizer instance, so stateful algorithms keep
/// their moments per parameter.
pub struct GroupedOptimizer {
    groups: Vec<GroupState>,
}

impl GroupedOptimizer {
    /// Creates a new `GroupedOptimizer`.
    ///
    /// # Arguments
    /// * `bindings` - The parameter groups and their learning rates.
    /// * `spec` - The algorithm every group uses.
    /// * `store` - The store the bound parameters live in.
    ///
    /// # Returns
    /// An error if a binding refers to a parameter the store doesn't hold.
    pub fn new(
        bindings: &[GroupBinding<ParamId>],
        spec: &OptimizerSpec,
        store: &ParamStore,
    ) -> Result<Self> {
        let mut groups = Vec::with_capacity(bindings.len());

        for binding in bindings {
            let mut members = Vec::with_capacity(binding.params.len());

            for &id in &binding.params {
                let range = store.range(id).ok_or(LrErr::SizeMismatch {
                    what: "bound parameters and store",
                    got: id.0,
                    expected: store.count(),
                })?;

                members.push((id, spec.build(range.len(), binding.lr)));
            }

            groups.push(GroupState {
                name: binding.name.clone(),
                lr: binding.lr,
                members,
            });
        }

        let bound = groups.iter().filter(|g| !g.members.is_empty()).count();
        info!("built {} parameter group(s), {bound} with parameters", groups.len());

        Ok(Self { groups })
    }

    /// The learning rate of each group, in binding order.
    pub fn learning_rates(&self) -> impl Iterator<Item = (&str, f32)> {
        self.groups.iter().map(|g| (g.name.as_str(), g.lr))
    }

    /// Updates every bound parameter in the store with its group's rate.
    ///
    /// # Arguments
    /// * `store` - The parameters to update.
    /// * `grad` - The gradient for the whole store, laid out like its flat buffer.
    ///
    /// # Returns
    /// An error if the gradient's length doesn't match the store's.
    pub fn step(&mut self, store: &mut ParamStore, grad: &[f32]) -> Result<()> {
        if grad.len() != store.len() {
            return Err(LrErr::SizeMismatch {
                what: "gradient and store",
                got: grad.len(),
                expected: store.len(),
            });
        }

        for group in &mut self.groups {
            for (id, optimizer) in &mut group.members {
                let (Some(range), Some(params)) = (store.range(*id), store.params_mut(*id)) else {
                    continue;
                };

                optimizer.update_params(&grad[range], params)?;
            }

            if group.members.is_empty() {
                debug!(group = group.name.as_str(); "skipped empty group");
            }
        }

        Ok(())
    }
}
