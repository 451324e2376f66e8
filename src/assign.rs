use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{config::DecayConfig, params::NamedParameters};

/// Separates the components of a hierarchical parameter name.
pub const SEPARATOR: char = '.';

/// Returns the top-level component of a parameter name, that is, everything before the first
/// separator. A name without separators is its own top-level group.
pub fn top_level_prefix(name: &str) -> &str {
    name.split_once(SEPARATOR).map_or(name, |(prefix, _)| prefix)
}

/// The order in which the given names are visited.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    /// The names come in model definition order (input-facing first) and get reversed.
    #[default]
    Reversed,
    /// The names already come deepest-first.
    AsGiven,
}

/// A set of parameters and the learning rate an optimizer should use for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBinding<P> {
    pub name: String,
    pub params: Vec<P>,
    pub lr: f32,
}

impl<P> GroupBinding<P> {
    /// Whether this binding holds no parameters, optimizers treat those as no-ops.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Assigns a learning rate to each named parameter group, decaying it every time the
/// traversal crosses into a different top-level group.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayerLrAssigner {
    traversal: Traversal,
}

impl LayerLrAssigner {
    /// Creates a new `LayerLrAssigner` that reverses the names it's given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `LayerLrAssigner` with the given traversal.
    pub fn with_traversal(traversal: Traversal) -> Self {
        Self { traversal }
    }

    /// Produces one binding per name in traversal order.
    ///
    /// # Arguments
    /// * `names` - The unique parameter names, ordered as the traversal expects them.
    /// * `is_trainable` - Whether the parameter with the given name requires a gradient.
    /// * `lookup` - Resolves a name into its parameter handle.
    /// * `config` - The base rate and the decay multiplier.
    ///
    /// # Returns
    /// The bindings, names that are not trainable or can't be resolved get an empty set.
    pub fn assign<S, P, T, L>(
        &self,
        names: &[S],
        mut is_trainable: T,
        mut lookup: L,
        config: &DecayConfig,
    ) -> Vec<GroupBinding<P>>
    where
        S: AsRef<str>,
        T: FnMut(&str) -> bool,
        L: FnMut(&str) -> Option<P>,
    {
        let ordered: Vec<&str> = match self.traversal {
            Traversal::Reversed => names.iter().rev().map(|name| name.as_ref()).collect(),
            Traversal::AsGiven => names.iter().map(|name| name.as_ref()).collect(),
        };

        let Some(first) = ordered.first() else {
            return Vec::new();
        };

        let mut lr = config.base_lr;
        let mut prev_prefix = top_level_prefix(*first);
        let mut bindings = Vec::with_capacity(ordered.len());

        for name in ordered {
            let prefix = top_level_prefix(name);
            if prefix != prev_prefix {
                lr *= config.multiplier;
                prev_prefix = prefix;
            }

            let params: Vec<P> = if is_trainable(name) {
                lookup(name).into_iter().collect()
            } else {
                Vec::new()
            };

            debug!(name = name, lr = lr, bound = params.len(); "assigned learning rate");
            bindings.push(GroupBinding {
                name: name.to_string(),
                params,
                lr,
            });
        }

        bindings
    }

    /// Produces the bindings for every parameter a model exposes.
    ///
    /// # Arguments
    /// * `model` - The model whose parameters are enumerated in definition order.
    /// * `config` - The base rate and the decay multiplier.
    pub fn assign_model<M>(&self, model: &M, config: &DecayConfig) -> Vec<GroupBinding<M::Handle>>
    where
        M: NamedParameters,
    {
        let named: Vec<_> = model.named_parameters().collect();
        let names: Vec<&str> = named.iter().map(|np| np.name).collect();
        let by_name: HashMap<&str, _> = named
            .iter()
            .map(|np| (np.name, (&np.handle, np.requires_grad)))
            .collect();

        self.assign(
            &names,
            |name| by_name.get(name).is_some_and(|&(_, trainable)| trainable),
            |name| by_name.get(name).map(|&(handle, _)| handle.clone()),
            config,
        )
    }
}
