use std::{collections::HashMap, ops::Range};

use log::debug;
use ndarray::{ArrayViewD, IxDyn};
use serde::{Deserialize, Serialize};

use super::{NamedParameter, NamedParameters, ParamGen};
use crate::{LrErr, Result, assign::top_level_prefix};

/// The position of a parameter inside a `ParamStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamId(pub usize);

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    shape: Vec<usize>,
    range: Range<usize>,
    requires_grad: bool,
}

/// Holds every parameter of a model in a single flat buffer.
///
/// Parameters are kept in the order they were added, which is the model's definition order.
#[derive(Debug, Clone, Default)]
pub struct ParamStore {
    entries: Vec<Entry>,
    by_name: HashMap<String, ParamId>,
    buf: Vec<f32>,
}

/// The amount of values a tensor with the given shape holds.
///
/// # Returns
/// `None` if the product of the dimensions overflows.
pub fn shape_size(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

impl ParamStore {
    /// Creates a new empty `ParamStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new parameter at the end of the store.
    ///
    /// # Arguments
    /// * `name` - The hierarchical name of the parameter, must be unique.
    /// * `shape` - The dimensions of the parameter tensor.
    /// * `requires_grad` - Whether the parameter is trainable.
    /// * `param_gen` - The generator for the initial values.
    ///
    /// # Returns
    /// The id of the new parameter, or an error if the name is taken, the shape overflows or
    /// the generator ran out.
    pub fn add<G: ParamGen + ?Sized>(
        &mut self,
        name: &str,
        shape: &[usize],
        requires_grad: bool,
        param_gen: &mut G,
    ) -> Result<ParamId> {
        if self.get(name).is_some() {
            return Err(LrErr::DuplicateParameter(name.to_string()));
        }

        let size = shape_size(shape).ok_or_else(|| LrErr::ShapeOverflow {
            name: name.to_string(),
            shape: shape.to_vec(),
        })?;
        let start = self.buf.len();

        while self.buf.len() - start < size {
            let missing = size - (self.buf.len() - start);
            let Some(sample) = param_gen.sample(missing).filter(|s| !s.is_empty()) else {
                let got = self.buf.len() - start;
                self.buf.truncate(start);
                return Err(LrErr::ParamGenExhausted {
                    name: name.to_string(),
                    got,
                    expected: size,
                });
            };

            self.buf.extend(sample);
        }

        let id = ParamId(self.entries.len());
        self.by_name.insert(name.to_string(), id);
        self.entries.push(Entry {
            name: name.to_string(),
            shape: shape.to_vec(),
            range: start..start + size,
            requires_grad,
        });

        debug!(name = name, size = size, requires_grad = requires_grad; "added parameter");
        Ok(id)
    }

    /// Finds a parameter by name.
    pub fn get(&self, name: &str) -> Option<ParamId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ParamId) -> Option<&str> {
        self.entries.get(id.0).map(|entry| entry.name.as_str())
    }

    pub fn requires_grad(&self, id: ParamId) -> Option<bool> {
        self.entries.get(id.0).map(|entry| entry.requires_grad)
    }

    /// The amount of parameters registered.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// The total amount of values across all parameters.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The flat buffer holding every parameter.
    pub fn as_slice(&self) -> &[f32] {
        &self.buf
    }

    /// The range of the flat buffer a parameter occupies.
    pub fn range(&self, id: ParamId) -> Option<Range<usize>> {
        self.entries.get(id.0).map(|entry| entry.range.clone())
    }

    pub fn params(&self, id: ParamId) -> Option<&[f32]> {
        let range = self.range(id)?;
        Some(&self.buf[range])
    }

    pub fn params_mut(&mut self, id: ParamId) -> Option<&mut [f32]> {
        let range = self.range(id)?;
        Some(&mut self.buf[range])
    }

    /// Gives a view of a parameter with its registered shape.
    pub fn view(&self, id: ParamId) -> Option<ArrayViewD<'_, f32>> {
        let entry = self.entries.get(id.0)?;
        ArrayViewD::from_shape(IxDyn(&entry.shape), &self.buf[entry.range.clone()]).ok()
    }

    /// Marks every parameter under the given top-level group as not trainable.
    ///
    /// # Returns
    /// The amount of parameters that matched.
    pub fn freeze(&mut self, prefix: &str) -> usize {
        self.set_requires_grad(prefix, false)
    }

    /// Marks every parameter under the given top-level group as trainable.
    ///
    /// # Returns
    /// The amount of parameters that matched.
    pub fn unfreeze(&mut self, prefix: &str) -> usize {
        self.set_requires_grad(prefix, true)
    }

    fn set_requires_grad(&mut self, prefix: &str, requires_grad: bool) -> usize {
        let mut matched = 0;

        for entry in &mut self.entries {
            if top_level_prefix(&entry.name) == prefix {
                entry.requires_grad = requires_grad;
                matched += 1;
            }
        }

        debug!(
            prefix = prefix,
            matched = matched,
            requires_grad = requires_grad;
            "toggled group"
        );
        matched
    }
}

impl NamedParameters for ParamStore {
    type Handle = ParamId;

    fn named_parameters(&self) -> impl Iterator<Item = NamedParameter<'_, ParamId>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| NamedParameter {
                name: &entry.name,
                handle: ParamId(i),
                requires_grad: entry.requires_grad,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ConstParamGen;

    fn store() -> ParamStore {
        let mut store = ParamStore::new();
        let mut zeros = ConstParamGen::new(0., usize::MAX);
        store.add("conv1.weight", &[2, 2], true, &mut zeros).unwrap();
        store.add("layer1.0.weight", &[3], true, &mut zeros).unwrap();
        store.add("layer1.0.bias", &[1], true, &mut zeros).unwrap();
        store.add("fc.weight", &[2, 1], true, &mut zeros).unwrap();
        store
    }

    #[test]
    fn add_and_get() {
        let store = store();

        assert_eq!(store.count(), 4);
        assert_eq!(store.len(), 10);
        assert_eq!(store.get("layer1.0.bias"), Some(ParamId(2)));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.range(ParamId(1)), Some(4..7));
        assert_eq!(store.name(ParamId(3)), Some("fc.weight"));
    }

    #[test]
    fn duplicate_names_fail() {
        let mut store = store();
        let mut ones = ConstParamGen::new(1., 10);

        let err = store.add("fc.weight", &[1], true, &mut ones).unwrap_err();
        assert!(matches!(err, LrErr::DuplicateParameter(_)));
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn exhausted_generator_fails_and_rolls_back() {
        let mut store = store();
        let mut ones = ConstParamGen::new(1., 3);

        let err = store.add("head.weight", &[2, 2], true, &mut ones).unwrap_err();
        assert!(matches!(
            err,
            LrErr::ParamGenExhausted {
                got: 3,
                expected: 4,
                ..
            }
        ));
        assert_eq!(store.len(), 10);
        assert_eq!(store.count(), 4);
    }

    #[test]
    fn overflowing_shape_fails() {
        let mut store = store();
        let mut ones = ConstParamGen::new(1., usize::MAX);

        let err = store
            .add("head.weight", &[usize::MAX, 2], true, &mut ones)
            .unwrap_err();
        assert!(matches!(err, LrErr::ShapeOverflow { .. }));
        assert_eq!(store.count(), 4);
        assert_eq!(store.get("head.weight"), None);
    }

    #[test]
    fn shape_sizes() {
        assert_eq!(shape_size(&[2, 3, 4]), Some(24));
        assert_eq!(shape_size(&[]), Some(1));
        assert_eq!(shape_size(&[5, 0]), Some(0));
        assert_eq!(shape_size(&[usize::MAX, 2]), None);
    }

    #[test]
    fn view_has_the_registered_shape() {
        let mut store = ParamStore::new();
        let mut ones = ConstParamGen::new(1., 6);
        let id = store.add("fc.weight", &[2, 3], true, &mut ones).unwrap();

        let view = store.view(id).unwrap();
        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.sum(), 6.);
    }

    #[test]
    fn params_mut_writes_to_the_buffer() {
        let mut store = store();
        let id = store.get("layer1.0.weight").unwrap();

        store.params_mut(id).unwrap().copy_from_slice(&[1., 2., 3.]);
        assert_eq!(&store.as_slice()[4..7], [1., 2., 3.]);
    }

    #[test]
    fn freeze_and_unfreeze_by_top_level_group() {
        let mut store = store();

        assert_eq!(store.freeze("layer1"), 2);
        assert_eq!(store.requires_grad(ParamId(1)), Some(false));
        assert_eq!(store.requires_grad(ParamId(2)), Some(false));
        assert_eq!(store.requires_grad(ParamId(0)), Some(true));

        assert_eq!(store.freeze("layer"), 0);
        assert_eq!(store.unfreeze("layer1"), 2);
        assert_eq!(store.requires_grad(ParamId(1)), Some(true));
    }

    #[test]
    fn named_parameters_follow_definition_order() {
        let mut store = store();
        store.freeze("fc");

        let named: Vec<_> = store.named_parameters().collect();
        let names: Vec<_> = named.iter().map(|np| np.name).collect();

        assert_eq!(
            names,
            ["conv1.weight", "layer1.0.weight", "layer1.0.bias", "fc.weight"]
        );
        assert_eq!(named[3].handle, ParamId(3));
        assert!(!named[3].requires_grad);
    }
}
