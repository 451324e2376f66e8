use std::{fs, path::Path};

use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    LrErr, Result,
    params::{ConstParamGen, ParamStore, RandParamGen, shape_size},
};

/// How a parameter's initial values are generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    Normal { mean: f32, std_dev: f32 },
    Kaiming { fan_in: usize },
}

impl Default for InitSpec {
    fn default() -> Self {
        Self::Const { value: 0. }
    }
}

/// A single parameter of a model manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub shape: Vec<usize>,
    #[serde(default = "default_requires_grad")]
    pub requires_grad: bool,
    #[serde(default)]
    pub init: InitSpec,
}

fn default_requires_grad() -> bool {
    true
}

/// Describes the parameters of a model in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub parameters: Vec<ParamSpec>,
    /// Top-level groups to freeze after building the store.
    #[serde(default)]
    pub frozen: Vec<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Manifest {
    /// Loads a `Manifest` from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LrErr::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Builds a `ParamStore` holding every parameter in the manifest.
    ///
    /// # Errors
    /// Returns an error on duplicate names, overflowing shapes or invalid distributions.
    pub fn build(&self) -> Result<ParamStore> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut store = ParamStore::new();

        for spec in &self.parameters {
            let name = spec.name.as_str();
            let size = shape_size(&spec.shape).ok_or_else(|| LrErr::ShapeOverflow {
                name: name.to_string(),
                shape: spec.shape.clone(),
            })?;
            let shape = spec.shape.as_slice();
            let requires_grad = spec.requires_grad;

            match spec.init {
                InitSpec::Const { value } => {
                    let mut param_gen = ConstParamGen::new(value, size);
                    store.add(name, shape, requires_grad, &mut param_gen)?;
                }
                InitSpec::Uniform { low, high } => {
                    let mut param_gen = RandParamGen::uniform(&mut rng, size, low, high)?;
                    store.add(name, shape, requires_grad, &mut param_gen)?;
                }
                InitSpec::Normal { mean, std_dev } => {
                    let mut param_gen = RandParamGen::normal(&mut rng, size, mean, std_dev)?;
                    store.add(name, shape, requires_grad, &mut param_gen)?;
                }
                InitSpec::Kaiming { fan_in } => {
                    let mut param_gen = RandParamGen::kaiming(&mut rng, size, fan_in)?;
                    store.add(name, shape, requires_grad, &mut param_gen)?;
                }
            }
        }

        for prefix in &self.frozen {
            if store.freeze(prefix) == 0 {
                warn!("no parameters under the frozen group {prefix}");
            }
        }

        info!(
            "built store with {} parameter(s), {} value(s)",
            store.count(),
            store.len()
        );
        Ok(store)
    }
}
