use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{LrErr, Result, assign::Traversal, optimization::OptimizerSpec};

/// How the learning rate decays from the output-facing layers towards the input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayConfig {
    pub base_lr: f32,
    pub multiplier: f32,
}

impl DecayConfig {
    /// Creates a new `DecayConfig`, checking its values.
    ///
    /// # Arguments
    /// * `base_lr` - The rate given to the deepest top-level group.
    /// * `multiplier` - The factor applied on each top-level group boundary.
    ///
    /// # Returns
    /// An `InvalidConfig` error if `base_lr` is not positive or `multiplier` is outside (0, 1].
    pub fn new(base_lr: f32, multiplier: f32) -> Result<Self> {
        let config = Self::unchecked(base_lr, multiplier);
        config.validate()?;
        Ok(config)
    }

    /// Creates a new `DecayConfig` without checking its values.
    ///
    /// Multipliers above one or non-positive rates are accepted as is, the
    /// resulting rates may then grow or change sign along the traversal.
    pub fn unchecked(base_lr: f32, multiplier: f32) -> Self {
        Self {
            base_lr,
            multiplier,
        }
    }

    /// Checks that `base_lr` is finite and positive and that `multiplier` is in (0, 1].
    pub fn validate(&self) -> Result<()> {
        let Self {
            base_lr,
            multiplier,
        } = *self;

        if !base_lr.is_finite() || base_lr <= 0. {
            return Err(LrErr::InvalidConfig(format!(
                "base_lr must be a positive number, got {base_lr}"
            )));
        }

        if !multiplier.is_finite() || multiplier <= 0. || multiplier > 1. {
            return Err(LrErr::InvalidConfig(format!(
                "multiplier must be in (0, 1], got {multiplier}"
            )));
        }

        Ok(())
    }
}

/// The configuration for a single fine-tuning setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub decay: DecayConfig,
    #[serde(default)]
    pub traversal: Traversal,
    #[serde(default)]
    pub optimizer: OptimizerSpec,
}

impl RunConfig {
    /// Loads a `RunConfig` from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or has an invalid decay.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LrErr::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content)
    }

    /// Parses and validates a `RunConfig` from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.decay.validate()?;
        config.optimizer.validate()?;
        Ok(config)
    }
}
