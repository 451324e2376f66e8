mod adam;
mod gradient_descent;
mod gradient_descent_with_momentum;
mod grouped;
mod optimizer;

pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use gradient_descent_with_momentum::GradientDescentWithMomentum;
pub use grouped::GroupedOptimizer;
pub use optimizer::Optimizer;

use serde::{Deserialize, Serialize};

use crate::{LrErr, Result};

/// The algorithm used to update each parameter group, the learning rate comes from the
/// group's binding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    #[default]
    GradientDescent,
    GradientDescentWithMomentum {
        momentum: f32,
    },
    Adam {
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
}

impl OptimizerSpec {
    /// Checks the hyperparameters of the algorithm.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::GradientDescent => Ok(()),
            Self::GradientDescentWithMomentum { momentum } => {
                if !(0.0..1.0).contains(&momentum) {
                    return Err(LrErr::InvalidConfig(format!(
                        "momentum must be in [0, 1), got {momentum}"
                    )));
                }

                Ok(())
            }
            Self::Adam {
                beta1,
                beta2,
                epsilon,
            } => {
                if !(0.0..1.0).contains(&beta1) || !(0.0..1.0).contains(&beta2) {
                    return Err(LrErr::InvalidConfig(format!(
                        "betas must be in [0, 1), got {beta1} and {beta2}"
                    )));
                }

                if !epsilon.is_finite() || epsilon <= 0. {
                    return Err(LrErr::InvalidConfig(format!(
                        "epsilon must be a positive number, got {epsilon}"
                    )));
                }

                Ok(())
            }
        }
    }

    /// Builds an optimizer for `len` parameters that steps with the given learning rate.
    pub fn build(&self, len: usize, learning_rate: f32) -> Box<dyn Optimizer> {
        match *self {
            Self::GradientDescent => Box::new(GradientDescent::new(learning_rate)),
            Self::GradientDescentWithMomentum { momentum } => Box::new(
                GradientDescentWithMomentum::new(len, learning_rate, momentum),
            ),
            Self::Adam {
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(len, learning_rate, beta1, beta2, epsilon)),
        }
    }
}
