use log::info;
use serde::Serialize;

use crate::assign::{GroupBinding, top_level_prefix};

/// A run of consecutive bindings under the same top-level group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub prefix: String,
    pub lr: f32,
    /// Bindings that hold at least one parameter.
    pub trainable: usize,
    pub total: usize,
}

/// Collapses the bindings into one summary per top-level group crossing.
pub fn summarize<P>(bindings: &[GroupBinding<P>]) -> Vec<GroupSummary> {
    let mut summaries: Vec<GroupSummary> = Vec::new();

    for binding in bindings {
        let prefix = top_level_prefix(&binding.name);
        let trainable = usize::from(!binding.is_empty());

        match summaries.last_mut() {
            Some(last) if last.prefix == prefix => {
                last.trainable += trainable;
                last.total += 1;
            }
            _ => summaries.push(GroupSummary {
                prefix: prefix.to_string(),
                lr: binding.lr,
                trainable,
                total: 1,
            }),
        }
    }

    summaries
}

pub fn log_summary(summaries: &[GroupSummary]) {
    for s in summaries {
        info!(
            "{:<16} lr={:<12e} trainable={}/{}",
            s.prefix, s.lr, s.trainable, s.total
        );
    }
}
