use std::collections::BTreeMap;

use crate::filter::FilterRule;

/// Final mapping from target name to the sub-tests excluded for it.
///
/// An empty exclusion list means "run everything in the binary"; a target
/// absent from the map is not run at all. `BTreeMap` keeps iteration in
/// lexicographic order, which is the order targets execute in.
pub type ResolvedTargetSet = BTreeMap<String, Vec<String>>;

/// The outcome of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub targets: ResolvedTargetSet,
    /// Targets removed entirely by an ALL-wildcard rule, in removal order.
    pub filtered_out: Vec<String>,
}

impl Resolution {
    /// Whether a requested single target was filtered down to nothing.
    pub fn single_target_filtered_out(&self) -> bool {
        self.targets.is_empty() && !self.filtered_out.is_empty()
    }
}

/// Resolve the final target set for one invocation.
///
/// Seeds the set with either the one requested target or every known
/// target, then applies the filter rules in catalog order: an ALL-wildcard
/// rule removes its target (idempotently), any other rule appends its
/// literal test name to that target's exclusion list. Rules restricted to
/// a configuration other than `config` are skipped, as are rules naming
/// targets outside the seeded set.
///
/// The returned value is complete before any build or execution begins;
/// nothing mutates it afterwards.
pub fn resolve(
    all_targets: &[String],
    rules: &[FilterRule],
    config: &str,
    single_target: Option<&str>,
) -> Resolution {
    let mut targets: ResolvedTargetSet = match single_target {
        Some(name) => BTreeMap::from([(name.to_owned(), Vec::new())]),
        None => all_targets
            .iter()
            .map(|t| (t.clone(), Vec::new()))
            .collect(),
    };

    let mut filtered_out = Vec::new();

    for rule in rules {
        if !rule.applies_to_config(config) {
            continue;
        }
        if rule.filters_whole_target() {
            if targets.remove(&rule.target_name).is_some() {
                filtered_out.push(rule.target_name.clone());
            }
        } else if let Some(exclusions) = targets.get_mut(&rule.target_name) {
            exclusions.push(rule.test_name.clone());
        }
    }

    Resolution {
        targets,
        filtered_out,
    }
}
