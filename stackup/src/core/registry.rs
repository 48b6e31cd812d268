//! Feature registry and dependency ordering.
//!
//! A feature depends on whichever feature provides (via its conflict flag) a
//! flag it requires. The topological order over that graph is computed once at
//! construction; ties are broken by declaration order so chain output is
//! deterministic.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::core::catalog::builtin_features;
use crate::core::error::{InstallError, RegistryError};
use crate::core::feature::FeatureDescriptor;
use crate::core::state::Flag;

static BUILTIN: LazyLock<FeatureRegistry> = LazyLock::new(|| {
    FeatureRegistry::new(builtin_features()).expect("builtin feature catalog should be acyclic")
});

#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    features: Vec<FeatureDescriptor>,
    /// `rank[i]` is the position of feature `i` in the topological order.
    rank: Vec<usize>,
}

impl FeatureRegistry {
    pub fn new(features: Vec<FeatureDescriptor>) -> Result<Self, RegistryError> {
        let mut seen = BTreeSet::new();
        for feature in &features {
            if !seen.insert(feature.name) {
                return Err(RegistryError::DuplicateFeature(feature.name.to_string()));
            }
        }
        let order = kahn_order(&features)?;
        let mut rank = vec![0; features.len()];
        for (position, index) in order.iter().enumerate() {
            rank[*index] = position;
        }
        Ok(Self { features, rank })
    }

    /// The built-in catalog, validated once per process.
    pub fn builtin() -> &'static FeatureRegistry {
        &BUILTIN
    }

    /// Features in declaration order.
    pub fn features(&self) -> &[FeatureDescriptor] {
        &self.features
    }

    pub fn get(&self, name: &str) -> Result<&FeatureDescriptor, InstallError> {
        self.features
            .iter()
            .find(|feature| feature.name == name)
            .ok_or_else(|| InstallError::UnknownFeature {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// First declared feature whose conflict flag is `flag`.
    pub fn provider(&self, flag: Flag) -> Option<&FeatureDescriptor> {
        self.features
            .iter()
            .find(|feature| feature.conflict_flag == flag)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|feature| feature.name).collect()
    }

    /// Resolve `names` and order them consistently with `requires`.
    ///
    /// Duplicates collapse to one entry. Any unknown name fails the whole call.
    pub fn topological_order<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<&FeatureDescriptor>, InstallError> {
        let mut indices = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            let index = self
                .features
                .iter()
                .position(|feature| feature.name == name)
                .ok_or_else(|| InstallError::UnknownFeature {
                    name: name.to_string(),
                    known: self.names().join(", "),
                })?;
            indices.insert(index);
        }
        let mut ordered: Vec<usize> = indices.into_iter().collect();
        ordered.sort_by_key(|index| self.rank[*index]);
        Ok(ordered
            .into_iter()
            .map(|index| &self.features[index])
            .collect())
    }
}

fn kahn_order(features: &[FeatureDescriptor]) -> Result<Vec<usize>, RegistryError> {
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); features.len()];
    let mut indegree = vec![0usize; features.len()];
    for (index, feature) in features.iter().enumerate() {
        let providers: BTreeSet<usize> = feature
            .requires
            .iter()
            .filter_map(|flag| features.iter().position(|f| f.conflict_flag == *flag))
            .collect();
        for provider in providers {
            dependents[provider].push(index);
            indegree[index] += 1;
        }
    }

    let mut ready: BTreeSet<usize> = (0..features.len())
        .filter(|index| indegree[*index] == 0)
        .collect();
    let mut order = Vec::with_capacity(features.len());
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for dependent in &dependents[next] {
            indegree[*dependent] -= 1;
            if indegree[*dependent] == 0 {
                ready.insert(*dependent);
            }
        }
    }

    if order.len() < features.len() {
        let stuck = (0..features.len())
            .filter(|index| indegree[*index] > 0)
            .map(|index| features[index].name.to_string())
            .collect();
        return Err(RegistryError::Cycle(stuck));
    }
    Ok(order)
}
