// Resolver - tiered fetch and merge
// Tiers are fetched strictly in precedence order; later tiers override earlier ones

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::key::logical_name;
use crate::domain::{KeyRules, MergedEnvironment, RawEntry, ResolutionConfig};
use crate::error::{AppError, Result};
use crate::port::KeyValueStore;

/// How a tier's entries are applied to the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Insert or overwrite every name
    Override,
    /// Overwrite names already present; drop names the tier would introduce
    RefineExisting,
}

/// One merge pass: a scope root and how its entries apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub name: &'static str,
    pub root: String,
    pub policy: MergePolicy,
}

/// Build the ordered tier list for a config
///
/// Order (lowest to highest precedence):
/// 1. global
/// 2. global scoped to the system
/// 3. system
/// 4. service (refine-only, skipped when no service is set)
/// 5. host
pub fn tiers(cfg: &ResolutionConfig) -> Vec<Tier> {
    let prefix = cfg.prefix();
    let system = cfg.system();

    let mut tiers = vec![
        Tier {
            name: "global",
            root: format!("{prefix}/global"),
            policy: MergePolicy::Override,
        },
        Tier {
            name: "global-system",
            root: format!("{prefix}/global/{system}"),
            policy: MergePolicy::Override,
        },
        Tier {
            name: "system",
            root: format!("{prefix}/system/{system}"),
            policy: MergePolicy::Override,
        },
    ];

    if !cfg.service().is_empty() {
        tiers.push(Tier {
            name: "service",
            root: format!("{prefix}/service/{}", cfg.service()),
            policy: MergePolicy::RefineExisting,
        });
    }

    tiers.push(Tier {
        name: "host",
        root: format!("{prefix}/host/{}", cfg.hostname()),
        policy: MergePolicy::Override,
    });

    tiers
}

/// Resolves a configuration tree into a flat environment
pub struct Resolver {
    store: Arc<dyn KeyValueStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Fetch every tier and merge into one mapping
    ///
    /// Either the whole mapping is returned or an error; a failed tier
    /// discards everything merged so far.
    ///
    /// # Errors
    /// - AppError::Domain if the config names an invalid scope
    /// - AppError::StoreUnavailable naming the tier and path whose fetch failed
    pub async fn resolve(&self, cfg: &ResolutionConfig) -> Result<MergedEnvironment> {
        cfg.validate()?;

        let rules = cfg.rules();
        let mut merged = MergedEnvironment::new();

        for tier in tiers(cfg) {
            let entries = self
                .store
                .fetch_recursive(&tier.root)
                .await
                .map_err(|source| AppError::StoreUnavailable {
                    tier: tier.name,
                    path: tier.root.clone(),
                    source,
                })?;

            let fetched = entries.len();
            let applied = merge_tier(&mut merged, &tier, entries, rules);

            debug!(
                tier = tier.name,
                path = %tier.root,
                fetched = fetched,
                applied = applied,
                "Merged tier"
            );
        }

        info!(keys = merged.len(), "Resolution complete");
        Ok(merged)
    }
}

/// Apply one tier's entries; returns how many names were written
fn merge_tier(
    merged: &mut MergedEnvironment,
    tier: &Tier,
    mut entries: Vec<RawEntry>,
    rules: KeyRules,
) -> usize {
    // Same-name collisions inside one tier resolve by path order, not store order
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let mut applied = 0;
    for entry in entries.into_iter().filter(|e| !e.is_directory) {
        let Some(name) = logical_name(&tier.root, &entry.path) else {
            continue;
        };
        let name = rules.apply(&name);

        if tier.policy == MergePolicy::RefineExisting && !merged.contains_key(&name) {
            debug!(tier = tier.name, key = %name, "Dropping key not present in earlier tiers");
            continue;
        }

        merged.insert(name, entry.value);
        applied += 1;
    }

    applied
}
