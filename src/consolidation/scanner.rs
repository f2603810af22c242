use super::host::Project;
use super::signature::{Signature, build_signature};
use super::{AssetItem, Category, ItemId};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Synthetic assets sharing one signature, in enumeration order.
///
/// The first member is the survivor. Never empty.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub id: Uuid,
    pub signature: Signature,
    pub members: Vec<AssetItem>,
}

impl Group {
    pub fn survivor(&self) -> &AssetItem {
        &self.members[0]
    }

    pub fn duplicates(&self) -> &[AssetItem] {
        &self.members[1..]
    }

    pub fn category(&self) -> Category {
        self.signature.category
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub solids: usize,
    pub nulls: usize,
    pub adjustments: usize,
}

impl CategoryCounts {
    fn record(&mut self, category: Category) {
        match category {
            Category::Solid => self.solids += 1,
            Category::Null => self.nulls += 1,
            Category::Adjustment => self.adjustments += 1,
        }
    }
}

/// Everything the execution phase needs from the analysis phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanResult {
    /// Groups in order of their first member's appearance
    pub groups: Vec<Group>,
    pub total_assets: usize,
    pub counts: CategoryCounts,
    pub duplicates_to_remove: usize,
}

impl ScanResult {
    pub fn group_for(&self, item: ItemId) -> Option<&Group> {
        self.groups
            .iter()
            .find(|group| group.members.iter().any(|member| member.id == item))
    }
}

/// Read the properties of one synthetic asset
pub fn read_asset<P: Project + ?Sized>(project: &P, item: ItemId) -> Result<AssetItem> {
    Ok(AssetItem {
        id: item,
        name: project.name(item)?,
        source: project.synthetic_source(item)?,
        parent: project.parent_folder(item)?,
    })
}

/// Walk every project item once and group the synthetic assets
pub fn scan_project<P: Project + ?Sized>(project: &P) -> Result<ScanResult> {
    let mut assets = Vec::new();
    for item in project.item_ids() {
        if !project
            .is_synthetic_asset(item)
            .with_context(|| format!("Failed to inspect item {item}"))?
        {
            continue;
        }
        let asset =
            read_asset(project, item).with_context(|| format!("Failed to read asset {item}"))?;
        assets.push(asset);
    }

    let result = group_assets(assets);

    tracing::info!(
        total = result.total_assets,
        solids = result.counts.solids,
        nulls = result.counts.nulls,
        adjustments = result.counts.adjustments,
        groups = result.groups.len(),
        duplicates = result.duplicates_to_remove,
        "Scanned project for synthetic assets"
    );

    Ok(result)
}

/// Group assets by signature, keeping their order
pub fn group_assets(assets: Vec<AssetItem>) -> ScanResult {
    let mut result = ScanResult {
        total_assets: assets.len(),
        ..ScanResult::default()
    };
    let mut index: HashMap<Signature, usize> = HashMap::new();

    for asset in assets {
        let signature = build_signature(&asset);
        result.counts.record(signature.category);

        match index.get(&signature) {
            Some(&position) => {
                tracing::debug!(
                    item = %asset.id,
                    name = %asset.name,
                    signature = %signature,
                    "Found duplicate"
                );
                result.groups[position].members.push(asset);
                result.duplicates_to_remove += 1;
            }
            None => {
                index.insert(signature.clone(), result.groups.len());
                result.groups.push(Group {
                    id: Uuid::new_v4(),
                    signature,
                    members: vec![asset],
                });
            }
        }
    }

    result
}
