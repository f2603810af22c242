use super::naming::base_name;
use super::scanner::{CategoryCounts, ScanResult};
use super::{Category, ItemId};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// What one group will turn into
#[derive(Debug, Clone, Serialize)]
pub struct GroupPlan {
    pub group: Uuid,
    pub signature: String,
    pub category: Category,
    pub survivor: ItemId,
    pub survivor_name: String,
    pub duplicates: Vec<ItemId>,
    /// Name before any collision suffix
    pub planned_name: String,
}

/// Dry-run analysis shown before anything is changed
#[derive(Debug, Clone, Serialize)]
pub struct DryRunReport {
    pub total_assets: usize,
    pub counts: CategoryCounts,
    pub duplicates_to_remove: usize,
    pub target_folder_name: String,
    pub groups: Vec<GroupPlan>,
}

impl DryRunReport {
    pub fn from_scan(scan: &ScanResult, target_folder_name: &str) -> Self {
        let groups = scan
            .groups
            .iter()
            .map(|group| GroupPlan {
                group: group.id,
                signature: group.signature.to_string(),
                category: group.category(),
                survivor: group.survivor().id,
                survivor_name: group.survivor().name.clone(),
                duplicates: group.duplicates().iter().map(|asset| asset.id).collect(),
                planned_name: base_name(&group.signature),
            })
            .collect();

        Self {
            total_assets: scan.total_assets,
            counts: scan.counts,
            duplicates_to_remove: scan.duplicates_to_remove,
            target_folder_name: target_folder_name.to_string(),
            groups,
        }
    }

    pub fn has_work(&self) -> bool {
        !self.groups.is_empty()
    }
}

impl fmt::Display for DryRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SOLID CONSOLIDATOR - DRY RUN REPORT")?;
        writeln!(f, "------------------------------------------------")?;
        writeln!(f, "Total Solids Found: {}", self.total_assets)?;
        writeln!(f, "   - Visual Solids: {}", self.counts.solids)?;
        writeln!(f, "   - Null Objects: {}", self.counts.nulls)?;
        writeln!(f, "   - Adjustment Layers: {}", self.counts.adjustments)?;
        writeln!(f)?;
        writeln!(f, "ACTION PLAN:")?;
        writeln!(
            f,
            "1. Move survivors to root '/{}' folder.",
            self.target_folder_name
        )?;
        writeln!(
            f,
            "2. Consolidate Duplicates: {} items will be deleted.",
            self.duplicates_to_remove
        )?;
        write!(f, "3. Rename Survivors (Unix Style).")
    }
}
