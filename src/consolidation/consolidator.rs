use super::host::Project;
use super::naming::{NameAllocator, base_name};
use super::references::find_consumers;
use super::scanner::{Group, ScanResult};
use super::ItemId;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationSummary {
    pub groups_processed: usize,
    pub layers_repointed: usize,
    pub items_removed: usize,
    pub survivors_moved: usize,
    pub survivors_renamed: usize,
    pub target_folder: Option<ItemId>,
}

/// First folder directly under the root named `name`
pub fn find_target_folder<P: Project + ?Sized>(project: &P, name: &str) -> Result<Option<ItemId>> {
    let root = project.root_folder();
    for index in 0..project.folder_len(root)? {
        let child = project.folder_child(root, index)?;
        if project.is_folder(child)? && project.name(child)? == name {
            return Ok(Some(child));
        }
    }
    Ok(None)
}

pub fn ensure_target_folder<P: Project + ?Sized>(project: &mut P, name: &str) -> Result<ItemId> {
    if let Some(folder) = find_target_folder(project, name)? {
        return Ok(folder);
    }
    let folder = project
        .add_folder(name)
        .with_context(|| format!("Failed to create folder '{name}'"))?;
    tracing::info!(folder = %folder, name, "Created target folder");
    Ok(folder)
}

/// Merge every group into its survivor, then move and rename the survivors.
///
/// Survivor names are assigned in group order against the names of every item
/// outside the groups, so a name is never blocked by another survivor's old
/// name. Stops at the first host failure. Work already done stays done.
pub fn consolidate<P: Project + ?Sized>(
    project: &mut P,
    scan: &ScanResult,
    target_folder: ItemId,
) -> Result<ConsolidationSummary> {
    let mut summary = ConsolidationSummary {
        target_folder: Some(target_folder),
        ..ConsolidationSummary::default()
    };

    let members: HashSet<ItemId> = scan
        .groups
        .iter()
        .flat_map(|group| group.members.iter().map(|asset| asset.id))
        .collect();
    let mut names = NameAllocator::excluding(project, &members)?;

    for group in &scan.groups {
        consolidate_group(project, group, target_folder, &mut names, &mut summary)
            .with_context(|| format!("Failed to consolidate group {}", group.signature))?;
        summary.groups_processed += 1;
    }

    tracing::info!(
        groups = summary.groups_processed,
        repointed = summary.layers_repointed,
        removed = summary.items_removed,
        moved = summary.survivors_moved,
        renamed = summary.survivors_renamed,
        "Consolidation finished"
    );

    Ok(summary)
}

fn consolidate_group<P: Project + ?Sized>(
    project: &mut P,
    group: &Group,
    target_folder: ItemId,
    names: &mut NameAllocator,
    summary: &mut ConsolidationSummary,
) -> Result<()> {
    let survivor = group.survivor().id;

    for duplicate in group.duplicates() {
        let consumers = find_consumers(project, duplicate.id)
            .with_context(|| format!("Failed to resolve users of {}", duplicate.id))?;

        for consumer in &consumers {
            project
                .replace_layer_source(consumer.composition, consumer.layer_index, survivor)
                .with_context(|| {
                    format!(
                        "Failed to repoint layer {} of {} to {}",
                        consumer.layer_index, consumer.composition, survivor
                    )
                })?;
        }
        summary.layers_repointed += consumers.len();

        project
            .remove(duplicate.id)
            .with_context(|| format!("Failed to remove duplicate {}", duplicate.id))?;
        summary.items_removed += 1;

        tracing::debug!(
            duplicate = %duplicate.id,
            survivor = %survivor,
            layers = consumers.len(),
            "Merged duplicate"
        );
    }

    if project.parent_folder(survivor)? != target_folder {
        project
            .set_parent_folder(survivor, target_folder)
            .with_context(|| format!("Failed to move {survivor} into {target_folder}"))?;
        summary.survivors_moved += 1;
    }

    let name = names.allocate(&base_name(&group.signature));
    if project.name(survivor)? != name {
        project
            .set_name(survivor, &name)
            .with_context(|| format!("Failed to rename {survivor} to '{name}'"))?;
        summary.survivors_renamed += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::memory::{Layer, MemoryProject, ROOT_FOLDER, solid};
    use crate::consolidation::scanner::scan_project;

    #[test]
    fn test_find_target_folder_only_looks_at_root() {
        let mut project = MemoryProject::new();
        let nested_parent = project.add_folder("Assets").unwrap();
        project.add_folder_in(nested_parent, "Solids").unwrap();
        assert_eq!(find_target_folder(&project, "Solids").unwrap(), None);

        let top = project.add_folder("Solids").unwrap();
        assert_eq!(find_target_folder(&project, "Solids").unwrap(), Some(top));
        assert_eq!(ensure_target_folder(&mut project, "Solids").unwrap(), top);
    }

    #[test]
    fn test_ensure_target_folder_creates_at_root() {
        let mut project = MemoryProject::new();
        let folder = ensure_target_folder(&mut project, "Solids").unwrap();
        assert_eq!(project.parent_folder(folder).unwrap(), ROOT_FOLDER);
        assert_eq!(project.name(folder).unwrap(), "Solids");
    }

    #[test]
    fn test_consolidate_merges_and_renames() {
        let mut project = MemoryProject::new();
        let old = project.add_folder("Old Solids").unwrap();
        let red = solid([1.0, 0.0, 0.0], 1920, 1080);
        let first = project.add_solid(old, "Red Solid 1", red).unwrap();
        let second = project.add_solid(ROOT_FOLDER, "Red Solid 2", red).unwrap();
        let comp = project.add_composition(ROOT_FOLDER, "Main").unwrap();
        project.add_layer(comp, Layer::new("BG", Some(second))).unwrap();
        let target = project.add_folder("Solids").unwrap();

        let scan = scan_project(&project).unwrap();
        let summary = consolidate(&mut project, &scan, target).unwrap();

        assert!(!project.contains(second));
        assert_eq!(project.layer_source(comp, 0).unwrap(), Some(first));
        assert_eq!(project.parent_folder(first).unwrap(), target);
        assert_eq!(project.name(first).unwrap(), "Solid_FF0000_1920x1080");
        assert_eq!(
            summary,
            ConsolidationSummary {
                groups_processed: 1,
                layers_repointed: 1,
                items_removed: 1,
                survivors_moved: 1,
                survivors_renamed: 1,
                target_folder: Some(target),
            }
        );
    }

    #[test]
    fn test_colliding_survivor_names_get_suffixes() {
        let mut project = MemoryProject::new();
        let target = project.add_folder("Solids").unwrap();
        let square = project
            .add_solid(ROOT_FOLDER, "Null 1", solid([1.0, 1.0, 1.0], 100, 100))
            .unwrap();
        let mut wide = solid([1.0, 1.0, 1.0], 100, 100);
        wide.pixel_aspect = 2.0;
        let anamorphic = project.add_solid(ROOT_FOLDER, "Null 2", wide).unwrap();

        let scan = scan_project(&project).unwrap();
        consolidate(&mut project, &scan, target).unwrap();

        assert_eq!(project.name(square).unwrap(), "Null_100x100");
        assert_eq!(project.name(anamorphic).unwrap(), "Null_100x100_1");
    }

    #[test]
    fn test_failure_keeps_committed_work() {
        let mut project = MemoryProject::new();
        let target = project.add_folder("Solids").unwrap();
        let black = solid([0.0, 0.0, 0.0], 10, 10);
        let keep = project.add_solid(ROOT_FOLDER, "Black 1", black).unwrap();
        let gone = project.add_solid(ROOT_FOLDER, "Black 2", black).unwrap();

        let scan = scan_project(&project).unwrap();
        // The target vanishing makes the move fail after the merge
        project.remove(target).unwrap();

        let err = consolidate(&mut project, &scan, target).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to move"));
        assert!(project.contains(keep));
        assert!(!project.contains(gone));
    }
}
