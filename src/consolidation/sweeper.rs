//! Empty folder cleanup.
//!
//! A sweep walks the folder tree depth-first, children in reverse index order,
//! and removes every sub-folder that is empty once its own sub-folders have
//! been swept. Walking backwards means removing child `i` never shifts the
//! index of a child still to be visited. Sweeps repeat until one removes
//! nothing.

use super::host::Project;
use super::ItemId;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;

/// Default cap on sweeps per run. Only reached by a malformed folder tree.
pub const DEFAULT_MAX_SWEEPS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    pub sweeps: usize,
    pub folders_removed: usize,
    /// False when the sweep cap was hit before a sweep came back clean
    pub converged: bool,
}

/// Sweep until nothing is removed or `max_sweeps` sweeps have run.
///
/// `protected` is never removed, whatever its name or contents. With no
/// `max_sweeps` the cap is the folder count plus one, which a tree always
/// converges within since every productive sweep removes a folder.
pub fn sweep_empty_folders<P: Project + ?Sized>(
    project: &mut P,
    protected: Option<ItemId>,
    max_sweeps: Option<usize>,
) -> Result<SweepOutcome> {
    let limit = match max_sweeps {
        Some(limit) => limit,
        None => count_folders(project)? + 1,
    };

    let mut outcome = SweepOutcome::default();
    while outcome.sweeps < limit {
        let removed = sweep_once(project, protected)?;
        outcome.sweeps += 1;
        outcome.folders_removed += removed;
        if removed == 0 {
            outcome.converged = true;
            break;
        }
    }

    if outcome.converged {
        tracing::info!(
            sweeps = outcome.sweeps,
            removed = outcome.folders_removed,
            "Removed empty folders"
        );
    } else {
        tracing::warn!(
            sweeps = outcome.sweeps,
            removed = outcome.folders_removed,
            "Stopped folder cleanup at the sweep limit"
        );
    }

    Ok(outcome)
}

/// One sweep from the root. Returns how many folders it removed.
pub fn sweep_once<P: Project + ?Sized>(project: &mut P, protected: Option<ItemId>) -> Result<usize> {
    let root = project.root_folder();
    let mut visited = HashSet::new();
    sweep_folder(project, root, protected, &mut visited)
}

fn sweep_folder<P: Project + ?Sized>(
    project: &mut P,
    folder: ItemId,
    protected: Option<ItemId>,
    visited: &mut HashSet<ItemId>,
) -> Result<usize> {
    // A folder reached twice in one sweep means the host tree has a cycle
    if !visited.insert(folder) {
        return Ok(0);
    }

    let mut removed = 0;
    for index in (0..project.folder_len(folder)?).rev() {
        let child = project.folder_child(folder, index)?;
        if !project.is_folder(child)? {
            continue;
        }

        removed += sweep_folder(project, child, protected, visited)?;

        if project.folder_len(child)? == 0 && Some(child) != protected {
            project
                .remove(child)
                .with_context(|| format!("Failed to remove empty folder {child}"))?;
            tracing::debug!(folder = %child, "Removed empty folder");
            removed += 1;
        }
    }
    Ok(removed)
}

fn count_folders<P: Project + ?Sized>(project: &P) -> Result<usize> {
    let mut count = 0;
    for item in project.item_ids() {
        if project.is_folder(item)? {
            count += 1;
        }
    }
    Ok(count)
}
