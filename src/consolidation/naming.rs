use super::host::Project;
use super::signature::Signature;
use super::{Category, ItemId};
use anyhow::Result;
use std::collections::HashSet;

/// Normalized name for a group's survivor
pub fn base_name(signature: &Signature) -> String {
    let dimensions = format!("{}x{}", signature.width, signature.height);
    match signature.category {
        Category::Null => format!("Null_{dimensions}"),
        Category::Adjustment => format!("Adjustment_Layer_{dimensions}"),
        Category::Solid => format!("Solid_{}_{}", signature.hex, dimensions),
    }
}

/// Hands out names that no other project item uses.
///
/// Names are compared across the whole project, not per folder. Each name
/// handed out is reserved, so later calls in the same pass see it as taken.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Reserve the names of every item except those in `skip`
    pub fn excluding<P: Project + ?Sized>(project: &P, skip: &HashSet<ItemId>) -> Result<Self> {
        let mut taken = HashSet::new();
        for item in project.item_ids() {
            if !skip.contains(&item) {
                taken.insert(project.name(item)?);
            }
        }
        Ok(Self { taken })
    }

    /// First free name of `base`, `base_1`, `base_2`, ...
    pub fn allocate(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 1;
        while self.taken.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

/// Pick a name no other project item uses.
///
/// The current name of `renaming` does not count as taken, so renaming an item
/// to the name it already has is stable.
pub fn unique_name<P: Project + ?Sized>(
    project: &P,
    base: &str,
    renaming: Option<ItemId>,
) -> Result<String> {
    let skip: HashSet<ItemId> = renaming.into_iter().collect();
    Ok(NameAllocator::excluding(project, &skip)?.allocate(base))
}
