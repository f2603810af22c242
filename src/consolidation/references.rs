use super::host::Project;
use super::{Consumer, ItemId};
use anyhow::{Context, Result};
use std::collections::HashSet;

/// Every layer that uses `item` as its source.
///
/// Uses the host's reverse index when it has one and falls back to scanning
/// every composition otherwise. Both paths return the same consumers in the
/// same order.
pub fn find_consumers<P: Project + ?Sized>(project: &P, item: ItemId) -> Result<Vec<Consumer>> {
    let users = project
        .used_in(item)
        .with_context(|| format!("Failed to look up users of {item}"))?;

    match users {
        Some(users) => {
            let users: HashSet<ItemId> = users.into_iter().collect();
            let mut compositions = Vec::new();
            for candidate in project.item_ids() {
                if users.contains(&candidate) && project.is_composition(candidate)? {
                    compositions.push(candidate);
                }
            }
            scan_layers(project, &compositions, item)
        }
        None => find_consumers_exhaustive(project, item),
    }
}

/// Every layer that uses `item`, found by visiting every composition
pub fn find_consumers_exhaustive<P: Project + ?Sized>(
    project: &P,
    item: ItemId,
) -> Result<Vec<Consumer>> {
    let mut compositions = Vec::new();
    for candidate in project.item_ids() {
        if project.is_composition(candidate)? {
            compositions.push(candidate);
        }
    }
    scan_layers(project, &compositions, item)
}

fn scan_layers<P: Project + ?Sized>(
    project: &P,
    compositions: &[ItemId],
    item: ItemId,
) -> Result<Vec<Consumer>> {
    let mut consumers = Vec::new();
    for &composition in compositions {
        let count = project
            .layer_count(composition)
            .with_context(|| format!("Failed to read layers of {composition}"))?;
        for layer_index in 0..count {
            if project.layer_source(composition, layer_index)? == Some(item) {
                consumers.push(Consumer {
                    composition,
                    layer_index,
                });
            }
        }
    }
    Ok(consumers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::memory::{Layer, MemoryProject, ROOT_FOLDER, solid};

    fn project_with_consumers() -> (MemoryProject, ItemId, Vec<Consumer>) {
        let mut project = MemoryProject::new();
        let red = project.add_solid(ROOT_FOLDER, "Red", solid([1.0, 0.0, 0.0], 100, 100)).unwrap();
        let blue = project.add_solid(ROOT_FOLDER, "Blue", solid([0.0, 0.0, 1.0], 100, 100)).unwrap();
        let main = project.add_composition(ROOT_FOLDER, "Main").unwrap();
        let other = project.add_composition(ROOT_FOLDER, "Other").unwrap();
        project.add_composition(ROOT_FOLDER, "Unused").unwrap();

        project.add_layer(main, Layer::new("Red A", Some(red))).unwrap();
        project.add_layer(main, Layer::new("Blue", Some(blue))).unwrap();
        project.add_layer(main, Layer::new("Red B", Some(red))).unwrap();
        project.add_layer(other, Layer::new("Text", None)).unwrap();
        project.add_layer(other, Layer::new("Red C", Some(red))).unwrap();

        let expected = vec![
            Consumer { composition: main, layer_index: 0 },
            Consumer { composition: main, layer_index: 2 },
            Consumer { composition: other, layer_index: 1 },
        ];
        (project, red, expected)
    }

    #[test]
    fn test_find_consumers_with_reverse_index() {
        let (project, red, expected) = project_with_consumers();
        assert_eq!(find_consumers(&project, red).unwrap(), expected);
    }

    #[test]
    fn test_find_consumers_without_reverse_index() {
        let (project, red, expected) = project_with_consumers();
        let project = project.without_reverse_index();
        assert_eq!(find_consumers(&project, red).unwrap(), expected);
    }

    #[test]
    fn test_strategies_agree() {
        let (project, red, _) = project_with_consumers();
        assert_eq!(
            find_consumers(&project, red).unwrap(),
            find_consumers_exhaustive(&project, red).unwrap()
        );
    }

    #[test]
    fn test_unused_item_has_no_consumers() {
        let mut project = MemoryProject::new();
        let green = project.add_solid(ROOT_FOLDER, "Green", solid([0.0, 1.0, 0.0], 100, 100)).unwrap();
        project.add_composition(ROOT_FOLDER, "Main").unwrap();
        assert!(find_consumers(&project, green).unwrap().is_empty());
    }
}
