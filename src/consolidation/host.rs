//! The project document the engine runs against.
//!
//! Hosts expose their object model through [`Project`]. The engine never
//! inspects concrete host types: it only asks an item what [`ItemKind`] it
//! has and reads or writes through the trait.

use super::{ItemId, SyntheticSource};
use anyhow::Result;
use std::ops::{Deref, DerefMut};

/// What feeds a footage item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Generated color fill (solids, nulls, adjustment layers)
    Solid,
    /// Media on disk
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    Composition,
    Footage(SourceKind),
}

/// Live, mutable project document.
///
/// Folder children and composition layers are addressed by 0-based index.
/// Every item other than the root folder has exactly one parent folder.
pub trait Project {
    /// Every item in enumeration order. The root folder is not listed.
    fn item_ids(&self) -> Vec<ItemId>;

    fn root_folder(&self) -> ItemId;

    fn kind(&self, item: ItemId) -> Result<ItemKind>;

    fn is_synthetic_asset(&self, item: ItemId) -> Result<bool> {
        Ok(self.kind(item)? == ItemKind::Footage(SourceKind::Solid))
    }

    fn is_folder(&self, item: ItemId) -> Result<bool> {
        Ok(self.kind(item)? == ItemKind::Folder)
    }

    fn is_composition(&self, item: ItemId) -> Result<bool> {
        Ok(self.kind(item)? == ItemKind::Composition)
    }

    fn name(&self, item: ItemId) -> Result<String>;

    fn set_name(&mut self, item: ItemId, name: &str) -> Result<()>;

    /// Visual properties of a synthetic asset. Fails for any other kind.
    fn synthetic_source(&self, item: ItemId) -> Result<SyntheticSource>;

    fn parent_folder(&self, item: ItemId) -> Result<ItemId>;

    fn set_parent_folder(&mut self, item: ItemId, folder: ItemId) -> Result<()>;

    /// Create a folder directly under the root
    fn add_folder(&mut self, name: &str) -> Result<ItemId>;

    fn folder_len(&self, folder: ItemId) -> Result<usize>;

    fn folder_child(&self, folder: ItemId, index: usize) -> Result<ItemId>;

    /// Remove an item. Removing a folder removes its contents.
    fn remove(&mut self, item: ItemId) -> Result<()>;

    fn layer_count(&self, composition: ItemId) -> Result<usize>;

    fn layer_source(&self, composition: ItemId, index: usize) -> Result<Option<ItemId>>;

    /// Point a layer at a new source. Timing, transform and every other
    /// layer property must be left untouched.
    fn replace_layer_source(
        &mut self,
        composition: ItemId,
        index: usize,
        source: ItemId,
    ) -> Result<()>;

    /// Compositions that use `item`, when the host keeps a reverse index.
    /// `None` means the caller has to scan every composition.
    fn used_in(&self, _item: ItemId) -> Result<Option<Vec<ItemId>>> {
        Ok(None)
    }

    fn begin_undo_group(&mut self, label: &str);

    fn end_undo_group(&mut self);
}

/// Open undo group on a project, closed when dropped.
///
/// Derefs to the project so every mutation made through the guard lands in
/// the same undo step, whichever way the caller leaves the scope.
pub struct UndoGroup<'a, P: Project + ?Sized> {
    project: &'a mut P,
}

impl<'a, P: Project + ?Sized> UndoGroup<'a, P> {
    pub fn begin(project: &'a mut P, label: &str) -> Self {
        project.begin_undo_group(label);
        Self { project }
    }
}

impl<P: Project + ?Sized> Deref for UndoGroup<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.project
    }
}

impl<P: Project + ?Sized> DerefMut for UndoGroup<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.project
    }
}

impl<P: Project + ?Sized> Drop for UndoGroup<'_, P> {
    fn drop(&mut self) {
        self.project.end_undo_group();
    }
}
