//! In-memory project document.
//!
//! A complete [`Project`] implementation over a flat item list, loadable from
//! and savable to a JSON snapshot. Item order in the list is the enumeration
//! order, and a folder's children are its items in that same order.

use super::host::{ItemKind, Project, SourceKind};
use super::{ItemId, Rgb, SyntheticSource};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identity of the root folder. Never listed among the items.
pub const ROOT_FOLDER: ItemId = ItemId(0);

fn root_folder_id() -> ItemId {
    ROOT_FOLDER
}

fn unit_scale() -> [f64; 2] {
    [100.0, 100.0]
}

/// Square-pixel synthetic source
pub fn solid(color: [f64; 3], width: u32, height: u32) -> SyntheticSource {
    SyntheticSource {
        color: Rgb(color),
        width,
        height,
        pixel_aspect: 1.0,
    }
}

/// A composition layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub source: Option<ItemId>,
    #[serde(default)]
    pub in_point: f64,
    #[serde(default)]
    pub out_point: f64,
    #[serde(default = "unit_scale")]
    pub scale: [f64; 2],
    #[serde(default)]
    pub position: [f64; 2],
}

impl Layer {
    pub fn new(name: impl Into<String>, source: Option<ItemId>) -> Self {
        Self {
            name: name.into(),
            source,
            in_point: 0.0,
            out_point: 10.0,
            scale: unit_scale(),
            position: [0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemBody {
    Folder,
    Solid(SyntheticSource),
    Footage {
        #[serde(default)]
        path: String,
    },
    Composition {
        #[serde(default)]
        layers: Vec<Layer>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default = "root_folder_id")]
    pub parent: ItemId,
    #[serde(flatten)]
    pub body: ItemBody,
}

/// Serializable form of a whole project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default)]
    pub items: Vec<ProjectItem>,
}

#[derive(Debug, Clone)]
pub struct MemoryProject {
    items: Vec<ProjectItem>,
    next_id: u64,
    reverse_index: bool,
    open_undo: Vec<String>,
    undo_history: Vec<String>,
}

impl Default for MemoryProject {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProject {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            reverse_index: true,
            open_undo: Vec::new(),
            undo_history: Vec::new(),
        }
    }

    /// Disable [`Project::used_in`], forcing callers to scan every composition
    pub fn without_reverse_index(mut self) -> Self {
        self.reverse_index = false;
        self
    }

    pub fn from_snapshot(snapshot: ProjectSnapshot) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &snapshot.items {
            if item.id == ROOT_FOLDER {
                bail!("Item '{}' uses the reserved root id {}", item.name, ROOT_FOLDER);
            }
            if !seen.insert(item.id) {
                bail!("Duplicate item id {}", item.id);
            }
        }

        let next_id = snapshot.items.iter().map(|item| item.id.0).max().unwrap_or(0) + 1;
        let project = Self {
            items: snapshot.items,
            next_id,
            ..Self::new()
        };

        for item in &project.items {
            if !project.is_folder_id(item.parent) {
                bail!("Parent {} of item {} is not a folder", item.parent, item.id);
            }
            if let ItemBody::Composition { layers } = &item.body {
                for (index, layer) in layers.iter().enumerate() {
                    if let Some(source) = layer.source {
                        project.check_layer_source(source).with_context(|| {
                            format!("Invalid source on layer {} of composition {}", index, item.id)
                        })?;
                    }
                }
            }
        }

        // Every item must reach the root by walking up its parents
        for item in &project.items {
            let mut current = item.parent;
            let mut steps = 0;
            while current != ROOT_FOLDER {
                steps += 1;
                if steps > project.items.len() {
                    bail!("Folder cycle above item {}", item.id);
                }
                current = project.entry(current)?.parent;
            }
        }

        Ok(project)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: ProjectSnapshot =
            serde_json::from_str(json).context("Failed to parse project snapshot")?;
        Self::from_snapshot(snapshot)
    }

    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            items: self.items.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.snapshot()).context("Failed to serialize project")
    }

    pub fn items(&self) -> &[ProjectItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&ProjectItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.item(id).is_some()
    }

    pub fn add_folder_in(&mut self, parent: ItemId, name: &str) -> Result<ItemId> {
        self.insert(parent, name, ItemBody::Folder)
    }

    pub fn add_solid(&mut self, parent: ItemId, name: &str, source: SyntheticSource) -> Result<ItemId> {
        self.insert(parent, name, ItemBody::Solid(source))
    }

    pub fn add_footage(&mut self, parent: ItemId, name: &str, path: &str) -> Result<ItemId> {
        self.insert(parent, name, ItemBody::Footage { path: path.to_string() })
    }

    pub fn add_composition(&mut self, parent: ItemId, name: &str) -> Result<ItemId> {
        self.insert(parent, name, ItemBody::Composition { layers: Vec::new() })
    }

    /// Append a layer, returning its index
    pub fn add_layer(&mut self, composition: ItemId, layer: Layer) -> Result<usize> {
        if let Some(source) = layer.source {
            self.check_layer_source(source)?;
        }
        let layers = self.layers_mut(composition)?;
        layers.push(layer);
        Ok(layers.len() - 1)
    }

    pub fn layers(&self, composition: ItemId) -> Result<&[Layer]> {
        match &self.entry(composition)?.body {
            ItemBody::Composition { layers } => Ok(layers.as_slice()),
            _ => bail!("Item {composition} is not a composition"),
        }
    }

    /// Labels of closed undo groups, oldest first
    pub fn undo_history(&self) -> &[String] {
        &self.undo_history
    }

    pub fn undo_depth(&self) -> usize {
        self.open_undo.len()
    }

    fn insert(&mut self, parent: ItemId, name: &str, body: ItemBody) -> Result<ItemId> {
        if !self.is_folder_id(parent) {
            bail!("Cannot add '{name}': parent {parent} is not a folder");
        }
        let id = ItemId(self.next_id);
        self.next_id += 1;
        self.items.push(ProjectItem {
            id,
            name: name.to_string(),
            parent,
            body,
        });
        Ok(id)
    }

    fn entry(&self, id: ItemId) -> Result<&ProjectItem> {
        self.item(id)
            .with_context(|| format!("Item {id} does not exist"))
    }

    fn entry_mut(&mut self, id: ItemId) -> Result<&mut ProjectItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .with_context(|| format!("Item {id} does not exist"))
    }

    fn is_folder_id(&self, id: ItemId) -> bool {
        id == ROOT_FOLDER || matches!(self.item(id), Some(ProjectItem { body: ItemBody::Folder, .. }))
    }

    fn check_layer_source(&self, source: ItemId) -> Result<()> {
        match self.item(source) {
            None => bail!("Layer source {source} does not exist"),
            Some(ProjectItem { body: ItemBody::Folder, .. }) => {
                bail!("Folder {source} cannot be a layer source")
            }
            Some(_) => Ok(()),
        }
    }

    fn layers_mut(&mut self, composition: ItemId) -> Result<&mut Vec<Layer>> {
        match &mut self.entry_mut(composition)?.body {
            ItemBody::Composition { layers } => Ok(layers),
            _ => bail!("Item {composition} is not a composition"),
        }
    }

    fn children(&self, folder: ItemId) -> impl Iterator<Item = &ProjectItem> {
        self.items.iter().filter(move |item| item.parent == folder)
    }

    /// `id` plus everything nested below it
    fn subtree(&self, id: ItemId) -> HashSet<ItemId> {
        let mut ids = HashSet::from([id]);
        loop {
            let before = ids.len();
            for item in &self.items {
                if ids.contains(&item.parent) {
                    ids.insert(item.id);
                }
            }
            if ids.len() == before {
                return ids;
            }
        }
    }
}

impl Project for MemoryProject {
    fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    fn root_folder(&self) -> ItemId {
        ROOT_FOLDER
    }

    fn kind(&self, item: ItemId) -> Result<ItemKind> {
        if item == ROOT_FOLDER {
            return Ok(ItemKind::Folder);
        }
        Ok(match self.entry(item)?.body {
            ItemBody::Folder => ItemKind::Folder,
            ItemBody::Solid(_) => ItemKind::Footage(SourceKind::Solid),
            ItemBody::Footage { .. } => ItemKind::Footage(SourceKind::File),
            ItemBody::Composition { .. } => ItemKind::Composition,
        })
    }

    fn name(&self, item: ItemId) -> Result<String> {
        if item == ROOT_FOLDER {
            return Ok("Root".to_string());
        }
        Ok(self.entry(item)?.name.clone())
    }

    fn set_name(&mut self, item: ItemId, name: &str) -> Result<()> {
        if item == ROOT_FOLDER {
            bail!("The root folder cannot be renamed");
        }
        self.entry_mut(item)?.name = name.to_string();
        Ok(())
    }

    fn synthetic_source(&self, item: ItemId) -> Result<SyntheticSource> {
        match &self.entry(item)?.body {
            ItemBody::Solid(source) => Ok(*source),
            _ => bail!("Item {item} is not a synthetic asset"),
        }
    }

    fn parent_folder(&self, item: ItemId) -> Result<ItemId> {
        if item == ROOT_FOLDER {
            bail!("The root folder has no parent");
        }
        Ok(self.entry(item)?.parent)
    }

    fn set_parent_folder(&mut self, item: ItemId, folder: ItemId) -> Result<()> {
        if item == ROOT_FOLDER {
            bail!("The root folder cannot be moved");
        }
        if !self.is_folder_id(folder) {
            bail!("Cannot move {item} into {folder}: not a folder");
        }
        if self.subtree(item).contains(&folder) {
            bail!("Cannot move folder {item} into itself");
        }
        self.entry_mut(item)?.parent = folder;
        Ok(())
    }

    fn add_folder(&mut self, name: &str) -> Result<ItemId> {
        self.insert(ROOT_FOLDER, name, ItemBody::Folder)
    }

    fn folder_len(&self, folder: ItemId) -> Result<usize> {
        if !self.is_folder_id(folder) {
            bail!("Item {folder} is not a folder");
        }
        Ok(self.children(folder).count())
    }

    fn folder_child(&self, folder: ItemId, index: usize) -> Result<ItemId> {
        if !self.is_folder_id(folder) {
            bail!("Item {folder} is not a folder");
        }
        self.children(folder)
            .nth(index)
            .map(|item| item.id)
            .with_context(|| format!("Folder {folder} has no child at index {index}"))
    }

    fn remove(&mut self, item: ItemId) -> Result<()> {
        if item == ROOT_FOLDER {
            bail!("The root folder cannot be removed");
        }
        self.entry(item)?;

        let removed = self.subtree(item);
        self.items.retain(|entry| !removed.contains(&entry.id));

        // Layers sourcing a removed item go with it
        for entry in &mut self.items {
            if let ItemBody::Composition { layers } = &mut entry.body {
                layers.retain(|layer| !layer.source.is_some_and(|source| removed.contains(&source)));
            }
        }
        Ok(())
    }

    fn layer_count(&self, composition: ItemId) -> Result<usize> {
        Ok(self.layers(composition)?.len())
    }

    fn layer_source(&self, composition: ItemId, index: usize) -> Result<Option<ItemId>> {
        self.layers(composition)?
            .get(index)
            .map(|layer| layer.source)
            .with_context(|| format!("Composition {composition} has no layer {index}"))
    }

    fn replace_layer_source(
        &mut self,
        composition: ItemId,
        index: usize,
        source: ItemId,
    ) -> Result<()> {
        self.check_layer_source(source)?;
        let layer = self
            .layers_mut(composition)?
            .get_mut(index)
            .with_context(|| format!("Composition {composition} has no layer {index}"))?;
        layer.source = Some(source);
        Ok(())
    }

    fn used_in(&self, item: ItemId) -> Result<Option<Vec<ItemId>>> {
        if !self.reverse_index {
            return Ok(None);
        }
        self.entry(item)?;
        let users = self
            .items
            .iter()
            .filter(|entry| match &entry.body {
                ItemBody::Composition { layers } => {
                    layers.iter().any(|layer| layer.source == Some(item))
                }
                _ => false,
            })
            .map(|entry| entry.id)
            .collect();
        Ok(Some(users))
    }

    fn begin_undo_group(&mut self, label: &str) {
        self.open_undo.push(label.to_string());
    }

    fn end_undo_group(&mut self) {
        if let Some(label) = self.open_undo.pop() {
            self.undo_history.push(label);
        }
    }
}
