/// BatchData groups visible render operations by rendering state.
///
/// Layout: priority → material → geometry → operation list. Each
/// (priority, material, geometry) triple owns at most one operation list
/// per fill cycle. Levels are iterated in insertion order.
///
/// Frame cycle:
/// - `clear()` empties the operation lists but keeps the tables, betting
///   the same materials and geometries come back next frame
/// - `add_visible_object()` for every visible object
/// - `render_batch()` once per pass, pruning emptied entries on the way
///
/// `reset()` returns every nested container to the buffer cache, for when
/// the batch composition changes (e.g. another scene procedure is selected).

use std::sync::Arc;
use crate::error::Galaxy3dResult;
use crate::renderer::{
    GeometryData, GeometryId, Material, MaterialId, RenderDevice, RenderOperation,
};
use crate::scene::SceneObject;
use super::batch_data_buffer_cache::{
    BatchCacheConfig, BatchDataBufferCache, GeometryEntry, GeometryTable, MaterialEntry,
    MaterialTable,
};

/// Number of priority buckets. Material priorities are clamped into
/// `[0, MAX_PRIORITY - 1]`.
pub const MAX_PRIORITY: i32 = 32;

/// Pass selection mask: bit `selector_id`, or every bit for -1.
pub fn selection_mask(selector_id: i32) -> u64 {
    match selector_id {
        -1 => u64::MAX,
        id => u32::try_from(id).ok()
            .and_then(|id| 1u64.checked_shl(id))
            .unwrap_or(0),
    }
}

pub struct BatchData {
    cache: BatchDataBufferCache,
    /// Indexed by clamped priority
    priorities: Vec<Option<MaterialTable>>,
    /// Priorities in first-use order
    priority_order: Vec<usize>,
    object_count: usize,
    /// Scratch list of materials pruned during `render_batch`
    unused_materials: Vec<MaterialId>,
}

impl BatchData {
    pub fn new(config: BatchCacheConfig) -> Self {
        Self::with_cache(BatchDataBufferCache::new(config))
    }

    pub fn with_cache(cache: BatchDataBufferCache) -> Self {
        Self {
            cache,
            priorities: (0..MAX_PRIORITY).map(|_| None).collect(),
            priority_order: Vec::new(),
            object_count: 0,
            unused_materials: Vec::new(),
        }
    }

    pub fn cache(&self) -> &BatchDataBufferCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut BatchDataBufferCache {
        &mut self.cache
    }

    // ===== FILL =====

    /// Add the render operations of `object` at LOD `level`.
    ///
    /// Operations missing a material or a geometry are skipped. The object's
    /// world transform is applied to every non-final operation transform.
    pub fn add_visible_object(&mut self, object: &dyn SceneObject, level: usize) {
        self.object_count += 1;
        let world = object.world_transform();

        for operation in object.render_operation(level) {
            let (Some(material), Some(geometry)) = (&operation.material, &operation.geometry) else {
                continue;
            };
            let mut operation = operation.clone();
            if !operation.root_transform_is_final {
                operation.root_transform = world * operation.root_transform;
            }
            self.add_operation(material, geometry, operation);
        }
    }

    /// Append one operation to the list of its (priority, material, geometry) triple.
    pub fn add_operation(
        &mut self,
        material: &Arc<Material>,
        geometry: &Arc<GeometryData>,
        operation: RenderOperation,
    ) {
        let priority = material.priority().clamp(0, MAX_PRIORITY - 1) as usize;
        let cache = &mut self.cache;

        if self.priorities[priority].is_none() {
            self.priorities[priority] = Some(cache.obtain_material_table());
            self.priority_order.push(priority);
        }
        let Some(materials) = self.priorities[priority].as_mut() else {
            return;
        };

        let material_entry = match materials.entries.entry(material.id()) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                materials.order.push(material.id());
                entry.insert(MaterialEntry {
                    material: material.clone(),
                    geometries: cache.obtain_geometry_table(),
                })
            }
        };

        let geometries = &mut material_entry.geometries;
        let geometry_entry = match geometries.entries.entry(geometry.id()) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                geometries.order.push(geometry.id());
                entry.insert(GeometryEntry {
                    geometry: geometry.clone(),
                    operations: cache.obtain_operation_list(),
                })
            }
        };

        geometry_entry.operations.push(operation);
    }

    // ===== CLEAR / RESET =====

    /// Empty every operation list, keeping the tables for the next frame.
    pub fn clear(&mut self) {
        self.object_count = 0;
        for materials in self.priorities.iter_mut().flatten() {
            for material in materials.entries.values_mut() {
                for geometry in material.geometries.entries.values_mut() {
                    geometry.operations.clear();
                }
            }
        }
    }

    /// Recycle every operation list and geometry table, and empty the
    /// material tables.
    pub fn reset(&mut self) {
        self.object_count = 0;
        let cache = &mut self.cache;
        for materials in self.priorities.iter_mut().flatten() {
            for (_, material) in materials.entries.drain() {
                cache.recycle_geometry_table(material.geometries);
            }
            materials.order.clear();
        }
    }

    // ===== RENDER =====

    /// Submit every operation list of the materials selected by `selector_id`.
    ///
    /// Emptied geometry entries are pruned (their lists recycled) and
    /// materials left without geometry are pruned too. A discarded geometry
    /// stops the scan of its material: it and the geometries after it are
    /// neither drawn nor pruned.
    pub fn render_batch(&mut self, device: &mut dyn RenderDevice, selector_id: i32) -> Galaxy3dResult<()> {
        let mask = selection_mask(selector_id);
        let mut unused = std::mem::take(&mut self.unused_materials);
        let cache = &mut self.cache;

        for &priority in &self.priority_order {
            let Some(materials) = self.priorities[priority].as_mut() else {
                continue;
            };

            unused.clear();
            for &material_id in &materials.order {
                let Some(entry) = materials.entries.get_mut(&material_id) else {
                    continue;
                };

                let used = prune_geometries(&mut entry.geometries, cache);
                if used && entry.material.pass_flags() & mask != 0 {
                    for operations in drawable_lists(&entry.geometries) {
                        device.render(&entry.material, operations, selector_id)?;
                    }
                }

                if entry.geometries.is_empty() {
                    unused.push(material_id);
                }
            }

            for material_id in unused.drain(..) {
                if let Some(entry) = materials.remove(material_id) {
                    cache.recycle_geometry_table(entry.geometries);
                }
            }
        }

        self.unused_materials = unused;
        Ok(())
    }

    /// Whether a material drawn by `selector_id` currently holds operations.
    pub fn has_visible_material(&self, selector_id: i32) -> bool {
        let mask = selection_mask(selector_id);
        self.materials().any(|entry| {
            entry.material.pass_flags() & mask != 0
                && entry.geometries.entries.values().any(|g| !g.operations.is_empty())
        })
    }

    // ===== STATISTICS =====

    /// Objects added since the last `clear()` / `reset()`
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// Operations currently batched
    pub fn operation_count(&self) -> usize {
        self.materials()
            .flat_map(|entry| entry.geometries.entries.values())
            .map(|g| g.operations.len())
            .sum()
    }

    /// Geometry entries currently held, empty ones included
    pub fn operation_list_count(&self) -> usize {
        self.materials().map(|entry| entry.geometries.len()).sum()
    }

    /// Material entries currently held across all priorities
    pub fn material_count(&self) -> usize {
        self.materials().count()
    }

    /// Priorities in use, in first-use order
    pub fn priorities(&self) -> impl Iterator<Item = usize> + '_ {
        self.priority_order.iter().copied()
            .filter(|&p| self.priorities[p].as_ref().is_some_and(|t| !t.is_empty()))
    }

    /// Operation list of a (material, geometry) pair, searched across priorities
    pub fn operations(&self, material: MaterialId, geometry: GeometryId) -> Option<&[RenderOperation]> {
        self.priorities.iter().flatten()
            .filter_map(|materials| materials.entries.get(&material))
            .find_map(|entry| entry.geometries.entries.get(&geometry))
            .map(|g| g.operations.as_slice())
    }

    fn materials(&self) -> impl Iterator<Item = &MaterialEntry> + '_ {
        self.priorities.iter().flatten().flat_map(|materials| materials.entries.values())
    }
}

impl Default for BatchData {
    fn default() -> Self {
        Self::new(BatchCacheConfig::default())
    }
}

/// Prune emptied geometry entries up to the first discarded geometry.
/// Returns whether a non-empty entry was seen.
fn prune_geometries(geometries: &mut GeometryTable, cache: &mut BatchDataBufferCache) -> bool {
    let mut used = false;
    let mut scanning = true;
    let entries = &mut geometries.entries;

    geometries.order.retain(|id| {
        if !scanning {
            return true;
        }
        let Some(entry) = entries.get(id) else {
            return false;
        };
        if entry.geometry.discard() {
            scanning = false;
            return true;
        }
        if !entry.operations.is_empty() {
            used = true;
            return true;
        }
        if let Some(entry) = entries.remove(id) {
            cache.recycle_operation_list(entry.operations);
        }
        false
    });

    used
}

/// Non-empty operation lists before the first discarded geometry
fn drawable_lists(geometries: &GeometryTable) -> impl Iterator<Item = &[RenderOperation]> + '_ {
    geometries.order.iter()
        .filter_map(|id| geometries.entries.get(id))
        .take_while(|entry| !entry.geometry.discard())
        .filter(|entry| !entry.operations.is_empty())
        .map(|entry| entry.operations.as_slice())
}

#[cfg(test)]
#[path = "batch_data_tests.rs"]
mod tests;
