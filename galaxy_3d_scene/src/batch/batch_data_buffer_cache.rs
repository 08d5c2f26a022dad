/// Pools of the containers nested inside `BatchData`.
///
/// Containers are obtained from the pool and recycled back to it instead of
/// being dropped, so a warmed-up batch stops allocating: recycled
/// containers are cleared but keep their capacity.
///
/// # Example
///
/// ```ignore
/// let mut cache = BatchDataBufferCache::new(BatchCacheConfig::default());
/// let list = cache.obtain_operation_list();   // from the idle pool
/// cache.recycle_operation_list(list);         // back to the idle pool
/// ```

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::renderer::{GeometryData, GeometryId, Material, MaterialId, RenderOperation};

/// Operations sharing one (priority, material, geometry) triple
pub type OperationList = Vec<RenderOperation>;

// ===== GEOMETRY TABLE =====

pub(crate) struct GeometryEntry {
    pub(crate) geometry: Arc<GeometryData>,
    pub(crate) operations: OperationList,
}

/// Geometry → operation list, iterated in insertion order
#[derive(Default)]
pub struct GeometryTable {
    pub(crate) order: Vec<GeometryId>,
    pub(crate) entries: FxHashMap<GeometryId, GeometryEntry>,
}

impl GeometryTable {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.order.capacity().min(self.entries.capacity())
    }

    fn reserve_to(&mut self, capacity: usize) {
        self.order.reserve(capacity.saturating_sub(self.order.len()));
        self.entries.reserve(capacity.saturating_sub(self.entries.len()));
    }
}

// ===== MATERIAL TABLE =====

pub(crate) struct MaterialEntry {
    pub(crate) material: Arc<Material>,
    pub(crate) geometries: GeometryTable,
}

/// Material → geometry table, iterated in insertion order
#[derive(Default)]
pub struct MaterialTable {
    pub(crate) order: Vec<MaterialId>,
    pub(crate) entries: FxHashMap<MaterialId, MaterialEntry>,
}

impl MaterialTable {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.order.capacity().min(self.entries.capacity())
    }

    fn reserve_to(&mut self, capacity: usize) {
        self.order.reserve(capacity.saturating_sub(self.order.len()));
        self.entries.reserve(capacity.saturating_sub(self.entries.len()));
    }

    pub(crate) fn remove(&mut self, id: MaterialId) -> Option<MaterialEntry> {
        let entry = self.entries.remove(&id)?;
        self.order.retain(|&m| m != id);
        Some(entry)
    }
}

// ===== CONFIG =====

/// Capacities of pooled containers and idle pool targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCacheConfig {
    /// Minimum capacity of a pooled operation list
    pub operation_list_capacity: usize,
    /// Minimum capacity of a pooled geometry table
    pub geometry_table_capacity: usize,
    /// Minimum capacity of a pooled material table
    pub material_table_capacity: usize,
    /// Idle operation lists kept ready
    pub idle_operation_lists: usize,
    /// Idle geometry tables kept ready
    pub idle_geometry_tables: usize,
    /// Idle material tables kept ready
    pub idle_material_tables: usize,
}

impl Default for BatchCacheConfig {
    fn default() -> Self {
        Self {
            operation_list_capacity: 16,
            geometry_table_capacity: 8,
            material_table_capacity: 16,
            idle_operation_lists: 64,
            idle_geometry_tables: 32,
            idle_material_tables: 4,
        }
    }
}

// ===== CACHE =====

pub struct BatchDataBufferCache {
    config: BatchCacheConfig,
    operation_lists: Vec<OperationList>,
    geometry_tables: Vec<GeometryTable>,
    material_tables: Vec<MaterialTable>,
}

impl BatchDataBufferCache {
    /// Create a cache with its idle pools filled to the configured counts.
    pub fn new(config: BatchCacheConfig) -> Self {
        let mut cache = Self {
            config,
            operation_lists: Vec::new(),
            geometry_tables: Vec::new(),
            material_tables: Vec::new(),
        };
        cache.reserve(config);
        cache
    }

    pub fn config(&self) -> &BatchCacheConfig {
        &self.config
    }

    /// Raise capacities and idle counts to `config`.
    ///
    /// Idle containers are grown in place; targets lower than the current
    /// values never shrink anything.
    pub fn reserve(&mut self, config: BatchCacheConfig) {
        self.config.operation_list_capacity =
            self.config.operation_list_capacity.max(config.operation_list_capacity);
        self.config.geometry_table_capacity =
            self.config.geometry_table_capacity.max(config.geometry_table_capacity);
        self.config.material_table_capacity =
            self.config.material_table_capacity.max(config.material_table_capacity);

        let list_capacity = self.config.operation_list_capacity;
        for list in &mut self.operation_lists {
            list.reserve(list_capacity.saturating_sub(list.len()));
        }
        for table in &mut self.geometry_tables {
            table.reserve_to(self.config.geometry_table_capacity);
        }
        for table in &mut self.material_tables {
            table.reserve_to(self.config.material_table_capacity);
        }

        while self.operation_lists.len() < config.idle_operation_lists {
            self.operation_lists.push(Vec::with_capacity(list_capacity));
        }
        while self.geometry_tables.len() < config.idle_geometry_tables {
            self.geometry_tables.push(GeometryTable::with_capacity(self.config.geometry_table_capacity));
        }
        while self.material_tables.len() < config.idle_material_tables {
            self.material_tables.push(MaterialTable::with_capacity(self.config.material_table_capacity));
        }
    }

    // ===== OBTAIN =====

    pub fn obtain_operation_list(&mut self) -> OperationList {
        self.operation_lists.pop()
            .unwrap_or_else(|| Vec::with_capacity(self.config.operation_list_capacity))
    }

    pub fn obtain_geometry_table(&mut self) -> GeometryTable {
        self.geometry_tables.pop()
            .unwrap_or_else(|| GeometryTable::with_capacity(self.config.geometry_table_capacity))
    }

    pub fn obtain_material_table(&mut self) -> MaterialTable {
        self.material_tables.pop()
            .unwrap_or_else(|| MaterialTable::with_capacity(self.config.material_table_capacity))
    }

    // ===== RECYCLE =====

    pub fn recycle_operation_list(&mut self, mut list: OperationList) {
        list.clear();
        self.operation_lists.push(list);
    }

    /// Recycle a geometry table together with the operation lists it holds.
    pub fn recycle_geometry_table(&mut self, mut table: GeometryTable) {
        for (_, entry) in table.entries.drain() {
            self.recycle_operation_list(entry.operations);
        }
        table.order.clear();
        self.geometry_tables.push(table);
    }

    /// Recycle a material table together with everything nested inside.
    pub fn recycle_material_table(&mut self, mut table: MaterialTable) {
        for (_, entry) in table.entries.drain() {
            self.recycle_geometry_table(entry.geometries);
        }
        table.order.clear();
        self.material_tables.push(table);
    }

    // ===== STATISTICS =====

    pub fn idle_operation_lists(&self) -> usize {
        self.operation_lists.len()
    }

    pub fn idle_geometry_tables(&self) -> usize {
        self.geometry_tables.len()
    }

    pub fn idle_material_tables(&self) -> usize {
        self.material_tables.len()
    }
}

impl Default for BatchDataBufferCache {
    fn default() -> Self {
        Self::new(BatchCacheConfig::default())
    }
}

#[cfg(test)]
#[path = "batch_data_buffer_cache_tests.rs"]
mod tests;
