//! Batch module: draw-call grouping with pooled containers.

mod batch_data;
mod batch_data_buffer_cache;

pub use batch_data::{BatchData, MAX_PRIORITY, selection_mask};
pub use batch_data_buffer_cache::{
    BatchCacheConfig, BatchDataBufferCache, GeometryTable, MaterialTable, OperationList,
};
