pub mod snapshot_cache;
pub mod view;
