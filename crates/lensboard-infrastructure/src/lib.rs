pub mod paths;
pub mod preference_store;
pub mod storage;

pub use crate::paths::LensboardPaths;
pub use crate::preference_store::PreferenceStore;
