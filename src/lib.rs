//! Tag cache tooling: a memory-mappable record container, a tag cache with
//! string and resource tables, and the converter that promotes a structure
//! BSP's instanced geometry into standalone scenery objects.

pub mod cache;
pub mod convert;
pub mod defaults;
pub mod parsing;
pub mod tags;
mod utils;

pub use cache::{
    CachedTag, GameCache, ResourceCache, ResourceHandle, StringId, StringTable, TagDefinition,
    TagGroup, TagInstance, TagStream,
};
pub use convert::InstancedGeometryToObjectConverter;
pub use defaults::ObjectDefaults;
pub use parsing::{PromoteLayoutFile, validate_layout};
pub use utils::*;
