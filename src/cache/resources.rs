use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{RDBFile, error::ForgeError, rdbfile::EntryMeta};

pub(crate) const RESOURCE_PREFIX: &str = "resource/";

/// Handle to a resource blob owned by one [`ResourceCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle(pub u32);

impl ResourceHandle {
    pub(crate) fn entry_name(&self) -> String {
        format!("{RESOURCE_PREFIX}{:08}", self.0)
    }
}

/// Typed storage for pageable resources (geometry buffers, collision data).
/// Each resource is kept encoded and expanded into a fresh value on access.
#[derive(Default)]
pub struct ResourceCache {
    blobs: RDBFile,
    count: u32,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create<T: Serialize>(&mut self, resource: &T) -> Result<ResourceHandle, ForgeError> {
        let handle = ResourceHandle(self.count);
        self.blobs.add(&handle.entry_name(), resource)?;
        self.count += 1;
        Ok(handle)
    }

    pub fn get<T: DeserializeOwned>(&self, handle: ResourceHandle) -> Result<T, ForgeError> {
        if !self.blobs.contains(&handle.entry_name()) {
            return Err(ForgeError::MissingResource(handle));
        }
        Ok(self.blobs.fetch::<T>(&handle.entry_name())?)
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copies every resource entry into `out`, keeping names and type tags.
    pub(crate) fn write_into(&self, out: &mut RDBFile) -> Result<(), ForgeError> {
        for meta in self.blobs.entries() {
            out.add_raw(&meta.name, meta.type_tag, self.blobs.entry_bytes(&meta.name)?)?;
        }
        Ok(())
    }

    /// Restores one resource entry copied out by [`ResourceCache::write_into`].
    pub(crate) fn restore(&mut self, meta: &EntryMeta, bytes: &[u8]) -> Result<(), ForgeError> {
        self.blobs.add_raw(&meta.name, meta.type_tag, bytes)?;
        self.count += 1;
        Ok(())
    }
}
