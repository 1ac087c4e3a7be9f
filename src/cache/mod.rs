pub mod resources;
pub mod strings;
pub mod tags;

pub use resources::*;
pub use strings::*;
pub use tags::*;

use std::{collections::HashMap, path::Path};

use tracing::{debug, info};

use crate::{RDBFile, error::ForgeError, rdbfile::type_tag_of};

/// Binary stream tag definitions are serialized into.
pub type TagStream = RDBFile;

const TAG_PREFIX: &str = "tag/";
const TAG_TABLE_ENTRY: &str = "cache/tags";
const STRING_TABLE_ENTRY: &str = "cache/strings";

fn tag_entry_name(tag: CachedTag) -> String {
    format!("{TAG_PREFIX}{:08}", tag.index)
}

////////////////////////////////////////////////
/// GameCache
/// * Owns the tag table, the string table and the resource cache of one
///   store. Definitions live in a separate [`TagStream`].
///
/// * Handles are issued by `allocate_tag` before a definition exists, so
///   records that reference each other can be built in any order.
////////////////////////////////////////////////
#[derive(Default)]
pub struct GameCache {
    tags: Vec<TagInstance>,
    lookup: HashMap<(TagGroup, String), CachedTag>,
    strings: StringTable,
    resources: ResourceCache,
}

impl GameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a handle for a `T` named `name`. The tag has no definition
    /// until it is serialized.
    pub fn allocate_tag<T: TagDefinition>(&mut self, name: &str) -> CachedTag {
        let tag = CachedTag {
            index: self.tags.len() as u32,
            group: T::GROUP,
        };
        self.tags.push(TagInstance {
            name: name.to_string(),
            group: T::GROUP,
            defined: false,
        });
        self.lookup.insert((T::GROUP, name.to_string()), tag);
        debug!(group = %T::GROUP, entry = %name, index = tag.index, "allocated tag");
        tag
    }

    pub fn try_get_tag<T: TagDefinition>(&self, name: &str) -> Option<CachedTag> {
        self.lookup.get(&(T::GROUP, name.to_string())).copied()
    }

    pub fn tag_instance(&self, tag: CachedTag) -> Result<&TagInstance, ForgeError> {
        match self.tags.get(tag.index as usize) {
            Some(instance) if instance.group == tag.group => Ok(instance),
            _ => Err(ForgeError::InvalidTag(tag)),
        }
    }

    pub fn tag_name(&self, tag: CachedTag) -> Result<&str, ForgeError> {
        Ok(&self.tag_instance(tag)?.name)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Every allocated tag, in allocation order.
    pub fn tags(&self) -> impl Iterator<Item = (CachedTag, &TagInstance)> + '_ {
        self.tags.iter().enumerate().map(|(i, instance)| {
            (
                CachedTag {
                    index: i as u32,
                    group: instance.group,
                },
                instance,
            )
        })
    }

    fn expect_group(&self, tag: CachedTag, expected: TagGroup) -> Result<(), ForgeError> {
        let instance = self.tag_instance(tag)?;
        if instance.group != expected {
            return Err(ForgeError::GroupMismatch {
                name: instance.name.clone(),
                expected,
                found: instance.group,
            });
        }
        Ok(())
    }

    pub fn serialize<T: TagDefinition>(
        &mut self,
        stream: &mut TagStream,
        tag: CachedTag,
        definition: &T,
    ) -> Result<(), ForgeError> {
        self.expect_group(tag, T::GROUP)?;
        stream.add_tagged(&tag_entry_name(tag), T::GROUP.0, definition)?;
        self.tags[tag.index as usize].defined = true;
        debug!(group = %T::GROUP, index = tag.index, "serialized tag");
        Ok(())
    }

    pub fn deserialize<T: TagDefinition>(
        &self,
        stream: &TagStream,
        tag: CachedTag,
    ) -> Result<T, ForgeError> {
        self.expect_group(tag, T::GROUP)?;
        Ok(stream.fetch_tagged::<T>(&tag_entry_name(tag), T::GROUP.0)?)
    }

    pub fn string_table(&self) -> &StringTable {
        &self.strings
    }

    pub fn string_table_mut(&mut self) -> &mut StringTable {
        &mut self.strings
    }

    pub fn resource_cache(&self) -> &ResourceCache {
        &self.resources
    }

    pub fn resource_cache_mut(&mut self) -> &mut ResourceCache {
        &mut self.resources
    }

    /// Writes the tag table, strings, resources and every definition in
    /// `stream` into a single container file.
    pub fn save(&self, stream: &TagStream, path: impl AsRef<Path>) -> Result<(), ForgeError> {
        let mut out = RDBFile::new();
        out.add(TAG_TABLE_ENTRY, &self.tags)?;
        out.add(STRING_TABLE_ENTRY, &self.strings)?;
        self.resources.write_into(&mut out)?;
        for meta in stream.entries() {
            out.add_raw(&meta.name, meta.type_tag, stream.entry_bytes(&meta.name)?)?;
        }
        out.save(path.as_ref())?;

        info!(
            resource = "cache",
            path = %path.as_ref().display(),
            tags = self.tags.len(),
            resources = self.resources.len(),
            "saved cache"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<(Self, TagStream), ForgeError> {
        let file = RDBFile::load(path.as_ref())?;

        let tags: Vec<TagInstance> = file.fetch(TAG_TABLE_ENTRY)?;
        let mut strings: StringTable = file.fetch(STRING_TABLE_ENTRY)?;
        strings.rebuild_lookup();

        let mut resources = ResourceCache::new();
        let mut stream = TagStream::new();
        for meta in file.entries() {
            let bytes = file.entry_bytes(&meta.name)?;
            if meta.name.starts_with(RESOURCE_PREFIX) {
                resources.restore(&meta, bytes)?;
            } else if meta.name.starts_with(TAG_PREFIX) {
                stream.add_raw(&meta.name, meta.type_tag, bytes)?;
            }
        }

        let lookup = tags
            .iter()
            .enumerate()
            .map(|(i, instance)| {
                (
                    (instance.group, instance.name.clone()),
                    CachedTag {
                        index: i as u32,
                        group: instance.group,
                    },
                )
            })
            .collect();

        info!(
            resource = "cache",
            path = %path.as_ref().display(),
            tags = tags.len(),
            source = "rdb",
            "loaded cache"
        );

        Ok((
            Self {
                tags,
                lookup,
                strings,
                resources,
            },
            stream,
        ))
    }
}

/// Type tag the cache file uses for its own tag table, exposed for tools that
/// read cache files through an [`RDBView`](crate::RDBView).
pub fn tag_table_type_tag() -> u32 {
    type_tag_of::<Vec<TagInstance>>()
}

pub const fn tag_table_entry() -> &'static str {
    TAG_TABLE_ENTRY
}
