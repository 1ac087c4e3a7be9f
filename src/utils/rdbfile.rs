use bytemuck::{Pod, Zeroable};
use memmap2::{Mmap, MmapMut};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    any::type_name,
    fs::{File, OpenOptions},
    path::Path,
};

use crate::error::RdbErr;

const MAGIC: [u8; 4] = *b"TAG0";
const VERSION: u16 = 1;
pub const ENTRY_NAME_CAPACITY: usize = 256;

/// Simple, portable FNV-1a 64-bit hash of a string.
#[inline]
fn fnv1a64(s: &str) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325; // offset basis
    for &b in s.as_bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3); // FNV prime
    }
    h
}

/// A cross-device, cross-process "type tag" for entries stored without an
/// explicit one. Stable as long as the type's *name/path* doesn't change.
pub fn type_tag_of<T>() -> u32 {
    fnv1a64(type_name::<T>()) as u32
}

fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, RdbErr> {
    Ok(bincode::serialize(value)?)
}

fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RdbErr> {
    Ok(bincode::deserialize(bytes)?)
}

//////////////////////////////////////////////////////////////////////////////
//////////////////////////////////////////////////////////////////////////////

#[repr(C)]
#[derive(Clone, Copy, Zeroable, Pod)]
struct Header {
    magic: [u8; 4],   // "TAG0"
    version: u16,     // 1
    reserved: u16,    // alignment / future flags
    entry_count: u32, // number of entries
}

#[repr(C)]
#[derive(Clone, Copy, Zeroable, Pod)]
struct Entry {
    offset: u64,   // offset of the blob inside the payload region
    len: u64,      // blob length
    type_tag: u32, // e.g. u32::from_le_bytes(*b"mode")
    name_len: u32,
    name: [u8; ENTRY_NAME_CAPACITY], // UTF-8, nul padded
}

impl Entry {
    fn name(&self) -> &[u8] {
        &self.name[..self.name_len as usize]
    }

    fn matches(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    fn meta(&self) -> EntryMeta {
        EntryMeta {
            name: String::from_utf8_lossy(self.name()).into_owned(),
            type_tag: self.type_tag,
            offset: self.offset,
            len: self.len,
        }
    }
}

/// Readable copy of one entry-table row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryMeta {
    pub name: String,
    pub type_tag: u32,
    pub offset: u64,
    pub len: u64,
}

fn make_entry(name: &str, type_tag: u32, offset: usize, len: usize) -> Result<Entry, RdbErr> {
    let bytes = name.as_bytes();
    if bytes.len() > ENTRY_NAME_CAPACITY {
        return Err(RdbErr::NameTooLong(name.to_string()));
    }

    let mut entry = Entry::zeroed();
    entry.offset = offset as u64;
    entry.len = len as u64;
    entry.type_tag = type_tag;
    entry.name_len = bytes.len() as u32;
    entry.name[..bytes.len()].copy_from_slice(bytes);
    Ok(entry)
}

/// Validates the header and returns `(entry_count, data_start)`.
fn parse_header(bytes: &[u8]) -> Result<(usize, usize), RdbErr> {
    let header_sz = std::mem::size_of::<Header>();
    if bytes.len() < header_sz {
        return Err(RdbErr::TooSmall);
    }
    let hdr = bytemuck::pod_read_unaligned::<Header>(&bytes[..header_sz]);
    if hdr.magic != MAGIC || hdr.version != VERSION {
        return Err(RdbErr::BadHeader);
    }

    let entries_sz = (hdr.entry_count as usize) * std::mem::size_of::<Entry>();
    let need = header_sz + entries_sz;
    if bytes.len() < need {
        return Err(RdbErr::TooSmall);
    }

    Ok((hdr.entry_count as usize, need))
}

fn read_entry(bytes: &[u8], index: usize) -> Entry {
    let sz = std::mem::size_of::<Entry>();
    let start = std::mem::size_of::<Header>() + index * sz;
    bytemuck::pod_read_unaligned::<Entry>(&bytes[start..start + sz])
}

fn entry_slice<'a>(data: &'a [u8], entry: &Entry) -> Result<&'a [u8], RdbErr> {
    let start = entry.offset as usize;
    let end = start + entry.len as usize;
    data.get(start..end).ok_or(RdbErr::TooSmall)
}

/// Growable record container. Every write appends a fresh payload; replaced
/// payloads stay orphaned in memory until `save` compacts them away.
#[derive(Default)]
pub struct RDBFile {
    entries: Vec<Entry>,
    data: Vec<u8>,
    revision: u64,
}

impl RDBFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`, tagging the payload with `T`'s type tag.
    pub fn add<T: Serialize>(&mut self, name: &str, obj: &T) -> Result<(), RdbErr> {
        self.add_tagged(name, type_tag_of::<T>(), obj)
    }

    /// Inserts or replaces `name` with an explicit type tag.
    pub fn add_tagged<T: Serialize>(
        &mut self,
        name: &str,
        type_tag: u32,
        obj: &T,
    ) -> Result<(), RdbErr> {
        let bytes = to_bytes(obj)?;
        self.add_raw(name, type_tag, &bytes)
    }

    /// Inserts or replaces `name` with an already-encoded payload.
    pub fn add_raw(&mut self, name: &str, type_tag: u32, bytes: &[u8]) -> Result<(), RdbErr> {
        let entry = make_entry(name, type_tag, self.data.len(), bytes.len())?;

        match self.entries.iter_mut().find(|e| e.matches(name)) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }

        self.data.extend_from_slice(bytes);
        self.revision += 1;

        Ok(())
    }

    pub fn fetch<T: DeserializeOwned>(&self, name: &str) -> Result<T, RdbErr> {
        self.fetch_tagged(name, type_tag_of::<T>())
    }

    pub fn fetch_tagged<T: DeserializeOwned>(&self, name: &str, type_tag: u32) -> Result<T, RdbErr> {
        let entry = self.find(name)?;
        if entry.type_tag != type_tag {
            return Err(RdbErr::TypeMismatch {
                name: name.to_string(),
                expected: type_tag,
                found: entry.type_tag,
            });
        }

        from_bytes::<T>(entry_slice(&self.data, entry)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.matches(name))
    }

    pub fn entries(&self) -> Vec<EntryMeta> {
        self.entries.iter().map(Entry::meta).collect()
    }

    pub fn entry_bytes(&self, name: &str) -> Result<&[u8], RdbErr> {
        entry_slice(&self.data, self.find(name)?)
    }

    /// Number of writes performed since this container was created or loaded.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn find(&self, name: &str) -> Result<&Entry, RdbErr> {
        self.entries
            .iter()
            .find(|e| e.matches(name))
            .ok_or_else(|| RdbErr::MissingEntry(name.to_string()))
    }

    /// Save using MmapMut for zero-copy struct writes. Orphaned payloads are
    /// dropped and offsets rewritten so the file only holds live blobs.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RdbErr> {
        let mut entries = Vec::with_capacity(self.entries.len());
        let mut data = Vec::new();
        for entry in &self.entries {
            let bytes = entry_slice(&self.data, entry)?;
            let mut compacted = *entry;
            compacted.offset = data.len() as u64;
            data.extend_from_slice(bytes);
            entries.push(compacted);
        }

        let hdr = Header {
            magic: MAGIC,
            version: VERSION,
            reserved: 0,
            entry_count: entries.len() as u32,
        };

        let hdr_bytes = bytemuck::bytes_of(&hdr);
        let ent_bytes = bytemuck::cast_slice::<Entry, u8>(&entries);

        let entries_start = hdr_bytes.len();
        let data_start = entries_start + ent_bytes.len();
        let total = data_start + data.len();

        let f = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        f.set_len(total as u64)?; // extend file to final size

        // Map for writing
        let mut map = unsafe { MmapMut::map_mut(&f)? };

        map[..entries_start].copy_from_slice(hdr_bytes);
        map[entries_start..data_start].copy_from_slice(ent_bytes);
        map[data_start..total].copy_from_slice(&data);

        map.flush()?;

        Ok(())
    }

    /// Load by mmap, then copy header/entries/payload out of the mapped bytes.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RdbErr> {
        let f = File::open(path)?;
        let map = unsafe { Mmap::map(&f)? };

        let (entry_count, data_start) = parse_header(&map)?;
        let entries = (0..entry_count).map(|i| read_entry(&map, i)).collect();

        Ok(Self {
            entries,
            data: map[data_start..].to_vec(),
            revision: 0,
        })
    }
}

/// Read-only view over a saved container; entries are decoded on demand
/// straight from the mapping.
pub struct RDBView {
    mmap: Mmap,
    entry_count: usize,
    data_start: usize,
}

impl RDBView {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RdbErr> {
        let f = File::open(path)?;
        let mmap = unsafe { Mmap::map(&f)? };
        let (entry_count, data_start) = parse_header(&mmap)?;

        Ok(Self {
            mmap,
            entry_count,
            data_start,
        })
    }

    fn iter(&self) -> impl Iterator<Item = Entry> + '_ {
        (0..self.entry_count).map(|i| read_entry(&self.mmap, i))
    }

    pub fn entries(&self) -> Vec<EntryMeta> {
        self.iter().map(|e| e.meta()).collect()
    }

    pub fn entry_bytes(&self, name: &str) -> Result<&[u8], RdbErr> {
        let entry = self
            .iter()
            .find(|e| e.matches(name))
            .ok_or_else(|| RdbErr::MissingEntry(name.to_string()))?;
        entry_slice(&self.mmap[self.data_start..], &entry)
    }

    pub fn fetch<T: DeserializeOwned>(&self, name: &str) -> Result<T, RdbErr> {
        self.fetch_tagged(name, type_tag_of::<T>())
    }

    pub fn fetch_tagged<T: DeserializeOwned>(&self, name: &str, type_tag: u32) -> Result<T, RdbErr> {
        let entry = self
            .iter()
            .find(|e| e.matches(name))
            .ok_or_else(|| RdbErr::MissingEntry(name.to_string()))?;
        if entry.type_tag != type_tag {
            return Err(RdbErr::TypeMismatch {
                name: name.to_string(),
                expected: type_tag,
                found: entry.type_tag,
            });
        }

        from_bytes::<T>(entry_slice(&self.mmap[self.data_start..], &entry)?)
    }
}
