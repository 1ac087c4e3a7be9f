use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Four-character code identifying a tag definition type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagGroup(pub u32);

impl TagGroup {
    pub const fn from_code(code: &[u8; 4]) -> Self {
        Self(u32::from_le_bytes(*code))
    }

    pub fn code(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for TagGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        if code.iter().all(|b| matches!(b, 0x20..=0x7E)) {
            write!(f, "{}", String::from_utf8_lossy(&code))
        } else {
            write!(f, "{:#010X}", self.0)
        }
    }
}

impl fmt::Debug for TagGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagGroup({self})")
    }
}

/// Handle to a tag owned by one [`GameCache`](super::GameCache). It has no
/// meaning outside the cache that allocated it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CachedTag {
    pub index: u32,
    pub group: TagGroup,
}

/// One row of a cache's tag table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagInstance {
    pub name: String,
    pub group: TagGroup,
    #[serde(default)]
    pub defined: bool,
}

/// A tag definition stored in a [`GameCache`](super::GameCache).
pub trait TagDefinition: Serialize + DeserializeOwned + Clone {
    const GROUP: TagGroup;
}
