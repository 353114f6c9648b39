#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
/// The kind of container to produce.
pub enum ResourceType {
    /// Plain images (ICO files)
    Icon,
    /// Images with cursor hotspots (CUR files)
    Cursor,
    /// Animated cursors (ANI files); declared but not encodable
    AnimatedCursor,
}

impl ResourceType {
    /// Maps the numeric type selector (1 = ICO, 2 = CUR, 3 = ANI) to a kind.
    /// Anything out of range selects `Icon`.
    pub fn from_number(number: u16) -> ResourceType {
        match number {
            2 => ResourceType::Cursor,
            3 => ResourceType::AnimatedCursor,
            _ => ResourceType::Icon,
        }
    }

    pub(crate) fn number(&self) -> u16 {
        match *self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
            ResourceType::AnimatedCursor => 3,
        }
    }

    /// Returns the file extension for this kind of container.
    pub fn extension(&self) -> &'static str {
        match *self {
            ResourceType::Icon => "ico",
            ResourceType::Cursor => "cur",
            ResourceType::AnimatedCursor => "ani",
        }
    }

    /// Returns the output name used when none is configured.
    pub fn default_name(&self) -> &'static str {
        match *self {
            ResourceType::Icon => "icon",
            ResourceType::Cursor => "cursor",
            ResourceType::AnimatedCursor => "ani_cursor",
        }
    }
}

//===========================================================================//


//===========================================================================//
