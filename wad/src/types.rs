pub use super::name::WadName;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub type LightLevel = i16;
pub type LinedefFlags = u16;
pub type SectorId = u16;
pub type SectorTag = u16;
pub type SectorType = u16;
pub type SidedefId = u16;
pub type SpecialType = u16;
pub type ThingFlags = u16;
pub type ThingType = u16;
pub type VertexId = u16;
pub type WadCoord = i16;
pub type SegId = u16;
pub type LinedefId = u16;
pub type ChildId = u16;
pub type BinaryAngle = u16;

/// Sidedef index stored in a linedef with no sidedef on that side.
pub const NO_SIDEDEF: SidedefId = 0xffff;

/// A fixed-size, little-endian record stored back to back in a lump.
pub trait WadRecord: DeserializeOwned + Serialize {
    /// On-disk size in bytes.
    const SIZE: usize;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadInfo {
    pub identifier: [u8; 4],
    pub num_lumps: u32,
    pub info_table_offset: u32,
}

impl WadRecord for WadInfo {
    const SIZE: usize = 12;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadLump {
    pub file_pos: u32,
    pub size: u32,
    pub name: WadName,
}

impl WadRecord for WadLump {
    const SIZE: usize = 16;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadThing {
    pub x: WadCoord,
    pub y: WadCoord,
    pub angle: BinaryAngle,
    pub thing_type: ThingType,
    pub flags: ThingFlags,
}

impl WadRecord for WadThing {
    const SIZE: usize = 10;
}

impl WadThing {
    pub fn angle_degrees(&self) -> f32 {
        binary_angle_to_degrees(self.angle)
    }

    pub fn marker(&self) -> Option<Marker> {
        Marker::from(self.thing_type)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadVertex {
    pub x: WadCoord,
    pub y: WadCoord,
}

impl WadRecord for WadVertex {
    const SIZE: usize = 4;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadLinedef {
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    pub flags: LinedefFlags,
    pub special_type: SpecialType,
    pub sector_tag: SectorTag,
    pub front_side: SidedefId,
    pub back_side: SidedefId,
}

impl WadRecord for WadLinedef {
    const SIZE: usize = 14;
}

impl WadLinedef {
    pub fn front_sidedef(&self) -> Option<SidedefId> {
        match self.front_side {
            NO_SIDEDEF => None,
            index => Some(index),
        }
    }

    pub fn back_sidedef(&self) -> Option<SidedefId> {
        match self.back_side {
            NO_SIDEDEF => None,
            index => Some(index),
        }
    }

    pub fn impassable(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    pub fn blocks_monsters(&self) -> bool {
        self.flags & 0x0002 != 0
    }

    pub fn is_two_sided(&self) -> bool {
        self.flags & 0x0004 != 0
    }

    pub fn upper_unpegged(&self) -> bool {
        self.flags & 0x0008 != 0
    }

    pub fn lower_unpegged(&self) -> bool {
        self.flags & 0x0010 != 0
    }

    pub fn secret(&self) -> bool {
        self.flags & 0x0020 != 0
    }

    pub fn blocks_sound(&self) -> bool {
        self.flags & 0x0040 != 0
    }

    pub fn never_shown_on_map(&self) -> bool {
        self.flags & 0x0080 != 0
    }

    pub fn always_shown_on_map(&self) -> bool {
        self.flags & 0x0100 != 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadSidedef {
    pub x_offset: WadCoord,
    pub y_offset: WadCoord,
    pub upper_texture: WadName,
    pub lower_texture: WadName,
    pub middle_texture: WadName,
    pub sector: SectorId,
}

impl WadRecord for WadSidedef {
    const SIZE: usize = 30;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadSector {
    pub floor_height: WadCoord,
    pub ceiling_height: WadCoord,
    pub floor_texture: WadName,
    pub ceiling_texture: WadName,
    pub light: LightLevel,
    pub sector_type: SectorType,
    pub tag: SectorTag,
}

impl WadRecord for WadSector {
    const SIZE: usize = 26;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadSubsector {
    pub num_segs: u16,
    pub first_seg: SegId,
}

impl WadRecord for WadSubsector {
    const SIZE: usize = 4;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadSeg {
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    pub angle: BinaryAngle,
    pub linedef: LinedefId,
    pub direction: u16,
    pub offset: u16,
}

impl WadRecord for WadSeg {
    const SIZE: usize = 12;
}

impl WadSeg {
    /// True if the seg runs against its linedef, i.e. it lies on the back side.
    pub fn is_reversed(&self) -> bool {
        self.direction != 0
    }

    pub fn angle_degrees(&self) -> f32 {
        binary_angle_to_degrees(self.angle)
    }
}

/// Axis aligned box as stored in a node: top, bottom, left, right.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadBox {
    pub top: WadCoord,
    pub bottom: WadCoord,
    pub left: WadCoord,
    pub right: WadCoord,
}

impl WadBox {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= i32::from(self.left)
            && x <= i32::from(self.right)
            && y >= i32::from(self.bottom)
            && y <= i32::from(self.top)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WadNode {
    pub line_x: WadCoord,
    pub line_y: WadCoord,
    pub step_x: WadCoord,
    pub step_y: WadCoord,
    pub front_box: WadBox,
    pub back_box: WadBox,
    pub front: ChildId,
    pub back: ChildId,
}

impl WadRecord for WadNode {
    const SIZE: usize = 28;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    StartPos { player: usize },
    DeathmatchStart,
    TeleportLanding,
}

const THING_TYPE_PLAYER1_START: ThingType = 1;
const THING_TYPE_PLAYER2_START: ThingType = 2;
const THING_TYPE_PLAYER3_START: ThingType = 3;
const THING_TYPE_PLAYER4_START: ThingType = 4;
const THING_TYPE_DEATHMATCH_START: ThingType = 11;
const THING_TYPE_TELEPORT_LANDING: ThingType = 14;

impl Marker {
    pub fn from(thing_type: ThingType) -> Option<Marker> {
        match thing_type {
            THING_TYPE_PLAYER1_START => Some(Marker::StartPos { player: 0 }),
            THING_TYPE_PLAYER2_START => Some(Marker::StartPos { player: 1 }),
            THING_TYPE_PLAYER3_START => Some(Marker::StartPos { player: 2 }),
            THING_TYPE_PLAYER4_START => Some(Marker::StartPos { player: 3 }),
            THING_TYPE_DEATHMATCH_START => Some(Marker::DeathmatchStart),
            THING_TYPE_TELEPORT_LANDING => Some(Marker::TeleportLanding),
            _ => None,
        }
    }
}

/// Maps the full `u16` range onto `[0, 360)` degrees.
pub fn binary_angle_to_degrees(angle: BinaryAngle) -> f32 {
    f32::from(angle) * (360.0 / 65536.0)
}
