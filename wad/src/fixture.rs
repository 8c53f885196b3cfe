//! Synthetic WADs for unit tests.

use super::archive::encode_record;
use super::types::{WadBox, WadLinedef, WadName, WadNode, WadRecord, WadSector, WadSeg};
use super::types::{WadSidedef, WadSubsector, WadThing, WadVertex, NO_SIDEDEF};
use byteorder::{LittleEndian, WriteBytesExt};
use std::str::FromStr;

pub const LEVEL_LUMPS: [&str; 8] = [
    "THINGS", "LINEDEFS", "SIDEDEFS", "VERTEXES", "SEGS", "SSECTORS", "NODES", "SECTORS",
];

pub struct WadBuilder {
    identifier: [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn new() -> Self {
        WadBuilder {
            identifier: *b"IWAD",
            lumps: Vec::new(),
        }
    }

    pub fn pwad() -> Self {
        WadBuilder {
            identifier: *b"PWAD",
            lumps: Vec::new(),
        }
    }

    pub fn lump(mut self, name: &str, data: Vec<u8>) -> Self {
        self.lumps.push((name.to_owned(), data));
        self
    }

    pub fn records<T: WadRecord>(self, name: &str, records: &[T]) -> Self {
        let mut data = Vec::with_capacity(records.len() * T::SIZE);
        for record in records {
            data.extend(encode_record(record).expect("test: could not encode record"));
        }
        self.lump(name, data)
    }

    pub fn level(self, name: &str, level: &TestLevel) -> Self {
        self.level_with_names(name, level, LEVEL_LUMPS)
    }

    pub fn level_with_names(self, name: &str, level: &TestLevel, names: [&str; 8]) -> Self {
        self.lump(name, Vec::new())
            .records(names[0], &level.things)
            .records(names[1], &level.linedefs)
            .records(names[2], &level.sidedefs)
            .records(names[3], &level.vertices)
            .records(names[4], &level.segs)
            .records(names[5], &level.subsectors)
            .records(names[6], &level.nodes)
            .records(names[7], &level.sectors)
    }

    pub fn build(self) -> Vec<u8> {
        let data_len: usize = self.lumps.iter().map(|(_, data)| data.len()).sum();
        let mut bytes = Vec::with_capacity(12 + data_len + 16 * self.lumps.len());
        bytes.extend_from_slice(&self.identifier);
        bytes.write_u32::<LittleEndian>(self.lumps.len() as u32).unwrap();
        bytes.write_u32::<LittleEndian>((12 + data_len) as u32).unwrap();

        let mut offsets = Vec::with_capacity(self.lumps.len());
        for (_, data) in &self.lumps {
            offsets.push(bytes.len() as u32);
            bytes.extend_from_slice(data);
        }
        for ((name, data), offset) in self.lumps.iter().zip(offsets) {
            bytes.write_u32::<LittleEndian>(offset).unwrap();
            bytes.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            let mut raw_name = [0u8; 8];
            raw_name[..name.len()].copy_from_slice(name.as_bytes());
            bytes.extend_from_slice(&raw_name);
        }
        bytes
    }
}

#[derive(Clone)]
pub struct TestLevel {
    pub things: Vec<WadThing>,
    pub linedefs: Vec<WadLinedef>,
    pub sidedefs: Vec<WadSidedef>,
    pub vertices: Vec<WadVertex>,
    pub segs: Vec<WadSeg>,
    pub subsectors: Vec<WadSubsector>,
    pub nodes: Vec<WadNode>,
    pub sectors: Vec<WadSector>,
}

fn name(value: &str) -> WadName {
    WadName::from_str(value).expect("test: bad name")
}

fn thing(x: i16, y: i16, thing_type: u16) -> WadThing {
    WadThing {
        x,
        y,
        angle: 0,
        thing_type,
        flags: 7,
    }
}

fn linedef(start_vertex: u16, end_vertex: u16, front_side: u16) -> WadLinedef {
    WadLinedef {
        start_vertex,
        end_vertex,
        flags: 1,
        special_type: 0,
        sector_tag: 0,
        front_side,
        back_side: NO_SIDEDEF,
    }
}

fn sidedef(sector: u16) -> WadSidedef {
    WadSidedef {
        x_offset: 0,
        y_offset: 0,
        upper_texture: name("-"),
        lower_texture: name("-"),
        middle_texture: name("STARTAN3"),
        sector,
    }
}

fn seg(start_vertex: u16, end_vertex: u16, linedef: u16, offset: u16) -> WadSeg {
    WadSeg {
        start_vertex,
        end_vertex,
        angle: 0,
        linedef,
        direction: 0,
        offset,
    }
}

fn sector(floor_height: i16) -> WadSector {
    WadSector {
        floor_height,
        ceiling_height: 128,
        floor_texture: name("FLOOR4_8"),
        ceiling_texture: name("CEIL3_5"),
        light: 160,
        sector_type: 0,
        tag: 0,
    }
}

fn bbox(top: i16, bottom: i16, left: i16, right: i16) -> WadBox {
    WadBox {
        top,
        bottom,
        left,
        right,
    }
}

impl TestLevel {
    /// A 128x128 room, split at x = 64 and its right half again at y = 64.
    ///
    /// Subsector 0 is the bottom right quarter, 1 the left half (sector 1) and 2 the top right
    /// quarter. Vertex 6 is not used by any linedef.
    pub fn square_room() -> Self {
        TestLevel {
            things: vec![
                thing(96, 96, 3004),
                thing(32, 32, 1),
                thing(10, 10, 2),
                thing(20, 100, 1),
            ],
            vertices: vec![
                WadVertex { x: 0, y: 0 },
                WadVertex { x: 128, y: 0 },
                WadVertex { x: 128, y: 128 },
                WadVertex { x: 0, y: 128 },
                WadVertex { x: 64, y: 0 },
                WadVertex { x: 64, y: 128 },
                WadVertex { x: 4000, y: -4000 },
            ],
            linedefs: vec![
                linedef(0, 1, 0),
                linedef(1, 2, 1),
                linedef(2, 3, 2),
                linedef(3, 0, 3),
            ],
            sidedefs: vec![sidedef(0), sidedef(0), sidedef(0), sidedef(1)],
            segs: vec![
                seg(4, 1, 0, 64),
                seg(1, 2, 1, 0),
                seg(3, 0, 3, 0),
                seg(5, 3, 2, 64),
                seg(0, 4, 0, 0),
                seg(2, 5, 2, 0),
            ],
            subsectors: vec![
                WadSubsector {
                    num_segs: 2,
                    first_seg: 0,
                },
                WadSubsector {
                    num_segs: 3,
                    first_seg: 2,
                },
                WadSubsector {
                    num_segs: 1,
                    first_seg: 5,
                },
            ],
            nodes: vec![
                WadNode {
                    line_x: 64,
                    line_y: 64,
                    step_x: 64,
                    step_y: 0,
                    front_box: bbox(64, 0, 64, 128),
                    back_box: bbox(128, 64, 64, 128),
                    front: 0x8000,
                    back: 0x8002,
                },
                WadNode {
                    line_x: 64,
                    line_y: 0,
                    step_x: 0,
                    step_y: 128,
                    front_box: bbox(128, 0, 64, 128),
                    back_box: bbox(128, 0, 0, 64),
                    front: 0,
                    back: 0x8001,
                },
            ],
            sectors: vec![sector(0), sector(-16)],
        }
    }
}
