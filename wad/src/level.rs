use super::archive::Archive;
use super::errors::{Error, Result};
use super::name::IntoWadName;
use super::tree::{BspNode, BspTree, Child};
use super::types::{Marker, VertexId, WadName, WadRecord};
use super::types::{WadCoord, WadLinedef, WadSector, WadSeg, WadSidedef, WadSubsector};
use super::types::{WadNode, WadThing, WadVertex};
use log::{info, warn};
use std::fmt::Debug;
use std::io::{Read, Seek};
use std::path::Path;
use std::vec::Vec;

const THINGS_OFFSET: usize = 1;
const LINEDEFS_OFFSET: usize = 2;
const SIDEDEFS_OFFSET: usize = 3;
const VERTICES_OFFSET: usize = 4;
const SEGS_OFFSET: usize = 5;
const SSECTORS_OFFSET: usize = 6;
const NODES_OFFSET: usize = 7;
const SECTORS_OFFSET: usize = 8;

/// Axis aligned bounds of a level's linedefs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    fn around(x: WadCoord, y: WadCoord) -> Bounds {
        Bounds {
            min_x: i32::from(x),
            min_y: i32::from(y),
            max_x: i32::from(x),
            max_y: i32::from(y),
        }
    }

    fn extend(self, x: WadCoord, y: WadCoord) -> Bounds {
        Bounds {
            min_x: self.min_x.min(i32::from(x)),
            min_y: self.min_y.min(i32::from(y)),
            max_x: self.max_x.max(i32::from(x)),
            max_y: self.max_y.max(i32::from(y)),
        }
    }
}

/// The geometry of one level, immutable once loaded.
///
/// Every index stored in the records (vertices, sidedefs, sectors, segs, nodes, subsectors) is
/// checked when the level is loaded, so the accessors below index without checking again.
#[derive(Clone, Debug)]
pub struct Level {
    pub name: WadName,
    pub things: Vec<WadThing>,
    pub player: Option<WadThing>,
    pub linedefs: Vec<WadLinedef>,
    pub sidedefs: Vec<WadSidedef>,
    pub vertices: Vec<WadVertex>,
    pub segs: Vec<WadSeg>,
    pub subsectors: Vec<WadSubsector>,
    pub nodes: Vec<BspNode>,
    pub sectors: Vec<WadSector>,
    pub bounds: Bounds,
}

impl Level {
    pub fn load<W, Q>(wad_path: &W, name: Q) -> Result<Level>
    where
        W: AsRef<Path> + Debug,
        Q: IntoWadName,
    {
        Level::from_archive(&Archive::open(wad_path)?, name)
    }

    pub fn from_archive<R, Q>(wad: &Archive<R>, name: Q) -> Result<Level>
    where
        R: Read + Seek,
        Q: IntoWadName,
    {
        let name = name.into_wad_name()?;
        let start_index = wad
            .lump_index(&name)
            .ok_or_else(|| Error::missing_level(name.as_str()))?;
        info!("Reading level data for '{}'...", name);

        let vertices = level_lump(wad, &name, start_index + VERTICES_OFFSET, "VERTEXES")?;
        let linedefs = level_lump(wad, &name, start_index + LINEDEFS_OFFSET, "LINEDEFS")?;
        let (player, things) =
            split_player(level_lump(wad, &name, start_index + THINGS_OFFSET, "THINGS")?);
        let nodes = level_lump::<_, WadNode>(wad, &name, start_index + NODES_OFFSET, "NODES")?
            .iter()
            .map(BspNode::from_wad)
            .collect();
        let subsectors = level_lump(wad, &name, start_index + SSECTORS_OFFSET, "SSECTORS")?;
        let segs = level_lump(wad, &name, start_index + SEGS_OFFSET, "SEGS")?;
        let sectors = level_lump(wad, &name, start_index + SECTORS_OFFSET, "SECTORS")?;
        let sidedefs = level_lump(wad, &name, start_index + SIDEDEFS_OFFSET, "SIDEDEFS")?;

        let mut level = Level {
            name,
            things,
            player,
            linedefs,
            sidedefs,
            vertices,
            segs,
            subsectors,
            nodes,
            sectors,
            bounds: Bounds::default(),
        };
        level.validate()?;
        level.bounds = level.linedef_bounds();

        info!("Loaded level '{}':", level.name);
        info!("    {:4} things", level.things.len());
        info!("    {:4} linedefs", level.linedefs.len());
        info!("    {:4} sidedefs", level.sidedefs.len());
        info!("    {:4} vertices", level.vertices.len());
        info!("    {:4} segs", level.segs.len());
        info!("    {:4} subsectors", level.subsectors.len());
        info!("    {:4} nodes", level.nodes.len());
        info!("    {:4} sectors", level.sectors.len());

        Ok(level)
    }

    pub fn bsp(&self) -> BspTree {
        BspTree::new(&self.nodes)
    }

    pub fn root_node(&self) -> Option<&BspNode> {
        self.nodes.last()
    }

    /// Index of the subsector containing `(x, y)`.
    pub fn locate_subsector(&self, x: i32, y: i32) -> usize {
        self.bsp().locate(x, y)
    }

    /// The sector of the subsector containing `(x, y)`.
    pub fn sector_at(&self, x: i32, y: i32) -> Option<&WadSector> {
        self.subsector_sector(self.locate_subsector(x, y))
    }

    pub fn vertex(&self, id: VertexId) -> Option<&WadVertex> {
        self.vertices.get(id as usize)
    }

    pub fn seg_linedef(&self, seg: &WadSeg) -> &WadLinedef {
        &self.linedefs[seg.linedef as usize]
    }

    pub fn seg_vertices(&self, seg: &WadSeg) -> (&WadVertex, &WadVertex) {
        (
            &self.vertices[seg.start_vertex as usize],
            &self.vertices[seg.end_vertex as usize],
        )
    }

    pub fn seg_sidedef(&self, seg: &WadSeg) -> Option<&WadSidedef> {
        let line = self.seg_linedef(seg);
        if seg.is_reversed() {
            self.back_sidedef(line)
        } else {
            self.front_sidedef(line)
        }
    }

    pub fn seg_back_sidedef(&self, seg: &WadSeg) -> Option<&WadSidedef> {
        let line = self.seg_linedef(seg);
        if seg.is_reversed() {
            self.front_sidedef(line)
        } else {
            self.back_sidedef(line)
        }
    }

    pub fn seg_sector(&self, seg: &WadSeg) -> Option<&WadSector> {
        self.seg_sidedef(seg)
            .map(|side| self.sidedef_sector(side))
    }

    pub fn seg_back_sector(&self, seg: &WadSeg) -> Option<&WadSector> {
        self.seg_back_sidedef(seg)
            .map(|side| self.sidedef_sector(side))
    }

    pub fn front_sidedef(&self, linedef: &WadLinedef) -> Option<&WadSidedef> {
        linedef
            .front_sidedef()
            .map(|index| &self.sidedefs[index as usize])
    }

    pub fn back_sidedef(&self, linedef: &WadLinedef) -> Option<&WadSidedef> {
        linedef
            .back_sidedef()
            .map(|index| &self.sidedefs[index as usize])
    }

    pub fn sidedef_sector(&self, sidedef: &WadSidedef) -> &WadSector {
        &self.sectors[sidedef.sector as usize]
    }

    pub fn subsector(&self, index: usize) -> Option<WadSubsector> {
        self.subsectors.get(index).cloned()
    }

    pub fn subsector_segs(&self, subsector: WadSubsector) -> &[WadSeg] {
        let start = subsector.first_seg as usize;
        &self.segs[start..start + subsector.num_segs as usize]
    }

    /// The sector of a subsector's first seg, the sector every seg in it borders.
    pub fn subsector_sector(&self, index: usize) -> Option<&WadSector> {
        self.subsector(index)
            .and_then(|subsector| self.subsector_segs(subsector).first())
            .and_then(|seg| self.seg_sector(seg))
    }

    fn linedef_bounds(&self) -> Bounds {
        let bounds = self.linedefs.iter().fold(None, |bounds: Option<Bounds>, line| {
            let start = &self.vertices[line.start_vertex as usize];
            let end = &self.vertices[line.end_vertex as usize];
            Some(match bounds {
                Some(bounds) => bounds.extend(start.x, start.y),
                None => Bounds::around(start.x, start.y),
            }
            .extend(end.x, end.y))
        });
        bounds.unwrap_or_else(|| {
            warn!("Level '{}' has no linedefs, bounds are empty.", self.name);
            Bounds::default()
        })
    }

    fn validate(&self) -> Result<()> {
        let level = self.name.as_str();
        let check = |what: &str, index: usize, reference: usize, len: usize| {
            if reference < len {
                Ok(())
            } else {
                Err(Error::bad_reference(level, what, index, reference, len))
            }
        };

        for (i, line) in self.linedefs.iter().enumerate() {
            check("linedef", i, line.start_vertex as usize, self.vertices.len())?;
            check("linedef", i, line.end_vertex as usize, self.vertices.len())?;
            let sides = [line.front_sidedef(), line.back_sidedef()];
            for &side in sides.iter().flatten() {
                check("linedef", i, side as usize, self.sidedefs.len())?;
            }
        }
        for (i, side) in self.sidedefs.iter().enumerate() {
            check("sidedef", i, side.sector as usize, self.sectors.len())?;
        }
        for (i, seg) in self.segs.iter().enumerate() {
            check("seg", i, seg.start_vertex as usize, self.vertices.len())?;
            check("seg", i, seg.end_vertex as usize, self.vertices.len())?;
            check("seg", i, seg.linedef as usize, self.linedefs.len())?;
        }
        for (i, subsector) in self.subsectors.iter().enumerate() {
            let end = subsector.first_seg as usize + subsector.num_segs as usize;
            ensure!(
                end <= self.segs.len(),
                Error::bad_reference(level, "subsector", i, end, self.segs.len())
            );
        }
        for (i, node) in self.nodes.iter().enumerate() {
            for &child in &[node.front, node.back] {
                match child {
                    Child::Node(index) => check("node", i, index, self.nodes.len())?,
                    Child::Leaf(index) => check("node", i, index, self.subsectors.len())?,
                }
            }
        }
        if let Child::Leaf(index) = self.bsp().root() {
            check("root", 0, index, self.subsectors.len())?;
        }
        Ok(())
    }
}

fn level_lump<R, T>(
    wad: &Archive<R>,
    level: &WadName,
    index: usize,
    expected: &str,
) -> Result<Vec<T>>
where
    R: Read + Seek,
    T: WadRecord,
{
    let lump = wad
        .lump_by_index(index)
        .map_err(|_| Error::unexpected_level_lump(level.as_str(), expected, "<end of WAD>"))?;
    let found = lump.name();
    ensure!(
        found == expected,
        Error::unexpected_level_lump(level.as_str(), expected, found.as_str())
    );
    lump.decode_vec()
}

/// Splits the first player one start out of `things`.
fn split_player(things: Vec<WadThing>) -> (Option<WadThing>, Vec<WadThing>) {
    let mut player = None;
    let mut rest = Vec::with_capacity(things.len());
    for thing in things {
        if player.is_none() && thing.marker() == Some(Marker::StartPos { player: 0 }) {
            player = Some(thing);
        } else {
            rest.push(thing);
        }
    }
    if player.is_none() {
        warn!("Level has no player one start.");
    }
    (player, rest)
}
