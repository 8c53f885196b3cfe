use clap::{value_t, App, AppSettings, Arg};
use failure::{bail, format_err, Error};
use log::{error, info};
use render::{Projection, SolidSpans, Viewpoint};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use wad::types::WadSeg;
use wad::{util, Archive, Level, WadName};

type Result<T> = std::result::Result<T, Error>;

pub struct MapPoint {
    x: i32,
    y: i32,
}

impl FromStr for MapPoint {
    type Err = Error;
    fn from_str(point_str: &str) -> Result<Self> {
        let mut coords = point_str.splitn(2, ',').map(|coord| coord.trim().parse::<i32>());
        match (coords.next(), coords.next()) {
            (Some(Ok(x)), Some(Ok(y))) => Ok(MapPoint { x, y }),
            _ => bail!("point format must be X,Y"),
        }
    }
}

pub struct ViewConfig {
    wad_file: PathBuf,
    level: WadName,
    width: i32,
    fov: f32,
}

pub enum RunMode {
    ListLevelNames {
        wad_file: PathBuf,
    },
    ListLumps {
        wad_file: PathBuf,
    },
    Locate {
        wad_file: PathBuf,
        level: WadName,
        point: MapPoint,
    },
    View(ViewConfig),
}

impl RunMode {
    pub fn from_args() -> Result<RunMode> {
        let matches = App::new("Doom Map")
            .version(env!("CARGO_PKG_VERSION"))
            .author("Cristi Cobzarenco <cristi.cobzarenco@gmail.com>")
            .about("Inspects the level geometry of a Doom WAD file.")
            .settings(&[AppSettings::ColoredHelp])
            .arg(
                Arg::with_name("iwad")
                    .long("iwad")
                    .short("i")
                    .help("WAD file to read")
                    .value_name("FILE")
                    .default_value("doom1.wad"),
            )
            .arg(
                Arg::with_name("level")
                    .long("level")
                    .short("l")
                    .help("name of the level to load")
                    .value_name("NAME")
                    .default_value("E1M1"),
            )
            .arg(
                Arg::with_name("width")
                    .long("width")
                    .short("w")
                    .help("number of screen columns to clip walls against")
                    .value_name("COLUMNS")
                    .default_value("320"),
            )
            .arg(
                Arg::with_name("fov")
                    .long("fov")
                    .short("f")
                    .help("horizontal field of view")
                    .value_name("DEGREES")
                    .default_value("90"),
            )
            .arg(
                Arg::with_name("locate")
                    .long("locate")
                    .help("print the subsector and sector containing a point, then exit")
                    .value_name("X,Y"),
            )
            .arg(Arg::with_name("list-levels").long("list-levels").help(
                "list the names and indices of all the levels in the WAD, then exit",
            ))
            .arg(Arg::with_name("list-lumps").long("list-lumps").help(
                "list every entry of the WAD directory, then exit",
            ))
            .get_matches();

        let wad_file: PathBuf = value_t!(matches, "iwad", String)?.into();
        let level = value_t!(matches, "level", String)?.parse::<WadName>()?;

        Ok(if matches.is_present("list-levels") {
            RunMode::ListLevelNames { wad_file }
        } else if matches.is_present("list-lumps") {
            RunMode::ListLumps { wad_file }
        } else if matches.is_present("locate") {
            RunMode::Locate {
                wad_file,
                level,
                point: value_t!(matches, "locate", MapPoint)?,
            }
        } else {
            RunMode::View(ViewConfig {
                wad_file,
                level,
                width: value_t!(matches, "width", i32)?,
                fov: value_t!(matches, "fov", f32)?,
            })
        })
    }
}

/// Whether `seg` hides everything behind it: a one sided line or a closed door.
fn blocks_view(level: &Level, seg: &WadSeg) -> bool {
    if util::is_solid_wall(level.seg_linedef(seg)) {
        return true;
    }
    match (level.seg_sector(seg), level.seg_back_sector(seg)) {
        (Some(front), Some(back)) => {
            back.ceiling_height <= front.floor_height || back.floor_height >= front.ceiling_height
        }
        _ => true,
    }
}

fn print_summary(level: &Level) {
    println!("Level {}", level.name);
    println!("    {:6} things", level.things.len());
    println!("    {:6} linedefs", level.linedefs.len());
    println!("    {:6} sidedefs", level.sidedefs.len());
    println!("    {:6} vertices", level.vertices.len());
    println!("    {:6} segs", level.segs.len());
    println!("    {:6} subsectors", level.subsectors.len());
    println!("    {:6} nodes", level.nodes.len());
    println!("    {:6} sectors", level.sectors.len());
    let sky_sectors = level
        .sectors
        .iter()
        .filter(|sector| util::is_sky_flat(&sector.ceiling_texture))
        .count();
    println!("    {:6} sectors open to the sky", sky_sectors);
    let bounds = &level.bounds;
    println!(
        "Bounds ({}, {}) to ({}, {}), {}x{}",
        bounds.min_x,
        bounds.min_y,
        bounds.max_x,
        bounds.max_y,
        bounds.width(),
        bounds.height()
    );
}

fn view(config: &ViewConfig) -> Result<()> {
    let level = Level::load(&config.wad_file, config.level)?;
    print_summary(&level);

    let player = level
        .player
        .ok_or_else(|| format_err!("level {} has no player start", level.name))?;
    let (x, y) = (i32::from(player.x), i32::from(player.y));
    println!(
        "Player start ({}, {}) facing {:.1} degrees, in subsector {}",
        x,
        y,
        player.angle_degrees(),
        level.locate_subsector(x, y)
    );

    let projector = Projection::new(config.width, config.fov)?.look_from(Viewpoint {
        x: f32::from(player.x),
        y: f32::from(player.y),
        angle_degrees: player.angle_degrees(),
    });
    let mut solid = SolidSpans::new(config.width)?;
    let mut leaves = 0;
    let mut solid_columns = 0;
    let mut window_columns = 0;
    let mut masked_columns = 0;
    let mut clip_error = None;

    let flow = level.bsp().front_to_back(x, y, |leaf| {
        leaves += 1;
        for seg in level.subsector_segs(level.subsectors[leaf]) {
            let (start, end) = level.seg_vertices(seg);
            let columns = projector.wall_columns(
                (f32::from(start.x), f32::from(start.y)),
                (f32::from(end.x), f32::from(end.y)),
            );
            let (first, last) = match columns {
                Some(columns) => columns,
                None => continue,
            };
            let clipped = if blocks_view(&level, seg) {
                solid.submit_with(first, last, |span| solid_columns += span.len())
            } else {
                let masked = level.seg_sidedef(seg).map_or(false, util::has_middle_texture);
                solid.pass_with(first, last, |span| {
                    window_columns += span.len();
                    if masked {
                        masked_columns += span.len();
                    }
                })
            };
            if let Err(error) = clipped {
                clip_error = Some(error);
                return ControlFlow::Break(());
            }
        }
        if solid.is_full() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    if let Some(error) = clip_error {
        return Err(error.into());
    }

    match flow {
        ControlFlow::Break(()) => println!(
            "Screen filled after {} of {} subsectors.",
            leaves,
            level.subsectors.len()
        ),
        ControlFlow::Continue(()) => println!(
            "Visited all {} subsectors, screen not filled.",
            leaves
        ),
    }
    println!(
        "{} solid columns, {} columns seen through windows ({} behind masked textures).",
        solid_columns, window_columns, masked_columns
    );
    Ok(())
}

fn run() -> Result<()> {
    env_logger::init();

    match RunMode::from_args()? {
        RunMode::ListLevelNames { wad_file } => {
            let wad = Archive::open(&wad_file)?;
            for (i_level, name) in wad.level_names().enumerate() {
                println!("{:3} {:8}", i_level, name);
            }
        }
        RunMode::ListLumps { wad_file } => {
            let wad = Archive::open(&wad_file)?;
            for lump in wad.lumps() {
                println!(
                    "{:5} {:8} {:10} {:8}",
                    lump.index(),
                    lump.name(),
                    lump.offset(),
                    lump.size()
                );
            }
        }
        RunMode::Locate {
            wad_file,
            level,
            point,
        } => {
            let level = Level::load(&wad_file, level)?;
            let subsector = level.locate_subsector(point.x, point.y);
            print!("({}, {}) is in subsector {}", point.x, point.y, subsector);
            match level.sector_at(point.x, point.y) {
                Some(sector) => println!(
                    ", floor {} ceiling {} light {}",
                    sector.floor_height, sector.ceiling_height, sector.light
                ),
                None => println!(", which has no sector"),
            }
        }
        RunMode::View(config) => {
            view(&config)?;
            info!("Done, shutting down.");
        }
    }
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        error!("Fatal error: {}", error);
        for cause in error.iter_causes() {
            error!("    caused by: {}", cause);
        }
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
