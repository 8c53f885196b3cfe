use super::types::{WadLinedef, WadName, WadSidedef};

pub fn is_untextured(name: &WadName) -> bool {
    name.is_empty() || name == "-"
}

pub fn is_sky_flat(name: &WadName) -> bool {
    name == "F_SKY1"
}

/// A line blocks sight completely when it has no back side.
pub fn is_solid_wall(line: &WadLinedef) -> bool {
    line.back_sidedef().is_none()
}

/// A two sided line whose middle texture is present is drawn like a window.
pub fn has_middle_texture(side: &WadSidedef) -> bool {
    !is_untextured(&side.middle_texture)
}
