//! Visual indicator matching: affected part, spot colour, spot shape

use crate::types::{AilmentRecord, DiagnosisRequest, PlantPart, SpotColor, SpotShape};

pub const AFFECTED_PART_POINTS: u32 = 2;
pub const SPOT_COLOR_POINTS: u32 = 2;
pub const SPOT_SHAPE_POINTS: u32 = 1;

pub fn affected_part_points(ailment: &AilmentRecord, request: &DiagnosisRequest) -> u32 {
    match (request.affected_part, ailment.affected_part) {
        (Some(observed), Some(known)) if observed != PlantPart::Other && observed == known => {
            AFFECTED_PART_POINTS
        }
        _ => 0,
    }
}

pub fn spot_color_points(ailment: &AilmentRecord, request: &DiagnosisRequest) -> u32 {
    match request.spot_color {
        Some(color) if color != SpotColor::Other && ailment.leaf_indicators.colors.contains(&color) => {
            SPOT_COLOR_POINTS
        }
        _ => 0,
    }
}

pub fn spot_shape_points(ailment: &AilmentRecord, request: &DiagnosisRequest) -> u32 {
    match request.spot_shape {
        Some(shape) if shape != SpotShape::Other && ailment.leaf_indicators.shapes.contains(&shape) => {
            SPOT_SHAPE_POINTS
        }
        _ => 0,
    }
}
