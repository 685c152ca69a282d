//! Line of sight: direct/arc fire classification and partial-cover dodge
//! bonus (4.3.5).

use crate::config::MechanicsConfig;
use crate::types::Position;

/// Grid cells strictly between `from` and `to`, via a Bresenham trace.
/// Used to test whether anything stands in a shooter's direct line.
pub fn trace_line(from: Position, to: Position) -> Vec<Position> {
    let (x0, y0) = (from.x as i32, from.y as i32);
    let (x1, y1) = (to.x as i32, to.y as i32);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut out = Vec::new();
    loop {
        if (x, y) != (x0, y0) && (x, y) != (x1, y1) {
            out.push(Position::new(x as u8, y as u8));
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    out
}

/// Whether any position in `occupied` blocks the line between `from` and
/// `to` (ignoring the endpoints themselves).
pub fn is_blocked(from: Position, to: Position, occupied: &std::collections::HashSet<Position>) -> bool {
    trace_line(from, to).iter().any(|p| occupied.contains(p))
}

/// Direct fire: a straight orthogonal or diagonal line with nothing
/// blocking. Arc fire: anything else, at a minimum range, with an
/// accuracy penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireMode {
    Direct,
    Arc,
    NoShot,
}

/// `is_siege` units fire exclusively by arc trajectory — they can never
/// use direct fire, so they're forbidden from shooting at all below the
/// arc-fire minimum range, even when the shot would otherwise be
/// unobstructed (an indirect-fire weapon can't hit what's standing next
/// to it).
pub fn fire_mode(
    from: Position,
    to: Position,
    ignore_los: bool,
    has_arc_fire: bool,
    is_siege: bool,
    occupied: &std::collections::HashSet<Position>,
    cfg: &MechanicsConfig,
) -> FireMode {
    if is_siege {
        return if from.chebyshev(to) >= cfg.arc_fire_min_range { FireMode::Arc } else { FireMode::NoShot };
    }
    if ignore_los || !is_blocked(from, to, occupied) {
        return FireMode::Direct;
    }
    if has_arc_fire && from.chebyshev(to) >= cfg.arc_fire_min_range {
        return FireMode::Arc;
    }
    FireMode::NoShot
}

pub fn arc_fire_penalty(cfg: &MechanicsConfig) -> f64 {
    cfg.arc_fire_accuracy_penalty
}

/// Dodge bonus when the traced line from `from` to `to` grazes the edge of
/// an empty intermediate cell: perpendicular distance from that cell's
/// centre to the continuous line falls in `(edge_lo, edge_hi)` cell-widths.
pub fn partial_cover_bonus(from: Position, to: Position, occupied: &std::collections::HashSet<Position>, cfg: &MechanicsConfig) -> f64 {
    let (x0, y0) = (from.x as f64, from.y as f64);
    let (x1, y1) = (to.x as f64, to.y as f64);
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return 0.0;
    }

    let min_x = x0.min(x1).floor() as i32;
    let max_x = x0.max(x1).ceil() as i32;
    let min_y = y0.min(y1).floor() as i32;
    let max_y = y0.max(y1).ceil() as i32;

    for gx in min_x..=max_x {
        for gy in min_y..=max_y {
            if gx < 0 || gy < 0 {
                continue;
            }
            let (cx, cy) = (gx as f64, gy as f64);
            if (cx, cy) == (x0, y0) || (cx, cy) == (x1, y1) {
                continue;
            }
            // how far along the segment the cell's perpendicular foot falls
            let t = ((cx - x0) * dx + (cy - y0) * dy) / (len * len);
            if t <= 0.0 || t >= 1.0 {
                continue;
            }
            let perp = ((dx * (cy - y0)) - (dy * (cx - x0))).abs() / len;
            if perp > cfg.partial_cover_edge_lo && perp < cfg.partial_cover_edge_hi {
                let cell = Position::new(gx as u8, gy as u8);
                if !occupied.contains(&cell) {
                    return cfg.partial_cover_dodge_bonus;
                }
            }
        }
    }
    0.0
}
