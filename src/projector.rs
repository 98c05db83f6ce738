#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScreenPos {
    pub(crate) x: u16,
    pub(crate) y: u16,
}

/// Returns `None` for z ≤ 0 or when the rounded cell lands outside
/// `[0, width) × [0, height)`.
pub(crate) fn project(x: f32, y: f32, z: f32, width: u16, height: u16) -> Option<ScreenPos> {
    if z.is_nan() || z <= 0.0 {
        return None;
    }
    let sx = axis(x, z, width)?;
    let sy = axis(y, z, height)?;
    Some(ScreenPos { x: sx, y: sy })
}

fn axis(v: f32, z: f32, extent: u16) -> Option<u16> {
    let s = ((v / z + 1.0) * extent as f32 / 2.0).round();
    // also rejects NaN
    if s >= 0.0 && s < extent as f32 {
        Some(s as u16)
    } else {
        None
    }
}
