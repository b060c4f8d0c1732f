// Missing-data filler - nearest-value gap interpolation
//
// Fills NaN gaps in time series by extending the nearest valid neighbor in
// either direction. Interior gaps split at the midpoint (ties go to the
// earlier neighbor); leading and trailing runs copy the first/last valid
// value. Channels are filled independently; a channel with no valid sample
// at all is a structural error, never silently zero-filled.

use crate::error::ExtractError;
use crate::types::{Point, Trajectory};

/// Fill NaN gaps in a scalar series in place.
///
/// Returns `false` if the series contains no valid sample (nothing to
/// extend from); the series is left untouched in that case.
pub fn fill_series(series: &mut [f64]) -> bool {
    let mut prev_valid: Option<usize> = None;
    let mut any_valid = false;

    for i in 0..series.len() {
        if !series[i].is_nan() {
            any_valid = true;
            match prev_valid {
                None => {
                    // Leading gap: extend the first valid value backward.
                    let v = series[i];
                    for s in series.iter_mut().take(i) {
                        *s = v;
                    }
                }
                Some(l) if l + 1 < i => {
                    // Interior gap between l and i: nearest neighbor wins,
                    // ties at the exact midpoint take the earlier value.
                    let (lv, rv) = (series[l], series[i]);
                    for k in (l + 1)..i {
                        series[k] = if k - l <= i - k { lv } else { rv };
                    }
                }
                _ => {}
            }
            prev_valid = Some(i);
        }
    }

    if let Some(l) = prev_valid {
        // Trailing gap: extend the last valid value forward.
        let v = series[l];
        for s in series.iter_mut().skip(l + 1) {
            *s = v;
        }
    }

    any_valid
}

/// Fill a scalar series, erroring if the whole channel is missing.
pub fn fill_missing_series(series: &[f64], channel: &str) -> Result<Vec<f64>, ExtractError> {
    let mut out = series.to_vec();
    if !fill_series(&mut out) && !series.is_empty() {
        return Err(ExtractError::AllMissing {
            channel: channel.to_string(),
        });
    }
    Ok(out)
}

/// Fill a 2D coordinate track, treating x and y as independent channels.
pub fn fill_missing_track(track: &[Point], channel: &str) -> Result<Vec<Point>, ExtractError> {
    let xs = fill_missing_series(
        &track.iter().map(|p| p.x).collect::<Vec<_>>(),
        &format!("{} x", channel),
    )?;
    let ys = fill_missing_series(
        &track.iter().map(|p| p.y).collect::<Vec<_>>(),
        &format!("{} y", channel),
    )?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| Point::new(x, y))
        .collect())
}

/// Fill every joint channel of a trajectory independently.
pub fn fill_missing_trajectory(
    trx: &Trajectory,
    actor: &str,
) -> Result<Trajectory, ExtractError> {
    let n_joints = trx.n_joints();
    let mut out = trx.clone();
    for j in 0..n_joints {
        let filled = fill_missing_track(&trx.joint_track(j), &format!("{} joint {}", actor, j))?;
        for (f, p) in filled.into_iter().enumerate() {
            out.set(f, j, p);
        }
    }
    Ok(out)
}
