//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - measured (historical) points: `o`
//! - estimated (spliced recent) points: `+`
//! - forecast path from the last observed point: `-` line

use chrono::NaiveDate;

use crate::domain::{PointKind, TimePoint};
use crate::forecast::ForecastPoint;

/// Render the combined series, optionally continued by a forecast.
pub fn render_ascii_plot(
    points: &[TimePoint],
    forecast: Option<&[ForecastPoint]>,
    width: usize,
    height: usize,
    unit: &str,
) -> String {
    let path: Vec<(f64, f64)> = match (forecast, points.last()) {
        (Some(f), Some(last)) if !f.is_empty() => std::iter::once((day(last.date), last.value))
            .chain(f.iter().map(|p| (day(p.date), p.value)))
            .collect(),
        _ => Vec::new(),
    };
    let dates = date_range(points, forecast);
    render_plot(points, &path, dates, width, height, unit)
}

fn render_plot(
    points: &[TimePoint],
    path: &[(f64, f64)],
    dates: Option<(NaiveDate, NaiveDate)>,
    width: usize,
    height: usize,
    unit: &str,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (d_min, d_max) = match dates {
        Some((a, b)) if b > a => (a, b),
        Some((a, _)) => (a, a.succ_opt().unwrap_or(a)),
        None => return "Plot: no data\n".to_string(),
    };
    let (t_min, t_max) = (day(d_min), day(d_max).max(day(d_min) + 1.0));

    let (y_min, y_max) = y_range(points, path).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Forecast first so observed points overlay it.
    draw_path(&mut grid, path, t_min, t_max, y_min, y_max);

    for p in points {
        let x = map_x(day(p.date), t_min, t_max, width);
        let y = map_y(p.value, y_min, y_max, height);
        grid[y][x] = match p.kind {
            PointKind::Measured => 'o',
            PointKind::Estimated => '+',
        };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {d_min} .. {d_max} | y=[{y_min:.2}, {y_max:.2}] {unit}\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day(date: NaiveDate) -> f64 {
    f64::from(chrono::Datelike::num_days_from_ce(&date))
}

fn date_range(points: &[TimePoint], forecast: Option<&[ForecastPoint]>) -> Option<(NaiveDate, NaiveDate)> {
    let dates = points
        .iter()
        .map(|p| p.date)
        .chain(forecast.unwrap_or_default().iter().map(|p| p.date));
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    for d in dates {
        range = Some(match range {
            None => (d, d),
            Some((lo, hi)) => (lo.min(d), hi.max(d)),
        });
    }
    range
}

fn y_range(points: &[TimePoint], path: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for y in points.iter().map(|p| p.value).chain(path.iter().map(|&(_, y)| y)) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        Some((min_y - 0.5, max_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_path(grid: &mut [Vec<char>], path: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if path.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in path {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
