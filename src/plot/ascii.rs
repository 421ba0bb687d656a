//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - waveform: `*` line
//! - t40/t60 markers: `o`
//! - knee points: `K`
//! - direction band under the axis: `/` rising region, `\` falling region

use crate::analysis::RegionSet;
use crate::domain::{Direction, Point};

/// Render the waveform with the markers and regions of `set`.
pub fn render_waveform_plot(time: &[f64], voltage: &[f64], set: &RegionSet, width: usize, height: usize) -> String {
    let samples: Vec<Point> = time.iter().zip(voltage).map(|(&t, &v)| Point::new(t, v)).collect();
    let mut canvas = Canvas::fitting(&samples, width.max(10), height.max(5));

    for pair in samples.windows(2) {
        canvas.line(pair[0], pair[1], '*');
    }
    if let [only] = samples.as_slice() {
        canvas.put(*only, '*');
    }
    // Knees go last so they stay visible where markers overlap.
    for p in set.t40_t60_points() {
        canvas.put(p, 'o');
    }
    for p in set.knee_points() {
        canvas.put(p, 'K');
    }

    let band: String = (0..canvas.width())
        .map(|x| match set.region_at(canvas.column_time(x)).map(|r| r.direction()) {
            Some(Direction::Rising) => '/',
            Some(Direction::Falling) => '\\',
            None => ' ',
        })
        .collect();

    let mut out = canvas.header();
    out.push_str(&canvas.rows());
    out.push_str(&band);
    out.push('\n');
    out
}

/// Character grid over a time/voltage window; row 0 is the top.
struct Canvas {
    grid: Vec<Vec<char>>,
    t: (f64, f64),
    v: (f64, f64),
}

impl Canvas {
    /// Full time range, voltage range padded by 5% so the trace clears the frame.
    fn fitting(samples: &[Point], width: usize, height: usize) -> Self {
        let t = span(samples.iter().map(|p| p.time)).unwrap_or((0.0, 1.0));
        let (lo, hi) = span(samples.iter().map(|p| p.voltage)).unwrap_or((0.0, 1.0));
        let pad = ((hi - lo) * 0.05).max(1e-12);
        Self {
            grid: vec![vec![' '; width]; height],
            t,
            v: (lo - pad, hi + pad),
        }
    }

    fn width(&self) -> usize {
        self.grid[0].len()
    }

    /// Time at the centre of column `x`.
    fn column_time(&self, x: usize) -> f64 {
        self.t.0 + (x as f64 / (self.width() as f64 - 1.0)) * (self.t.1 - self.t.0)
    }

    fn cell(&self, p: Point) -> (isize, isize) {
        let last_col = (self.width() - 1) as f64;
        let last_row = (self.grid.len() - 1) as f64;
        let fx = ((p.time - self.t.0) / (self.t.1 - self.t.0)).clamp(0.0, 1.0);
        let fy = ((p.voltage - self.v.0) / (self.v.1 - self.v.0)).clamp(0.0, 1.0);
        ((fx * last_col).round() as isize, (last_row - fy * last_row).round() as isize)
    }

    fn set(&mut self, (x, y): (isize, isize), ch: char) {
        if let Some(cell) = usize::try_from(y)
            .ok()
            .zip(usize::try_from(x).ok())
            .and_then(|(y, x)| self.grid.get_mut(y)?.get_mut(x))
        {
            *cell = ch;
        }
    }

    fn put(&mut self, p: Point, ch: char) {
        let at = self.cell(p);
        self.set(at, ch);
    }

    /// Bresenham line between the cells of `a` and `b`, both ends included.
    fn line(&mut self, a: Point, b: Point, ch: char) {
        let (mut x, mut y) = self.cell(a);
        let (x1, y1) = self.cell(b);
        let (dx, dy) = ((x1 - x).abs(), -(y1 - y).abs());
        let (sx, sy) = ((x1 - x).signum(), (y1 - y).signum());
        let mut err = dx + dy;

        loop {
            self.set((x, y), ch);
            if (x, y) == (x1, y1) {
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
    }

    fn header(&self) -> String {
        format!(
            "Plot: t=[{:.4e}, {:.4e}] s | U=[{:.3}, {:.3}] V\n",
            self.t.0, self.t.1, self.v.0, self.v.1
        )
    }

    fn rows(&self) -> String {
        self.grid
            .iter()
            .map(|row| row.iter().collect::<String>() + "\n")
            .collect()
    }
}

/// `(min, max)` of finite, non-degenerate values.
fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (min.is_finite() && max.is_finite() && max > min).then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_without_regions() {
        let time = [0.0, 1.0, 2.0, 3.0];
        let voltage = [0.0, 0.0, 10.0, 10.0];
        let txt = render_waveform_plot(&time, &voltage, &RegionSet::new(), 10, 5);
        let expected = concat!(
            "Plot: t=[0.0000e0, 3.0000e0] s | U=[-0.500, 10.500] V\n",
            "      ****\n",
            "     *    \n",
            "     *    \n",
            "    *     \n",
            "****      \n",
            "          \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn markers_and_band_follow_regions() {
        let mut time = Vec::new();
        let mut voltage = Vec::new();
        for i in 0..100 {
            time.push(i as f64);
            voltage.push(if i < 10 {
                0.0
            } else if i <= 20 {
                (i - 10) as f64
            } else if i < 80 {
                10.0
            } else if i <= 90 {
                (90 - i) as f64
            } else {
                0.0
            });
        }
        let mut set = RegionSet::new();
        set.load_waveform(&time, &voltage).unwrap();

        let txt = render_waveform_plot(&time, &voltage, &set, 100, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 1 + 12 + 1);
        assert!(txt.contains('K'));
        assert!(txt.contains('o'));

        let band = lines[lines.len() - 1];
        assert_eq!(band.chars().nth(50), Some('/'));
        assert_eq!(band.chars().nth(95), Some('\\'));
        assert_eq!(band.chars().nth(5), Some(' '));
    }
}
