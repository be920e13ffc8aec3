//! Contrast-limited adaptive histogram equalization on 8-bit grayscale.
//!
//! The image is split into a grid of tiles. Each tile gets a clipped
//! histogram and a cumulative lookup table; every output pixel is a bilinear
//! blend of the four lookup tables whose tile centres surround it.
//!
//! When the image size is not a multiple of the grid, tiles are measured on a
//! virtually padded image with reflect-101 borders, so every tile has the
//! same area.

use image::GrayImage;

use crate::clip_limit::ClipLimit;

/// Tile grid used by the studio: 8 columns by 8 rows.
pub const TILE_GRID: (usize, usize) = (8, 8);

const HIST_SIZE: usize = 256;

type Histogram = [u32; HIST_SIZE];
type Lut = [u8; HIST_SIZE];

/// Applies CLAHE with the fixed [`TILE_GRID`].
pub fn enhance(src: &GrayImage, clip: ClipLimit) -> GrayImage {
    enhance_with_grid(src, clip, TILE_GRID)
}

/// Applies CLAHE with an arbitrary `(tiles_x, tiles_y)` grid.
///
/// Zero grid dimensions are treated as one. The output always has the
/// dimensions of `src`.
pub fn enhance_with_grid(src: &GrayImage, clip: ClipLimit, grid: (usize, usize)) -> GrayImage {
    let (width, height) = (src.width() as usize, src.height() as usize);
    if width == 0 || height == 0 {
        return GrayImage::new(src.width(), src.height());
    }

    let tiles = (grid.0.max(1), grid.1.max(1));
    let tile_size = ((width + tiles.0 - 1) / tiles.0, (height + tiles.1 - 1) / tiles.1);
    let tile_area = tile_size.0 * tile_size.1;

    let clip_count = clip_count(clip, tile_area);
    let lut_scale = (HIST_SIZE - 1) as f32 / tile_area as f32;

    let mut luts: Vec<Lut> = Vec::with_capacity(tiles.0 * tiles.1);
    for tile_y in 0..tiles.1 {
        for tile_x in 0..tiles.0 {
            let mut hist = tile_histogram(src, tile_size, tile_x, tile_y);
            clip_histogram(&mut hist, clip_count);
            luts.push(build_lut(&hist, lut_scale));
        }
    }

    interpolate(src, &luts, tile_size, tiles)
}

/// Absolute per-bin ceiling for a tile of `tile_area` pixels.
fn clip_count(clip: ClipLimit, tile_area: usize) -> u32 {
    ((clip.value() * tile_area as f64 / HIST_SIZE as f64) as u32).max(1)
}

/// Maps an index on the padded grid back into `0..len`, mirroring about the
/// last sample without repeating it (`... 2 1 0 1 2 ... n-2 n-1 n-2 ...`).
fn reflect_101(i: usize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = i % period;
    if m < len {
        m
    } else {
        period - m
    }
}

fn tile_histogram(
    src: &GrayImage,
    tile_size: (usize, usize),
    tile_x: usize,
    tile_y: usize,
) -> Histogram {
    let (width, height) = (src.width() as usize, src.height() as usize);
    let raw = src.as_raw();
    let x0 = tile_x * tile_size.0;
    let y0 = tile_y * tile_size.1;

    let mut hist: Histogram = [0; HIST_SIZE];
    for y in y0..y0 + tile_size.1 {
        let row = reflect_101(y, height) * width;
        if x0 + tile_size.0 <= width {
            for &p in &raw[row + x0..row + x0 + tile_size.0] {
                hist[p as usize] += 1;
            }
        } else {
            for x in x0..x0 + tile_size.0 {
                hist[raw[row + reflect_101(x, width)] as usize] += 1;
            }
        }
    }
    hist
}

/// Caps every bin at `limit` and spreads the excess back over the whole
/// histogram: an equal batch per bin, then the remainder one count at a time
/// at a fixed stride from bin 0. Total mass is preserved.
fn clip_histogram(hist: &mut Histogram, limit: u32) {
    let mut clipped: usize = 0;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += (*bin - limit) as usize;
            *bin = limit;
        }
    }

    let batch = clipped / HIST_SIZE;
    let mut residual = clipped - batch * HIST_SIZE;
    for bin in hist.iter_mut() {
        *bin += batch as u32;
    }

    if residual != 0 {
        let step = (HIST_SIZE / residual).max(1);
        let mut i = 0;
        while i < HIST_SIZE && residual > 0 {
            hist[i] += 1;
            i += step;
            residual -= 1;
        }
    }
}

fn build_lut(hist: &Histogram, lut_scale: f32) -> Lut {
    let mut lut: Lut = [0; HIST_SIZE];
    let mut sum: u32 = 0;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = (sum as f32 * lut_scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Neighbouring tile indices and the weight of the second one, for a pixel
/// coordinate along one axis.
fn axis_weights(pos: usize, tile_len: usize, n_tiles: usize) -> (usize, usize, f32) {
    let f = pos as f32 / tile_len as f32 - 0.5;
    let lo = f.floor();
    let weight = f - lo;
    let lo = lo as isize;
    let first = lo.max(0) as usize;
    let second = ((lo + 1) as usize).min(n_tiles - 1);
    (first, second, weight)
}

fn interpolate(
    src: &GrayImage,
    luts: &[Lut],
    tile_size: (usize, usize),
    tiles: (usize, usize),
) -> GrayImage {
    let (width, height) = (src.width() as usize, src.height() as usize);
    let raw = src.as_raw();
    let mut dst = GrayImage::new(src.width(), src.height());

    let columns: Vec<(usize, usize, f32)> = (0..width)
        .map(|x| axis_weights(x, tile_size.0, tiles.0))
        .collect();

    let out: &mut [u8] = &mut dst;
    for y in 0..height {
        let (ty1, ty2, ya) = axis_weights(y, tile_size.1, tiles.1);
        let top = &luts[ty1 * tiles.0..(ty1 + 1) * tiles.0];
        let bottom = &luts[ty2 * tiles.0..(ty2 + 1) * tiles.0];

        for (x, &(tx1, tx2, xa)) in columns.iter().enumerate() {
            let p = raw[y * width + x] as usize;
            let upper = f32::from(top[tx1][p]) * (1.0 - xa) + f32::from(top[tx2][p]) * xa;
            let lower = f32::from(bottom[tx1][p]) * (1.0 - xa) + f32::from(bottom[tx2][p]) * xa;
            let value = upper * (1.0 - ya) + lower * ya;
            out[y * width + x] = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    dst
}
