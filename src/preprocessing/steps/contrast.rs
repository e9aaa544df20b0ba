use super::StepError;
use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Contrast-limited adaptive histogram equalization (CLAHE)
///
/// The image is split into a `tile_grid` of tiles, each tile gets its own
/// equalization curve with histogram bins capped at
/// `clip_limit * tile_area / 256`, and every pixel is bilinearly
/// interpolated between the curves of the four nearest tiles.
pub fn clahe(
    image: &GrayImage,
    clip_limit: f32,
    tile_grid: (u32, u32),
) -> Result<GrayImage, StepError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(StepError::EmptyImage { width, height });
    }
    if tile_grid.0 == 0 || tile_grid.1 == 0 {
        return Err(StepError::InvalidParameter(format!(
            "tile grid must be non-empty, got {}x{}",
            tile_grid.0, tile_grid.1
        )));
    }

    // Tiny images get fewer tiles so no tile is empty
    let grid_x = tile_grid.0.min(width);
    let grid_y = tile_grid.1.min(height);

    let x_bounds = tile_bounds(width, grid_x);
    let y_bounds = tile_bounds(height, grid_y);

    let mut luts = Vec::with_capacity((grid_x * grid_y) as usize);
    for ty in 0..grid_y as usize {
        for tx in 0..grid_x as usize {
            let mut hist = [0u32; BINS];
            for y in y_bounds[ty]..y_bounds[ty + 1] {
                for x in x_bounds[tx]..x_bounds[tx + 1] {
                    hist[image.get_pixel(x, y).0[0] as usize] += 1;
                }
            }

            let area = (x_bounds[tx + 1] - x_bounds[tx]) * (y_bounds[ty + 1] - y_bounds[ty]);
            if clip_limit > 0.0 {
                let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
                clip_histogram(&mut hist, limit);
            }
            luts.push(build_lut(&hist, area));
        }
    }

    let tile_w = width as f32 / grid_x as f32;
    let tile_h = height as f32 / grid_y as f32;
    let lut = |tx: usize, ty: usize, v: usize| luts[ty * grid_x as usize + tx][v] as f32;

    Ok(GrayImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y).0[0] as usize;

        let fx = x as f32 / tile_w - 0.5;
        let fy = y as f32 / tile_h - 0.5;
        let (tx1, tx2, ax) = neighbours(fx, grid_x);
        let (ty1, ty2, ay) = neighbours(fy, grid_y);

        let top = lut(tx1, ty1, v) * (1.0 - ax) + lut(tx2, ty1, v) * ax;
        let bottom = lut(tx1, ty2, v) * (1.0 - ax) + lut(tx2, ty2, v) * ax;
        let value = top * (1.0 - ay) + bottom * ay;

        Luma([value.round().clamp(0.0, 255.0) as u8])
    }))
}

fn tile_bounds(extent: u32, tiles: u32) -> Vec<u32> {
    (0..=tiles as u64)
        .map(|i| (i * extent as u64 / tiles as u64) as u32)
        .collect()
}

/// Neighbouring tile indices along one axis plus the weight of the second
fn neighbours(f: f32, tiles: u32) -> (usize, usize, f32) {
    let first = f.floor();
    let weight = f - first;
    let last = tiles as i64 - 1;
    let t1 = (first as i64).clamp(0, last) as usize;
    let t2 = (first as i64 + 1).clamp(0, last) as usize;
    (t1, t2, weight)
}

/// Cap every bin at `limit` and spread the excess evenly over all bins
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess % BINS as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS / residual as usize).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

fn build_lut(hist: &[u32; BINS], area: u32) -> [u8; BINS] {
    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; BINS];
    let mut sum = 0u32;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        sum += count;
        *entry = (sum as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
