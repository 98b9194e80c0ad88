//! Geometric transforms: extraction, pasting, rotation, shifting, flips,
//! tile permutation, rebinning and subsampling.
//!
//! Every transform re-expresses the bad-pixel mask under the same mapping
//! it applies to the pixels. Window coordinates are 1-based inclusive,
//! FITS-style.

use strum_macros::Display;

use crate::error::{ImageError, ImageResult};
use crate::image::{with_plane, PixelBuffer, PixelData};
use crate::kind::Pixel;
use crate::mask::Mask;
use crate::plane::Plane;


/// Mirror axes for [`PixelBuffer::flip`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Mirror left-right (columns reversed).
    Horizontal,
    /// Mirror top-bottom (rows reversed).
    Vertical,
    /// Mirror across the diagonal y = x (transpose; swaps dimensions).
    Diagonal,
    /// Mirror across the anti-diagonal y = -x (swaps dimensions).
    AntiDiagonal,
}

/// Validate a 1-based inclusive window against the buffer bounds.
fn check_window(
    nx: usize,
    ny: usize,
    llx: usize,
    lly: usize,
    urx: usize,
    ury: usize,
) -> ImageResult<()> {
    if llx < 1 || lly < 1 || urx > nx || ury > ny || llx > urx || lly > ury {
        return Err(ImageError::illegal(format!(
            "window ({llx},{lly})-({urx},{ury}) invalid for {nx}x{ny} image"
        )));
    }
    Ok(())
}

fn extract_plane<T: Pixel>(
    src: &Plane<T>,
    x0: usize,
    y0: usize,
    out_w: usize,
    out_h: usize,
) -> Plane<T> {
    let mut out = Vec::with_capacity(out_w * out_h);
    if out_w == src.width() {
        // Full-width window: one contiguous run.
        out.extend_from_slice(
            &src.as_slice()[y0 * src.width()..(y0 + out_h) * src.width()],
        );
    } else {
        for y in y0..y0 + out_h {
            out.extend_from_slice(&src.row(y)[x0..x0 + out_w]);
        }
    }
    Plane::from_vec(out_w, out_h, out)
}

impl PixelBuffer {
    /// Copy out the 1-based inclusive window `(llx,lly)-(urx,ury)`.
    ///
    /// The mask sub-rectangle is extracted only when the source carries a
    /// mask.
    pub fn extract(
        &self,
        llx: usize,
        lly: usize,
        urx: usize,
        ury: usize,
    ) -> ImageResult<PixelBuffer> {
        check_window(self.width(), self.height(), llx, lly, urx, ury)?;

        let (x0, y0) = (llx - 1, lly - 1);
        let (out_w, out_h) = (urx - llx + 1, ury - lly + 1);

        let data = with_plane!(self.data(), p => {
            PixelData::from(extract_plane(p, x0, y0, out_w, out_h))
        });
        let mask = self
            .mask()
            .map(|m| m.extract(x0, y0, x0 + out_w - 1, y0 + out_h - 1));

        Ok(PixelBuffer::from_data(data, mask))
    }

    /// Paste `src` into `self` with its lower-left pixel at 1-based
    /// `(xpos, ypos)`, silently clipping whatever falls outside.
    ///
    /// Kinds must match. Masks are unioned at the target location; a
    /// destination mask is materialized only when either side carries one.
    pub fn copy_into(&mut self, src: &PixelBuffer, xpos: isize, ypos: isize) -> ImageResult<()> {
        if self.kind() != src.kind() {
            return Err(ImageError::TypeMismatch(self.kind(), src.kind()));
        }

        let (dst_w, dst_h) = (self.width() as isize, self.height() as isize);
        let (src_w, src_h) = (src.width() as isize, src.height() as isize);
        let (x0, y0) = (xpos - 1, ypos - 1);

        // Clipped overlap in destination coordinates.
        let dx_lo = x0.max(0);
        let dy_lo = y0.max(0);
        let dx_hi = (x0 + src_w).min(dst_w);
        let dy_hi = (y0 + src_h).min(dst_h);
        if dx_lo >= dx_hi || dy_lo >= dy_hi {
            return Ok(());
        }

        fn paste<T: Pixel>(
            dst: &mut Plane<T>,
            src: &Plane<T>,
            x0: isize,
            y0: isize,
            dx_lo: isize,
            dy_lo: isize,
            dx_hi: isize,
            dy_hi: isize,
        ) {
            let run = (dx_hi - dx_lo) as usize;
            for dy in dy_lo..dy_hi {
                let sy = (dy - y0) as usize;
                let sx = (dx_lo - x0) as usize;
                let src_row = &src.row(sy)[sx..sx + run];
                dst.row_mut(dy as usize)[dx_lo as usize..dx_lo as usize + run]
                    .copy_from_slice(src_row);
            }
        }

        match (self.data_mut(), src.data()) {
            (PixelData::Int32(d), PixelData::Int32(s)) => {
                paste(d, s, x0, y0, dx_lo, dy_lo, dx_hi, dy_hi)
            }
            (PixelData::Float32(d), PixelData::Float32(s)) => {
                paste(d, s, x0, y0, dx_lo, dy_lo, dx_hi, dy_hi)
            }
            (PixelData::Float64(d), PixelData::Float64(s)) => {
                paste(d, s, x0, y0, dx_lo, dy_lo, dx_hi, dy_hi)
            }
            (PixelData::Complex64(d), PixelData::Complex64(s)) => {
                paste(d, s, x0, y0, dx_lo, dy_lo, dx_hi, dy_hi)
            }
            (PixelData::Complex128(d), PixelData::Complex128(s)) => {
                paste(d, s, x0, y0, dx_lo, dy_lo, dx_hi, dy_hi)
            }
            _ => unreachable!("kind equality checked above"),
        }

        if let Some(src_mask) = src.mask() {
            self.mask_or_materialize().union_at(src_mask, x0, y0);
        }

        Ok(())
    }

    /// Rotate by `rot mod 4` quarter turns clockwise.
    ///
    /// 180 degrees is an in-place reversal; 90/270 run in place on square
    /// buffers and allocate a transposed plane otherwise. Width and height
    /// are swapped for odd turns; the mask is turned identically.
    pub fn turn(&mut self, rot: i32) {
        let r = rot.rem_euclid(4);
        match r {
            0 => {}
            2 => {
                with_plane!(self.data_mut(), p => p.as_mut_slice().reverse());
                if let Some(mask) = self.mask_mut() {
                    let (w, h) = (mask.width(), mask.height());
                    let old = mask.clone();
                    for y in 0..h {
                        for x in 0..w {
                            mask.set_xy(x, y, old.get_xy(w - 1 - x, h - 1 - y));
                        }
                    }
                }
            }
            1 | 3 => {
                let cw = r == 1;
                with_plane!(self.data_mut(), p => quarter_turn(p, cw));
                if let Some(mask) = self.mask_mut() {
                    *mask = quarter_turn_mask(mask, cw);
                }
            }
            _ => unreachable!(),
        }
    }

    /// Shift by whole pixels without wrapping: vacated rows/columns are
    /// zero-filled and marked bad.
    pub fn shift(&mut self, dx: isize, dy: isize) -> ImageResult<()> {
        let (nx, ny) = (self.width(), self.height());
        if dx.unsigned_abs() >= nx || dy.unsigned_abs() >= ny {
            return Err(ImageError::illegal(format!(
                "shift ({dx},{dy}) out of range for {nx}x{ny} image"
            )));
        }
        if dx == 0 && dy == 0 {
            return Ok(());
        }

        fn shifted<T: Pixel>(src: &Plane<T>, dx: isize, dy: isize) -> Plane<T> {
            let (nx, ny) = (src.width(), src.height());
            let mut out = Plane::filled(nx, ny, T::zero());
            for y in 0..ny as isize {
                let sy = y - dy;
                if sy < 0 || sy >= ny as isize {
                    continue;
                }
                for x in 0..nx as isize {
                    let sx = x - dx;
                    if sx < 0 || sx >= nx as isize {
                        continue;
                    }
                    *out.get_mut(x as usize, y as usize) = *src.get(sx as usize, sy as usize);
                }
            }
            out
        }

        let data = with_plane!(self.data(), p => PixelData::from(shifted(p, dx, dy)));

        // Shifted mask: moved bad bits plus the vacated band.
        let old_mask = self.mask().cloned();
        let mut mask = Mask::new(nx, ny);
        for y in 0..ny as isize {
            for x in 0..nx as isize {
                let (sx, sy) = (x - dx, y - dy);
                let vacated =
                    sx < 0 || sx >= nx as isize || sy < 0 || sy >= ny as isize;
                let bad = vacated
                    || old_mask
                        .as_ref()
                        .map(|m| m.get_xy(sx as usize, sy as usize))
                        .unwrap_or(false);
                if bad {
                    mask.set_xy(x as usize, y as usize, true);
                }
            }
        }

        *self.data_mut() = data;
        self.set_mask_unchecked(Some(mask));
        Ok(())
    }

    /// Mirror across the given axis. Each axis is an involution.
    pub fn flip(&mut self, axis: FlipAxis) {
        match axis {
            FlipAxis::Horizontal => {
                with_plane!(self.data_mut(), p => {
                    for y in 0..p.height() {
                        p.row_mut(y).reverse();
                    }
                });
                if let Some(mask) = self.mask_mut() {
                    let (w, h) = (mask.width(), mask.height());
                    let old = mask.clone();
                    for y in 0..h {
                        for x in 0..w {
                            mask.set_xy(x, y, old.get_xy(w - 1 - x, y));
                        }
                    }
                }
            }
            FlipAxis::Vertical => {
                with_plane!(self.data_mut(), p => {
                    let h = p.height();
                    let w = p.width();
                    for y in 0..h / 2 {
                        let top = h - 1 - y;
                        let (a, b) = p.as_mut_slice().split_at_mut(top * w);
                        a[y * w..y * w + w].swap_with_slice(&mut b[..w]);
                    }
                });
                if let Some(mask) = self.mask_mut() {
                    let (w, h) = (mask.width(), mask.height());
                    let old = mask.clone();
                    for y in 0..h {
                        for x in 0..w {
                            mask.set_xy(x, y, old.get_xy(x, h - 1 - y));
                        }
                    }
                }
            }
            FlipAxis::Diagonal => {
                with_plane!(self.data_mut(), p => transpose(p, false));
                if let Some(mask) = self.mask_mut() {
                    *mask = transpose_mask(mask, false);
                }
            }
            FlipAxis::AntiDiagonal => {
                with_plane!(self.data_mut(), p => transpose(p, true));
                if let Some(mask) = self.mask_mut() {
                    *mask = transpose_mask(mask, true);
                }
            }
        }
    }

    /// Partition into `nb_cut x nb_cut` equal tiles and relocate them:
    /// result tile `i` (1-based, row-major from the lower-left) is source
    /// tile `permutation[i - 1]`.
    ///
    /// The permutation is verified by checksum only: every entry must lie
    /// in `[1, nb_cut^2]` and the entries must sum to the triangular number
    /// of `nb_cut^2`. Some non-bijective sequences pass this check; that is
    /// the documented behavior, not an oversight.
    pub fn move_tiles(&mut self, nb_cut: usize, permutation: &[usize]) -> ImageResult<()> {
        let (nx, ny) = (self.width(), self.height());
        if nb_cut == 0 || nx % nb_cut != 0 || ny % nb_cut != 0 {
            return Err(ImageError::illegal(format!(
                "tile count {nb_cut} does not divide {nx}x{ny} image"
            )));
        }

        let n_tiles = nb_cut * nb_cut;
        if permutation.len() != n_tiles {
            return Err(ImageError::illegal(format!(
                "permutation has {} entries, expected {n_tiles}",
                permutation.len()
            )));
        }
        if permutation.iter().any(|&t| t < 1 || t > n_tiles) {
            return Err(ImageError::illegal(
                "permutation entry outside tile range".to_string(),
            ));
        }
        let expected: usize = n_tiles * (n_tiles + 1) / 2;
        let sum: usize = permutation.iter().sum();
        if sum != expected {
            return Err(ImageError::illegal(format!(
                "permutation checksum {sum} != {expected}"
            )));
        }

        let (tile_w, tile_h) = (nx / nb_cut, ny / nb_cut);

        fn permute<T: Pixel>(
            src: &Plane<T>,
            nb_cut: usize,
            tile_w: usize,
            tile_h: usize,
            permutation: &[usize],
        ) -> Plane<T> {
            let mut out = Plane::filled(src.width(), src.height(), T::zero());
            for dst_tile in 0..nb_cut * nb_cut {
                let src_tile = permutation[dst_tile] - 1;
                let (dtx, dty) = (dst_tile % nb_cut, dst_tile / nb_cut);
                let (stx, sty) = (src_tile % nb_cut, src_tile / nb_cut);
                for row in 0..tile_h {
                    let sy = sty * tile_h + row;
                    let dy = dty * tile_h + row;
                    let s = &src.row(sy)[stx * tile_w..(stx + 1) * tile_w];
                    out.row_mut(dy)[dtx * tile_w..(dtx + 1) * tile_w].copy_from_slice(s);
                }
            }
            out
        }

        let data =
            with_plane!(self.data(), p => PixelData::from(permute(p, nb_cut, tile_w, tile_h, permutation)));
        *self.data_mut() = data;

        if let Some(old) = self.mask().cloned() {
            let mut mask = Mask::new(nx, ny);
            for dst_tile in 0..n_tiles {
                let src_tile = permutation[dst_tile] - 1;
                let (dtx, dty) = (dst_tile % nb_cut, dst_tile / nb_cut);
                let (stx, sty) = (src_tile % nb_cut, src_tile / nb_cut);
                for row in 0..tile_h {
                    for col in 0..tile_w {
                        if old.get_xy(stx * tile_w + col, sty * tile_h + row) {
                            mask.set_xy(dtx * tile_w + col, dty * tile_h + row, true);
                        }
                    }
                }
            }
            self.set_mask_unchecked(Some(mask));
        }

        Ok(())
    }

    /// Sum `xstep * ystep` source pixels into each destination pixel over
    /// the largest fully covered sub-region starting at 1-based
    /// `(xstart, ystart)`.
    ///
    /// Mask propagation is pessimistic here: one bad contributor marks the
    /// output pixel bad. This intentionally differs from the reductions'
    /// rescale-by-good-count policy.
    pub fn rebin(
        &self,
        xstart: usize,
        ystart: usize,
        xstep: usize,
        ystep: usize,
    ) -> ImageResult<PixelBuffer> {
        let (nx, ny) = (self.width(), self.height());
        if xstart < 1 || ystart < 1 || xstart > nx || ystart > ny || xstep == 0 || ystep == 0 {
            return Err(ImageError::illegal(format!(
                "rebin start ({xstart},{ystart}) step ({xstep},{ystep}) invalid for {nx}x{ny}"
            )));
        }
        let out_w = (nx - xstart + 1) / xstep;
        let out_h = (ny - ystart + 1) / ystep;
        if out_w == 0 || out_h == 0 {
            return Err(ImageError::illegal(
                "rebin window does not cover a single output pixel".to_string(),
            ));
        }

        fn block_sums<T: Pixel>(
            src: &Plane<T>,
            x0: usize,
            y0: usize,
            xstep: usize,
            ystep: usize,
            out_w: usize,
            out_h: usize,
        ) -> Plane<T> {
            let mut out = Vec::with_capacity(out_w * out_h);
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut acc = num_complex::Complex::new(0.0, 0.0);
                    for sy in 0..ystep {
                        for sx in 0..xstep {
                            acc += src
                                .get(x0 + ox * xstep + sx, y0 + oy * ystep + sy)
                                .to_c64();
                        }
                    }
                    out.push(T::from_c64(acc));
                }
            }
            Plane::from_vec(out_w, out_h, out)
        }

        let (x0, y0) = (xstart - 1, ystart - 1);
        let data = with_plane!(self.data(), p => {
            PixelData::from(block_sums(p, x0, y0, xstep, ystep, out_w, out_h))
        });

        crate::flops::add_flops((out_w * out_h * xstep * ystep) as u64);

        let mask = self.mask().map(|old| {
            let mut m = Mask::new(out_w, out_h);
            for oy in 0..out_h {
                for ox in 0..out_w {
                    'block: for sy in 0..ystep {
                        for sx in 0..xstep {
                            if old.get_xy(x0 + ox * xstep + sx, y0 + oy * ystep + sy) {
                                m.set_xy(ox, oy, true);
                                break 'block;
                            }
                        }
                    }
                }
            }
            m
        });

        Ok(PixelBuffer::from_data(data, mask))
    }

    /// Pure decimation: keep one sample every `xstep/ystep` pixels starting
    /// at (1,1). No averaging; the mask is decimated identically.
    pub fn extract_subsample(&self, xstep: usize, ystep: usize) -> ImageResult<PixelBuffer> {
        let (nx, ny) = (self.width(), self.height());
        if xstep == 0 || ystep == 0 {
            return Err(ImageError::illegal(format!(
                "subsample steps must be positive, got ({xstep},{ystep})"
            )));
        }
        let out_w = (nx - 1) / xstep + 1;
        let out_h = (ny - 1) / ystep + 1;

        fn decimate<T: Pixel>(
            src: &Plane<T>,
            xstep: usize,
            ystep: usize,
            out_w: usize,
            out_h: usize,
        ) -> Plane<T> {
            let mut out = Vec::with_capacity(out_w * out_h);
            for oy in 0..out_h {
                for ox in 0..out_w {
                    out.push(*src.get(ox * xstep, oy * ystep));
                }
            }
            Plane::from_vec(out_w, out_h, out)
        }

        let data = with_plane!(self.data(), p => {
            PixelData::from(decimate(p, xstep, ystep, out_w, out_h))
        });

        let mask = self.mask().map(|old| {
            let mut m = Mask::new(out_w, out_h);
            for oy in 0..out_h {
                for ox in 0..out_w {
                    if old.get_xy(ox * xstep, oy * ystep) {
                        m.set_xy(ox, oy, true);
                    }
                }
            }
            m
        });

        Ok(PixelBuffer::from_data(data, mask))
    }
}

/// Quarter-turn a plane clockwise or counter-clockwise.
///
/// Square planes rotate in place through four-way element cycles; non-square
/// planes rebuild into a transposed allocation.
fn quarter_turn<T: Pixel>(plane: &mut Plane<T>, cw: bool) {
    let (w, h) = (plane.width(), plane.height());

    if w == h {
        let n = w;
        let s = plane.as_mut_slice();
        for ring in 0..n / 2 {
            for i in ring..n - 1 - ring {
                // Positions of one four-cycle, clockwise order.
                let a = ring * n + i;
                let b = i * n + (n - 1 - ring);
                let c = (n - 1 - ring) * n + (n - 1 - i);
                let d = (n - 1 - i) * n + ring;
                if cw {
                    // Values travel a -> d -> c -> b -> a.
                    let tmp = s[a];
                    s[a] = s[b];
                    s[b] = s[c];
                    s[c] = s[d];
                    s[d] = tmp;
                } else {
                    let tmp = s[d];
                    s[d] = s[c];
                    s[c] = s[b];
                    s[b] = s[a];
                    s[a] = tmp;
                }
            }
        }
        return;
    }

    let mut out = vec![T::zero(); w * h];
    for y in 0..h {
        for x in 0..w {
            // Clockwise (y up): (x, y) -> (y, w - 1 - x); the inverse for ccw.
            let (ox, oy) = if cw { (y, w - 1 - x) } else { (h - 1 - y, x) };
            out[oy * h + ox] = *plane.get(x, y);
        }
    }
    plane.replace(h, w, out);
}

fn quarter_turn_mask(mask: &Mask, cw: bool) -> Mask {
    let (w, h) = (mask.width(), mask.height());
    let mut out = Mask::new(h, w);
    for y in 0..h {
        for x in 0..w {
            if mask.get_xy(x, y) {
                let (ox, oy) = if cw { (y, w - 1 - x) } else { (h - 1 - y, x) };
                out.set_xy(ox, oy, true);
            }
        }
    }
    out
}

/// Transpose (`anti == false`, mirror across y = x) or anti-transpose
/// (`anti == true`, mirror across y = -x). Swaps the dimensions.
fn transpose<T: Pixel>(plane: &mut Plane<T>, anti: bool) {
    let (w, h) = (plane.width(), plane.height());
    let mut out = vec![T::zero(); w * h];
    for y in 0..h {
        for x in 0..w {
            let (ox, oy) = if anti {
                (h - 1 - y, w - 1 - x)
            } else {
                (y, x)
            };
            out[oy * h + ox] = *plane.get(x, y);
        }
    }
    plane.replace(h, w, out);
}

fn transpose_mask(mask: &Mask, anti: bool) -> Mask {
    let (w, h) = (mask.width(), mask.height());
    let mut out = Mask::new(h, w);
    for y in 0..h {
        for x in 0..w {
            if mask.get_xy(x, y) {
                let (ox, oy) = if anti {
                    (h - 1 - y, w - 1 - x)
                } else {
                    (y, x)
                };
                out.set_xy(ox, oy, true);
            }
        }
    }
    out
}
