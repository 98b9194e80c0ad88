//! Elementwise arithmetic over pixel buffers.
//!
//! Every binary operator exists in a create form (`*_new`, result kind is
//! the first operand's kind) and an in-place form (`*_assign`), both built
//! on one private kernel. Values are computed in the `Complex<f64>` domain
//! and cast back to the storage kind; bitwise operators run directly on
//! `Int32` planes.
//!
//! Mask rule: the result mask is the union of the operand masks; division
//! additionally rejects every zero-divisor position. Two maskless inputs
//! produce a maskless result.

use num_complex::Complex;
use strum_macros::Display;

use crate::error::{ImageError, ImageResult};
use crate::image::{check_same_dims, union_masks, PixelBuffer, PixelData};
use crate::kind::PixelKind;
use crate::mask::Mask;
use crate::stats::aggregates;


/// Elementwise binary operator selector for the shared kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Hypot,
    And,
    Or,
    Xor,
}

impl BinOp {
    fn name(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Min => "min",
            BinOp::Hypot => "hypot",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
        }
    }

    fn is_bitwise(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or | BinOp::Xor)
    }
}

/// Normalization modes for [`PixelBuffer::normalize`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Subtract the minimum, divide by `max - min`: range becomes `[0, 1]`.
    Scale,
    /// Divide by the mean of the good pixels.
    Mean,
    /// Divide by the sum of the good pixels.
    Flux,
    /// Divide by the sum of absolute values of the good pixels.
    AbsFlux,
}

fn validate_kinds(op: BinOp, a: PixelKind, b: PixelKind) -> ImageResult<()> {
    if op.is_bitwise() {
        // A complex operand can never pair with a bitwise operator; a real
        // non-Int32 operand is a kind the operator does not support.
        if a.is_complex() || b.is_complex() {
            return Err(ImageError::TypeMismatch(a, b));
        }
        if a != PixelKind::Int32 {
            return Err(ImageError::InvalidType(a, "bitwise operators"));
        }
        if b != PixelKind::Int32 {
            return Err(ImageError::InvalidType(b, "bitwise operators"));
        }
    }

    if matches!(op, BinOp::Min | BinOp::Hypot) {
        if a.is_complex() {
            return Err(ImageError::InvalidType(a, op.name()));
        }
        if b.is_complex() {
            return Err(ImageError::InvalidType(b, op.name()));
        }
    }

    Ok(())
}

/// The shared elementwise kernel: computes the result plane and mask of
/// `a op b` without touching either operand.
fn binary_kernel(
    a: &PixelBuffer,
    b: &PixelBuffer,
    op: BinOp,
) -> ImageResult<(PixelData, Option<Mask>)> {
    check_same_dims(a, b)?;
    validate_kinds(op, a.kind(), b.kind())?;

    let (nx, ny) = (a.width(), a.height());
    let len = nx * ny;

    if op.is_bitwise() {
        let pa = a.as_i32().expect("kind validated");
        let pb = b.as_i32().expect("kind validated");
        let out: Vec<i32> = pa
            .as_slice()
            .iter()
            .zip(pb.as_slice().iter())
            .map(|(&x, &y)| match op {
                BinOp::And => x & y,
                BinOp::Or => x | y,
                BinOp::Xor => x ^ y,
                _ => unreachable!(),
            })
            .collect();

        let mask = union_masks(a.mask(), b.mask());
        return Ok((
            PixelData::Int32(crate::plane::Plane::from_vec(nx, ny, out)),
            mask,
        ));
    }

    let rhs = b.data().to_c64_vec();
    let mut values = Vec::with_capacity(len);
    let mut zero_positions: Vec<usize> = Vec::new();

    for idx in 0..len {
        let x = a.data().get_c64(idx);
        let y = rhs[idx];
        let v = match op {
            BinOp::Add => x + y,
            BinOp::Sub => x - y,
            BinOp::Mul => x * y,
            BinOp::Div => {
                if y.re == 0.0 && y.im == 0.0 {
                    zero_positions.push(idx);
                    Complex::new(0.0, 0.0)
                } else {
                    x / y
                }
            }
            BinOp::Min => Complex::new(x.re.min(y.re), 0.0),
            BinOp::Hypot => Complex::new(x.re.hypot(y.re), 0.0),
            BinOp::And | BinOp::Or | BinOp::Xor => unreachable!(),
        };
        values.push(v);
    }

    // The whole operation fails only when every divisor is zero.
    if op == BinOp::Div && zero_positions.len() == len {
        return Err(ImageError::DivisionByZero);
    }

    crate::flops::add_flops(len as u64);

    let mut mask = union_masks(a.mask(), b.mask());
    if !zero_positions.is_empty() {
        let m = mask.get_or_insert_with(|| Mask::new(nx, ny));
        for idx in zero_positions {
            m.set(idx, true);
        }
    }

    Ok((PixelData::from_c64_slice(a.kind(), nx, ny, &values), mask))
}

macro_rules! binary_ops {
    ($(($new:ident, $assign:ident, $op:expr)),+ $(,)?) => {
        impl PixelBuffer {
            $(
                pub fn $new(&self, other: &PixelBuffer) -> ImageResult<PixelBuffer> {
                    let (data, mask) = binary_kernel(self, other, $op)?;
                    Ok(PixelBuffer::from_data(data, mask))
                }

                /// In-place form; the operand is untouched when the call
                /// fails.
                pub fn $assign(&mut self, other: &PixelBuffer) -> ImageResult<()> {
                    let (data, mask) = binary_kernel(self, other, $op)?;
                    let (d, m) = self.parts_mut();
                    *d = data;
                    *m = mask;
                    Ok(())
                }
            )+
        }
    };
}

binary_ops!(
    (add_new, add_assign, BinOp::Add),
    (sub_new, sub_assign, BinOp::Sub),
    (mul_new, mul_assign, BinOp::Mul),
    (div_new, div_assign, BinOp::Div),
    (min_new, min_assign, BinOp::Min),
    (hypot_new, hypot_assign, BinOp::Hypot),
    (and_new, and_assign, BinOp::And),
    (or_new, or_assign, BinOp::Or),
    (xor_new, xor_assign, BinOp::Xor),
);

/// Outcome of one scalar-kernel element.
enum Elem {
    Value(Complex<f64>),
    Bad,
}

impl PixelBuffer {
    /// Run a scalar pass in place: every element is computed in double
    /// precision and cast back; elements the operation is undefined for are
    /// forced to zero and rejected.
    fn scalar_pass(&mut self, f: impl Fn(Complex<f64>) -> Elem) {
        let len = self.data().len();
        let mut bad_positions: Vec<usize> = Vec::new();

        for idx in 0..len {
            let v = self.data().get_c64(idx);
            match f(v) {
                Elem::Value(out) => self.data_mut().set_c64(idx, out),
                Elem::Bad => {
                    self.data_mut().set_c64(idx, Complex::new(0.0, 0.0));
                    bad_positions.push(idx);
                }
            }
        }

        crate::flops::add_flops(len as u64);

        if !bad_positions.is_empty() {
            let mask = self.mask_or_materialize();
            for idx in bad_positions {
                mask.set(idx, true);
            }
        }
    }

    fn require_real(&self, operation: &'static str) -> ImageResult<()> {
        if self.kind().is_complex() {
            return Err(ImageError::InvalidType(self.kind(), operation));
        }
        Ok(())
    }

    pub fn add_scalar(&mut self, s: f64) -> ImageResult<()> {
        self.scalar_pass(|v| Elem::Value(v + s));
        Ok(())
    }

    pub fn sub_scalar(&mut self, s: f64) -> ImageResult<()> {
        self.scalar_pass(|v| Elem::Value(v - s));
        Ok(())
    }

    pub fn mul_scalar(&mut self, s: f64) -> ImageResult<()> {
        self.scalar_pass(|v| Elem::Value(v * s));
        Ok(())
    }

    /// Divide by a scalar. An exactly-zero scalar fails atomically: no pixel
    /// is modified.
    pub fn div_scalar(&mut self, s: f64) -> ImageResult<()> {
        if s == 0.0 {
            return Err(ImageError::DivisionByZero);
        }
        self.scalar_pass(|v| Elem::Value(v / s));
        Ok(())
    }

    /// Logarithm of every pixel in the given base. Non-positive pixels are
    /// rejected and zeroed; the pass continues.
    pub fn log(&mut self, base: f64) -> ImageResult<()> {
        self.require_real("log")?;
        if base <= 0.0 || base == 1.0 {
            return Err(ImageError::illegal(format!(
                "logarithm base must be positive and != 1, got {base}"
            )));
        }

        let inv_ln_base = 1.0 / base.ln();
        self.scalar_pass(|v| {
            if v.re <= 0.0 {
                Elem::Bad
            } else {
                Elem::Value(Complex::new(v.re.ln() * inv_ln_base, 0.0))
            }
        });
        Ok(())
    }

    /// Exponential: every pixel `p` becomes `base^p`. Undefined combinations
    /// (negative base with non-integer pixel, `0^negative`) are rejected.
    pub fn exp(&mut self, base: f64) -> ImageResult<()> {
        self.require_real("exp")?;

        self.scalar_pass(|v| {
            let p = v.re;
            if base < 0.0 && p.fract() != 0.0 {
                Elem::Bad
            } else if base == 0.0 && p < 0.0 {
                Elem::Bad
            } else {
                Elem::Value(Complex::new(base.powf(p), 0.0))
            }
        });
        Ok(())
    }

    /// Power: every pixel `p` becomes `p^exponent`. Undefined combinations
    /// (negative pixel with non-integer exponent, `0^negative`) are
    /// rejected.
    pub fn pow(&mut self, exponent: f64) -> ImageResult<()> {
        self.require_real("pow")?;

        self.scalar_pass(|v| {
            let p = v.re;
            if p < 0.0 && exponent.fract() != 0.0 {
                Elem::Bad
            } else if p == 0.0 && exponent < 0.0 {
                Elem::Bad
            } else {
                Elem::Value(Complex::new(p.powf(exponent), 0.0))
            }
        });
        Ok(())
    }

    /// Normalize the buffer in place according to `mode`.
    ///
    /// Aggregates are taken over good pixels only, then the transform is
    /// applied to every pixel. A zero denominator (flat image for `Scale`,
    /// zero mean/flux otherwise) fails with `DivisionByZero` before any
    /// mutation.
    pub fn normalize(&mut self, mode: NormalizeMode) -> ImageResult<()> {
        self.require_real("normalize")?;
        let agg = aggregates(self)?;

        let (offset, denom) = match mode {
            NormalizeMode::Scale => (agg.min, agg.max - agg.min),
            NormalizeMode::Mean => (0.0, agg.mean),
            NormalizeMode::Flux => (0.0, agg.sum),
            NormalizeMode::AbsFlux => (0.0, agg.abs_sum),
        };
        if denom == 0.0 {
            return Err(ImageError::DivisionByZero);
        }

        tracing::debug!(%mode, offset, denom, "normalizing image");

        let inv = 1.0 / denom;
        self.scalar_pass(|v| Elem::Value(Complex::new((v.re - offset) * inv, 0.0)));
        Ok(())
    }
}
