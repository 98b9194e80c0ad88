//! Generation of the standard interpolation kernel families.
//!
//! Profiles are tabulated once into a 2048-sample table over the standard
//! radius of 2.0 pixels and then read back by quantized distance, the same
//! table-lookup scheme the engine's interpolation primitive expects.

use std::f64::consts::PI;
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{ImageError, ImageResult};
use crate::resample::KernelProfile;

/// Number of samples tabulated per profile.
pub const KERNEL_SAMPLES: usize = 2048;

/// Radius of the generated profiles, in pixels.
pub const KERNEL_RADIUS: f64 = 2.0;

/// Sharpness of the tanh kernel's transition edges.
const TANH_STEEPNESS: f64 = 5.0;

/// The kernel families the engine can tabulate.
#[derive(Debug, Display, EnumString, EnumIter, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum KernelFamily {
    /// The default profile (tanh).
    Default,
    /// Hyperbolic-tangent window: a boxcar with soft edges.
    Tanh,
    /// sin(pi x) / (pi x).
    Sinc,
    /// Squared sinc.
    Sinc2,
    /// Sinc windowed by a wider sinc.
    Lanczos,
    /// Hamming-windowed sinc.
    Hamming,
    /// Hann-windowed sinc.
    Hann,
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        return 1.0;
    }
    let px = PI * x;
    px.sin() / px
}

fn kernel_value(family: KernelFamily, x: f64) -> f64 {
    match family {
        KernelFamily::Default | KernelFamily::Tanh => {
            0.5 * ((TANH_STEEPNESS * (x + 0.5)).tanh() - (TANH_STEEPNESS * (x - 0.5)).tanh())
        }
        KernelFamily::Sinc => sinc(x),
        KernelFamily::Sinc2 => {
            let s = sinc(x);
            s * s
        }
        KernelFamily::Lanczos => {
            if x.abs() >= KERNEL_RADIUS {
                0.0
            } else {
                sinc(x) * sinc(x / KERNEL_RADIUS)
            }
        }
        KernelFamily::Hamming => sinc(x) * (0.54 + 0.46 * (PI * x / KERNEL_RADIUS).cos()),
        KernelFamily::Hann => sinc(x) * (0.5 + 0.5 * (PI * x / KERNEL_RADIUS).cos()),
    }
}

/// Tabulate a kernel family into a ready-to-use profile.
pub fn generate(family: KernelFamily) -> KernelProfile {
    let mut samples = Vec::with_capacity(KERNEL_SAMPLES);
    for i in 0..KERNEL_SAMPLES {
        let x = i as f64 * KERNEL_RADIUS / (KERNEL_SAMPLES - 1) as f64;
        samples.push(kernel_value(family, x));
    }
    KernelProfile::new(samples, KERNEL_RADIUS).expect("generated table is never empty")
}

/// Tabulate a kernel family given by name.
///
/// Unknown names fail with `UnsupportedMode`.
pub fn generate_named(name: &str) -> ImageResult<KernelProfile> {
    let family = KernelFamily::from_str(name)
        .map_err(|_| ImageError::UnsupportedMode(name.to_string()))?;
    Ok(generate(family))
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn profiles_peak_at_center() {
        for family in KernelFamily::iter() {
            let profile = generate(family);
            let center = profile.value(0.0);
            assert!(center > 0.9, "{family} center = {center}");
            // Monotone enough near zero that the center dominates.
            assert!(center >= profile.value(0.4), "{family}");
        }
    }

    #[test]
    fn sinc_vanishes_at_integer_distances() {
        let profile = generate(KernelFamily::Sinc);
        assert!(profile.value(1.0).abs() < 1e-3);
        assert!(profile.value(2.0).abs() < 1e-3);
    }

    #[test]
    fn lanczos_vanishes_at_radius() {
        let profile = generate(KernelFamily::Lanczos);
        assert!(profile.value(1.0).abs() < 1e-3);
        assert!(profile.value(2.0).abs() < 1e-3);
    }

    #[test]
    fn value_beyond_radius_is_zero() {
        let profile = generate(KernelFamily::Tanh);
        assert_eq!(profile.value(2.5), 0.0);
        assert_eq!(profile.value(-3.0), 0.0);
    }

    #[test]
    fn named_lookup() {
        assert!(generate_named("lanczos").is_ok());
        assert!(generate_named("tanh").is_ok());
        assert_eq!(
            generate_named("boxcar").unwrap_err(),
            ImageError::UnsupportedMode("boxcar".to_string())
        );
    }
}
