use crate::error::ImageError;
use crate::fourier::{fft, fft_image, FftOptions};
use crate::image::PixelBuffer;
use crate::kind::PixelKind;

#[test]
fn roundtrip_scales_by_product_of_dims() {
    // Property 5: unnormalized forward + inverse multiplies by the product
    // of the dimensions.
    let dims = [4usize, 8];
    let n: usize = dims.iter().product();
    let original: Vec<f64> = (0..n).map(|i| (i as f64) * 0.37 - 3.0).collect();

    let mut re = original.clone();
    let mut im = vec![0.0; n];
    fft(&mut re, &mut im, &dims, 1).unwrap();
    fft(&mut re, &mut im, &dims, -1).unwrap();

    let scale = n as f64;
    for i in 0..n {
        assert!(
            (re[i] - original[i] * scale).abs() < 1e-9,
            "re[{i}] = {}, expected {}",
            re[i],
            original[i] * scale
        );
        assert!(im[i].abs() < 1e-9);
    }
}

#[test]
fn dc_component_is_sum() {
    let dims = [4usize, 4];
    let mut re: Vec<f64> = (1..=16).map(|v| v as f64).collect();
    let mut im = vec![0.0; 16];
    let expected: f64 = re.iter().sum();

    fft(&mut re, &mut im, &dims, 1).unwrap();

    assert!((re[0] - expected).abs() < 1e-9);
    assert!(im[0].abs() < 1e-9);
}

#[test]
fn one_dimensional_impulse() {
    // FFT of a unit impulse is flat.
    let mut re = vec![1.0, 0.0, 0.0, 0.0];
    let mut im = vec![0.0; 4];
    fft(&mut re, &mut im, &[4], 1).unwrap();

    for k in 0..4 {
        assert!((re[k] - 1.0).abs() < 1e-12);
        assert!(im[k].abs() < 1e-12);
    }
}

#[test]
fn three_dimensional_roundtrip() {
    let dims = [2usize, 4, 2];
    let n: usize = dims.iter().product();
    let original: Vec<f64> = (0..n).map(|i| ((i * 7 + 3) % 11) as f64).collect();

    let mut re = original.clone();
    let mut im = vec![0.0; n];
    fft(&mut re, &mut im, &dims, 1).unwrap();
    fft(&mut re, &mut im, &dims, -1).unwrap();

    let scale = n as f64;
    for i in 0..n {
        assert!((re[i] - original[i] * scale).abs() < 1e-9);
    }
}

#[test]
fn non_power_of_two_rejected() {
    let mut re = vec![0.0; 6];
    let mut im = vec![0.0; 6];
    assert!(matches!(
        fft(&mut re, &mut im, &[6], 1),
        Err(ImageError::IllegalInput(_))
    ));
    assert!(matches!(
        fft(&mut re, &mut im, &[2, 3], 1),
        Err(ImageError::IllegalInput(_))
    ));
}

#[test]
fn invalid_sign_rejected() {
    let mut re = vec![0.0; 4];
    let mut im = vec![0.0; 4];
    assert_eq!(
        fft(&mut re, &mut im, &[4], 2).unwrap_err(),
        ImageError::UnsupportedMode("fft sign 2".to_string())
    );
    assert_eq!(
        fft(&mut re, &mut im, &[4], 0).unwrap_err(),
        ImageError::UnsupportedMode("fft sign 0".to_string())
    );
}

#[test]
fn length_mismatch_rejected() {
    let mut re = vec![0.0; 4];
    let mut im = vec![0.0; 8];
    assert!(matches!(
        fft(&mut re, &mut im, &[4], 1),
        Err(ImageError::IllegalInput(_))
    ));
}

#[test]
fn image_wrapper_roundtrip_normalizes() {
    let values: Vec<f64> = (0..16).map(|i| (i as f64) * 0.5 + 1.0).collect();
    let mut re = PixelBuffer::wrap(4, 4, values.clone()).unwrap();
    let mut im = PixelBuffer::new(4, 4, PixelKind::Float64).unwrap();

    let options = FftOptions::default();
    fft_image(&mut re, &mut im, 1, &options).unwrap();
    fft_image(&mut re, &mut im, -1, &options).unwrap();

    for y in 1..=4 {
        for x in 1..=4 {
            let expected = values[(y - 1) * 4 + (x - 1)];
            assert!((re.get(x, y).unwrap() - expected).abs() < 1e-9);
            assert!(im.get(x, y).unwrap().abs() < 1e-9);
        }
    }
}

#[test]
fn image_wrapper_opt_out_of_normalization() {
    let mut re = PixelBuffer::wrap(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    let mut im = PixelBuffer::new(2, 2, PixelKind::Float64).unwrap();

    let options = FftOptions {
        normalize: false,
        swap_quadrants: false,
    };
    fft_image(&mut re, &mut im, 1, &options).unwrap();
    fft_image(&mut re, &mut im, -1, &options).unwrap();

    // Unnormalized: scaled by nx * ny = 4.
    assert!((re.get(1, 1).unwrap() - 4.0).abs() < 1e-9);
    assert!((re.get(2, 2).unwrap() - 16.0).abs() < 1e-9);
}

#[test]
fn image_wrapper_quadrant_swap_roundtrip() {
    let values: Vec<f64> = (0..16).map(|i| ((i * 5 + 2) % 9) as f64).collect();
    let mut re = PixelBuffer::wrap(4, 4, values.clone()).unwrap();
    let mut im = PixelBuffer::new(4, 4, PixelKind::Float64).unwrap();

    let options = FftOptions {
        normalize: true,
        swap_quadrants: true,
    };
    fft_image(&mut re, &mut im, 1, &options).unwrap();
    fft_image(&mut re, &mut im, -1, &options).unwrap();

    for y in 1..=4 {
        for x in 1..=4 {
            let expected = values[(y - 1) * 4 + (x - 1)];
            assert!((re.get(x, y).unwrap() - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn image_wrapper_quadrant_swap_centers_dc() {
    // A constant image transforms to a single DC spike; swapping quadrants
    // moves it from (1,1) to the upper-right quadrant corner.
    let mut re = PixelBuffer::wrap(4, 4, vec![1.0; 16]).unwrap();
    let mut im = PixelBuffer::new(4, 4, PixelKind::Float64).unwrap();

    let options = FftOptions {
        normalize: true,
        swap_quadrants: true,
    };
    fft_image(&mut re, &mut im, 1, &options).unwrap();

    assert_eq!(re.get(1, 1).unwrap(), 0.0);
    assert_eq!(re.get(3, 3).unwrap(), 16.0);
}

#[test]
fn image_wrapper_validates_kinds_and_dims() {
    let mut re = PixelBuffer::new(4, 4, PixelKind::Float32).unwrap();
    let mut im = PixelBuffer::new(4, 4, PixelKind::Float64).unwrap();
    assert_eq!(
        fft_image(&mut re, &mut im, 1, &FftOptions::default()).unwrap_err(),
        ImageError::InvalidType(PixelKind::Float32, "fft_image")
    );

    let mut re = PixelBuffer::new(4, 4, PixelKind::Float64).unwrap();
    let mut im = PixelBuffer::new(4, 2, PixelKind::Float64).unwrap();
    assert_eq!(
        fft_image(&mut re, &mut im, 1, &FftOptions::default()).unwrap_err(),
        ImageError::IncompatibleInput(4, 4, 4, 2)
    );

    let mut re = PixelBuffer::new(6, 4, PixelKind::Float64).unwrap();
    let mut im = PixelBuffer::new(6, 4, PixelKind::Float64).unwrap();
    assert!(matches!(
        fft_image(&mut re, &mut im, 1, &FftOptions::default()),
        Err(ImageError::IllegalInput(_))
    ));
}
