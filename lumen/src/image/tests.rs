use num_complex::Complex;

use crate::error::ImageError;
use crate::image::PixelBuffer;
use crate::kind::PixelKind;
use crate::mask::Mask;

#[test]
fn new_allocates_zero_filled() {
    let img = PixelBuffer::new(4, 3, PixelKind::Float32).unwrap();
    assert_eq!(img.width(), 4);
    assert_eq!(img.height(), 3);
    assert_eq!(img.kind(), PixelKind::Float32);
    assert!(img.mask().is_none());
    assert_eq!(img.get(1, 1).unwrap(), 0.0);
    assert_eq!(img.get(4, 3).unwrap(), 0.0);
}

#[test]
fn new_rejects_zero_dimensions() {
    assert!(matches!(
        PixelBuffer::new(0, 5, PixelKind::Int32),
        Err(ImageError::IllegalInput(_))
    ));
    assert!(matches!(
        PixelBuffer::new(5, 0, PixelKind::Int32),
        Err(ImageError::IllegalInput(_))
    ));
}

#[test]
fn wrap_adopts_storage() {
    let img = PixelBuffer::wrap(3, 2, vec![1i32, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(img.kind(), PixelKind::Int32);
    assert_eq!(img.get(1, 1).unwrap(), 1.0);
    assert_eq!(img.get(3, 1).unwrap(), 3.0);
    assert_eq!(img.get(1, 2).unwrap(), 4.0);
    assert_eq!(img.get(3, 2).unwrap(), 6.0);
}

#[test]
fn wrap_rejects_length_mismatch() {
    assert!(matches!(
        PixelBuffer::wrap(3, 2, vec![1.0f64; 5]),
        Err(ImageError::IllegalInput(_))
    ));
}

#[test]
fn get_set_one_based_bounds() {
    let mut img = PixelBuffer::new(3, 3, PixelKind::Float64).unwrap();
    img.set(2, 2, 7.5).unwrap();
    assert_eq!(img.get(2, 2).unwrap(), 7.5);

    assert_eq!(
        img.get(0, 1),
        Err(ImageError::AccessOutOfRange(0, 1, 3, 3))
    );
    assert_eq!(
        img.get(4, 1),
        Err(ImageError::AccessOutOfRange(4, 1, 3, 3))
    );
    assert_eq!(
        img.set(1, 4, 0.0),
        Err(ImageError::AccessOutOfRange(1, 4, 3, 3))
    );
}

#[test]
fn complex_access() {
    let mut img = PixelBuffer::new(2, 2, PixelKind::Complex128).unwrap();
    img.set_complex(1, 2, 1.5, -2.5).unwrap();
    assert_eq!(img.get_complex(1, 2).unwrap(), (1.5, -2.5));
    // `get` returns the real part
    assert_eq!(img.get(1, 2).unwrap(), 1.5);
}

#[test]
fn int_set_truncates() {
    let mut img = PixelBuffer::new(2, 2, PixelKind::Int32).unwrap();
    img.set(1, 1, 4.9).unwrap();
    assert_eq!(img.get(1, 1).unwrap(), 4.0);
}

#[test]
fn reject_materializes_mask_lazily() {
    let mut img = PixelBuffer::new(3, 3, PixelKind::Float32).unwrap();
    assert!(img.mask().is_none());
    assert!(img.is_good(2, 2).unwrap());

    img.reject(2, 2).unwrap();
    assert!(img.mask().is_some());
    assert!(!img.is_good(2, 2).unwrap());
    assert!(img.is_good(1, 1).unwrap());
    assert_eq!(img.mask().unwrap().count_bad(), 1);
}

#[test]
fn all_good_mask_stays_materialized() {
    let mut img = PixelBuffer::new(2, 2, PixelKind::Float32).unwrap();
    img.reject(1, 1).unwrap();
    img.mask_mut().unwrap().set_xy(0, 0, false);

    // Every pixel is good again, but the mask is not collapsed to None.
    assert!(img.mask().unwrap().is_all_good());
    assert!(img.mask().is_some());
}

#[test]
fn set_mask_checks_dimensions() {
    let mut img = PixelBuffer::new(3, 2, PixelKind::Float32).unwrap();
    assert_eq!(
        img.set_mask(Mask::new(2, 2)),
        Err(ImageError::IncompatibleInput(3, 2, 2, 2))
    );
    assert!(img.set_mask(Mask::new(3, 2)).is_ok());
}

#[test]
fn duplicate_copies_pixels_and_mask() {
    let mut img = PixelBuffer::wrap(2, 2, vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
    img.reject(1, 1).unwrap();

    let mut copy = img.duplicate();
    assert_eq!(copy.get(2, 2).unwrap(), 4.0);
    assert!(!copy.is_good(1, 1).unwrap());

    // Deep copy: mutating the duplicate leaves the original untouched.
    copy.set(2, 2, 9.0).unwrap();
    copy.reject(2, 1).unwrap();
    assert_eq!(img.get(2, 2).unwrap(), 4.0);
    assert!(img.is_good(2, 1).unwrap());
}

#[test]
fn wrap_complex_kinds() {
    let img = PixelBuffer::wrap(1, 2, vec![Complex::new(1.0f32, 2.0), Complex::new(3.0, 4.0)])
        .unwrap();
    assert_eq!(img.kind(), PixelKind::Complex64);
    assert_eq!(img.get_complex(1, 2).unwrap(), (3.0, 4.0));
}
