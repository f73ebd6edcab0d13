use super::*;

#[test]
fn frame_rejects_mismatched_length() {
    assert!(Frame::new(2, 2, vec![0; 15], 0.0).is_err());
    assert!(Frame::new(2, 2, vec![0; 16], 0.0).is_ok());
}

#[test]
fn zero_area_frames_are_empty() {
    let f = Frame::new(0, 7, Vec::new(), 0.0).unwrap();
    assert!(f.is_empty());
    assert!(f.data().is_empty());
}

#[test]
fn filled_and_pixel_access() {
    let mut f = Frame::filled(3, 2, [1, 2, 3, 4], 5.0).unwrap();
    assert_eq!(f.pixel(2, 1), [1, 2, 3, 4]);
    f.set_pixel(0, 1, [9, 9, 9, 9]);
    assert_eq!(f.pixel(0, 1), [9, 9, 9, 9]);
    assert_eq!(f.timestamp(), 5.0);
}

#[test]
fn media_image_validates_and_snapshots() {
    assert!(MediaImage::new(1, 1, vec![0; 3]).is_err());
    let f = Frame::filled(2, 1, [7, 7, 7, 255], 0.0).unwrap();
    let m = MediaImage::from_frame(&f);
    assert_eq!((m.width, m.height), (2, 1));
    assert_eq!(m.rgba8.as_slice(), f.data());
}

#[test]
fn rgba_len_overflow_is_an_error() {
    #[cfg(target_pointer_width = "64")]
    assert!(rgba_len(u32::MAX, u32::MAX).is_err());
    assert_eq!(rgba_len(4, 3).unwrap(), 48);
}
