use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_black_at_40_percent_darkens() {
    let dst = [200, 100, 50, 255];
    let out = over(dst, [0, 0, 0, 255], 0.4);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 120);
    assert_eq!(out[1], 60);
    assert_eq!(out[2], 30);
}

#[test]
fn intersect_respects_coverage() {
    let px = [100, 50, 25, 255];
    assert_eq!(intersect(px, 0), [0, 0, 0, 0]);
    assert_eq!(intersect(px, 255), px);
}

#[test]
fn desaturate_keeps_luminosity_of_opaque_pixels() {
    assert_eq!(desaturate([255, 0, 0, 255]), [77, 77, 77, 255]);
    assert_eq!(desaturate([255, 255, 255, 255]), [255, 255, 255, 255]);
    let [r, g, b, a] = desaturate([10, 200, 90, 255]);
    assert!(r == g && g == b);
    assert_eq!(a, 255);
}

#[test]
fn desaturate_shows_mid_grey_on_empty_backdrop() {
    assert_eq!(desaturate([0, 0, 0, 0]), [128, 128, 128, 255]);
}

#[test]
fn intersect_into_clears_unmasked_pixels() {
    let src = [9u8, 9, 9, 255].repeat(3);
    let mask = [0u8, 255, 0];
    let mut out = vec![7u8; 12];
    intersect_into(&mut out, &src, &mask).unwrap();
    assert_eq!(out, vec![0, 0, 0, 0, 9, 9, 9, 255, 0, 0, 0, 0]);
}

#[test]
fn buffer_length_mismatch_is_an_error() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    assert!(intersect_into(&mut dst, &[0u8; 8], &[0u8; 1]).is_err());
}
