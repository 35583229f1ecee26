use super::*;

fn surface(w: u32, h: u32) -> Surface {
    Surface::new(Canvas::new(w, h)).unwrap()
}

fn image_from_rows(w: u32, h: u32, px: &[[u8; 4]]) -> PreparedImage {
    let raw: Vec<u8> = px.iter().flatten().copied().collect();
    PreparedImage::from_premul(image::RgbaImage::from_raw(w, h, raw).unwrap()).unwrap()
}

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

#[test]
fn empty_canvas_cannot_back_a_surface() {
    assert!(Surface::new(Canvas::new(0, 0)).is_err());
}

#[test]
fn pixel_bounds_round_shared_edges_consistently() {
    let s = surface(10, 10);
    let third = 10.0 / 3.0;
    let a = s.pixel_bounds(Rect::new(0.0, 0.0, 10.0, third)).unwrap();
    let b = s
        .pixel_bounds(Rect::new(0.0, third, 10.0, 2.0 * third))
        .unwrap();
    assert_eq!(a.y1, b.y0);
    assert!(s.pixel_bounds(Rect::new(20.0, 0.0, 30.0, 5.0)).is_none());
}

#[test]
fn fill_rect_is_clipped_to_the_rect() {
    let mut s = surface(4, 4);
    s.fill_rect(Rect::new(1.0, 1.0, 3.0, 3.0), Rgba8Premul::opaque(9, 8, 7));
    assert_eq!(s.pixel(1, 1), Some([9, 8, 7, 255]));
    assert_eq!(s.pixel(2, 2), Some([9, 8, 7, 255]));
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(3, 3), Some([0, 0, 0, 0]));
}

#[test]
fn cover_fit_crops_tall_images_vertically() {
    let img = image_from_rows(1, 4, &[RED, GREEN, GREEN, BLUE]);
    let mut s = surface(2, 2);
    s.draw_image_cover(&img, Rect::new(0.0, 0.0, 2.0, 2.0));
    for y in 0..2 {
        for x in 0..2 {
            let [r, g, b, a] = s.pixel(x, y).unwrap();
            assert!(g > 200 && r < 60 && b < 60, "({x},{y}) = {:?}", [r, g, b, a]);
            assert_eq!(a, 255);
        }
    }
}

#[test]
fn cover_fit_crops_wide_images_horizontally() {
    let img = image_from_rows(4, 1, &[BLUE, RED, RED, BLUE]);
    let mut s = surface(2, 2);
    s.draw_image_cover(&img, Rect::new(0.0, 0.0, 2.0, 2.0));
    for y in 0..2 {
        for x in 0..2 {
            let [r, _, b, _] = s.pixel(x, y).unwrap();
            assert!(r > 200 && b < 60);
        }
    }
}

#[test]
fn upscaled_cover_fit_keeps_aspect_and_crops_both_sides() {
    // 3x1 into 100x50: scale 50, drawn 150 wide, 25 px cropped on each side.
    let img = image_from_rows(3, 1, &[RED, GREEN, BLUE]);
    let mut s = surface(100, 50);
    s.draw_image_cover(&img, Rect::new(0.0, 0.0, 100.0, 50.0));
    for x in 35..=65 {
        let [r, g, b, _] = s.pixel(x, 25).unwrap();
        assert!(g > 150 && g > r && g > b, "x={x} = {:?}", [r, g, b]);
    }
    let [r, _, _, _] = s.pixel(0, 25).unwrap();
    assert!(r > 200);
    let [_, _, b, _] = s.pixel(99, 25).unwrap();
    assert!(b > 200);
}

#[test]
fn upscaled_cover_fit_crops_tall_images_symmetrically() {
    let img = image_from_rows(1, 3, &[RED, GREEN, BLUE]);
    let mut s = surface(50, 100);
    s.draw_image_cover(&img, Rect::new(0.0, 0.0, 50.0, 100.0));
    for y in 35..=65 {
        let [r, g, b, _] = s.pixel(25, y).unwrap();
        assert!(g > 150 && g > r && g > b, "y={y} = {:?}", [r, g, b]);
    }
    assert!(s.pixel(25, 0).unwrap()[0] > 200);
    assert!(s.pixel(25, 99).unwrap()[2] > 200);
}

#[test]
fn cover_fit_never_paints_outside_the_rect() {
    let img = image_from_rows(2, 2, &[RED, RED, RED, RED]);
    let mut s = surface(4, 4);
    s.draw_image_cover(&img, Rect::new(1.0, 1.0, 3.0, 3.0));
    assert_eq!(s.pixel(0, 1), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(3, 2), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(1, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(1, 1).unwrap()[3], 255);
}

#[test]
fn desaturate_rect_only_touches_its_area() {
    let mut s = surface(2, 1);
    s.fill_rect(Rect::new(0.0, 0.0, 2.0, 1.0), Rgba8Premul::opaque(255, 0, 0));
    s.desaturate_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(s.pixel(0, 0), Some([77, 77, 77, 255]));
    assert_eq!(s.pixel(1, 0), Some([255, 0, 0, 255]));
}

#[test]
fn diagonal_line_hits_both_corners_inside_bounds() {
    let mut s = surface(4, 4);
    s.stroke_line(
        Point::new(0.0, 0.0),
        Point::new(4.0, 4.0),
        Rgba8Premul::opaque(255, 255, 255),
    );
    assert_eq!(s.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(3, 3), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(3, 0), Some([0, 0, 0, 0]));
}

#[test]
fn grid_lines_land_on_multiples_of_spacing() {
    let mut s = surface(5, 5);
    s.draw_grid(2, Rgba8Premul::opaque(1, 1, 1));
    assert_eq!(s.pixel(0, 3), Some([1, 1, 1, 255]));
    assert_eq!(s.pixel(4, 1), Some([1, 1, 1, 255]));
    assert_eq!(s.pixel(3, 2), Some([1, 1, 1, 255]));
    assert_eq!(s.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(3, 3), Some([0, 0, 0, 0]));
}
