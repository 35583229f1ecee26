use super::*;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::math::Rng64;
use crate::raster::surface::Surface;
use crate::reveal::grid::{RevealGrid, RevealOrder};

const BASE: [u8; 4] = [10, 10, 10, 255];
const TARGET: [u8; 4] = [200, 0, 0, 255];

fn canvas() -> Canvas {
    Canvas::new(20, 10)
}

fn layers() -> BoardLayers {
    let mut base = Surface::new(canvas()).unwrap();
    let mut target = Surface::new(canvas()).unwrap();
    let bounds = Rect::new(0.0, 0.0, 20.0, 10.0);
    base.fill_rect(bounds, Rgba8Premul::opaque(BASE[0], BASE[1], BASE[2]));
    target.fill_rect(bounds, Rgba8Premul::opaque(TARGET[0], TARGET[1], TARGET[2]));
    BoardLayers {
        base,
        target,
        regions: Vec::new(),
        placeholders: 0,
    }
}

fn mask_and_order() -> (RevealMask, RevealOrder) {
    let grid = RevealGrid::new(canvas(), 10).unwrap();
    let order = RevealOrder::shuffled(grid.total(), &mut Rng64::new(11)).unwrap();
    (RevealMask::new(canvas(), grid).unwrap(), order)
}

fn params(phase: Phase, blink_elapsed: Option<Duration>, style: &FrameStyle) -> FrameParams<'_> {
    FrameParams {
        phase,
        blink_elapsed,
        flash: Duration::from_millis(50),
        style,
    }
}

#[test]
fn nothing_revealed_shows_only_the_base() {
    let layers = layers();
    let (mask, _) = mask_and_order();
    let style = FrameStyle::default();
    let mut out = FrameRGBA::new(canvas()).unwrap();
    FrameCompositor::new()
        .compose(&layers, &mask, params(Phase::Filling, None, &style), &mut Rng64::new(0), &mut out)
        .unwrap();
    assert_eq!(out.data, layers.base.data());
}

#[test]
fn revealed_cells_show_the_target_exactly() {
    let layers = layers();
    let (mut mask, order) = mask_and_order();
    mask.reveal_up_to(&order, 1);
    let (rx, ry) = mask.grid().cell_origin(order.as_slice()[0]);
    let (hx, hy) = mask.grid().cell_origin(order.as_slice()[1]);

    let style = FrameStyle::default();
    let mut out = FrameRGBA::new(canvas()).unwrap();
    let mut compositor = FrameCompositor::new();
    for phase in [Phase::Filling, Phase::Holding, Phase::Resetting] {
        compositor
            .compose(&layers, &mask, params(phase, None, &style), &mut Rng64::new(0), &mut out)
            .unwrap();
        assert_eq!(out.pixel(rx + 3, ry + 3), Some(TARGET), "{phase}");
        assert_eq!(out.pixel(hx + 3, hy + 3), Some(BASE), "{phase}");
    }
}

#[test]
fn blinking_ignores_the_mask() {
    let layers = layers();
    let (mask, _) = mask_and_order();
    let style = FrameStyle::default();
    let mut out = FrameRGBA::new(canvas()).unwrap();
    let mut compositor = FrameCompositor::new();
    let mut rng = Rng64::new(3);
    for _ in 0..10 {
        compositor
            .compose(
                &layers,
                &mask,
                params(Phase::Blinking, Some(Duration::from_millis(200)), &style),
                &mut rng,
                &mut out,
            )
            .unwrap();
        let px = out.pixel(5, 5).unwrap();
        assert!(px[0] >= 180, "{px:?}");
        assert!(px[1] <= 2, "{px:?}");
    }
}

#[test]
fn flash_whitens_only_the_start_of_blinking() {
    let layers = layers();
    let (mask, _) = mask_and_order();
    let style = FrameStyle::default();
    let mut out = FrameRGBA::new(canvas()).unwrap();
    let mut compositor = FrameCompositor::new();

    compositor
        .compose(
            &layers,
            &mask,
            params(Phase::Blinking, Some(Duration::from_millis(10)), &style),
            &mut Rng64::new(1),
            &mut out,
        )
        .unwrap();
    assert!(out.pixel(0, 0).unwrap()[1] >= 70);

    compositor
        .compose(
            &layers,
            &mask,
            params(Phase::Blinking, Some(Duration::from_millis(60)), &style),
            &mut Rng64::new(1),
            &mut out,
        )
        .unwrap();
    assert!(out.pixel(0, 0).unwrap()[1] <= 2);
}

#[test]
fn mismatched_output_is_rejected() {
    let layers = layers();
    let (mask, _) = mask_and_order();
    let style = FrameStyle::default();
    let mut out = FrameRGBA::new(Canvas::new(4, 4)).unwrap();
    let err = FrameCompositor::new()
        .compose(&layers, &mask, params(Phase::Filling, None, &style), &mut Rng64::new(0), &mut out)
        .unwrap_err();
    assert!(err.to_string().contains("does not match"));
}

#[test]
fn nearest_presentation_duplicates_pixels() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![255, 0, 0, 255, 0, 0, 255, 255],
        premultiplied: true,
    };
    let scaled = present_nearest(&frame, 4, 2).unwrap();
    assert_eq!((scaled.width, scaled.height), (4, 2));
    assert_eq!(scaled.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(scaled.pixel(2, 0), Some([0, 0, 255, 255]));
    assert_eq!(scaled.pixel(3, 1), Some([0, 0, 255, 255]));
    assert!(present_nearest(&frame, 0, 2).is_err());
}

#[test]
fn frame_style_rejects_out_of_range_alpha() {
    let style = FrameStyle {
        flash_alpha: 1.5,
        ..FrameStyle::default()
    };
    assert!(style.validate().is_err());
    assert!(FrameStyle::default().validate().is_ok());
}

#[test]
fn straight_image_unpremultiplies() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    let img = frame.to_straight_image().unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [128, 0, 0, 128]);
}
