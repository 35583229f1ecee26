use std::time::Duration;

use serde::Serialize;

use crate::animation::state::{AnimationState, MaskAction, Phase, StepParams, step};
use crate::assets::loader::{ImageTable, LoadFailure, LoaderOpts, load_images};
use crate::assets::source::ImageSource;
use crate::compose::layers::{BoardLayers, LayerInputs, LayerStyle, build_layers};
use crate::engine::opts::EngineOpts;
use crate::foundation::core::Canvas;
use crate::foundation::error::{BoardError, BoardResult};
use crate::foundation::math::{Fnv1a64, Rng64};
use crate::model::board::{Board, Domain, validate_domains};
use crate::render::compositor::{FrameCompositor, FrameParams};
use crate::render::frame::FrameRGBA;
use crate::reveal::grid::{RevealGrid, RevealOrder};
use crate::reveal::mask::RevealMask;

/// Snapshot of an engine for UI overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BoardStatus {
    pub phase: Phase,
    pub visible_count: u64,
    pub target_pixel_count: u64,
    pub total_grid_pixels: u64,
    /// Cells revealed per `filling` tick.
    pub fill_speed: u64,
    /// `round(colored / total * 100)` of the current board.
    pub completion_percentage: u32,
    /// True while the full target layer is being previewed.
    pub preview_active: bool,
}

struct BoardInputs {
    board: Board,
    domains: Vec<Domain>,
    images: ImageTable,
}

/// Everything derived from one input configuration; dropped as a whole on change.
struct Scene {
    layers: BoardLayers,
    grid: RevealGrid,
    order: RevealOrder,
    mask: RevealMask,
    state: AnimationState,
    params: StepParams,
}

/// One progressive-reveal board: owns its layers, mask, animation state and output frame.
///
/// Engines share nothing; drive each one from a single thread by calling [`BoardEngine::tick`]
/// once per display frame.
pub struct BoardEngine {
    opts: EngineOpts,
    pixel_size: u32,
    rng: Rng64,
    inputs: Option<BoardInputs>,
    layer_key: Option<u64>,
    input_key: Option<u64>,
    layer_generation: u64,
    scene: Option<Scene>,
    compositor: FrameCompositor,
    frame: FrameRGBA,
}

impl BoardEngine {
    /// Validate options and allocate the output frame. Fails with [`BoardError::Surface`] when
    /// the canvas cannot back a raster.
    pub fn new(opts: EngineOpts) -> BoardResult<Self> {
        opts.validate()?;
        let frame = FrameRGBA::new(opts.canvas)?;
        let rng = opts.seed.map_or_else(Rng64::from_entropy, Rng64::new);
        Ok(Self {
            pixel_size: opts.pixel_size,
            opts,
            rng,
            inputs: None,
            layer_key: None,
            input_key: None,
            layer_generation: 0,
            scene: None,
            compositor: FrameCompositor::new(),
            frame,
        })
    }

    pub fn opts(&self) -> &EngineOpts {
        &self.opts
    }

    pub fn canvas(&self) -> Canvas {
        self.opts.canvas
    }

    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Number of times the static layers have been built.
    pub fn layer_generation(&self) -> u64 {
        self.layer_generation
    }

    /// Last composed frame.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Current reveal mask, if inputs are set.
    pub fn mask(&self) -> Option<&RevealMask> {
        self.scene.as_ref().map(|s| &s.mask)
    }

    pub fn reveal_order(&self) -> Option<&RevealOrder> {
        self.scene.as_ref().map(|s| &s.order)
    }

    pub fn layers(&self) -> Option<&BoardLayers> {
        self.scene.as_ref().map(|s| &s.layers)
    }

    /// Replace board, domains and the already-joined image table.
    ///
    /// `images` is keyed by each domain's position in sort order, as produced by
    /// [`crate::load_images`]. Any change restarts the animation at `filling` with a fresh
    /// reveal order; layers are rebuilt only when something they depend on changed.
    #[tracing::instrument(skip_all, fields(domains = domains.len()))]
    pub fn set_inputs(
        &mut self,
        board: Board,
        domains: Vec<Domain>,
        images: ImageTable,
    ) -> BoardResult<()> {
        board.validate()?;
        validate_domains(&domains)?;
        self.inputs = Some(BoardInputs {
            board,
            domains,
            images,
        });
        self.refresh()
    }

    /// Load every domain image from `source` (concurrently, joined once), then
    /// [`BoardEngine::set_inputs`]. Returns the images that fell back to placeholders.
    #[tracing::instrument(skip_all, fields(domains = domains.len()))]
    pub fn load(
        &mut self,
        board: Board,
        domains: Vec<Domain>,
        source: &dyn ImageSource,
        loader: &LoaderOpts,
    ) -> BoardResult<Vec<LoadFailure>> {
        board.validate()?;
        validate_domains(&domains)?;
        let report = load_images(&domains, source, loader)?;
        self.set_inputs(board, domains, report.table)?;
        Ok(report.failures)
    }

    /// Change the reveal cell size; rebuilds layers and restarts the cycle when it differs.
    pub fn set_pixel_size(&mut self, pixel_size: u32) -> BoardResult<()> {
        if pixel_size == 0 {
            return Err(BoardError::surface("pixel_size must be > 0"));
        }
        self.pixel_size = pixel_size;
        self.refresh()
    }

    /// Restart the cycle at `filling` with a fresh reveal order, keeping the current layers.
    pub fn restart(&mut self) -> BoardResult<()> {
        self.input_key = None;
        self.refresh()
    }

    /// Advance one display frame at engine time `now` and compose it.
    ///
    /// Without inputs the frame is blank. Mask updates always happen before composition.
    pub fn tick(&mut self, now: Duration) -> BoardResult<&FrameRGBA> {
        let Some(scene) = self.scene.as_mut() else {
            self.frame.data.fill(0);
            return Ok(&self.frame);
        };

        let next = step(&scene.state, &scene.params, now);
        match next.mask {
            MaskAction::Keep => {}
            MaskAction::RevealUpTo(n) => {
                scene.mask.reveal_up_to(&scene.order, n);
            }
            MaskAction::Clear => scene.mask.clear(),
        }
        if next.state.phase != scene.state.phase {
            tracing::debug!(
                from = %scene.state.phase,
                to = %next.state.phase,
                visible = next.state.visible_count,
                "phase transition"
            );
        }
        scene.state = next.state;

        let params = FrameParams {
            phase: scene.state.phase,
            blink_elapsed: scene.state.blink_elapsed(now),
            flash: self.opts.flash(),
            style: &self.opts.frame_style,
        };
        self.compositor.compose(
            &scene.layers,
            &scene.mask,
            params,
            &mut self.rng,
            &mut self.frame,
        )?;
        Ok(&self.frame)
    }

    pub fn status(&self) -> BoardStatus {
        let completion_percentage = self
            .inputs
            .as_ref()
            .map_or(0, |i| i.board.completion_percentage());
        match &self.scene {
            Some(scene) => BoardStatus {
                phase: scene.state.phase,
                visible_count: scene.state.visible_count,
                target_pixel_count: scene.params.target,
                total_grid_pixels: scene.grid.total(),
                fill_speed: scene.params.fill_speed,
                completion_percentage,
                preview_active: scene.state.phase == Phase::Blinking,
            },
            None => BoardStatus {
                phase: Phase::Filling,
                visible_count: 0,
                target_pixel_count: 0,
                total_grid_pixels: 0,
                fill_speed: 0,
                completion_percentage,
                preview_active: false,
            },
        }
    }

    /// Drop inputs, layers and animation state. The next [`BoardEngine::tick`] yields a blank frame.
    pub fn teardown(&mut self) {
        if self.scene.take().is_some() {
            tracing::debug!("board engine torn down");
        }
        self.inputs = None;
        self.layer_key = None;
        self.input_key = None;
        self.frame.data.fill(0);
    }

    fn refresh(&mut self) -> BoardResult<()> {
        let Some(inputs) = self.inputs.as_ref() else {
            return Ok(());
        };
        let layer_key = layer_key(inputs, self.pixel_size, self.opts.canvas, &self.opts.style);
        let input_key = input_key(layer_key, &inputs.board);
        if self.input_key == Some(input_key) && self.scene.is_some() {
            return Ok(());
        }

        // The running cycle is dropped before anything is rebuilt.
        let previous = self.scene.take();
        let layers = match previous {
            Some(scene) if self.layer_key == Some(layer_key) => scene.layers,
            _ => {
                let layers = build_layers(&LayerInputs {
                    board_type: inputs.board.board_type,
                    domains: &inputs.domains,
                    images: &inputs.images,
                    canvas: self.opts.canvas,
                    pixel_size: self.pixel_size,
                    style: &self.opts.style,
                })?;
                self.layer_generation += 1;
                layers
            }
        };

        let grid = RevealGrid::new(self.opts.canvas, self.pixel_size)?;
        let order = RevealOrder::shuffled(grid.total(), &mut self.rng)?;
        let mask = RevealMask::new(self.opts.canvas, grid)?;
        let params = StepParams {
            target: grid.target_pixel_count(&inputs.board),
            fill_speed: grid.fill_speed(self.opts.fill_frames),
            hold: self.opts.hold(),
            blink: self.opts.blink(),
        };
        tracing::debug!(
            generation = self.layer_generation,
            cols = grid.cols,
            rows = grid.rows,
            target = params.target,
            fill_speed = params.fill_speed,
            "animation restarted"
        );

        self.scene = Some(Scene {
            layers,
            grid,
            order,
            mask,
            state: AnimationState::initial(),
            params,
        });
        self.layer_key = Some(layer_key);
        self.input_key = Some(input_key);
        Ok(())
    }
}

fn layer_key(inputs: &BoardInputs, pixel_size: u32, canvas: Canvas, style: &LayerStyle) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u8(inputs.board.board_type.tag());
    h.write_u64(inputs.domains.len() as u64);
    for d in &inputs.domains {
        h.write_str(&d.id);
        h.write_str(&d.color_hex);
        h.write_u64(d.images.len() as u64);
        for img in d.ordered_images() {
            h.write_str(&img.url);
        }
    }
    h.write_u64(inputs.images.fingerprint());
    h.write_u32(pixel_size);
    h.write_u32(canvas.width);
    h.write_u32(canvas.height);

    h.write_str(&style.placeholder_base_hex);
    h.write_u32(style.grid_spacing_cells);
    for v in [
        style.placeholder_line_alpha,
        style.grid_line_width,
        style.base_grid_alpha,
        style.target_grid_alpha,
        style.base_darken_alpha,
    ] {
        h.write_u32(v.to_bits());
    }
    h.finish()
}

fn input_key(layer_key: u64, board: &Board) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(layer_key);
    h.write_u64(board.total_pixels);
    h.write_u64(board.colored_pixels);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/engine/board_engine.rs"]
mod tests;
