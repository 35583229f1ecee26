//! pixelboard renders progressive-reveal vision boards.
//!
//! A board is a set of life domains, each with a colour and a few images. The engine draws a
//! desaturated backdrop and a full-colour copy of the board once, then reveals the colour copy
//! cell by cell in a shuffled order until it matches the board's completion, holds, flashes a
//! short full-colour preview and starts over:
//!
//! - Describe the board with [`Board`] and [`Domain`] (or load a [`BoardScene`])
//! - Create a [`BoardEngine`] and hand it inputs with [`BoardEngine::load`]
//! - Call [`BoardEngine::tick`] once per display frame, or let a [`FrameLoop`] do it
//! - Export whole cycles into a [`FrameSink`] with [`export_frames`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod compose;
pub(crate) mod encode;
pub(crate) mod engine;
pub(crate) mod layout;
pub(crate) mod model;
pub(crate) mod raster;
pub(crate) mod render;
pub(crate) mod reveal;
pub(crate) mod session;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{BoardError, BoardResult};
pub use crate::foundation::math::Rng64;

pub use crate::animation::state::{AnimationState, MaskAction, Phase, Step, StepParams, step};
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::loader::{
    ImageKey, ImageTable, LoadFailure, LoadReport, LoaderOpts, load_images,
};
#[cfg(feature = "http")]
pub use crate::assets::source::HttpImageSource;
pub use crate::assets::source::{AutoImageSource, FsImageSource, ImageSource, MemoryImageSource};
pub use crate::compose::layers::{
    BoardLayers, LayerInputs, LayerStyle, MAX_IMAGES_PER_REGION, build_layers,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::engine::board_engine::{BoardEngine, BoardStatus};
pub use crate::engine::opts::EngineOpts;
pub use crate::layout::regions::{Region, compute_regions};
pub use crate::model::board::{Board, BoardScene, BoardType, Domain, DomainImage};
pub use crate::model::color::parse_hex_color;
pub use crate::raster::surface::Surface;
pub use crate::render::compositor::{FrameCompositor, FrameParams, FrameStyle, present_nearest};
pub use crate::render::frame::FrameRGBA;
pub use crate::reveal::grid::{RevealGrid, RevealOrder};
pub use crate::reveal::mask::RevealMask;
pub use crate::session::export::{RenderStats, cycle_frame_count, export_frames};
pub use crate::session::frame_loop::{FrameLoop, LoopExit};
