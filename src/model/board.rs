use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::opts::EngineOpts;
use crate::foundation::error::{BoardError, BoardResult};

/// Period a board covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardType {
    /// One week of journal entries. Regions show only their canonical image.
    Weekly,
    /// One month.
    Monthly,
    /// One quarter.
    Quarterly,
    /// One year.
    Annual,
}

impl BoardType {
    /// Stable tag used in invalidation keys.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Weekly => b'w',
            Self::Monthly => b'm',
            Self::Quarterly => b'q',
            Self::Annual => b'a',
        }
    }
}

/// Board descriptor owned by the caller. Read-only to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Caller identifier, only used for diagnostics.
    #[serde(default)]
    pub id: Option<String>,
    /// Period type. Required: it decides whether regions show a sub-grid of images.
    pub board_type: BoardType,
    /// Pixels the board can earn in total.
    pub total_pixels: u64,
    /// Pixels earned so far. Must not exceed `total_pixels`.
    pub colored_pixels: u64,
    /// Opaque layout metadata; carried through, never interpreted.
    #[serde(default)]
    pub layout_metadata: serde_json::Value,
    /// Design style label, carried through for hosts.
    #[serde(default)]
    pub design_style: Option<String>,
}

impl Board {
    /// Minimal board with the given progress counts.
    pub fn new(board_type: BoardType, total_pixels: u64, colored_pixels: u64) -> Self {
        Self {
            id: None,
            board_type,
            total_pixels,
            colored_pixels,
            layout_metadata: serde_json::Value::Null,
            design_style: None,
        }
    }

    /// Check `0 <= colored_pixels <= total_pixels`.
    pub fn validate(&self) -> BoardResult<()> {
        if self.colored_pixels > self.total_pixels {
            return Err(BoardError::validation(format!(
                "coloredPixels ({}) must not exceed totalPixels ({})",
                self.colored_pixels, self.total_pixels
            )));
        }
        Ok(())
    }

    /// Completion ratio in `[0, 1]`; `0` when the board has no pixels.
    pub fn completion_ratio(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        (self.colored_pixels as f64 / self.total_pixels as f64).clamp(0.0, 1.0)
    }

    /// `round(colored / total * 100)`, suitable for a UI overlay.
    pub fn completion_percentage(&self) -> u32 {
        (self.completion_ratio() * 100.0).round() as u32
    }
}

/// One image attached to a domain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainImage {
    /// Image location, resolved by an [`crate::ImageSource`].
    #[serde(alias = "imageUrl")]
    pub url: String,
    /// Display order (ascending).
    #[serde(default)]
    pub sort_order: i64,
}

impl DomainImage {
    pub fn new(url: impl Into<String>, sort_order: i64) -> Self {
        Self {
            url: url.into(),
            sort_order,
        }
    }
}

/// A life domain: one coloured area of the board with its images.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub color_hex: String,
    #[serde(default)]
    pub images: Vec<DomainImage>,
}

impl Domain {
    pub fn new(id: impl Into<String>, color_hex: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            color_hex: color_hex.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        let sort_order = self.images.len() as i64 + 1;
        self.images.push(DomainImage::new(url, sort_order));
        self
    }

    /// Images in display order (stable sort by `sort_order`). The first one is canonical.
    pub fn ordered_images(&self) -> Vec<&DomainImage> {
        let mut out: Vec<&DomainImage> = self.images.iter().collect();
        out.sort_by_key(|img| img.sort_order);
        out
    }

    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Reject duplicated domain ids: regions are matched back to domains by id.
pub fn validate_domains(domains: &[Domain]) -> BoardResult<()> {
    let mut seen = HashSet::with_capacity(domains.len());
    for d in domains {
        if !seen.insert(d.id.as_str()) {
            return Err(BoardError::validation(format!(
                "duplicate domain id '{}'",
                d.id
            )));
        }
    }
    Ok(())
}

/// JSON document describing one board to render: inputs plus engine options.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardScene {
    pub board: Board,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub opts: EngineOpts,
}

impl BoardScene {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BoardResult<Self> {
        let scene: Self = serde_json::from_reader(r)
            .map_err(|e| BoardError::serde(format!("parse board scene JSON: {e}")))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> BoardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BoardError::validation(format!("open board scene '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> BoardResult<()> {
        self.board.validate()?;
        validate_domains(&self.domains)?;
        self.opts.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/board.rs"]
mod tests;
