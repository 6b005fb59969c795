//! The trajectory line and the presenter that owns it.
//!
//! There is exactly one [`TrajectoryLine`]. It lives inside the
//! [`LinePresenter`] resource, is created the first time something needs it,
//! and is then mutated in place every frame.

use std::path::PathBuf;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrajectoryError};
use crate::types::TrajectorySample;

/// Location of the line description inside the asset folder.
pub const DEFAULT_LINE_ASSET: &str = "trajectory/trajectory_line.ron";

/// Full path of the packaged line description.
///
/// Rooted the same way as Bevy's default asset source (`BEVY_ASSET_ROOT`,
/// then `CARGO_MANIFEST_DIR`, then the executable's directory), so the
/// working directory the game was launched from does not matter.
pub fn default_line_asset_path() -> PathBuf {
    #[cfg(not(any(target_arch = "wasm32", target_os = "android")))]
    let base = bevy::asset::io::file::FileAssetReader::get_base_path();
    #[cfg(any(target_arch = "wasm32", target_os = "android"))]
    let base = PathBuf::new();

    base.join("assets").join(DEFAULT_LINE_ASSET)
}

/// Visual description of the trajectory line, loaded from the line asset.
///
/// # Example
/// ```
/// use bevy_bow_trajectory::line::LineStyle;
///
/// let style: LineStyle = ron::from_str(
///     "(start_color: (1.0, 1.0, 1.0, 0.9), end_color: (1.0, 0.3, 0.1, 0.4))",
/// ).unwrap();
/// assert!(style.face_camera);
/// ```
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LineStyle {
    /// RGBA colour at the launch end
    pub start_color: (f32, f32, f32, f32),
    /// RGBA colour at the far end
    pub end_color: (f32, f32, f32, f32),
    /// Orient the ribbon towards the camera (otherwise it lies flat)
    #[serde(default = "default_face_camera")]
    pub face_camera: bool,
}

fn default_face_camera() -> bool {
    true
}

impl LineStyle {
    pub fn start_color(&self) -> Color {
        let (r, g, b, a) = self.start_color;
        Color::srgba(r, g, b, a)
    }

    pub fn end_color(&self) -> Color {
        let (r, g, b, a) = self.end_color;
        Color::srgba(r, g, b, a)
    }
}

/// Where the line asset comes from.
#[derive(Resource, Clone, Debug)]
pub enum LineAssetSource {
    /// RON file on disk
    File(PathBuf),
    /// Style supplied directly by the host
    Inline(LineStyle),
}

impl Default for LineAssetSource {
    fn default() -> Self {
        LineAssetSource::File(default_line_asset_path())
    }
}

impl LineAssetSource {
    /// Loads the style. One-shot, synchronous.
    pub fn load(&self) -> Result<LineStyle> {
        match self {
            LineAssetSource::Inline(style) => Ok(style.clone()),
            LineAssetSource::File(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| TrajectoryError::AssetIo {
                        path: path.clone(),
                        source,
                    })?;
                ron::from_str(&contents).map_err(|e| TrajectoryError::AssetParse {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

/// The drawable trajectory polyline.
#[derive(Clone, Debug)]
pub struct TrajectoryLine {
    vertices: Vec<Vec3>,
    start_width: f32,
    end_width: f32,
    visible: bool,
    style: LineStyle,
}

impl TrajectoryLine {
    fn new(style: LineStyle) -> Self {
        Self {
            vertices: Vec::new(),
            start_width: 0.1,
            end_width: 0.1,
            visible: false,
            style,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn start_width(&self) -> f32 {
        self.start_width
    }

    pub fn end_width(&self) -> f32 {
        self.end_width
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }
}

/// Observable presenter state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PresenterState {
    /// No line yet
    Uninitialized,
    Hidden,
    Visible,
    /// Asset load failed; the overlay is off for this session
    Disabled,
}

enum Slot {
    Uninitialized,
    Ready(TrajectoryLine),
    Disabled,
}

/// Sole owner of the trajectory line.
///
/// Lifecycle: `Uninitialized -> Hidden <-> Visible`. A failed asset load moves
/// to `Disabled`, which is never left; there is no retry.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_bow_trajectory::line::{LineAssetSource, LinePresenter, LineStyle, PresenterState};
/// use bevy_bow_trajectory::types::TrajectorySample;
///
/// let style = LineStyle {
///     start_color: (1.0, 1.0, 1.0, 1.0),
///     end_color: (1.0, 1.0, 1.0, 0.5),
///     face_camera: true,
/// };
/// let mut presenter = LinePresenter::new(LineAssetSource::Inline(style));
///
/// presenter.hide(); // nothing to hide yet
/// assert_eq!(presenter.state(), PresenterState::Uninitialized);
///
/// presenter.show(&TrajectorySample::starting_at(Vec3::ZERO)).unwrap();
/// assert_eq!(presenter.state(), PresenterState::Visible);
/// ```
#[derive(Resource)]
pub struct LinePresenter {
    source: LineAssetSource,
    slot: Slot,
}

impl Default for LinePresenter {
    fn default() -> Self {
        Self::new(LineAssetSource::default())
    }
}

impl LinePresenter {
    pub fn new(source: LineAssetSource) -> Self {
        Self {
            source,
            slot: Slot::Uninitialized,
        }
    }

    pub fn state(&self) -> PresenterState {
        match &self.slot {
            Slot::Uninitialized => PresenterState::Uninitialized,
            Slot::Ready(line) if line.visible => PresenterState::Visible,
            Slot::Ready(_) => PresenterState::Hidden,
            Slot::Disabled => PresenterState::Disabled,
        }
    }

    /// The line, if it has been created.
    pub fn line(&self) -> Option<&TrajectoryLine> {
        match &self.slot {
            Slot::Ready(line) => Some(line),
            _ => None,
        }
    }

    /// Returns the line, creating it (hidden) on first use.
    pub fn ensure_resource(&mut self) -> Result<&mut TrajectoryLine> {
        if let Slot::Uninitialized = self.slot {
            match self.source.load() {
                Ok(style) => {
                    info!("trajectory line created");
                    self.slot = Slot::Ready(TrajectoryLine::new(style));
                }
                Err(err) => {
                    error!("trajectory line disabled: {err}");
                    self.slot = Slot::Disabled;
                    return Err(err);
                }
            }
        }

        match &mut self.slot {
            Slot::Ready(line) => Ok(line),
            _ => Err(TrajectoryError::LineUnavailable),
        }
    }

    /// Hides the line. Never creates it.
    pub fn hide(&mut self) {
        if let Slot::Ready(line) = &mut self.slot {
            line.visible = false;
        }
    }

    /// Replaces the vertex list with `points` and makes the line visible.
    pub fn show(&mut self, points: &TrajectorySample) -> Result<()> {
        let line = self.ensure_resource()?;
        line.vertices.clear();
        line.vertices.extend_from_slice(points.points());
        line.visible = true;
        Ok(())
    }

    /// Updates both end widths in place, whatever the visibility.
    pub fn set_widths(&mut self, start: f32, end: f32) -> Result<()> {
        let line = self.ensure_resource()?;
        line.start_width = start;
        line.end_width = end;
        Ok(())
    }
}
