use bevy::prelude::*;

use crate::line::LinePresenter;
use crate::resources::SamplerSettings;

/// Draw debug gizmos for the predicted trajectory.
///
/// Draws the raw polyline and a marker at every sampled point.
pub fn draw_trajectory_debug(
    mut gizmos: Gizmos,
    presenter: Res<LinePresenter>,
    settings: Res<SamplerSettings>,
) {
    if !settings.debug_draw {
        return;
    }

    let Some(line) = presenter.line().filter(|line| line.is_visible()) else {
        return;
    };

    gizmos.linestrip(line.vertices().iter().copied(), Color::srgb(0.0, 1.0, 0.0));
    for point in line.vertices() {
        gizmos.sphere(*point, 0.03, Color::srgb(1.0, 0.0, 0.0));
    }

    // Impact marker
    if let Some(last) = line.vertices().last() {
        gizmos.sphere(*last, 0.15, Color::srgb(1.0, 1.0, 0.0));
    }
}
