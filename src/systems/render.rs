//! Line rendering - mirrors the presenter's line into one persistent ribbon mesh.

use bevy::asset::RenderAssetUsages;
use bevy::camera::visibility::NoFrustumCulling;
use bevy::color::{ColorToComponents, Mix};
use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;

use crate::components::TrajectoryLineMesh;
use crate::line::{LinePresenter, TrajectoryLine};

/// Scratch geometry reused between frames.
#[derive(Default)]
pub struct RibbonBuffers {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

/// Builds a ribbon for `line` into `out`, reusing its allocations.
///
/// Each vertex becomes two ribbon vertices offset sideways by half the local
/// width. Width and colour are interpolated linearly from the start to the end
/// of the line. With `eye` set and the style facing the camera, the ribbon is
/// turned towards `eye`; otherwise it lies flat.
pub fn write_ribbon(line: &TrajectoryLine, eye: Option<Vec3>, out: &mut RibbonBuffers) {
    out.positions.clear();
    out.colors.clear();
    out.indices.clear();

    let vertices = line.vertices();
    let count = vertices.len();
    if count == 0 {
        return;
    }

    let start_color = line.style().start_color().to_linear();
    let end_color = line.style().end_color().to_linear();
    let eye = eye.filter(|_| line.style().face_camera);

    for (i, &point) in vertices.iter().enumerate() {
        let t = if count > 1 {
            i as f32 / (count - 1) as f32
        } else {
            0.0
        };
        let half_width = 0.5 * (line.start_width() + (line.end_width() - line.start_width()) * t);

        let prev = vertices[i.saturating_sub(1)];
        let next = vertices[(i + 1).min(count - 1)];
        let tangent = (next - prev).normalize_or(Vec3::NEG_Z);

        let facing = eye.map_or(Vec3::Y, |eye| (eye - point).normalize_or(Vec3::Y));
        let side = tangent
            .cross(facing)
            .try_normalize()
            .or_else(|| tangent.cross(Vec3::X).try_normalize())
            .unwrap_or(Vec3::X);

        out.positions.push((point - side * half_width).to_array());
        out.positions.push((point + side * half_width).to_array());

        let color = start_color.mix(&end_color, t).to_f32_array();
        out.colors.push(color);
        out.colors.push(color);
    }

    for segment in 0..(count as u32 - 1) {
        let a = segment * 2;
        out.indices
            .extend_from_slice(&[a, a + 1, a + 2, a + 1, a + 3, a + 2]);
    }
}

/// Spawns the line entity. It starts hidden and is never despawned, so it
/// survives scene changes.
pub fn setup_line_mesh(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, Vec::<[f32; 3]>::new())
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, Vec::<[f32; 4]>::new())
        .with_inserted_indices(Indices::U32(Vec::new()));

    commands.spawn((
        TrajectoryLineMesh,
        Name::new("Trajectory Line"),
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::IDENTITY,
        Visibility::Hidden,
        NoFrustumCulling,
    ));
}

/// Copies presenter state into the line entity every frame.
///
/// Geometry is written into the existing mesh buffers; nothing is respawned.
pub fn sync_line_mesh(
    presenter: Res<LinePresenter>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut buffers: Local<RibbonBuffers>,
    mut lines: Query<(&Mesh3d, &mut Visibility), With<TrajectoryLineMesh>>,
    cameras: Query<&GlobalTransform, With<Camera3d>>,
) {
    let Ok((mesh3d, mut visibility)) = lines.single_mut() else {
        return;
    };

    let Some(line) = presenter.line().filter(|line| line.is_visible()) else {
        visibility.set_if_neq(Visibility::Hidden);
        return;
    };

    let eye = cameras.iter().next().map(GlobalTransform::translation);
    write_ribbon(line, eye, &mut buffers);

    let Some(mut mesh) = meshes.get_mut(&mesh3d.0) else {
        return;
    };
    if let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
    {
        positions.clear();
        positions.extend_from_slice(&buffers.positions);
    }
    if let Some(VertexAttributeValues::Float32x4(colors)) = mesh.attribute_mut(Mesh::ATTRIBUTE_COLOR) {
        colors.clear();
        colors.extend_from_slice(&buffers.colors);
    }
    if let Some(Indices::U32(indices)) = mesh.indices_mut() {
        indices.clear();
        indices.extend_from_slice(&buffers.indices);
    }

    visibility.set_if_neq(Visibility::Inherited);
}
