use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy::render::camera::PerspectiveProjection;

/// The viewer, sticks fly in front of it once drawn.
#[derive(Component)]
pub struct PlayerCam;

fn spawn_camera(mut cmds: Commands) {
    let perspective_projection =
        PerspectiveProjection { fov: 45_f32.to_radians(), ..Default::default() };
    cmds.spawn_bundle(PerspectiveCameraBundle {
        perspective_projection,
        transform: Transform::from_xyz(0.0, 2.0, 10.0),
        ..PerspectiveCameraBundle::new_3d()
    })
    .insert_bundle((PlayerCam, Name::new("Player camera")));
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::rgb(0.06, 0.09, 0.16)))
            .add_startup_system(spawn_camera);
    }
}
