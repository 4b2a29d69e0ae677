use bevy::prelude::*;
use bevy_debug_text_overlay::OverlayPlugin;

mod animate;
mod audio;
mod camera;
mod category;
mod celebrate;
mod config;
mod draw;
mod eject;
mod explain;
mod fortune;
mod profile;
mod scene;
mod state;
mod system_helper;
mod ui;

use state::AppState;

fn main() {
    let mut app = App::new();
    app.insert_resource(Msaa { samples: 4 })
        .insert_resource(WindowDescriptor {
            title: "灵签祈福".to_owned(),
            width: 720.0,
            height: 960.0,
            ..Default::default()
        })
        .add_plugins(DefaultPlugins)
        .add_plugin(OverlayPlugin { font_size: 16.0, ..Default::default() })
        .add_plugin(state::Plugin)
        .add_plugin(camera::Plugin)
        .add_plugin(animate::Plugin)
        .add_plugin(scene::Plugin(AppState::Shaking))
        .add_plugin(draw::Plugin(AppState::Shaking))
        .add_plugin(eject::Plugin(AppState::Shaking))
        .add_plugin(celebrate::Plugin)
        .add_plugin(explain::Plugin(AppState::Result))
        .add_plugin(audio::Plugin)
        .add_plugin(ui::Plugin);

    #[cfg(feature = "debug")]
    app.add_plugin(bevy_inspector_egui::WorldInspectorPlugin::new());

    app.run();
}
