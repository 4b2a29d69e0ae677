//! The screens drawn over the scene, one module per [`AppState`].
mod common;
mod home;
mod result;
mod shaking;
mod user_info;

use bevy::prelude::{Plugin as BevyPlugin, *};

use crate::state::AppState;

#[cfg(feature = "debug")]
fn debug_buttons(
    mut ctx: ResMut<bevy_inspector_egui::bevy_egui::EguiContext>,
    mut session: ResMut<crate::state::Session>,
    mut navigate: EventWriter<crate::state::Navigate>,
    state: Res<State<AppState>>,
) {
    use crate::{category::Category, fortune::CATALOG, state::Navigate};
    use bevy_inspector_egui::egui::*;
    Area::new("ui::debug_buttons")
        .anchor(Align2::RIGHT_BOTTOM, vec2(0., 0.))
        .show(ctx.ctx_mut(), |ui| {
            ui.label(format!("{:?}", state.current()));
            if ui.button("Skip form").clicked() {
                navigate.send(Navigate::SelectCategory(Category::Postgraduate));
                session.user_name = "测试".to_owned();
                session.birthday = "2000-01-01".parse().ok();
            }
            if ui.button("Force stick out").clicked() {
                if let Some(fortune) = CATALOG.first() {
                    session.set_fortune(fortune);
                }
                navigate.send(Navigate::StickOut);
            }
            if ui.button("Reset").clicked() {
                navigate.send(Navigate::Reset);
            }
        });
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        #[cfg(feature = "debug")]
        app.add_system(debug_buttons);

        app.add_plugin(common::Plugin)
            .add_plugin(home::Plugin(AppState::Home))
            .add_plugin(user_info::Plugin(AppState::UserInfo))
            .add_plugin(shaking::Plugin(AppState::Shaking))
            .add_plugin(result::Plugin(AppState::Result));
    }
}
