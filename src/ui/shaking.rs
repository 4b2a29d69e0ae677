use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_ui_build_macros::{build_ui, size, unit};
use bevy_ui_navigation::*;

use super::common::{UiAssets, GOLD};
use crate::{
    draw::{DrawEvent, GestureBlocker},
    state::{AppState, Navigate, Session},
    system_helper::cleanup_marked,
};

const IDLE_HINT: &str = "长按屏幕摇动竹筒";

#[derive(Component, Clone)]
struct ShakingHudRoot;

#[derive(Component, Clone)]
struct Hint;

#[derive(Component, Clone)]
struct BackButton;

fn hint_for(event: DrawEvent) -> &'static str {
    match event {
        DrawEvent::ShakeStarted => "诚心默念，松手出签",
        DrawEvent::ShakeStopped => IDLE_HINT,
        DrawEvent::Drawn => "灵签已出",
    }
}

fn update_hint(mut events: EventReader<DrawEvent>, mut hints: Query<&mut Text, With<Hint>>) {
    if let Some(event) = events.iter().last() {
        for mut text in hints.iter_mut() {
            text.sections[0].value = hint_for(*event).to_owned();
        }
    }
}

fn go_back(
    mut events: EventReader<NavEvent>,
    mut navigate: EventWriter<Navigate>,
    buttons: Query<(), With<BackButton>>,
) {
    for (event_type, from) in events.nav_iter().types() {
        if matches!(event_type, NavEvent::NoChanges { request: NavRequest::Action, .. })
            && buttons.get(from).is_ok()
        {
            navigate.send(Navigate::Back);
        }
    }
}

fn setup_hud(mut cmds: Commands, ui_assets: Res<UiAssets>, session: Res<Session>) {
    use PositionType::Absolute;
    let heading = match session.category {
        Some(category) => format!("{} · {}", session.user_name, category.title()),
        None => session.user_name.clone(),
    };
    let anchored = |position: Rect<Val>| NodeBundle {
        color: Color::NONE.into(),
        style: Style {
            position_type: Absolute,
            position,
            size: size!(100 pct, auto),
            justify_content: JustifyContent::Center,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut back = ui_assets.button(Color::rgba(0.0, 0.0, 0.0, 0.4));
    back.style.position_type = Absolute;
    back.style.position = Rect { left: Val::Px(16.0), top: Val::Px(16.0), ..Default::default() };
    let node = NodeBundle { color: Color::NONE.into(), ..Default::default() };
    build_ui! {
        #[cmd(cmds)]
        entity[ui_assets.screen_root(); ShakingHudRoot, Name::new("Shaking hud root")](
            entity[anchored(Rect { top: Val::Px(24.0), ..Default::default() }); Name::new("Heading")](
                node[ui_assets.colored_text(&heading, 30.0, GOLD);]
            ),
            entity[anchored(Rect { bottom: Val::Px(80.0), ..Default::default() }); Name::new("Hint box")](
                node[ui_assets.large_text(IDLE_HINT); Hint, Name::new("Hint")]
            ),
            entity[back; Focusable::default(), BackButton, GestureBlocker, Name::new("Back")](
                node[ui_assets.text_bundle("返回", 24.0);]
            )
        )
    };
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        app.add_system_set(self.0.on_enter(setup_hud))
            .add_system_set(self.0.on_exit(cleanup_marked::<ShakingHudRoot>))
            .add_system_set(
                self.0
                    .on_update(update_hint.after("read_gesture"))
                    .with_system(go_back.after(NavRequestSystem)),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_follows_the_gesture() {
        assert_eq!(hint_for(DrawEvent::ShakeStopped), IDLE_HINT);
        assert_ne!(hint_for(DrawEvent::ShakeStarted), IDLE_HINT);
        assert_ne!(hint_for(DrawEvent::Drawn), hint_for(DrawEvent::ShakeStarted));
    }
}
