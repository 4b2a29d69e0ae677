use bevy::math::Vec3Swizzles;
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_ui_build_macros::{rect, size, style, unit};
use bevy_ui_navigation::*;
use bevy_ui_navigation::systems as nav;

use crate::audio::AudioRequest;

pub const INK: Color = Color::rgb(0.96, 0.92, 0.84);
pub const GOLD: Color = Color::rgb(0.98, 0.75, 0.14);
pub const PANEL: Color = Color::rgba(0.12, 0.06, 0.03, 0.85);

#[derive(Clone, Component, Default)]
pub struct MenuCursor {
    size: Vec2,
    position: Vec2,
}
impl MenuCursor {
    fn set_target(&mut self, node: &Node, transform: &GlobalTransform) {
        self.size = node.size * 1.05;
        self.position = transform.translation.xy() - self.size / 2.0;
    }
    pub fn spawn_ui_element(cmds: &mut Commands) -> Entity {
        cmds.spawn_bundle(NodeBundle {
            style: style! { position_type: PositionType::Absolute, size: size!(0 pct, 0 pct), },
            color: UiColor(Color::rgba(1.0, 0.85, 0.4, 0.15)),
            ..Default::default()
        })
        .insert_bundle((Self::default(), Name::new("Cursor")))
        .id()
    }
}

pub struct UiAssets {
    /// Needs CJK glyphs.
    pub font: Handle<Font>,
}
impl FromWorld for UiAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.get_resource::<AssetServer>().unwrap();
        Self { font: assets.load("fonts/NotoSerifSC-Regular.otf") }
    }
}

impl UiAssets {
    pub fn colored_text(&self, content: &str, font_size: f32, color: Color) -> TextBundle {
        let style = TextStyle { color, font: self.font.clone(), font_size };
        let align = TextAlignment { horizontal: HorizontalAlign::Center, ..Default::default() };
        let text = Text::with_section(content, style, align);
        TextBundle { text, ..Default::default() }
    }
    pub fn text_bundle(&self, content: &str, font_size: f32) -> TextBundle {
        self.colored_text(content, font_size, INK)
    }
    pub fn large_text(&self, content: &str) -> TextBundle {
        self.text_bundle(content, 48.)
    }
    /// Text wrapped to `width` pixels.
    pub fn paragraph(&self, content: &str, font_size: f32, width: f32) -> TextBundle {
        let mut bundle = self.text_bundle(content, font_size);
        bundle.style = style! { max_size: Size::new(Val::Px(width), Val::Auto), margin: rect!(8 px), };
        bundle
    }
    /// A clickable panel, put the label in it as child.
    pub fn button(&self, color: Color) -> ButtonBundle {
        ButtonBundle {
            color: UiColor(color),
            style: style! {
                padding: rect!(12 px),
                margin: rect!(8 px),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
            },
            ..Default::default()
        }
    }
    /// Screen-sized column, centered.
    pub fn screen_root(&self) -> NodeBundle {
        NodeBundle {
            color: Color::NONE.into(),
            style: style! {
                size: size!(100 pct, 100 pct),
                flex_direction: FlexDirection::ColumnReverse,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
            },
            ..Default::default()
        }
    }
}

fn update_highlight(
    mut highlight: Query<(&mut Style, &mut Node, &mut MenuCursor), Without<Focused>>,
    focused: Query<(&Node, &GlobalTransform), With<Focused>>,
) {
    use Val::Px;
    let query = (highlight.get_single_mut(), focused.get_single());
    if let (Ok((mut style, mut cursor_node, mut target)), Ok((node, transform))) = query {
        target.set_target(node, transform);
        if let (Px(left), Px(bot), Px(width), Px(height)) = (
            style.position.left,
            style.position.bottom,
            style.size.width,
            style.size.height,
        ) {
            let size = cursor_node.size;
            cursor_node.size += (target.size - size) * 0.4;
            style.size.width += (target.size.x - width) * 0.4;
            style.size.height += (target.size.y - height) * 0.4;
            style.position.left += (target.position.x - left) * 0.4;
            style.position.bottom += (target.position.y - bot) * 0.4;
        } else {
            style.position = rect!(1 px);
            style.size = size!(1 px, 1 px);
        }
    }
}

/// Click on every activated button.
fn click_sound(mut events: EventReader<NavEvent>, mut audio: EventWriter<AudioRequest>) {
    for (event, _) in events.nav_iter().types() {
        if matches!(event, NavEvent::NoChanges { request: NavRequest::Action, .. }) {
            audio.send(AudioRequest::PlayClick);
        }
    }
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(NavigationPlugin)
            .init_resource::<UiAssets>()
            .init_resource::<nav::InputMapping>()
            .add_system(nav::default_mouse_input)
            .add_system(update_highlight)
            .add_system(click_sound.after(NavRequestSystem));

        app.add_startup_system(|mut cmds: Commands| {
            cmds.spawn_bundle(UiCameraBundle::default());
        });
    }
}
