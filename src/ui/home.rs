use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_ui_build_macros::{build_ui, rect, size, style, unit};
use bevy_ui_navigation::*;

use super::common::{MenuCursor, UiAssets, GOLD};
use crate::{
    category::Category,
    state::{AppState, Navigate},
    system_helper::cleanup_marked,
};

#[derive(Component, Clone)]
struct HomeRoot;

#[derive(Component, Clone, Copy)]
struct CategoryButton(Category);

fn select_category(
    mut events: EventReader<NavEvent>,
    mut navigate: EventWriter<Navigate>,
    buttons: Query<&CategoryButton>,
) {
    for (event_type, from) in events.nav_iter().types() {
        if let (NavEvent::NoChanges { request: NavRequest::Action, .. }, Ok(button)) =
            (event_type, buttons.get(from))
        {
            navigate.send(Navigate::SelectCategory(button.0));
        }
    }
}

fn setup_home(mut cmds: Commands, ui_assets: Res<UiAssets>) {
    let node = NodeBundle {
        color: Color::NONE.into(),
        style: style! {
            flex_direction: FlexDirection::ColumnReverse,
            align_items: AlignItems::Center,
        },
        ..Default::default()
    };
    let mut category_button = |category: Category| {
        let mut button = ui_assets.button(category.color());
        button.style.size = size!(420 px, auto);
        button.style.flex_direction = FlexDirection::ColumnReverse;
        let focusable = if category == Category::ALL[0] {
            Focusable::new().dormant()
        } else {
            Focusable::default()
        };
        build_ui! {
            #[cmd(cmds)]
            entity[button; focusable, CategoryButton(category), Name::new(category.title())](
                node[ui_assets.large_text(category.title());],
                node[ui_assets.text_bundle(category.blessing(), 22.0);]
            )
        }
        .id()
    };
    let buttons = Category::ALL.map(&mut category_button);
    let cursor = MenuCursor::spawn_ui_element(&mut cmds);

    build_ui! {
        #[cmd(cmds)]
        entity[ui_assets.screen_root(); HomeRoot, Name::new("Home root")](
            id(cursor),
            node[ui_assets.colored_text("灵签祈福", 72.0, GOLD); Name::new("Title")],
            node[ui_assets.text_bundle("心诚则灵，摇签问卜", 24.0); style! { margin: rect!(20 px), }],
            node[; Name::new("Categories")](
                id(buttons[0]),
                id(buttons[1]),
                id(buttons[2])
            ),
            node[ui_assets.text_bundle("仅供娱乐，相信自己，努力必有回报", 16.0); style! { margin: rect!(40 px), }]
        )
    };
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        app.add_system_set(self.0.on_enter(setup_home))
            .add_system_set(self.0.on_exit(cleanup_marked::<HomeRoot>))
            .add_system_set(self.0.on_update(select_category.after(NavRequestSystem)));
    }
}
