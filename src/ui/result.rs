//! The drawn fortune: rank, poem, meaning on demand and the explanation.
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_ui_build_macros::{build_ui, rect, size, style, unit};
use bevy_ui_navigation::*;

use super::common::{MenuCursor, UiAssets, GOLD, PANEL};
use crate::{
    explain::{Explanation, RequestExplanation},
    state::{AppState, Navigate, Session},
    system_helper::cleanup_marked,
};

const TEXT_WIDTH: f32 = 520.0;

#[derive(Component, Clone)]
struct ResultRoot;

#[derive(Component, Clone, Copy, PartialEq)]
enum ResultButton {
    RevealMeaning,
    Explain,
    Reset,
}

/// Hidden until the meaning is revealed.
#[derive(Component, Clone)]
struct MeaningPanel;

#[derive(Component, Clone)]
struct ExplanationText;

/// Whether the meaning panel is shown.
#[derive(Default)]
struct MeaningRevealed(bool);

/// What the explanation part of the screen shows.
#[derive(Debug, PartialEq)]
enum ExplanationView<'a> {
    Hidden,
    Button,
    Loading,
    Text(&'a str),
}
impl<'a> ExplanationView<'a> {
    fn new(revealed: bool, explanation: &'a Explanation) -> Self {
        match (revealed, explanation) {
            (false, _) => ExplanationView::Hidden,
            (true, Explanation::Idle) => ExplanationView::Button,
            (true, Explanation::Pending) => ExplanationView::Loading,
            (true, Explanation::Ready(text)) => ExplanationView::Text(text),
        }
    }
    fn text(&self) -> String {
        match self {
            ExplanationView::Hidden | ExplanationView::Button => String::new(),
            ExplanationView::Loading => "大师正在解签...".to_owned(),
            ExplanationView::Text(text) => format!("大师解签\n\n{text}"),
        }
    }
}

fn press_buttons(
    mut events: EventReader<NavEvent>,
    mut navigate: EventWriter<Navigate>,
    mut request: EventWriter<RequestExplanation>,
    mut revealed: ResMut<MeaningRevealed>,
    buttons: Query<&ResultButton>,
) {
    for (event_type, from) in events.nav_iter().types() {
        if !matches!(event_type, NavEvent::NoChanges { request: NavRequest::Action, .. }) {
            continue;
        }
        match buttons.get(from) {
            Ok(ResultButton::RevealMeaning) => revealed.0 = true,
            Ok(ResultButton::Explain) => request.send(RequestExplanation),
            Ok(ResultButton::Reset) => navigate.send(Navigate::Reset),
            Err(_) => {}
        }
    }
}

#[allow(clippy::type_complexity)]
fn sync_sections(
    revealed: Res<MeaningRevealed>,
    explanation: Res<Explanation>,
    mut buttons: Query<(&ResultButton, &mut Style), Without<MeaningPanel>>,
    mut panels: Query<&mut Style, With<MeaningPanel>>,
    mut texts: Query<&mut Text, With<ExplanationText>>,
) {
    if !revealed.is_changed() && !explanation.is_changed() {
        return;
    }
    let shown = |visible: bool| if visible { Display::Flex } else { Display::None };
    let view = ExplanationView::new(revealed.0, &explanation);
    for mut style in panels.iter_mut() {
        style.display = shown(revealed.0);
    }
    for (button, mut style) in buttons.iter_mut() {
        style.display = match button {
            ResultButton::RevealMeaning => shown(!revealed.0),
            ResultButton::Explain => shown(view == ExplanationView::Button),
            ResultButton::Reset => Display::Flex,
        };
    }
    for mut text in texts.iter_mut() {
        text.sections[0].value = view.text();
    }
}

fn setup_result(mut cmds: Commands, ui_assets: Res<UiAssets>, session: Res<Session>) {
    cmds.insert_resource(MeaningRevealed(false));
    let title = match session.category {
        Some(category) => format!("{category} 灵签"),
        None => "灵签".to_owned(),
    };
    let (rank, rank_color, poem, meaning) = match session.fortune {
        Some(fortune) => (
            fortune.rank.label(),
            fortune.rank.color(),
            fortune.poem_lines().collect::<Vec<_>>(),
            fortune.meaning,
        ),
        None => {
            warn!("showing the result screen without a fortune");
            ("—", GOLD, Vec::new(), "")
        }
    };
    let node = NodeBundle {
        color: Color::NONE.into(),
        style: style! {
            flex_direction: FlexDirection::ColumnReverse,
            align_items: AlignItems::Center,
        },
        ..Default::default()
    };
    let mut meaning_panel = NodeBundle {
        color: PANEL.into(),
        style: style! {
            flex_direction: FlexDirection::ColumnReverse,
            align_items: AlignItems::Center,
            padding: rect!(12 px),
            margin: rect!(8 px),
        },
        ..Default::default()
    };
    meaning_panel.style.display = Display::None;
    let mut hidden_button = ui_assets.button(Color::rgb(0.55, 0.27, 0.07));
    hidden_button.style.display = Display::None;

    let poem_node = cmds.spawn_bundle(node.clone()).insert(Name::new("Poem")).id();
    for line in poem {
        let line = cmds.spawn_bundle(ui_assets.text_bundle(line, 32.0)).id();
        cmds.entity(poem_node).add_child(line);
    }
    let cursor = MenuCursor::spawn_ui_element(&mut cmds);

    build_ui! {
        #[cmd(cmds)]
        entity[ui_assets.screen_root(); ResultRoot, Name::new("Result root")](
            id(cursor),
            node[ui_assets.colored_text(&title, 40.0, GOLD); Name::new("Title")],
            node[ui_assets.colored_text(rank, 64.0, rank_color); Name::new("Rank")],
            id(poem_node),
            entity[ui_assets.button(Color::rgb(0.45, 0.3, 0.15)); Focusable::default(), ResultButton::RevealMeaning](
                node[ui_assets.text_bundle("查看释文", 26.0);]
            ),
            entity[meaning_panel; MeaningPanel, Name::new("Meaning")](
                node[ui_assets.colored_text("签意：", 24.0, GOLD);],
                node[ui_assets.paragraph(meaning, 22.0, TEXT_WIDTH);]
            ),
            entity[hidden_button; Focusable::default(), ResultButton::Explain](
                node[ui_assets.text_bundle("请大师解签", 26.0);]
            ),
            node[ui_assets.paragraph("", 20.0, TEXT_WIDTH); ExplanationText, Name::new("Explanation")],
            entity[ui_assets.button(Color::rgb(0.3, 0.2, 0.12)); Focusable::new().dormant(), ResultButton::Reset](
                node[ui_assets.text_bundle("返回重摇", 26.0);]
            )
        )
    };
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        app.init_resource::<MeaningRevealed>()
            .add_system_set(self.0.on_enter(setup_result))
            .add_system_set(self.0.on_exit(cleanup_marked::<ResultRoot>))
            .add_system_set(
                self.0
                    .on_update(press_buttons.label("result_buttons").after(NavRequestSystem))
                    .with_system(sync_sections.after("result_buttons")),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explanation_shows_after_meaning() {
        use ExplanationView::*;
        let ready = Explanation::Ready("稳中求进".to_owned());
        assert_eq!(ExplanationView::new(false, &Explanation::Idle), Hidden);
        assert_eq!(ExplanationView::new(false, &ready), Hidden);
        assert_eq!(ExplanationView::new(true, &Explanation::Idle), Button);
        assert_eq!(ExplanationView::new(true, &Explanation::Pending), Loading);
        assert_eq!(ExplanationView::new(true, &ready), Text("稳中求进"));
    }

    #[test]
    fn explanation_text() {
        assert_eq!(ExplanationView::Button.text(), "");
        assert_eq!(ExplanationView::Loading.text(), "大师正在解签...");
        assert!(ExplanationView::Text("稳中求进").text().ends_with("稳中求进"));
    }
}
