//! Name and birthday form.
//!
//! Click a field (or press tab) to type in it. Enter or the submit button
//! validates the form, errors are shown under the fields.
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_ui_build_macros::{build_ui, rect, size, style, unit};
use bevy_ui_navigation::*;

use super::common::{MenuCursor, UiAssets, GOLD, PANEL};
use crate::{
    profile::UserInfoForm,
    state::{AppState, Navigate, Session},
    system_helper::cleanup_marked,
};

const MAX_NAME_CHARS: usize = 16;
const MAX_BIRTHDAY_CHARS: usize = 10;
const TEXT_COLOR: Color = Color::rgb(0.12, 0.16, 0.23);
const PLACEHOLDER_COLOR: Color = Color::rgb(0.58, 0.55, 0.5);
const ERROR_COLOR: Color = Color::rgb(0.94, 0.35, 0.3);

#[derive(Component, Clone)]
struct UserInfoRoot;

#[derive(Component, Clone, Copy, PartialEq, Eq, Debug)]
enum Field {
    Name,
    Birthday,
}
impl Field {
    fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "请输入您的姓名",
            Field::Birthday => "YYYY-MM-DD",
        }
    }
}

/// The text displaying the value of a [`Field`].
#[derive(Component, Clone, Copy)]
struct FieldText(Field);

#[derive(Component, Clone)]
struct FormMessage;

#[derive(Component, Clone, Copy, PartialEq)]
enum FormButton {
    Back,
    Submit,
}

/// The form being typed in.
#[derive(Debug, Clone)]
struct FormInput {
    form: UserInfoForm,
    active: Field,
}
impl Default for FormInput {
    fn default() -> Self {
        Self { form: UserInfoForm::default(), active: Field::Name }
    }
}
impl FormInput {
    fn from_session(session: &Session) -> Self {
        let form = UserInfoForm {
            name: session.user_name.clone(),
            birthday: session.birthday.map_or_else(String::new, |b| b.to_string()),
        };
        Self { form, active: Field::Name }
    }
    fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.form.name,
            Field::Birthday => &self.form.birthday,
        }
    }
    fn type_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        match self.active {
            Field::Name if self.form.name.chars().count() < MAX_NAME_CHARS => {
                self.form.name.push(c);
            }
            Field::Birthday
                if self.form.birthday.len() < MAX_BIRTHDAY_CHARS
                    && (c.is_ascii_digit() || "-/.".contains(c)) =>
            {
                self.form.birthday.push(c);
            }
            Field::Name | Field::Birthday => {}
        }
    }
    fn erase(&mut self) {
        match self.active {
            Field::Name => self.form.name.pop(),
            Field::Birthday => self.form.birthday.pop(),
        };
    }
    fn next_field(&mut self) {
        self.active = match self.active {
            Field::Name => Field::Birthday,
            Field::Birthday => Field::Name,
        };
    }
    /// The text to show for `field`, with its color.
    fn display(&self, field: Field) -> (String, Color) {
        let caret = if self.active == field { "|" } else { "" };
        match self.value(field) {
            "" => (format!("{caret}{}", field.placeholder()), PLACEHOLDER_COLOR),
            value => (format!("{value}{caret}"), TEXT_COLOR),
        }
    }
}

fn submit(
    input: &FormInput,
    navigate: &mut EventWriter<Navigate>,
    message: &mut Query<&mut Text, With<FormMessage>>,
) {
    match input.form.validate() {
        Ok((name, birthday)) => navigate.send(Navigate::SubmitUserInfo { name, birthday }),
        Err(err) => {
            info!("user info rejected: {err}");
            for mut text in message.iter_mut() {
                text.sections[0].value = err.to_string();
            }
        }
    }
}

fn type_text(
    mut chars: EventReader<ReceivedCharacter>,
    mut input: ResMut<FormInput>,
    mut navigate: EventWriter<Navigate>,
    mut message: Query<&mut Text, With<FormMessage>>,
    keys: Res<Input<KeyCode>>,
) {
    for received in chars.iter() {
        input.type_char(received.char);
    }
    if keys.just_pressed(KeyCode::Back) {
        input.erase();
    }
    if keys.just_pressed(KeyCode::Tab) {
        input.next_field();
    }
    if keys.just_pressed(KeyCode::Return) || keys.just_pressed(KeyCode::NumpadEnter) {
        submit(&input, &mut navigate, &mut message);
    }
}

fn show_fields(input: Res<FormInput>, mut texts: Query<(&mut Text, &FieldText)>) {
    if !input.is_changed() {
        return;
    }
    for (mut text, FieldText(field)) in texts.iter_mut() {
        let (value, color) = input.display(*field);
        let section = &mut text.sections[0];
        section.value = value;
        section.style.color = color;
    }
}

fn activate(
    mut events: EventReader<NavEvent>,
    mut input: ResMut<FormInput>,
    mut navigate: EventWriter<Navigate>,
    mut message: Query<&mut Text, With<FormMessage>>,
    fields: Query<&Field>,
    buttons: Query<&FormButton>,
) {
    use NavEvent::NoChanges;
    use NavRequest::Action;
    for (event_type, from) in events.nav_iter().types() {
        if !matches!(event_type, NoChanges { request: Action, .. }) {
            continue;
        }
        if let Ok(field) = fields.get(from) {
            input.active = *field;
        }
        match buttons.get(from) {
            Ok(FormButton::Back) => navigate.send(Navigate::Back),
            Ok(FormButton::Submit) => submit(&input, &mut navigate, &mut message),
            Err(_) => {}
        }
    }
}

fn setup_form(mut cmds: Commands, ui_assets: Res<UiAssets>, session: Res<Session>) {
    let input = FormInput::from_session(&session);
    let node = NodeBundle {
        color: Color::NONE.into(),
        style: style! {
            flex_direction: FlexDirection::ColumnReverse,
            align_items: AlignItems::FlexStart,
            margin: rect!(8 px),
        },
        ..Default::default()
    };
    let field_box = NodeBundle {
        color: Color::rgb(1.0, 0.98, 0.94).into(),
        style: style! {
            size: size!(400 px, 48 px),
            padding: rect!(10 px),
            align_items: AlignItems::Center,
        },
        ..Default::default()
    };
    let field_text = |field: Field| {
        let (value, color) = input.display(field);
        ui_assets.colored_text(&value, 24.0, color)
    };
    let panel = NodeBundle {
        color: PANEL.into(),
        style: style! {
            flex_direction: FlexDirection::ColumnReverse,
            align_items: AlignItems::Center,
            padding: rect!(24 px),
        },
        ..Default::default()
    };
    let row = NodeBundle {
        color: Color::NONE.into(),
        style: style! { flex_direction: FlexDirection::Row, margin: rect!(12 px), },
        ..Default::default()
    };
    let cursor = MenuCursor::spawn_ui_element(&mut cmds);

    build_ui! {
        #[cmd(cmds)]
        entity[ui_assets.screen_root(); UserInfoRoot, Name::new("User info root")](
            id(cursor),
            entity[panel; Name::new("Form")](
                node[ui_assets.colored_text("心诚则灵 · 录入生辰", 36.0, GOLD);],
                node(
                    node[ui_assets.text_bundle("姓名", 22.0);],
                    entity[field_box.clone(); Focusable::new().dormant(), Field::Name, Name::new("Name field")](
                        node[field_text(Field::Name); FieldText(Field::Name)]
                    ),
                    node[ui_assets.text_bundle("出生日期", 22.0);],
                    entity[field_box; Focusable::default(), Field::Birthday, Name::new("Birthday field")](
                        node[field_text(Field::Birthday); FieldText(Field::Birthday)]
                    )
                ),
                node[ui_assets.colored_text("", 20.0, ERROR_COLOR); FormMessage, Name::new("Form message")],
                entity[row; Name::new("Form buttons")](
                    entity[ui_assets.button(Color::rgb(0.45, 0.3, 0.15)); Focusable::default(), FormButton::Back](
                        node[ui_assets.text_bundle("返回", 26.0);]
                    ),
                    entity[ui_assets.button(Color::rgb(0.55, 0.27, 0.07)); Focusable::default(), FormButton::Submit](
                        node[ui_assets.text_bundle("开始摇签", 26.0);]
                    )
                )
            )
        )
    };
    cmds.insert_resource(input);
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        app.init_resource::<FormInput>()
            .add_system_set(self.0.on_enter(setup_form))
            .add_system_set(self.0.on_exit(cleanup_marked::<UserInfoRoot>))
            .add_system_set(
                self.0
                    .on_update(type_text.label("type_text"))
                    .with_system(activate.label("activate_form").after(NavRequestSystem))
                    .with_system(show_fields.after("type_text").after("activate_form")),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Birthday;

    fn type_str(input: &mut FormInput, text: &str) {
        text.chars().for_each(|c| input.type_char(c));
    }

    #[test]
    fn typing_goes_to_the_active_field() {
        let mut input = FormInput::default();
        type_str(&mut input, "王小明\u{8}");
        input.next_field();
        type_str(&mut input, "19a95-0x6-1\r8");
        assert_eq!(input.form.name, "王小明");
        assert_eq!(input.form.birthday, "1995-06-18");

        type_str(&mut input, "999");
        assert_eq!(input.form.birthday, "1995-06-18");
        input.erase();
        input.erase();
        assert_eq!(input.form.birthday, "1995-06");
        input.next_field();
        input.erase();
        assert_eq!(input.form.name, "王小");
    }

    #[test]
    fn name_length_is_bounded() {
        let mut input = FormInput::default();
        type_str(&mut input, &"签".repeat(40));
        assert_eq!(input.form.name.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn placeholder_until_typed() {
        let mut input = FormInput::default();
        assert_eq!(input.display(Field::Name), ("|请输入您的姓名".to_owned(), PLACEHOLDER_COLOR));
        assert_eq!(input.display(Field::Birthday), ("YYYY-MM-DD".to_owned(), PLACEHOLDER_COLOR));
        type_str(&mut input, "李");
        assert_eq!(input.display(Field::Name), ("李|".to_owned(), TEXT_COLOR));
    }

    #[test]
    fn prefilled_from_session() {
        let session = Session {
            user_name: "李白".to_owned(),
            birthday: Some(Birthday { year: 701, month: 2, day: 8 }),
            ..Default::default()
        };
        let input = FormInput::from_session(&session);
        assert_eq!(input.value(Field::Name), "李白");
        assert_eq!(input.value(Field::Birthday), "0701-02-08");
        assert_eq!(input.active, Field::Name);
    }
}
