//! Screen flow and the data collected while going through it.
//!
//! ```text
//!  Home --SelectCategory--> UserInfo --SubmitUserInfo--> Shaking --StickOut--> Result
//!   ↑  ←--------Back-------     ↑  ←----------Back---------                       |
//!   ←---------------------------------------Reset-------------------------------←
//! ```
//!
//! Screens change only through [`Navigate`] events, see [`AppState::next`].
use bevy::prelude::{Plugin as BevyPlugin, *};

use crate::{category::Category, fortune::Fortune, profile::Birthday};

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub enum AppState {
    /// Category selection
    Home,
    /// Name and birthday form
    UserInfo,
    /// The cylinder scene, until the winning stick reaches the viewer
    Shaking,
    /// Poem, meaning and explanation
    Result,
}

/// Request to move to another screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigate {
    SelectCategory(Category),
    SubmitUserInfo { name: String, birthday: Birthday },
    Back,
    /// The winning stick arrived in front of the viewer.
    StickOut,
    /// Start over from the category selection, forgetting everything.
    Reset,
}

impl AppState {
    /// Screen reached from `self` through `request`, `None` if `request`
    /// makes no sense on this screen.
    pub fn next(self, request: &Navigate) -> Option<AppState> {
        use AppState::*;
        match (self, request) {
            (Home, Navigate::SelectCategory(_)) => Some(UserInfo),
            (UserInfo, Navigate::Back) => Some(Home),
            (UserInfo, Navigate::SubmitUserInfo { .. }) => Some(Shaking),
            (Shaking, Navigate::Back) => Some(UserInfo),
            (Shaking, Navigate::StickOut) => Some(Result),
            (Result, Navigate::Reset) => Some(Home),
            _ => None,
        }
    }
}

/// Everything known about the current drawing session.
#[derive(Default, Debug)]
pub struct Session {
    pub category: Option<Category>,
    pub user_name: String,
    pub birthday: Option<Birthday>,
    pub fortune: Option<&'static Fortune>,
}
impl Session {
    fn apply(&mut self, request: &Navigate) {
        match request {
            Navigate::SelectCategory(category) => self.category = Some(*category),
            Navigate::SubmitUserInfo { name, birthday } => {
                self.user_name = name.clone();
                self.birthday = Some(*birthday);
                self.fortune = None;
            }
            Navigate::Reset => *self = Session::default(),
            Navigate::Back | Navigate::StickOut => {}
        }
    }
    /// Set the drawn fortune, `false` if one was already drawn.
    pub fn set_fortune(&mut self, fortune: &'static Fortune) -> bool {
        if self.fortune.is_some() {
            return false;
        }
        self.fortune = Some(fortune);
        true
    }
}

/// Handle [`Navigate`] events.
///
/// At most one transition happens per frame, further requests in the same
/// frame are dropped.
fn navigate(
    mut requests: EventReader<Navigate>,
    mut state: ResMut<State<AppState>>,
    mut session: ResMut<Session>,
) {
    for request in requests.iter() {
        let current = *state.current();
        let next = match current.next(request) {
            Some(next) => next,
            None => {
                warn!("ignoring {request:?} on screen {current:?}");
                continue;
            }
        };
        match state.set(next) {
            Ok(()) => {
                info!("screen {current:?} -> {next:?}");
                session.apply(request);
                break;
            }
            Err(err) => warn!("cannot enter {next:?}: {err:?}"),
        }
    }
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_state(AppState::Home)
            .init_resource::<Session>()
            .add_event::<Navigate>()
            .add_system(navigate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fortune::CATALOG;

    fn submit() -> Navigate {
        let birthday = Birthday { year: 2001, month: 9, day: 1 };
        Navigate::SubmitUserInfo { name: "小明".to_owned(), birthday }
    }

    #[test]
    fn transitions() {
        use AppState::*;
        let category = Navigate::SelectCategory(Category::Postgraduate);
        macro_rules! flow_assert {
            ($($from:ident + $request:expr => $to:expr),* $(,)?) => (
                $( assert_eq!($from.next(&$request), $to, "{:?} + {:?}", $from, $request); )*
            )
        }
        flow_assert!(
            Home + category => Some(UserInfo),
            Home + Navigate::Back => None,
            Home + Navigate::StickOut => None,
            UserInfo + Navigate::Back => Some(Home),
            UserInfo + submit() => Some(Shaking),
            UserInfo + category => None,
            Shaking + Navigate::Back => Some(UserInfo),
            Shaking + Navigate::StickOut => Some(Result),
            Shaking + Navigate::Reset => None,
            Result + Navigate::Reset => Some(Home),
            Result + Navigate::Back => None,
            Result + Navigate::StickOut => None,
        );
    }

    #[test]
    fn session_follows_requests() {
        let mut session = Session::default();
        session.apply(&Navigate::SelectCategory(Category::CivilService));
        session.apply(&submit());
        assert_eq!(session.category, Some(Category::CivilService));
        assert_eq!(session.user_name, "小明");
        assert!(session.birthday.is_some());

        assert!(session.set_fortune(&CATALOG[0]));
        assert!(!session.set_fortune(&CATALOG[1]));
        assert_eq!(session.fortune, Some(&CATALOG[0]));

        session.apply(&Navigate::StickOut);
        assert_eq!(session.fortune, Some(&CATALOG[0]));

        session.apply(&Navigate::Reset);
        assert_eq!(session.category, None);
        assert!(session.user_name.is_empty());
        assert_eq!(session.birthday, None);
        assert_eq!(session.fortune, None);
    }
}
