//! Press, hold and release to shake the cylinder until a stick comes out.
//!
//! # Architecture
//!
//! [`DrawSequencer`] is the gesture state machine, it knows nothing of
//! bevy. The systems in this module feed it input and react to its
//! transitions:
//!
//! * [`read_gesture`]: mouse, touch and space bar presses/releases go to the
//!   sequencer, transitions are sent as [`DrawEvent`]s.
//! * [`sync_shake`]: the cylinder shakes while the sequencer is shaking.
//! * [`complete_draw`]: once the winning stick reached the viewer (see
//!   [`crate::eject`]), pick the fortune, celebrate and show the result.
//!
//! ## States
//!
//! ```text
//!          press                   release, held ≥ 0.5s
//!   Idle ---------→ Shaking --------------------------→ Drawn (terminal)
//!    ↑                 |
//!    ←-----------------
//!    release, held < 0.5s
//! ```
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy::window::CursorLeft;
use bevy_debug_text_overlay::screen_print;

use crate::{
    animate::Animated,
    audio::{AudioRequest, SfxParam},
    celebrate::Celebrate,
    eject::StickArrived,
    fortune::FortuneCatalog,
    state::{AppState, Navigate, Session},
};

/// Minimum time the cylinder must be shaken for a stick to come out.
pub const MIN_HOLD_SECS: f64 = 0.5;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DrawState {
    Idle,
    /// Shaking since the given timestamp, in seconds.
    Shaking { since: f64 },
    /// A stick came out. No further input is accepted.
    Drawn,
}

/// What a release did to the [`DrawSequencer`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Release {
    /// Not shaking, nothing happened.
    Ignored,
    /// Released before [`MIN_HOLD_SECS`], back to idle.
    TooShort { held: f64 },
    /// Entered [`DrawState::Drawn`].
    Drawn { held: f64 },
}

/// The shake-and-draw gesture state machine. Timestamps are in seconds and
/// must not go backward.
#[derive(Debug)]
pub struct DrawSequencer {
    state: DrawState,
}
impl Default for DrawSequencer {
    fn default() -> Self {
        Self { state: DrawState::Idle }
    }
}
impl DrawSequencer {
    pub fn state(&self) -> DrawState {
        self.state
    }
    pub fn is_shaking(&self) -> bool {
        matches!(self.state, DrawState::Shaking { .. })
    }
    /// Start shaking. `false` if not idle.
    pub fn on_press_start(&mut self, now: f64) -> bool {
        if self.state != DrawState::Idle {
            return false;
        }
        self.state = DrawState::Shaking { since: now };
        true
    }
    pub fn on_press_end(&mut self, now: f64) -> Release {
        let since = match self.state {
            DrawState::Shaking { since } => since,
            DrawState::Idle | DrawState::Drawn => return Release::Ignored,
        };
        let held = now - since;
        if held < MIN_HOLD_SECS {
            self.state = DrawState::Idle;
            Release::TooShort { held }
        } else {
            self.state = DrawState::Drawn;
            Release::Drawn { held }
        }
    }
}

/// Transitions of the [`DrawSequencer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawEvent {
    ShakeStarted,
    ShakeStopped,
    /// Held long enough, the winning stick pops out.
    Drawn,
}

/// UI elements under which presses are not shake gestures.
#[derive(Component, Clone)]
pub struct GestureBlocker;

/// The group of the scene that shakes with the gesture.
#[derive(Component)]
pub struct ShakenGroup;

fn reset_sequencer(mut sequencer: ResMut<DrawSequencer>) {
    *sequencer = DrawSequencer::default();
}

#[allow(clippy::too_many_arguments)]
fn read_gesture(
    mut sequencer: ResMut<DrawSequencer>,
    mut draw_events: EventWriter<DrawEvent>,
    mut audio_events: EventWriter<AudioRequest>,
    mut cursor_left: EventReader<CursorLeft>,
    mouse: Res<Input<MouseButton>>,
    keyboard: Res<Input<KeyCode>>,
    touches: Res<Touches>,
    time: Res<Time>,
    blockers: Query<&Interaction, With<GestureBlocker>>,
) {
    let now = time.seconds_since_startup();
    let blocked = blockers.iter().any(|i| *i != Interaction::None);
    let pressed = mouse.just_pressed(MouseButton::Left)
        || keyboard.just_pressed(KeyCode::Space)
        || touches.iter_just_pressed().next().is_some();
    let released = mouse.just_released(MouseButton::Left)
        || keyboard.just_released(KeyCode::Space)
        || touches.iter_just_released().next().is_some()
        || touches.iter_just_cancelled().next().is_some()
        || cursor_left.iter().next().is_some();

    if pressed && !blocked && sequencer.on_press_start(now) {
        draw_events.send(DrawEvent::ShakeStarted);
        audio_events.send(AudioRequest::PlayRattle(SfxParam::StartLoop));
    }
    if released {
        match sequencer.on_press_end(now) {
            Release::Ignored => {}
            Release::TooShort { held } => {
                screen_print!(sec: 2.0, "shook {held:.2}s, not enough");
                draw_events.send(DrawEvent::ShakeStopped);
                audio_events.send(AudioRequest::StopSfxLoop);
                audio_events.send(AudioRequest::PlayRattle(SfxParam::PlayOnce));
            }
            Release::Drawn { held } => {
                info!("stick drawn after shaking {held:.2}s");
                draw_events.send(DrawEvent::ShakeStopped);
                draw_events.send(DrawEvent::Drawn);
                audio_events.send(AudioRequest::StopSfxLoop);
                audio_events.send(AudioRequest::PlayPop);
            }
        }
    }
}

fn sync_shake(sequencer: Res<DrawSequencer>, mut groups: Query<&mut Animated, With<ShakenGroup>>) {
    if !sequencer.is_changed() {
        return;
    }
    let shaking = sequencer.is_shaking();
    for mut animated in groups.iter_mut() {
        if let Animated::Shake { active, .. } = animated.as_mut() {
            *active = shaking;
        }
    }
}

/// Pick the fortune once the winning stick arrived and show it.
fn complete_draw(
    mut arrivals: EventReader<StickArrived>,
    mut session: ResMut<Session>,
    mut navigate: EventWriter<Navigate>,
    mut celebrate: EventWriter<Celebrate>,
    mut audio_events: EventWriter<AudioRequest>,
    catalog: Res<FortuneCatalog>,
) {
    if arrivals.iter().next().is_none() || session.fortune.is_some() {
        return;
    }
    let fortune = match catalog.draw(&fastrand::Rng::new()) {
        Some(fortune) => fortune,
        None => {
            error!("the fortune catalog is empty");
            return;
        }
    };
    if session.set_fortune(fortune) {
        info!("drew {} out of {} fortunes", fortune.rank, catalog.len());
        celebrate.send(Celebrate);
        audio_events.send(AudioRequest::PlayChime);
        navigate.send(Navigate::StickOut);
    }
}

fn stop_rattle(mut audio_events: EventWriter<AudioRequest>) {
    audio_events.send(AudioRequest::StopSfxLoop);
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        app.init_resource::<DrawSequencer>()
            .init_resource::<FortuneCatalog>()
            .add_event::<DrawEvent>()
            .add_system_set(self.0.on_enter(reset_sequencer))
            .add_system_set(self.0.on_exit(stop_rattle))
            .add_system_set(
                self.0
                    .on_update(read_gesture.label("read_gesture"))
                    .with_system(sync_shake.after("read_gesture"))
                    .with_system(complete_draw),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hold_goes_back_to_idle() {
        for held in [0.0, 0.1, 0.25, 0.499] {
            let mut sequencer = DrawSequencer::default();
            assert!(sequencer.on_press_start(0.0));
            assert!(sequencer.is_shaking());
            assert_eq!(sequencer.on_press_end(held), Release::TooShort { held });
            assert_eq!(sequencer.state(), DrawState::Idle);
        }
    }

    #[test]
    fn long_hold_draws_exactly_once() {
        for held in [0.5, 0.6, 3.0] {
            let mut sequencer = DrawSequencer::default();
            sequencer.on_press_start(1.0);
            let release = sequencer.on_press_end(1.0 + held);
            assert!(matches!(release, Release::Drawn { .. }), "{held}: {release:?}");
            assert_eq!(sequencer.state(), DrawState::Drawn);
            // Drawn is terminal
            assert_eq!(sequencer.on_press_end(9.0), Release::Ignored);
            assert!(!sequencer.on_press_start(10.0));
            assert_eq!(sequencer.on_press_end(20.0), Release::Ignored);
            assert_eq!(sequencer.state(), DrawState::Drawn);
        }
    }

    #[test]
    fn retry_after_short_hold() {
        let mut sequencer = DrawSequencer::default();
        sequencer.on_press_start(0.0);
        assert!(matches!(sequencer.on_press_end(0.2), Release::TooShort { .. }));
        // A second press while already shaking keeps the first timestamp
        assert!(sequencer.on_press_start(1.0));
        assert!(!sequencer.on_press_start(1.3));
        assert!(matches!(sequencer.on_press_end(1.6), Release::Drawn { .. }));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut sequencer = DrawSequencer::default();
        assert_eq!(sequencer.on_press_end(5.0), Release::Ignored);
        assert_eq!(sequencer.state(), DrawState::Idle);
    }
}
