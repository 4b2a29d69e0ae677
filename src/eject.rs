//! The winning stick pops out of the cylinder, falls for a while and then
//! flies in front of the viewer.
//!
//! [`EjectMotion`] holds the per-draw physics state and is stepped with an
//! explicit timestep:
//!
//! * For the first [`FREE_FALL_SECS`] the stick follows a ballistic
//!   trajectory: velocity integrates [`GRAVITY`], position and euler angles
//!   integrate their velocities.
//! * Afterward position and angles ease toward a fixed offset from the
//!   viewer, covering [`ARRIVAL_EASING`] of the remaining distance each step.
//!   The first step ending closer than [`ARRIVAL_DISTANCE`] to the target
//!   reports the arrival, later steps never do.
use std::f32::consts::FRAC_PI_2;

use bevy::math::EulerRot::XYZ;
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_debug_text_overlay::screen_print;
#[cfg(feature = "debug")]
use bevy_inspector_egui::{Inspectable, RegisterInspectable};

use crate::{camera::PlayerCam, draw::DrawEvent, state::AppState};

pub const GRAVITY: f32 = 15.0;
pub const FREE_FALL_SECS: f32 = 1.5;
pub const ARRIVAL_EASING: f32 = 0.08;
pub const ARRIVAL_DISTANCE: f32 = 0.2;
/// Where the stick stops, relative to the viewer position.
const VIEWER_OFFSET: [f32; 3] = [0.0, -0.5, -2.0];
/// Euler angles of the stick once arrived, lying across the view.
const ARRIVAL_ANGLES: [f32; 3] = [FRAC_PI_2, 0.0, 0.0];

/// The stick that pops out when drawing.
#[derive(Component)]
pub struct WinningStick;

/// Euler angles (XYZ) of a stick, kept separately from its `Transform` so
/// that they can be integrated.
#[cfg_attr(feature = "debug", derive(Inspectable))]
#[derive(Component, Clone, Copy, Default)]
pub struct StickAngles(pub Vec3);

/// Sent once when the winning stick reached the viewer.
pub struct StickArrived;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StickPhase {
    /// In the cylinder, every stick but the winning one stays there.
    AtRest,
    /// Popping out and falling.
    Ejecting,
    /// Flying toward the viewer.
    Arriving,
}

#[cfg_attr(feature = "debug", derive(Inspectable))]
#[derive(Component, Clone, Debug)]
pub struct EjectMotion {
    velocity: Vec3,
    angular_velocity: Vec3,
    elapsed: f32,
    arrived: bool,
}
impl EjectMotion {
    pub fn new(velocity: Vec3, angular_velocity: Vec3) -> Self {
        Self { velocity, angular_velocity, elapsed: 0.0, arrived: false }
    }
    /// Launch velocities, drawn once per draw.
    ///
    /// Velocity: lateral in [-1.5, 1.5], vertical in [8, 12], forward in
    /// [3, 5]. Angular velocity: [-3, 3] on each axis.
    pub fn random(rng: &fastrand::Rng) -> Self {
        let range = |min: f32, max: f32| min + rng.f32() * (max - min);
        let velocity = Vec3::new(range(-1.5, 1.5), range(8.0, 12.0), range(3.0, 5.0));
        let angular_velocity = Vec3::new(range(-3.0, 3.0), range(-3.0, 3.0), range(-3.0, 3.0));
        Self::new(velocity, angular_velocity)
    }
    pub fn phase(motion: Option<&Self>) -> StickPhase {
        match motion {
            None => StickPhase::AtRest,
            Some(motion) if motion.elapsed < FREE_FALL_SECS => StickPhase::Ejecting,
            Some(_) => StickPhase::Arriving,
        }
    }
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }
    /// Advance the motion by `delta` seconds, moving `translation` and
    /// `angles` toward `target` (in the same space as `translation`).
    ///
    /// Returns `true` on the single step where the stick arrives.
    pub fn step(&mut self, translation: &mut Vec3, angles: &mut Vec3, target: Vec3, delta: f32) -> bool {
        let t = self.elapsed;
        self.elapsed += delta;
        if t < FREE_FALL_SECS {
            self.velocity.y -= GRAVITY * delta;
            *translation += self.velocity * delta;
            *angles += self.angular_velocity * delta;
            return false;
        }
        *translation = translation.lerp(target, ARRIVAL_EASING);
        *angles = angles.lerp(Vec3::from(ARRIVAL_ANGLES), ARRIVAL_EASING);
        if !self.arrived && translation.distance(target) < ARRIVAL_DISTANCE {
            self.arrived = true;
            return true;
        }
        false
    }
}

fn launch_winning_stick(
    mut events: EventReader<DrawEvent>,
    mut cmds: Commands,
    sticks: Query<Entity, (With<WinningStick>, Without<EjectMotion>)>,
) {
    if events.iter().any(|e| *e == DrawEvent::Drawn) {
        let rng = fastrand::Rng::new();
        for entity in sticks.iter() {
            cmds.entity(entity).insert(EjectMotion::random(&rng));
        }
    }
}

type EjectingStick = (
    &'static mut Transform,
    &'static mut StickAngles,
    &'static mut EjectMotion,
    Option<&'static Parent>,
);
fn run_eject(
    time: Res<Time>,
    cam: Query<&GlobalTransform, With<PlayerCam>>,
    parents: Query<&GlobalTransform, Without<WinningStick>>,
    mut sticks: Query<EjectingStick, With<WinningStick>>,
    mut arrivals: EventWriter<StickArrived>,
) {
    let viewer = match cam.get_single() {
        Ok(cam) => cam.translation,
        Err(_) => return,
    };
    let delta = time.delta_seconds();
    let world_target = viewer + Vec3::from(VIEWER_OFFSET);
    for (mut transform, mut angles, mut motion, parent) in sticks.iter_mut() {
        let target = match parent.and_then(|p| parents.get(p.0).ok()) {
            Some(parent) => parent.compute_matrix().inverse().transform_point3(world_target),
            None => world_target,
        };
        let mut translation = transform.translation;
        let arrived = motion.step(&mut translation, &mut angles.0, target, delta);
        transform.translation = translation;
        transform.rotation = Quat::from_euler(XYZ, angles.0.x, angles.0.y, angles.0.z);
        screen_print!(sec: 0.5, "stick {:?} at {:.1}s", EjectMotion::phase(Some(&motion)), motion.elapsed());
        if arrived {
            info!("winning stick arrived after {:.2}s", motion.elapsed());
            arrivals.send(StickArrived);
        }
    }
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        #[cfg(feature = "debug")]
        app.register_inspectable::<EjectMotion>()
            .register_inspectable::<StickAngles>();

        app.add_event::<StickArrived>().add_system_set(
            self.0
                .on_update(launch_winning_stick.after("read_gesture"))
                .with_system(run_eject),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        draw::{DrawSequencer, DrawState, Release},
        fortune::FortuneCatalog,
    };

    const FRAME: f32 = 1.0 / 60.0;

    /// Step `motion` for `frames` frames, returns the number of arrivals seen
    /// and the final translation.
    fn simulate(motion: &mut EjectMotion, target: Vec3, frames: usize) -> (usize, Vec3) {
        let (mut translation, mut angles) = (Vec3::ZERO, Vec3::ZERO);
        let mut arrivals = 0;
        for _ in 0..frames {
            let was_arrived = motion.has_arrived();
            if motion.step(&mut translation, &mut angles, target, FRAME) {
                assert!(!was_arrived);
                assert!(motion.elapsed() > FREE_FALL_SECS);
                assert!(translation.distance(target) < ARRIVAL_DISTANCE);
                arrivals += 1;
            }
        }
        (arrivals, translation)
    }

    #[test]
    fn random_launch_is_within_ranges() {
        let rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            let EjectMotion { velocity: v, angular_velocity: w, .. } = EjectMotion::random(&rng);
            assert!((-1.5..=1.5).contains(&v.x), "{v}");
            assert!((8.0..=12.0).contains(&v.y), "{v}");
            assert!((3.0..=5.0).contains(&v.z), "{v}");
            for axis in [w.x, w.y, w.z] {
                assert!((-3.0..=3.0).contains(&axis), "{w}");
            }
        }
    }

    #[test]
    fn free_fall_follows_gravity() {
        let mut motion = EjectMotion::new(Vec3::new(1.0, 10.0, 4.0), Vec3::new(2.0, 0.0, -1.0));
        let (mut translation, mut angles) = (Vec3::ZERO, Vec3::ZERO);
        assert_eq!(EjectMotion::phase(None), StickPhase::AtRest);
        motion.step(&mut translation, &mut angles, Vec3::splat(100.0), 0.1);
        assert_eq!(EjectMotion::phase(Some(&motion)), StickPhase::Ejecting);
        // v.y = 10 - 15 * 0.1 = 8.5, integrated once
        assert!((translation - Vec3::new(0.1, 0.85, 0.4)).length() < 1e-5);
        assert!((angles - Vec3::new(0.2, 0.0, -0.1)).length() < 1e-6);
        // The stick doesn't move toward the target before the phase boundary
        for _ in 0..13 {
            motion.step(&mut translation, &mut angles, Vec3::splat(100.0), 0.1);
        }
        assert!(translation.distance(Vec3::splat(100.0)) > 90.0);
        assert_eq!(EjectMotion::phase(Some(&motion)), StickPhase::Ejecting);
        motion.step(&mut translation, &mut angles, Vec3::splat(100.0), 0.25);
        assert_eq!(EjectMotion::phase(Some(&motion)), StickPhase::Arriving);
    }

    #[test]
    fn arrival_is_reported_once() {
        let target = Vec3::new(0.0, 1.5, 8.0);
        let rng = fastrand::Rng::with_seed(42);
        for _ in 0..20 {
            let mut motion = EjectMotion::random(&rng);
            let (arrivals, translation) = simulate(&mut motion, target, 60 * 10);
            assert_eq!(arrivals, 1);
            assert!(translation.distance(target) < ARRIVAL_DISTANCE);
            assert!(motion.has_arrived());
        }
    }

    #[test]
    fn arrival_waits_for_free_fall() {
        let target = Vec3::ZERO;
        let mut motion = EjectMotion::new(Vec3::ZERO, Vec3::ZERO);
        let (mut translation, mut angles) = (Vec3::ZERO, Vec3::ZERO);
        let mut frames = 0;
        while !motion.step(&mut translation, &mut angles, target, FRAME) {
            frames += 1;
            assert!(frames < 600);
        }
        assert!(motion.elapsed() >= FREE_FALL_SECS);
    }

    #[test]
    fn hold_then_eject_produces_a_fortune() {
        let mut sequencer = DrawSequencer::default();
        sequencer.on_press_start(0.0);
        let release = sequencer.on_press_end(0.6);
        assert!(matches!(release, Release::Drawn { .. }));
        assert_eq!(sequencer.state(), DrawState::Drawn);
        assert_eq!(sequencer.on_press_end(0.7), Release::Ignored);

        let rng = fastrand::Rng::with_seed(2024);
        let mut motion = EjectMotion::random(&rng);
        let target = Vec3::new(0.0, 1.5, 8.0);
        let (arrivals, _) = simulate(&mut motion, target, 60 * 10);
        assert_eq!(arrivals, 1);
        assert!(motion.elapsed() >= FREE_FALL_SECS);

        let fortune = FortuneCatalog::default().draw(&rng).unwrap();
        assert!(!fortune.rank.label().is_empty());
        assert!(!fortune.poem.is_empty());
        assert!(!fortune.meaning.is_empty());
    }
}
