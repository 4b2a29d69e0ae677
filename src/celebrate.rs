//! Confetti burst when a fortune is revealed.
use std::f32::consts::FRAC_PI_2;

use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy_ui_build_macros::style;

/// Fire a confetti burst.
pub struct Celebrate;

const PARTICLE_COUNT: usize = 100;
/// Total angle of the burst cone, in degrees, centered on straight up.
const SPREAD_DEGREES: f32 = 70.0;
/// Height of the burst origin, as a fraction of the window height from the
/// top.
const ORIGIN_FROM_TOP: f32 = 0.6;
/// Pixels per second squared.
const GRAVITY: f32 = 1400.0;
const LIFETIME_SECS: f32 = 3.0;
const DRAG: f32 = 0.9;
const COLORS: [&str; 4] = ["fbbf24", "f59e0b", "d97706", "b45309"];

#[derive(Component, Debug, Clone)]
struct Particle {
    /// Pixels from the bottom left of the window.
    position: Vec2,
    velocity: Vec2,
    age: f32,
}
impl Particle {
    fn new(origin: Vec2, rng: &fastrand::Rng) -> Self {
        let half_spread = SPREAD_DEGREES.to_radians() / 2.0;
        let angle = FRAC_PI_2 + (rng.f32() * 2.0 - 1.0) * half_spread;
        let speed = 700.0 + rng.f32() * 500.0;
        let velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
        Self { position: origin, velocity, age: 0.0 }
    }
    /// Advance by `delta` seconds, `false` once the particle should
    /// disappear.
    fn step(&mut self, delta: f32) -> bool {
        self.age += delta;
        self.velocity.y -= GRAVITY * delta;
        self.velocity *= DRAG.powf(delta);
        self.position += self.velocity * delta;
        self.age < LIFETIME_SECS
    }
    fn alpha(&self) -> f32 {
        (1.0 - self.age / LIFETIME_SECS).clamp(0.0, 1.0)
    }
}

fn burst(mut events: EventReader<Celebrate>, mut cmds: Commands, windows: Res<Windows>) {
    if events.iter().next().is_none() {
        return;
    }
    let (width, height) = match windows.get_primary() {
        Some(window) => (window.width(), window.height()),
        None => return,
    };
    let origin = Vec2::new(width / 2.0, height * (1.0 - ORIGIN_FROM_TOP));
    let rng = fastrand::Rng::new();
    for i in 0..PARTICLE_COUNT {
        let color = Color::hex(COLORS[i % COLORS.len()]).unwrap_or(Color::ORANGE);
        let side = 6.0 + rng.f32() * 6.0;
        let particle = Particle::new(origin, &rng);
        cmds.spawn_bundle(NodeBundle {
            style: style! {
                position_type: PositionType::Absolute,
                size: Size::new(Val::Px(side), Val::Px(side)),
            },
            color: UiColor(color),
            ..Default::default()
        })
        .insert_bundle((particle, Name::new("Confetti")));
    }
}

fn fly(
    time: Res<Time>,
    mut cmds: Commands,
    mut particles: Query<(Entity, &mut Particle, &mut Style, &mut UiColor)>,
) {
    let delta = time.delta_seconds();
    for (entity, mut particle, mut style, mut color) in particles.iter_mut() {
        if !particle.step(delta) {
            cmds.entity(entity).despawn_recursive();
            continue;
        }
        style.position.left = Val::Px(particle.position.x);
        style.position.bottom = Val::Px(particle.position.y);
        color.0.set_a(particle.alpha());
    }
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Celebrate>()
            .add_system(burst)
            .add_system(fly);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_goes_up_within_spread() {
        let rng = fastrand::Rng::with_seed(11);
        let max_tilt = (SPREAD_DEGREES / 2.0).to_radians() + 1e-4;
        for _ in 0..PARTICLE_COUNT * 5 {
            let particle = Particle::new(Vec2::ZERO, &rng);
            assert!(particle.velocity.y > 0.0);
            let tilt = particle.velocity.angle_between(Vec2::Y).abs();
            assert!(tilt <= max_tilt, "{tilt}");
        }
    }

    #[test]
    fn particles_fall_and_expire() {
        let mut particle = Particle::new(Vec2::new(400.0, 300.0), &fastrand::Rng::with_seed(1));
        let mut frames = 0;
        while particle.step(1.0 / 60.0) {
            frames += 1;
        }
        assert!((170..=181).contains(&frames), "{frames}");
        assert!(particle.velocity.y < 0.0);
        assert!(particle.position.y < 300.0);
        assert_eq!(particle.alpha(), 0.0);
    }
}
