use std::f64::consts::PI;

use bevy::math::EulerRot::XYZ;
use bevy::prelude::{Plugin as BevyPlugin, *};
#[cfg(feature = "debug")]
use bevy_inspector_egui::{Inspectable, RegisterInspectable};

/// How much of the remaining distance to rest is covered each frame when a
/// [`Animated::Shake`] stops.
const SETTLE_FACTOR: f32 = 0.1;

#[cfg_attr(feature = "debug", derive(Inspectable))]
#[derive(Component)]
pub enum Animated {
    /// Change `scale` to give a feeling of breathing
    Breath {
        offset: f64,
        strength: f32,
        period: f64,
    },
    /// Pitch front-to-back while `active`, `rate` radians per second.
    /// Eases back to the initial transform when not active.
    Shake { active: bool, rate: f64 },
}
impl Animated {
    pub fn breath(offset: f64, strength: f32, period: f64) -> Self {
        Animated::Breath { offset, strength, period }
    }
    pub fn shake(rate: f64) -> Self {
        Animated::Shake { active: false, rate }
    }
}

#[cfg_attr(feature = "debug", derive(Inspectable))]
#[derive(Component)]
struct InitialTransform(Transform);

fn enable_animation(animated: Query<(Entity, &Transform), Added<Animated>>, mut cmds: Commands) {
    let mut cmd_buffer = Vec::new();
    for (entity, transform) in animated.iter() {
        cmd_buffer.push((entity, (InitialTransform(*transform),)));
    }
    cmds.insert_or_spawn_batch(cmd_buffer);
}

/// Offset from rest of a shaken object at phase `t`.
fn shake_offset(t: f64) -> Transform {
    let (sin, cos) = (t.sin() as f32, t.cos() as f32);
    let side = (t * 0.3).sin() as f32;
    Transform {
        translation: Vec3::new(0.0, cos * 0.2, sin * 0.3),
        rotation: Quat::from_euler(XYZ, sin * 0.4, 0.0, side * 0.05),
        scale: Vec3::ONE,
    }
}

fn run_animation(
    time: Res<Time>,
    mut animated: Query<(&mut Transform, &InitialTransform, &Animated)>,
) {
    let time = time.seconds_since_startup();
    for (mut trans, init, anim) in animated.iter_mut() {
        match *anim {
            Animated::Breath { offset, strength, period } => {
                let anim_offset = (time + offset) % period / period * PI * 2.0;
                // ao = 0 → (0, 0.1); ao = 1 → (0.1, 0.0); ao = 2 → (0, 0.1)
                let scale_offset = Vec3::new(
                    (anim_offset as f32).sin() * strength,
                    0.0,
                    (anim_offset as f32).cos() * strength,
                );
                trans.scale = init.0.scale + scale_offset;
            }
            Animated::Shake { active: true, rate } => {
                let offset = shake_offset(time * rate);
                trans.translation = init.0.translation + offset.translation;
                trans.rotation = init.0.rotation * offset.rotation;
            }
            Animated::Shake { active: false, .. } => {
                let (cur_pos, cur_rot) = (trans.translation, trans.rotation);
                trans.translation = cur_pos.lerp(init.0.translation, SETTLE_FACTOR);
                trans.rotation = cur_rot.lerp(init.0.rotation, SETTLE_FACTOR);
            }
        }
    }
}

pub struct Plugin;
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        #[cfg(feature = "debug")]
        app.register_inspectable::<Animated>()
            .register_inspectable::<InitialTransform>();

        app.add_system(enable_animation)
            .add_system(run_animation.label("animation"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shake_swings_around_rest() {
        let at_zero = shake_offset(0.0);
        assert!((at_zero.translation - Vec3::new(0.0, 0.2, 0.0)).length() < 1e-6);
        assert!(at_zero.rotation.angle_between(Quat::IDENTITY) < 1e-6);

        let quarter = shake_offset(PI / 2.0);
        assert!((quarter.translation.z - 0.3).abs() < 1e-5);
        assert!((quarter.rotation.angle_between(Quat::IDENTITY) - 0.4).abs() < 0.01);
    }
}
