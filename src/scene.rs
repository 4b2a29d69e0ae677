//! The shaking scene: a bamboo cylinder full of sticks, held by two hands.
//!
//! Everything is spawned when entering the shaking screen and despawned when
//! leaving it. The cylinder, hands and sticks are children of a single
//! [`ShakenGroup`] entity, which [`crate::draw`] shakes.
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::math::EulerRot::XYZ;
use bevy::prelude::{Plugin as BevyPlugin, *};
use bevy::render::{
    mesh::{
        Indices,
        VertexAttributeValues::{Float32x2, Float32x3},
    },
    render_resource::PrimitiveTopology,
};

use crate::{
    animate::Animated,
    draw::ShakenGroup,
    eject::{StickAngles, WinningStick},
    state::AppState,
    system_helper::cleanup_marked,
};

const STICK_COUNT: usize = 80;
/// Pitch rate of the cylinder while shaking, in radians per second.
const SHAKE_RATE: f64 = 15.0;

/// Despawned when leaving the scene.
#[derive(Component)]
struct SceneRoot;

/// A cylinder or a truncated cone along the Y axis, centered on the origin.
#[derive(Debug, Clone, Copy)]
pub struct Cylinder {
    pub top_radius: f32,
    pub bottom_radius: f32,
    pub height: f32,
    pub segments: u32,
    /// Close the top and bottom with discs.
    pub caps: bool,
    /// Also render the inner side, for open tubes.
    pub two_sided: bool,
}
impl Cylinder {
    pub fn new(radius: f32, height: f32, segments: u32) -> Self {
        Self {
            top_radius: radius,
            bottom_radius: radius,
            height,
            segments,
            caps: true,
            two_sided: false,
        }
    }
    pub fn open_tube(top_radius: f32, bottom_radius: f32, height: f32, segments: u32) -> Self {
        Self { top_radius, bottom_radius, height, segments, caps: false, two_sided: true }
    }
}

#[derive(Default)]
struct Geometry {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}
impl Geometry {
    fn vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        self.positions.push(position.into());
        self.normals.push(normal.into());
        self.uvs.push(uv);
        self.positions.len() as u32 - 1
    }
}

impl Cylinder {
    fn geometry(&self) -> Geometry {
        let mut geo = Geometry::default();
        let segments = self.segments.max(3);
        let half = self.height / 2.0;
        let slope = (self.bottom_radius - self.top_radius) / self.height;
        let angle = |i: u32| i as f32 / segments as f32 * TAU;

        let side = |geo: &mut Geometry, flip: f32| {
            let first = geo.positions.len() as u32;
            for i in 0..=segments {
                let (sin, cos) = angle(i).sin_cos();
                let normal = Vec3::new(cos, slope, sin).normalize() * flip;
                let u = i as f32 / segments as f32;
                let top = Vec3::new(cos * self.top_radius, half, sin * self.top_radius);
                let bottom = Vec3::new(cos * self.bottom_radius, -half, sin * self.bottom_radius);
                geo.vertex(top, normal, [u, 0.0]);
                geo.vertex(bottom, normal, [u, 1.0]);
            }
            for i in 0..segments {
                let (a, b) = (first + 2 * i, first + 2 * i + 1);
                let (c, d) = (a + 2, b + 2);
                if flip > 0.0 {
                    geo.indices.extend([a, c, b, c, d, b]);
                } else {
                    geo.indices.extend([a, b, c, c, b, d]);
                }
            }
        };
        side(&mut geo, 1.0);
        if self.two_sided {
            side(&mut geo, -1.0);
        }
        if self.caps {
            for (y, radius, normal) in [(half, self.top_radius, Vec3::Y), (-half, self.bottom_radius, -Vec3::Y)] {
                let center = geo.vertex(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5]);
                for i in 0..=segments {
                    let (sin, cos) = angle(i).sin_cos();
                    let uv = [cos * 0.5 + 0.5, sin * 0.5 + 0.5];
                    geo.vertex(Vec3::new(cos * radius, y, sin * radius), normal, uv);
                }
                for i in 0..segments {
                    let (p, next) = (center + 1 + i, center + 2 + i);
                    if normal.y > 0.0 {
                        geo.indices.extend([center, next, p]);
                    } else {
                        geo.indices.extend([center, p, next]);
                    }
                }
            }
        }
        geo
    }
}
impl From<Cylinder> for Mesh {
    fn from(cylinder: Cylinder) -> Self {
        let Geometry { positions, normals, uvs, indices } = cylinder.geometry();
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList);
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, Float32x3(positions));
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, Float32x3(normals));
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, Float32x2(uvs));
        mesh.set_indices(Some(Indices::U32(indices)));
        mesh
    }
}

struct SceneAssets {
    tube: Handle<Mesh>,
    bottom: Handle<Mesh>,
    stick: Handle<Mesh>,
    tip: Handle<Mesh>,
    palm: Handle<Mesh>,
    finger: Handle<Mesh>,
    thumb: Handle<Mesh>,
    wood: Handle<StandardMaterial>,
    dark_wood: Handle<StandardMaterial>,
    bamboo: Handle<StandardMaterial>,
    red: Handle<StandardMaterial>,
    skin: Handle<StandardMaterial>,
}
impl FromWorld for SceneAssets {
    fn from_world(world: &mut World) -> Self {
        macro_rules! add_material {
            ($color:expr, $roughness:expr $(, metallic: $metallic:expr)?) => {{
                let mut mats = world.get_resource_mut::<Assets<StandardMaterial>>().unwrap();
                mats.add(StandardMaterial {
                    base_color: $color,
                    perceptual_roughness: $roughness,
                    $(metallic: $metallic,)?
                    ..Default::default()
                })
            }};
        }
        let wood = add_material!(Color::rgb_u8(0x8b, 0x5a, 0x2b), 0.9);
        let dark_wood = add_material!(Color::rgb_u8(0x6b, 0x42, 0x26), 0.9);
        let bamboo = add_material!(Color::rgb_u8(0xd2, 0xb4, 0x8c), 0.8);
        let red = add_material!(Color::rgb_u8(0xcc, 0x00, 0x00), 0.5);
        let skin = add_material!(Color::rgb_u8(0xfc, 0xd5, 0xb5), 0.4, metallic: 0.05);

        let mut meshes = world.get_resource_mut::<Assets<Mesh>>().unwrap();
        let capsule = |radius, depth| shape::Capsule { radius, depth, ..Default::default() };
        Self {
            tube: meshes.add(Cylinder::open_tube(1.0, 0.8, 5.0, 32).into()),
            bottom: meshes.add(Cylinder::new(0.8, 0.2, 32).into()),
            stick: meshes.add(Cylinder::new(0.04, 4.0, 8).into()),
            tip: meshes.add(Cylinder::new(0.041, 0.2, 8).into()),
            palm: meshes.add(shape::Icosphere { radius: 1.0, subdivisions: 3 }.into()),
            finger: meshes.add(capsule(0.14, 0.8).into()),
            thumb: meshes.add(capsule(0.19, 0.55).into()),
            wood,
            dark_wood,
            bamboo,
            red,
            skin,
        }
    }
}

/// Random placement of a stick inside the cylinder: translation and euler
/// angles.
fn stick_placement(rng: &fastrand::Rng) -> (Vec3, Vec3) {
    let centered = |scale: f32| (rng.f32() - 0.5) * scale;
    let translation = Vec3::new(centered(1.2), centered(0.5), centered(1.2));
    let angles = Vec3::new(centered(0.2), rng.f32() * PI, centered(0.2));
    (translation, angles)
}

fn spawn_hand(parent: &mut ChildBuilder, assets: &SceneAssets, is_left: bool) {
    let sign = if is_left { -1.0 } else { 1.0 };
    let pbr = |mesh: &Handle<Mesh>, transform: Transform| PbrBundle {
        mesh: mesh.clone(),
        material: assets.skin.clone(),
        transform,
        ..Default::default()
    };
    let hand_transform = Transform {
        translation: Vec3::new(sign * 1.25, -1.8, 0.0),
        rotation: Quat::from_rotation_z(sign * 0.1),
        scale: Vec3::ONE,
    };
    parent
        .spawn_bundle((hand_transform, GlobalTransform::default()))
        .insert_bundle((Name::new("Hand"), Animated::breath(0.0, 0.02, 4.0)))
        .with_children(|hand| {
            hand.spawn_bundle(pbr(&assets.palm, Transform::from_scale(Vec3::new(0.25, 1.4, 1.2))));
            for i in 0..4 {
                let i = i as f32;
                let curl = Quat::from_euler(XYZ, 0.0, sign * 0.3, sign * FRAC_PI_2);
                let finger = Transform {
                    translation: Vec3::new(-sign * 0.5, 0.5 - i * 0.3, 0.4),
                    rotation: curl,
                    scale: Vec3::splat(1.0 - i * 0.06),
                };
                hand.spawn_bundle(pbr(&assets.finger, finger));
            }
            let thumb = Transform {
                translation: Vec3::new(-sign * 0.35, 0.2, -0.45),
                rotation: Quat::from_euler(XYZ, 0.0, sign * -0.5, sign * (FRAC_PI_2 - 0.2)),
                scale: Vec3::ONE,
            };
            hand.spawn_bundle(pbr(&assets.thumb, thumb));
        });
}

fn spawn_scene(mut cmds: Commands, assets: Res<SceneAssets>) {
    let rng = fastrand::Rng::new();
    cmds.insert_resource(AmbientLight { color: Color::WHITE, brightness: 0.6 });
    cmds.spawn_bundle(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 15000.0,
            shadows_enabled: true,
            ..Default::default()
        },
        transform: Transform::from_xyz(5.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..Default::default()
    })
    .insert(SceneRoot);
    cmds.spawn_bundle(PointLightBundle {
        point_light: PointLight {
            color: Color::rgb_u8(0xff, 0xaa, 0x00),
            intensity: 800.0,
            ..Default::default()
        },
        transform: Transform::from_xyz(-5.0, 5.0, -5.0),
        ..Default::default()
    })
    .insert(SceneRoot);

    cmds.spawn_bundle((Transform::identity(), GlobalTransform::default()))
        .insert_bundle((
            SceneRoot,
            ShakenGroup,
            Animated::shake(SHAKE_RATE),
            Name::new("Cylinder group"),
        ))
        .with_children(|group| {
            group.spawn_bundle(PbrBundle {
                mesh: assets.tube.clone(),
                material: assets.wood.clone(),
                transform: Transform::from_xyz(0.0, -1.5, 0.0),
                ..Default::default()
            });
            group.spawn_bundle(PbrBundle {
                mesh: assets.bottom.clone(),
                material: assets.dark_wood.clone(),
                transform: Transform::from_xyz(0.0, -4.0, 0.0),
                ..Default::default()
            });
            spawn_hand(group, &assets, false);
            spawn_hand(group, &assets, true);
            for index in 0..STICK_COUNT {
                let (translation, angles) = stick_placement(&rng);
                let rotation = Quat::from_euler(XYZ, angles.x, angles.y, angles.z);
                let mut stick = group.spawn_bundle(PbrBundle {
                    mesh: assets.stick.clone(),
                    material: assets.bamboo.clone(),
                    transform: Transform { translation, rotation, scale: Vec3::ONE },
                    ..Default::default()
                });
                stick.with_children(|stick| {
                    stick.spawn_bundle(PbrBundle {
                        mesh: assets.tip.clone(),
                        material: assets.red.clone(),
                        transform: Transform::from_xyz(0.0, 1.9, 0.0),
                        ..Default::default()
                    });
                });
                if index == 0 {
                    stick.insert_bundle((WinningStick, StickAngles(angles), Name::new("Winning stick")));
                }
            }
        });
}

pub struct Plugin(pub AppState);
impl BevyPlugin for Plugin {
    fn build(&self, app: &mut App) {
        use crate::system_helper::StateSystems;
        app.init_resource::<SceneAssets>()
            .add_system_set(self.0.on_enter(spawn_scene))
            .add_system_set(self.0.on_exit(cleanup_marked::<SceneRoot>));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tube_vertices_lie_on_its_radii() {
        let tube = Cylinder::open_tube(1.0, 0.8, 5.0, 32);
        let geo = tube.geometry();
        // two sides of 33 pairs of vertices, no caps
        assert_eq!(geo.positions.len(), 2 * 33 * 2);
        assert_eq!(geo.indices.len(), 2 * 32 * 6);
        for [x, y, z] in &geo.positions {
            let radius = (x * x + z * z).sqrt();
            let expected = if *y > 0.0 { 1.0 } else { 0.8 };
            assert!((radius - expected).abs() < 1e-5);
            assert!((y.abs() - 2.5).abs() < 1e-5);
        }
    }

    #[test]
    fn capped_cylinder_faces_outward() {
        let geo = Cylinder::new(0.5, 2.0, 8).geometry();
        assert_eq!(geo.positions.len(), 9 * 2 + 2 * (1 + 9));
        assert!(geo.indices.iter().all(|i| (*i as usize) < geo.positions.len()));
        for triangle in geo.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| Vec3::from(geo.positions[triangle[k] as usize]));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0, "{a} {b} {c}");
        }
    }

    #[test]
    fn sticks_start_inside_the_cylinder() {
        let rng = fastrand::Rng::with_seed(3);
        for _ in 0..500 {
            let (translation, angles) = stick_placement(&rng);
            assert!(translation.x.abs() <= 0.6 && translation.z.abs() <= 0.6);
            assert!(translation.y.abs() <= 0.25);
            assert!(angles.x.abs() <= 0.1 && angles.z.abs() <= 0.1);
            assert!((0.0..PI).contains(&angles.y));
        }
    }
}
