//! Stairs Example
//!
//! A playable example with a character on a course featuring:
//! - A floor
//! - A staircase with climbable steps
//! - A ledge too tall to step onto
//! - A walkable ramp and a ramp too steep to stand on
//! - A wall
//!
//! ## Controls
//! - **W/S** or **Up/Down**: Move forward/backward
//! - **A/D** or **Left/Right**: Strafe
//! - **Q/E**: Orbit the camera
//! - **Space**: Jump
//!
//! The camera follows the player; the player turns to face where the camera
//! looks while moving.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use stepwalk_controller::prelude::*;
use stepwalk_controller::rapier::static_collision_groups;

// ==================== Constants ====================

const PLAYER_HALF_HEIGHT: f32 = 0.5;
const PLAYER_RADIUS: f32 = 0.3;
const PLAYER_MASS: f32 = 1.0;

const STEP_COUNT: usize = 6;
// Above the leg probe (0.3 over the feet for this capsule) and below the
// default maximum step height.
const STEP_RISE: f32 = 0.32;
const STEP_RUN: f32 = 0.6;

const CAMERA_DISTANCE: f32 = 7.0;
const CAMERA_HEIGHT: f32 = 3.5;
const CAMERA_ORBIT_SPEED: f32 = 1.5;

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Stairs - Character Controller Example".into(),
                resolution: (1280, 720).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins(RapierDebugRenderPlugin::default())
        // Character controller
        .add_plugins(CharacterControllerPlugin::<Rapier3dBackend>::default())
        .add_plugins(PlayerInputPlugin)
        .init_resource::<CameraOrbit>()
        .add_systems(Startup, setup)
        .add_systems(Update, (orbit_camera, follow_player).chain())
        .run();
}

/// Yaw of the follow camera around the player.
#[derive(Resource, Default)]
struct CameraOrbit {
    yaw: f32,
}

// ==================== Setup ====================

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    groups: Res<PhysicsGroups>,
) {
    let statics = static_collision_groups(&groups);
    let mut spawn_block = |center: Vec3, half: Vec3, rotation: Quat, color: Color| {
        commands.spawn((
            Mesh3d(meshes.add(Cuboid::new(half.x * 2.0, half.y * 2.0, half.z * 2.0))),
            MeshMaterial3d(materials.add(color)),
            Transform::from_translation(center).with_rotation(rotation),
            RigidBody::Fixed,
            Collider::cuboid(half.x, half.y, half.z),
            statics,
        ));
    };

    // Floor
    spawn_block(
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::new(30.0, 0.5, 30.0),
        Quat::IDENTITY,
        Color::srgb(0.35, 0.4, 0.35),
    );

    // Staircase going toward -Z
    for i in 0..STEP_COUNT {
        let height = STEP_RISE * (i + 1) as f32;
        spawn_block(
            Vec3::new(0.0, height / 2.0, -4.0 - STEP_RUN * i as f32),
            Vec3::new(1.5, height / 2.0, STEP_RUN / 2.0),
            Quat::IDENTITY,
            Color::srgb(0.6, 0.55, 0.45),
        );
    }

    // Ledge taller than the maximum step height
    spawn_block(
        Vec3::new(5.0, 0.4, -5.0),
        Vec3::new(1.5, 0.4, 1.5),
        Quat::IDENTITY,
        Color::srgb(0.7, 0.35, 0.3),
    );

    // Walkable ramp (20°) and steep ramp (55°)
    spawn_block(
        Vec3::new(-5.0, 0.0, -5.0),
        Vec3::new(1.5, 0.1, 4.0),
        Quat::from_rotation_x(20f32.to_radians()),
        Color::srgb(0.4, 0.5, 0.7),
    );
    spawn_block(
        Vec3::new(-9.0, 0.0, -5.0),
        Vec3::new(1.5, 0.1, 3.0),
        Quat::from_rotation_x(55f32.to_radians()),
        Color::srgb(0.7, 0.4, 0.6),
    );

    // Wall
    spawn_block(
        Vec3::new(0.0, 2.0, 8.0),
        Vec3::new(6.0, 2.0, 0.25),
        Quat::IDENTITY,
        Color::srgb(0.5, 0.5, 0.5),
    );

    // Player
    commands.spawn((
        Mesh3d(meshes.add(Capsule3d::new(PLAYER_RADIUS, PLAYER_HALF_HEIGHT * 2.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.9, 0.8, 0.3))),
        Transform::from_xyz(0.0, 2.0, 2.0),
        RapierCharacterBundle::capsule(PLAYER_HALF_HEIGHT, PLAYER_RADIUS, PLAYER_MASS)
            .with_config(ControllerConfig::player())
            .with_groups(&groups),
        PlayerControlled,
    ));

    // Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
        ControllerCamera,
    ));

    // Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // UI instructions
    commands.spawn((
        Text::new("WASD: Move | Q/E: Orbit camera | Space: Jump"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

// ==================== Camera ====================

fn orbit_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut orbit: ResMut<CameraOrbit>,
) {
    if keyboard.pressed(KeyCode::KeyQ) {
        orbit.yaw += CAMERA_ORBIT_SPEED * time.delta_secs();
    }
    if keyboard.pressed(KeyCode::KeyE) {
        orbit.yaw -= CAMERA_ORBIT_SPEED * time.delta_secs();
    }
}

fn follow_player(
    orbit: Res<CameraOrbit>,
    q_player: Query<&Transform, (With<PlayerControlled>, Without<ControllerCamera>)>,
    mut q_camera: Query<&mut Transform, With<ControllerCamera>>,
) {
    let (Ok(player), Ok(mut camera)) = (q_player.single(), q_camera.single_mut()) else {
        return;
    };

    let offset = Quat::from_rotation_y(orbit.yaw) * Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE);
    camera.translation = player.translation + offset;
    camera.look_at(player.translation, Vec3::Y);
}
