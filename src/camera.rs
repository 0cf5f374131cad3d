//! Free-look camera, its controller and the view/projection uniform.
//!
//! The batching core only reads [`Camera::position`], [`Camera::yaw`] and
//! [`Camera::pitch`] once per frame to pick the chunks in view.

use cgmath::{InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, perspective};
use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Pitch is clamped to this many degrees either way to keep the up vector valid.
pub const PITCH_LIMIT: f32 = 89.0;

/// Position plus heading in degrees.
///
/// Yaw is kept in `[0, 360)`; yaw 0° looks along +X and 90° along +Z.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    yaw: f32,
    pitch: f32,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: 0.0,
            pitch: 0.0,
        };
        camera.set_yaw(yaw);
        camera.set_pitch(pitch);
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw.rem_euclid(360.0);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn forward(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(Vector3::unit_y()).normalize()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }
}

#[derive(Debug, Clone)]
pub struct Projection {
    aspect: f32,
    fovy: cgmath::Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<cgmath::Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Movement and look tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// World units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            speed: 25.0,
            sensitivity: 0.15,
        }
    }
}

/// WASD/space/shift movement and mouse look.
#[derive(Debug, Default)]
pub struct CameraController {
    pub config: CameraConfig,
    amount_forward: f32,
    amount_backward: f32,
    amount_left: f32,
    amount_right: f32,
    amount_up: f32,
    amount_down: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state,
                    ..
                },
            ..
        } = event
        else {
            return false;
        };
        let amount = if *state == ElementState::Pressed { 1.0 } else { 0.0 };
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.amount_forward = amount,
            KeyCode::KeyS | KeyCode::ArrowDown => self.amount_backward = amount,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.amount_left = amount,
            KeyCode::KeyD | KeyCode::ArrowRight => self.amount_right = amount,
            KeyCode::Space => self.amount_up = amount,
            KeyCode::ShiftLeft => self.amount_down = amount,
            _ => return false,
        }
        true
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical += dy as f32;
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let velocity = self.config.speed * dt.as_secs_f32();

        // Walking stays level regardless of pitch
        let forward = camera.forward();
        let flat = Vector3::new(forward.x, 0.0, forward.z);
        if flat.magnitude2() > 0.0 {
            camera.position += flat.normalize() * (self.amount_forward - self.amount_backward) * velocity;
        }
        camera.position += camera.right() * (self.amount_right - self.amount_left) * velocity;
        camera.position.y += (self.amount_up - self.amount_down) * velocity;

        camera.set_yaw(camera.yaw() + self.rotate_horizontal * self.config.sensitivity);
        camera.set_pitch(camera.pitch() - self.rotate_vertical * self.config.sensitivity);
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state together with its GPU uniform.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
