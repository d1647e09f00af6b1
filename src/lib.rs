use std::{
    iter,
    time::{Duration, Instant},
};

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

mod input;
mod material;
mod math;
mod triangle;
mod vertex;

use material::{Material, MaterialId};
use math::{Matrix, Vector};
use triangle::Triangle;
use vertex::{Color, Vertex};

// Scene slots: which triangle gets which per-frame animation.
const BOUNCER: usize = 0;
const SPINNER: usize = 1;
const PULSER: usize = 2;

const SPIN_SPEED: f32 = 0.01;
const PULSE_MIN: f32 = 0.75;
const PULSE_MAX: f32 = 1.25;
const PULSE_GROW: f32 = 1.004;
const PULSE_SHRINK: f32 = 0.996;

struct State<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    window: &'a Window,
    materials: Vec<Material>,
    triangles: Vec<Triangle>,
    velocities: Vec<Vector>,
    vertex_buffer: wgpu::Buffer,
    pulse_growing: bool,
    paused: bool,
    frame_count: u32,
    last_fps_update: Instant,
    fps: f64,
    fps_cap_enabled: bool,
    target_fps: u32,
    last_frame_time: Instant,
}

/// The triangles the demo animates: one bounces around the scene, one
/// spins in place, one pulses in scale.
fn demo_scene() -> (Vec<Triangle>, Vec<Vector>) {
    let bouncer = Triangle::new(
        vec![
            Vertex::new(Vector::new2(-0.9, -0.9), Color::RED),
            Vertex::new(Vector::new2(-0.5, -0.9), Color::GREEN),
            Vertex::new(Vector::new2(-0.7, -0.5), Color::BLUE),
        ],
        MaterialId(0),
    );
    let spinner = Triangle::new(
        vec![
            Vertex::new(Vector::new2(0.3, 0.4), Color::WHITE),
            Vertex::new(Vector::new2(0.7, 0.4), Color::WHITE),
            Vertex::new(Vector::new2(0.5, 0.75), Color::WHITE),
        ],
        MaterialId(1),
    );
    let pulser = Triangle::new(
        vec![
            Vertex::new(Vector::new2(-0.2, 0.05), Color::YELLOW),
            Vertex::new(Vector::new2(0.2, 0.05), Color::RED),
            Vertex::new(Vector::new2(0.0, 0.45), Color::WHITE),
        ],
        MaterialId(0),
    );

    let velocities = vec![Vector::new2(0.004, 0.007), Vector::zero(), Vector::zero()];

    (vec![bouncer, spinner, pulser], velocities)
}

/// Reflects `velocity` on any axis where the bounds have left the [-1, 1]
/// scene square and the motion is still outward. The outward check keeps a
/// triangle that is already past the wall from flipping every frame.
fn reflect_velocity(min: Vector, max: Vector, velocity: &mut Vector) {
    if (max.x > 1.0 && velocity.x > 0.0) || (min.x < -1.0 && velocity.x < 0.0) {
        velocity.x = -velocity.x;
    }
    if (max.y > 1.0 && velocity.y > 0.0) || (min.y < -1.0 && velocity.y < 0.0) {
        velocity.y = -velocity.y;
    }
}

/// One pulse step: turn around at the scale limits, then scale by a small
/// factor. Turnaround happens one step past the limit, so the scale stays
/// within [PULSE_MIN * PULSE_SHRINK, PULSE_MAX * PULSE_GROW].
fn step_pulse(triangle: &mut Triangle, growing: &mut bool) {
    if triangle.current_scale() >= PULSE_MAX {
        *growing = false;
    } else if triangle.current_scale() <= PULSE_MIN {
        *growing = true;
    }
    triangle.scale(if *growing { PULSE_GROW } else { PULSE_SHRINK });
}

impl<'a> State<'a> {
    async fn new(window: &'a Window) -> anyhow::Result<State<'a>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter")?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::PUSH_CONSTANTS,
                required_limits: wgpu::Limits {
                    max_push_constant_size: 256,
                    ..Default::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);

        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let materials = vec![
            Material::new(&device, &shader, config.format, "fs_main"),
            Material::new(&device, &shader, config.format, "fs_green"),
        ];

        let (triangles, velocities) = demo_scene();

        let vertices: Vec<Vertex> = triangles
            .iter()
            .flat_map(|t| t.vertices().iter().copied())
            .collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            size,
            config,
            window,
            materials,
            triangles,
            velocities,
            vertex_buffer,
            pulse_growing: true,
            paused: false,
            frame_count: 0,
            last_fps_update: Instant::now(),
            fps: 0.0,
            fps_cap_enabled: true,
            target_fps: 60,
            last_frame_time: Instant::now(),
        })
    }

    pub fn window(&self) -> &Window {
        self.window
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn update(&mut self) {
        if self.paused {
            return;
        }

        // Translate by velocity, bouncing off the [-1, 1] scene square.
        for (triangle, velocity) in self.triangles.iter_mut().zip(&mut self.velocities) {
            triangle.translate(*velocity);
            reflect_velocity(triangle.min_bounds(), triangle.max_bounds(), velocity);
        }

        self.triangles[SPINNER].rotate(SPIN_SPEED);
        step_pulse(&mut self.triangles[PULSER], &mut self.pulse_growing);
    }

    fn update_window_title(&self) {
        let cap_status = if self.fps_cap_enabled {
            format!("(capped at {} FPS)", self.target_fps)
        } else {
            "(uncapped)".to_string()
        };
        let pause_status = if self.paused { " [paused]" } else { "" };

        self.window.set_title(&format!(
            "{} - FPS: {:.1} {}{}",
            env!("CARGO_PKG_NAME"),
            self.fps,
            cap_status,
            pause_status
        ));
    }

    /// Scene coordinates are a square; squeeze the longer window axis so
    /// triangles keep their shape at any window size.
    fn aspect_transform(&self) -> Matrix {
        let (w, h) = (self.config.width as f32, self.config.height as f32);
        if w >= h {
            Matrix::scale(h / w, 1.0, 1.0)
        } else {
            Matrix::scale(1.0, w / h, 1.0)
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // If the FPS cap is enabled, wait until the next frame is due.
        if self.fps_cap_enabled {
            let frame_duration = Duration::from_secs_f64(1.0 / self.target_fps as f64);
            let elapsed = self.last_frame_time.elapsed();

            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }

            self.last_frame_time = Instant::now();
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Re-upload every vertex each frame; the transforms above mutate
        // positions in place and the whole scene is a few dozen vertices.
        let vertices: Vec<Vertex> = self
            .triangles
            .iter()
            .flat_map(|t| t.vertices().iter().copied())
            .collect();
        self.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            let transform = self.aspect_transform();

            let mut first = 0u32;
            for triangle in &self.triangles {
                self.materials[triangle.material().0].apply(&mut render_pass);
                render_pass.set_push_constants(
                    wgpu::ShaderStages::VERTEX,
                    0,
                    bytemuck::bytes_of(&transform),
                );
                let count = triangle.vertices().len() as u32;
                render_pass.draw(first..first + count, 0..1);
                first += count;
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        // FPS counter, surfaced through the window title.
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_update);

        if elapsed.as_secs_f64() > 0.1 {
            self.fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_fps_update = now;

            self.update_window_title();
        }

        Ok(())
    }
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    let title = env!("CARGO_PKG_NAME");
    let window = winit::window::WindowBuilder::new()
        .with_title(title)
        .with_inner_size(LogicalSize::new(1024.0, 768.0))
        .build(&event_loop)?;

    let mut state = State::new(&window).await?;
    let mut surface_configured = false;

    event_loop.run(move |event, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == state.window().id() => {
            if !input::handle_input(&mut state, event) {
                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::Resized(physical_size) => {
                        surface_configured = true;
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        state.window().request_redraw();

                        if !surface_configured {
                            return;
                        }

                        state.update();
                        match state.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size)
                            }
                            Err(wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other) => {
                                log::error!("surface unrecoverable, exiting");
                                control_flow.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                log::warn!("surface timeout")
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_reflects_once_on_exit() {
        let mut velocity = Vector::new2(0.01, 0.0);
        reflect_velocity(Vector::new2(0.8, -0.2), Vector::new2(1.1, 0.2), &mut velocity);
        assert_eq!(velocity, Vector::new2(-0.01, 0.0));

        // Still past the wall, but now moving inward: no second flip.
        reflect_velocity(Vector::new2(0.8, -0.2), Vector::new2(1.1, 0.2), &mut velocity);
        assert_eq!(velocity, Vector::new2(-0.01, 0.0));
    }

    #[test]
    fn velocity_axes_reflect_independently() {
        // Out through the bottom only; x stays untouched.
        let mut velocity = Vector::new2(0.01, -0.02);
        reflect_velocity(
            Vector::new2(-0.5, -1.3),
            Vector::new2(-0.1, -0.9),
            &mut velocity,
        );
        assert_eq!(velocity, Vector::new2(0.01, 0.02));
    }

    #[test]
    fn velocity_unchanged_inside_bounds() {
        let mut velocity = Vector::new2(-0.03, 0.04);
        reflect_velocity(
            Vector::new2(-0.9, -0.9),
            Vector::new2(0.9, 0.9),
            &mut velocity,
        );
        assert_eq!(velocity, Vector::new2(-0.03, 0.04));
    }

    #[test]
    fn pulse_oscillates_between_scale_limits() {
        let (mut triangles, _) = demo_scene();
        let mut triangle = triangles.remove(PULSER);
        let mut growing = true;

        let mut min_seen = f32::MAX;
        let mut max_seen = f32::MIN;
        for _ in 0..5000 {
            step_pulse(&mut triangle, &mut growing);
            let scale = triangle.current_scale();
            min_seen = min_seen.min(scale);
            max_seen = max_seen.max(scale);
            // Turnaround happens one step past the limit, never further.
            assert!(scale >= PULSE_MIN * PULSE_SHRINK - 1e-4, "scale {scale}");
            assert!(scale <= PULSE_MAX * PULSE_GROW + 1e-4, "scale {scale}");
        }

        // It actually pulses: both turnaround regions get visited.
        assert!(min_seen <= PULSE_MIN * 1.01);
        assert!(max_seen >= PULSE_MAX * 0.99);
    }
}
