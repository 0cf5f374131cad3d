//! Flow control and the frame loop.
//!
//! A "flow" is a piece of application logic that mutates the scene: it places,
//! moves and removes instances and loads meshes. The engine owns the scene and
//! runs every frame in a fixed order:
//!
//! 1. Collect window/device events and hand them to all flows
//! 2. Call `on_update` on all flows, which is where registry mutations happen
//! 3. Rebuild all dirty chunks
//! 4. Select the chunk range in view of the camera
//! 5. Draw every chunk batch in range and present the frame

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{context::Context, data_structures::texture::Texture, scene::Scene};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// The scene as driven by the engine: batches live in `wgpu` buffers.
pub type WgpuScene = Scene<wgpu::Device>;

/// A deferred mutation of the application state and the scene.
pub type Mutation<S> = Box<dyn FnOnce(&mut S, &mut WgpuScene)>;

///
/// This is the Output Type for every lifecycle hook.
///
/// `Out::FutFn` resolves futures (typically asset loads) into mutations that are applied to
/// the state and scene once ready. On native targets they are resolved before the next frame,
/// on wasm they arrive through the event loop.
///
/// `Out::Configure` can be used to modify the Context, e.g. the clear colour, the view range
/// settings or the camera.
///
/// `Empty` is the default output used when nothing has to be handled.
///
pub enum Out<S> {
    FutFn(Vec<Box<dyn Future<Output = Mutation<S>>>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl<S> Default for Out<S> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for application logic driving a scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once after the GPU context exists
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
/// 3. `on_update()` is called every frame before dirty chunks are rebuilt
pub trait GraphicsFlow<S> {
    /// Initialize the flow: configure the context and populate the scene.
    fn on_init(&mut self, ctx: &mut Context, scene: &mut WgpuScene, state: &mut S) -> Out<S>;

    /// Update state every frame. All registry mutations of the frame belong here.
    fn on_update(&mut self, ctx: &Context, scene: &mut WgpuScene, state: &mut S, dt: Duration) -> Out<S>;

    /// Handle raw device events (keyboard, mouse hardware input).
    fn on_device_events(&mut self, _ctx: &Context, _scene: &mut WgpuScene, _state: &mut S, _event: &DeviceEvent) -> Out<S> {
        Out::Empty
    }

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, _ctx: &Context, _scene: &mut WgpuScene, _state: &mut S, _event: &WindowEvent) -> Out<S> {
        Out::Empty
    }
}

// Dummy impl to make wasm work
impl<State> Debug for dyn GraphicsFlow<State> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Application state bundle: GPU context, scene, app state, and surface status.
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    scene: WgpuScene,
    state: State,
    is_surface_configured: bool,
    mouse_look: bool,
    frames: u32,
    since_title: Duration,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            scene: Scene::new(),
            state: State::default(),
            is_surface_configured: false,
            mouse_look: false,
            frames: 0,
            since_title: Duration::from_millis(0),
        })
    }
}

impl<State> AppState<State> {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    fn update_camera(&mut self, dt: Duration) {
        let camera = &mut self.ctx.camera;
        camera.controller.update(&mut camera.camera, dt);
        camera
            .uniform
            .update_view_proj(&camera.camera, &self.ctx.projection);
        self.ctx.queue.write_buffer(
            &camera.buffer,
            0,
            bytemuck::cast_slice(&[camera.uniform]),
        );
    }

    fn update_title(&mut self, dt: Duration) {
        self.frames += 1;
        self.since_title += dt;
        if self.since_title >= Duration::from_secs(1) {
            let fps = self.frames as f32 / self.since_title.as_secs_f32();
            self.ctx.window.set_title(&format!(
                "FPS: {} | Models: {} | Chunks: {}",
                fps.round(),
                self.scene.instances.len(),
                self.scene.batches().len()
            ));
            self.frames = 0;
            self.since_title = Duration::from_millis(0);
        }
    }

    fn render(&mut self) -> Result<(), RenderError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        // Every mutation of this frame has been applied; bake the touched chunks
        self.scene.prepare(&self.ctx.device)?;
        let range = self.ctx.view_range();

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            wgpu::CurrentSurfaceTexture::Outdated | wgpu::CurrentSurfaceTexture::Lost => {
                return Err(RenderError::Reconfigure);
            }
            other => return Err(RenderError::Skipped(format!("{:?}", other))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

            render_pass.set_pipeline(&self.ctx.batch_pipeline);
            render_pass.set_bind_group(0, &self.ctx.camera.bind_group, &[]);
            self.scene.draw(&mut render_pass, &range);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[derive(Debug)]
enum RenderError {
    // The surface is lost or outdated
    Reconfigure,
    Skipped(String),
    Engine(crate::error::EngineError),
}

impl From<crate::error::EngineError> for RenderError {
    fn from(e: crate::error::EngineError) -> Self {
        RenderError::Engine(e)
    }
}

pub struct App<State: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    state: Option<AppState<State>>,
    graphics_flows: Vec<Box<dyn GraphicsFlow<State>>>,
    last_time: Instant,
}

impl<State: 'static> App<State> {
    fn new(
        event_loop: &EventLoop<FlowEvent<State>>,
        flows: Vec<Box<dyn GraphicsFlow<State>>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy,
            state: None,
            graphics_flows: flows,
            last_time: Instant::now(),
        })
    }

    fn init_flows(&mut self) {
        let Some(app_state) = self.state.as_mut() else {
            return;
        };
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.scene, &mut app_state.state);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                app_state,
                self.proxy.clone(),
                out,
            );
        }
        log::info!(
            "Scene initialized with {} instances in {} chunks",
            app_state.scene.instances.len(),
            app_state.scene.instances.chunk_keys().count()
        );
    }
}

pub(crate) enum FlowEvent<State: 'static> {
    #[allow(dead_code)]
    Initialized(AppState<State>),
    #[allow(dead_code)]
    Mut(Mutation<State>),
    #[allow(dead_code)]
    Exit,
}

impl<State> Debug for FlowEvent<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::Mut(_) => f.write_str("Mut(|&mut State, &mut Scene| -> {...})"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl<State: 'static + Default> ApplicationHandler<FlowEvent<State>> for App<State> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("chunk-ngin");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(AppState::new(window)) {
                Ok(app_state) => {
                    self.state = Some(app_state);
                    self.init_flows();
                }
                Err(e) => {
                    log::error!("App initialization failed. Cannot create the main context: {}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match AppState::new(window).await {
                    Ok(app_state) => {
                        assert!(proxy.send_event(FlowEvent::Initialized(app_state)).is_ok());
                    }
                    Err(e) => {
                        log::error!("App initialization failed: {}", e);
                        let _ = proxy.send_event(FlowEvent::Exit);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State>) {
        match event {
            FlowEvent::Initialized(mut app_state) => {
                // This is the message from our wasm `spawn_local`
                let size = app_state.ctx.window.inner_size();
                app_state.resize(size.width, size.height);
                app_state.ctx.window.request_redraw();
                self.state = Some(app_state);
                self.init_flows();
            }
            FlowEvent::Mut(mutation) => {
                if let Some(app_state) = &mut self.state {
                    mutation(&mut app_state.state, &mut app_state.scene);
                }
            }
            FlowEvent::Exit => event_loop.exit(),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(app_state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if app_state.mouse_look {
                app_state.ctx.camera.controller.handle_mouse(dx, dy);
            }
        }
        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_device_events(&app_state.ctx, &mut app_state.scene, &mut app_state.state, &event);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                app_state,
                self.proxy.clone(),
                out,
            );
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(app_state) = &mut self.state else {
            return;
        };

        app_state.ctx.camera.controller.handle_window_events(&event);

        for flow in self.graphics_flows.iter_mut() {
            let out = flow.on_window_events(&app_state.ctx, &mut app_state.scene, &mut app_state.state, &event);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                app_state,
                self.proxy.clone(),
                out,
            );
        }

        match event {
            WindowEvent::CloseRequested => {
                app_state.scene.release(&app_state.ctx.device);
                event_loop.exit();
            }
            WindowEvent::Resized(size) => app_state.resize(size.width, size.height),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Right,
                ..
            } => app_state.mouse_look = button_state.is_pressed(),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                // (a) apply this frame's mutations
                for flow in self.graphics_flows.iter_mut() {
                    let out = flow.on_update(&app_state.ctx, &mut app_state.scene, &mut app_state.state, dt);
                    handle_flow_output(
                        #[cfg(not(target_arch = "wasm32"))]
                        &self.async_runtime,
                        app_state,
                        self.proxy.clone(),
                        out,
                    );
                }
                app_state.update_camera(dt);
                app_state.update_title(dt);

                // (b)-(d) rebuild, select, draw
                match app_state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(RenderError::Reconfigure) => {
                        let size = app_state.ctx.window.inner_size();
                        app_state.resize(size.width, size.height);
                    }
                    Err(RenderError::Skipped(reason)) => log::warn!("Skipping frame: {}", reason),
                    Err(RenderError::Engine(e)) => {
                        log::error!("Fatal GPU error, shutting down: {}", e);
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output<State>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    app_state: &mut AppState<State>,
    #[allow(unused_variables)] proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    out: Out<State>,
) {
    match out {
        // Mutate the state if the arch supports blocking, create an event otherwise
        Out::FutFn(futures) => {
            let futures: Vec<Pin<Box<dyn Future<Output = Mutation<State>>>>> =
                futures.into_iter().map(Pin::from).collect();
            let fut = async move { futures::future::join_all(futures.into_iter()).await };
            #[cfg(not(target_arch = "wasm32"))]
            {
                let resolved: Vec<Mutation<State>> = async_runtime.block_on(fut);
                for mutation in resolved {
                    mutation(&mut app_state.state, &mut app_state.scene);
                }
            }

            #[cfg(target_arch = "wasm32")]
            {
                wasm_bindgen_futures::spawn_local(async move {
                    let resolved = fut.await;
                    for mutation in resolved {
                        assert!(proxy.send_event(FlowEvent::Mut(mutation)).is_ok());
                    }
                });
            }
        }
        Out::Configure(f) => f(&mut app_state.ctx),
        Out::Empty => (),
    }
}

/// Runs the event loop until the window is closed.
pub fn run<State: 'static + Default>(flows: Vec<Box<dyn GraphicsFlow<State>>>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent<State>> = EventLoop::with_user_event().build()?;

    let mut app: App<State> = App::new(&event_loop, flows)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
