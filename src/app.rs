use cgmath::Vector3;
use std::sync::{mpsc, Arc};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::{
    catalog::{self, CatalogEntry},
    gfx::{
        camera::{
            camera_controller::CameraController, camera_utils::CameraManager,
            orbit_camera::OrbitCamera,
        },
        rendering::render_engine::RenderEngine,
        scene::{
            model::{Mesh, Model},
            scene::Scene,
        },
    },
    loader::{self, LoadEvent, LoadPhase, LoadSequencer, LoadedModel},
    ui::{
        manager::UiManager,
        panel::{CatalogPanel, LoadStatus},
    },
};

/// Directory listing endpoint the viewer scrapes for OBJ/MTL pairs.
pub const DEFAULT_ASSETS_URL: &str = "http://localhost:8000/assets/";

/// The viewer session: owns the event loop and every piece of viewer state.
pub struct GanderApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    panel: CatalogPanel,
    assets_url: String,
    catalog_rx: Option<mpsc::Receiver<Vec<CatalogEntry>>>,
    load_tx: mpsc::Sender<LoadEvent>,
    load_rx: mpsc::Receiver<LoadEvent>,
    sequencer: LoadSequencer,
}

impl GanderApp {
    /// Create a new viewer session pointed at `assets_url`
    pub async fn new(assets_url: &str) -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        let camera = OrbitCamera::new(6.0, 0.35, 0.0, Vector3::new(0.0, 0.0, 0.0), 1.5);
        let controller = CameraController::new(0.005, 0.1);

        let camera_manager = CameraManager::new(camera, controller);
        let scene = Scene::new(camera_manager);

        let (load_tx, load_rx) = mpsc::channel();

        Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                panel: CatalogPanel::new(),
                assets_url: assets_url.to_string(),
                catalog_rx: None,
                load_tx,
                load_rx,
                sequencer: LoadSequencer::new(),
            },
        }
    }

    /// Run the viewer (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .expect("Failed to run event loop");
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("gander")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();
            self.scene
                .camera_manager
                .camera
                .resize_projection(width, height);

            let window_clone = window_handle.clone();
            let renderer =
                pollster::block_on(
                    async move { RenderEngine::new(window_clone, width, height).await },
                );

            self.scene
                .init_gpu_resources(renderer.device(), renderer.queue());

            let ui_manager = UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window_handle,
            );

            self.ui_manager = Some(ui_manager);
            self.render_engine = Some(renderer);

            // Kick off catalog discovery; the panel shows its scanning
            // state until the background fetch reports back
            let (catalog_tx, catalog_rx) = mpsc::channel();
            catalog::spawn_fetch(self.assets_url.clone(), catalog_tx);
            self.catalog_rx = Some(catalog_rx);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        if self.render_engine.is_none() {
            return;
        }

        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                // Key releases must still reach the controller, otherwise a
                // movement key held while the UI grabs focus sticks forever
                if let WindowEvent::KeyboardInput {
                    event: key_event, ..
                } = &event
                {
                    if key_event.state == ElementState::Released {
                        self.scene.camera_manager.process_keyboard_event(key_event);
                    }
                }
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if matches!(
                    key_event.physical_key,
                    winit::keyboard::PhysicalKey::Code(winit::keyboard::KeyCode::Escape)
                ) {
                    event_loop.exit();
                    return;
                }
                self.scene.camera_manager.process_keyboard_event(&key_event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.drain_catalog();
                self.drain_load_events();

                self.scene.update();

                let Some(render_engine) = self.render_engine.as_mut() else {
                    return;
                };
                render_engine.update(self.scene.camera_manager.camera.uniform);

                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    let window_clone = window.clone();
                    let panel = &mut self.panel;
                    render_engine.render_frame_with_ui(
                        &self.scene,
                        |device, queue, encoder, color_attachment| {
                            ui_manager.draw(
                                device,
                                queue,
                                encoder,
                                &window_clone,
                                color_attachment,
                                |ui| panel.draw(ui),
                            );
                        },
                    );
                } else {
                    render_engine.render_frame_simple(&self.scene);
                }

                if let Some(entry) = self.panel.take_request() {
                    self.begin_load(entry);
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        // Don't orbit the camera while the UI owns the pointer
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_any_input() {
                return;
            }
        }

        self.scene.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

impl AppState {
    /// Starts a background load for `entry`, retiring every earlier request.
    fn begin_load(&mut self, entry: CatalogEntry) {
        // The previous model is released before the new load starts
        self.scene.clear_model();

        let generation = self.sequencer.begin();
        self.panel
            .set_status(LoadStatus::Loading(LoadPhase::Material));
        log::info!("loading '{}' (request {generation})", entry.name);

        loader::spawn_load(generation, &self.assets_url, entry, self.load_tx.clone());
    }

    /// Picks up the catalog discovery result, if it has arrived.
    fn drain_catalog(&mut self) {
        let Some(rx) = self.catalog_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(entries) => {
                log::info!("catalog ready: {} model(s)", entries.len());
                self.panel.set_entries(entries);
            }
            Err(mpsc::TryRecvError::Empty) => {
                self.catalog_rx = Some(rx);
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                self.panel.set_entries(Vec::new());
            }
        }
    }

    /// Applies loader events, dropping any that carry a stale generation.
    fn drain_load_events(&mut self) {
        while let Ok(event) = self.load_rx.try_recv() {
            match event {
                LoadEvent::Phase { generation, phase } => {
                    if self.sequencer.is_current(generation) {
                        self.panel.set_status(LoadStatus::Loading(phase));
                    }
                }
                LoadEvent::Finished { generation, result } => {
                    if !self.sequencer.is_current(generation) {
                        log::debug!("discarding result of superseded load {generation}");
                        continue;
                    }

                    match result {
                        Ok(loaded) => self.install_model(loaded),
                        Err(err) => {
                            log::error!("model load failed: {err}");
                            self.scene.clear_model();
                            self.panel.set_status(LoadStatus::Failed(err.to_string()));
                        }
                    }
                }
            }
        }
    }

    /// Installs a loaded model: recenter, face the camera, upload buffers,
    /// and reframe the orbit camera around it.
    fn install_model(&mut self, loaded: LoadedModel) {
        let Some(render_engine) = self.render_engine.as_ref() else {
            return;
        };

        let meshes = loaded
            .meshes
            .into_iter()
            .map(|m| Mesh::new(m.positions, m.normals, m.indices, m.material))
            .collect();

        let mut model = Model::new(loaded.name.clone(), meshes);
        let extent = model.orient_for_viewing();

        self.scene.set_model(model, loaded.materials);
        self.scene
            .init_gpu_resources(render_engine.device(), render_engine.queue());

        self.scene.camera_manager.camera.frame(extent);
        self.panel.set_status(LoadStatus::Ready(loaded.name));
    }
}
