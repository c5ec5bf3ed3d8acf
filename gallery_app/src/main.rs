//! Primitive gallery
//!
//! Shows a phong cube, a height-colored sphere inside a ring and an orbit, a geodesic
//! ball, a row of cones, cylinders and pyramids, a height field and a
//! textured plane, lit by one directional and two point lights.
//!
//! Controls: drag to orbit, scroll to zoom, `F` toggles wireframe, `P`
//! saves a screenshot, `Escape` quits.

use gl_engine::assets::{load_texture, MediaExporter};
use gl_engine::foundation::collections::{RendererHandle, TextureHandle, ViewHandle};
use gl_engine::prelude::*;
use gl_engine::render::resources::{PixelBufferDescriptor, PixelFormat};

const CONFIG_PATH: &str = "gallery.toml";
const PLANE_TEXTURE: &str = "checker.png";

struct GalleryApp {
    engine: Engine,
    context: Context,
    renderer: RendererHandle,
    view: ViewHandle,
    camera: Entity,
    exporter: MediaExporter,
    screenshots: u32,
}

impl GalleryApp {
    fn new(config: EngineConfig) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating primitive gallery...");
        let mut context = Context::new(&config.window)?;
        let device = context.create_device();
        let exporter = MediaExporter::builder().folder_path(&config.assets.export_dir).build();
        let mut engine = Engine::create(Box::new(device), config)?;

        let scene = engine.create_scene();
        for entity in Self::build_gallery(&mut engine)? {
            engine.add_to_scene(scene, entity)?;
        }

        let camera = engine.create_entity();
        engine.create_camera(camera).set_radius(16.0);
        let skybox = SkyboxBuilder::new().color(0.05, 0.05, 0.08, 1.0).build(&mut engine);

        let view = engine.create_view();
        if let Some(bound) = engine.view_mut(view) {
            bound.set_scene(Some(scene));
            bound.set_camera(Some(camera));
            bound.set_skybox(Some(skybox));
        }
        let renderer = engine.create_renderer();
        let background = engine.skybox(skybox).map_or([0.0, 0.0, 0.0, 1.0], |skybox| skybox.color());
        if let Some(renderer) = engine.renderer_mut(renderer) {
            renderer.set_clear_options(ClearOptions { clear: true, clear_color: background });
        }

        let mut app = Self { engine, context, renderer, view, camera, exporter, screenshots: 0 };
        let (width, height) = app.context.framebuffer_size();
        app.resize(width, height);
        Ok(app)
    }

    fn build_gallery(engine: &mut Engine) -> EngineResult<Vec<Entity>> {
        let cube = Cube::builder()
            .shading_model(ShadingModel::Phong)
            .phong_material(material::EMERALD)
            .transform(Mat4::translation(-3.0, 0.0, 0.0))
            .build(engine)?;

        let sphere = Sphere::builder()
            .shading_model(ShadingModel::Phong)
            .phong_material(material::PEARL)
            .transform(Mat4::translation(0.0, 0.0, 0.0))
            .build(engine)?;

        let ball = Geodesic::builder()
            .transform(Mat4::translation(3.0, 0.0, 0.0))
            .build(engine)?;

        let ring = Ring::builder()
            .radius(1.4)
            .thickness(0.4)
            .build(engine)?;
        let orbit = Orbit::ellipse(6.0, 2.5)
            .color(1.0, 1.0, 0.6)
            .build(engine)?;

        let cone = Cone::builder()
            .transform(Mat4::translation(-4.5, 4.0, 0.0))
            .build(engine)?;
        let cylinder = Cylinder::builder()
            .transform(Mat4::translation(-1.5, 4.0, 0.0))
            .build(engine)?;
        let pyramid = Pyramid::builder()
            .transform(Mat4::translation(1.5, 4.0, 0.0))
            .build(engine)?;
        let tetrahedron = Tetrahedron::builder()
            .shading_model(ShadingModel::Phong)
            .phong_material(material::JADE)
            .transform(Mat4::translation(4.5, 4.0, 0.0))
            .build(engine)?;

        let surface = Surface::builder(|x, y| (x * 2.0).sin() * (y * 2.0).cos())
            .half_extent(2.0)
            .transform(Mat4::translation(0.0, -5.0, 0.0))
            .build(engine)?;

        let texture = Self::plane_texture(engine)?;
        let plane = Plane::builder()
            .size(14.0, 14.0)
            .uv_repeat(4.0)
            .unlit_texture(texture)
            .transform(Mat4::translation(0.0, 0.0, -1.5))
            .build(engine)?;

        let sun = engine.create_entity();
        LightBuilder::new(LightType::Directional)
            .direction(-1.0, -0.5, -1.0)
            .ambient(0.1, 0.1, 0.1)
            .diffuse(0.6, 0.6, 0.6)
            .build(engine.world_mut(), sun);

        let warm = engine.create_entity();
        LightBuilder::new(LightType::Point)
            .position(-2.0, -3.0, 2.0)
            .color(1.0, 0.6, 0.3)
            .distance(LightDistance::Short)
            .build(engine.world_mut(), warm);

        let cold = engine.create_entity();
        LightBuilder::new(LightType::Point)
            .position(2.0, 3.0, 2.0)
            .color(0.3, 0.6, 1.0)
            .distance(LightDistance::Short)
            .build(engine.world_mut(), cold);

        let drawables = [cube, sphere, ring, orbit, ball, cone, cylinder, pyramid, tetrahedron, surface, plane];
        let mut entities: Vec<Entity> = drawables.iter().map(Drawable::entity).collect();
        entities.extend([sun, warm, cold]);
        Ok(entities)
    }

    /// Texture file when present, generated checkerboard otherwise
    fn plane_texture(engine: &mut Engine) -> EngineResult<TextureHandle> {
        match load_texture(PLANE_TEXTURE, engine) {
            Ok(texture) => return Ok(texture),
            Err(e) => log::warn!("Using generated checkerboard: {e}"),
        }

        const SIZE: u32 = 64;
        let mut pixels = Vec::with_capacity((SIZE * SIZE * 4) as usize);
        for y in 0..SIZE {
            for x in 0..SIZE {
                let shade = if (x / 8 + y / 8) % 2 == 0 { 230 } else { 40 };
                pixels.extend_from_slice(&[shade, shade, shade, 255]);
            }
        }
        let texture = TextureBuilder::new().width(SIZE).height(SIZE).build(engine)?;
        engine.set_texture_image(texture, 0, &PixelBufferDescriptor::new(&pixels, PixelFormat::Rgba))?;
        engine.generate_mipmaps(texture)?;
        Ok(texture)
    }

    fn resize(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        if let Some(view) = self.engine.view_mut(self.view) {
            view.set_viewport([0, 0, width, height]);
        }
        if let Some(camera) = self.engine.camera_mut(self.camera) {
            camera.set_perspective(45_f32.to_radians(), width as f32 / height as f32, 0.1, 100.0);
        }
        log::debug!("Viewport resized to {width}x{height}");
    }

    fn handle_input(&mut self, input: &FrameInput) -> Result<(), Box<dyn std::error::Error>> {
        if let Some((width, height)) = input.resized {
            self.resize(width, height);
        }
        if let Some(camera) = self.engine.camera_mut(self.camera) {
            if input.is_dragging() {
                camera.relative_drag(input.drag.0, input.drag.1);
            }
            if input.scroll != 0.0 {
                camera.relative_zoom(input.scroll);
            }
        }
        if input.was_pressed(Key::Escape) {
            self.context.set_should_close(true);
        }
        if input.was_pressed(Key::F) {
            self.engine.toggle_polygon_mode(self.renderer)?;
        }
        if input.was_pressed(Key::P) {
            self.screenshot()?;
        }
        Ok(())
    }

    fn screenshot(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (width, height) = self.context.framebuffer_size();
        let (width, height) = (width.max(0) as u32, height.max(0) as u32);
        let mut pixels = vec![0; width as usize * height as usize * 4];
        self.engine.read_framebuffer_rgba(0, 0, width, height, &mut pixels)?;
        self.screenshots += 1;
        self.exporter
            .export_image(&format!("gallery_{:03}", self.screenshots), &pixels, width, height)?;
        Ok(())
    }

    fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Starting primitive gallery...");
        while !self.context.should_close() {
            let input = self.context.poll();
            self.handle_input(&input)?;
            self.engine.render(self.renderer, self.view)?;
            self.context.swap_buffers();
        }
        log::info!("Primitive gallery closed");
        Ok(())
    }
}

impl Drop for GalleryApp {
    fn drop(&mut self) {
        self.engine.destroy();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    gl_engine::foundation::logging::init_with_default("info");

    let config = EngineConfig::load_or_default(CONFIG_PATH)?;
    let mut app = GalleryApp::new(config)?;
    app.run()
}
