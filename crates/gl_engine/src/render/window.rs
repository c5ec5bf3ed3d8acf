//! GLFW window with an OpenGL context
//!
//! [`Context`] owns the window, its event queue and the frame clock. Input is
//! gathered per frame by [`Context::poll`] into a [`FrameInput`] value that
//! the application loop consumes, rather than through registered callbacks.

use std::collections::HashSet;

use glfw::Context as _;
use thiserror::Error;

use crate::core::config::WindowConfig;
use crate::render::backends::OpenGlDevice;

pub use glfw::Key;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// The window or its context could not be created
    #[error("Failed to create a {width}x{height} window with OpenGL {major}.{minor}")]
    CreationFailed {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Requested major GL version
        major: u32,
        /// Requested minor GL version
        minor: u32,
    },
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Input gathered during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Cursor movement while the left button was held, in screen coordinates
    pub drag: (f32, f32),
    /// Vertical scroll amount
    pub scroll: f32,
    /// Keys that went down this frame
    pub pressed: HashSet<Key>,
    /// New framebuffer size, if it changed
    pub resized: Option<(i32, i32)>,
    /// Seconds since the context was created
    pub time: f32,
    /// Seconds since the previous poll
    pub delta_time: f32,
}

impl FrameInput {
    /// Whether `key` went down this frame
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Whether the pointer was dragged this frame
    pub fn is_dragging(&self) -> bool {
        self.drag != (0.0, 0.0)
    }
}

/// GLFW window, GL context and frame clock
pub struct Context {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    dragging: bool,
    last_cursor: (f64, f64),
    last_time: f64,
}

impl Context {
    /// Create the window and make its core-profile context current
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|error| WindowError::InitializationFailed(format!("{error:?}")))?;

        let (major, minor) = config.gl_version;
        glfw.window_hint(glfw::WindowHint::ContextVersion(major, minor));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::Samples(Some(config.samples)));
        glfw.window_hint(glfw::WindowHint::Resizable(true));
        #[cfg(target_os = "macos")]
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| {
                log::error!("Failed to create GLFW window");
                WindowError::CreationFailed { width: config.width, height: config.height, major, minor }
            })?;

        window.make_current();
        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        window.set_key_polling(true);
        window.set_scroll_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_mouse_button_polling(true);
        window.set_framebuffer_size_polling(true);

        let last_time = glfw.get_time();
        log::info!(
            "Created window '{}' ({}x{}, OpenGL {major}.{minor} core)",
            config.title,
            config.width,
            config.height
        );

        Ok(Self {
            glfw,
            window,
            events,
            dragging: false,
            last_cursor: (0.0, 0.0),
            last_time,
        })
    }

    /// Load GL entry points for this context into a device
    pub fn create_device(&mut self) -> OpenGlDevice {
        let window = &mut self.window;
        OpenGlDevice::from_loader_function(|name| window.get_proc_address(name) as *const _)
    }

    /// Process pending window events and advance the frame clock
    pub fn poll(&mut self) -> FrameInput {
        self.glfw.poll_events();

        let now = self.glfw.get_time();
        let mut input = FrameInput {
            time: now as f32,
            delta_time: (now - self.last_time) as f32,
            ..FrameInput::default()
        };
        self.last_time = now;

        for (_, event) in glfw::flush_messages(&self.events) {
            match event {
                glfw::WindowEvent::MouseButton(glfw::MouseButton::Button1, action, _) => match action {
                    glfw::Action::Press => {
                        self.dragging = true;
                        self.last_cursor = self.window.get_cursor_pos();
                    }
                    glfw::Action::Release => self.dragging = false,
                    glfw::Action::Repeat => {}
                },
                glfw::WindowEvent::CursorPos(x, y) if self.dragging => {
                    input.drag.0 += (x - self.last_cursor.0) as f32;
                    input.drag.1 += (y - self.last_cursor.1) as f32;
                    self.last_cursor = (x, y);
                }
                glfw::WindowEvent::Scroll(_, y) => input.scroll += y as f32,
                glfw::WindowEvent::Key(key, _, glfw::Action::Press, _) => {
                    input.pressed.insert(key);
                }
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    log::trace!("Framebuffer resized to {width}x{height}");
                    input.resized = Some((width, height));
                }
                _ => {}
            }
        }
        input
    }

    /// Present the back buffer
    pub fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request or cancel closing
    pub fn set_should_close(&mut self, close: bool) {
        self.window.set_should_close(close);
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (i32, i32) {
        self.window.get_framebuffer_size()
    }
}
