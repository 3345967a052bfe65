// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `gyre-glow`.
//
// `gyre-glow` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `gyre-glow` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `gyre-glow`. If not, see <https://www.gnu.org/licenses/>.

// Easy module for setting up a glutin context for the examples.

use gyre::{Mesh, Scene, Spin};
use gyre_glow::GlowContext;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;

use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};

use raw_window_handle::HasRawWindowHandle;

use std::error::Error;
use std::mem;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use winit::event::{Event, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

pub(crate) fn init() {
    tracing_subscriber::fmt::init();
}

/// Open a window and keep the mesh spinning in it until the window closes.
pub(crate) fn run(title: &'static str, mesh: Mesh, spin: Spin) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    GlutinSetup::new(&event_loop, title)?.run(event_loop, mesh, spin)
}

struct GlutinSetup {
    display: Display,
    config: Config,
    context: ContextType,
    window: Option<Window>,
    title: &'static str,
}

enum ContextType {
    NotCurrent(NotCurrentContext),
    Current {
        context: PossiblyCurrentContext,
        window: Window,
        surface: Surface<WindowSurface>,
    },
    Hole,
}

impl Default for ContextType {
    fn default() -> Self {
        Self::Hole
    }
}

fn make_window_builder(title: &str) -> WindowBuilder {
    WindowBuilder::new().with_title(title)
}

impl GlutinSetup {
    fn new<T>(
        event_loop: &EventLoopWindowTarget<T>,
        title: &'static str,
    ) -> Result<Self, Box<dyn Error>> {
        // Start building a window.
        let window = if cfg!(windows) {
            Some(make_window_builder(title))
        } else {
            None
        };

        // Use the window builder to start building a display.
        let display = DisplayBuilder::new().with_window_builder(window);

        // Look for a config with a depth buffer and a good sample count.
        let (window, gl_config) = display.build(
            event_loop,
            ConfigTemplateBuilder::new()
                .with_alpha_size(8)
                .with_depth_size(24),
            |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .unwrap()
            },
        )?;

        println!("Config: {:?}", &gl_config);
        println!("Depth Size: {:?}", gl_config.depth_size());
        println!("Samples: {:?}", gl_config.num_samples());
        println!("Api: {:?}", gl_config.api());

        // Try to build a several different contexts.
        let window_handle = window.as_ref().map(|w| w.raw_window_handle());
        let contexts = [
            ContextAttributesBuilder::new().build(window_handle),
            ContextAttributesBuilder::new()
                .with_context_api(ContextApi::Gles(None))
                .build(window_handle),
            ContextAttributesBuilder::new()
                .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
                .build(window_handle),
        ];

        let display = gl_config.display();
        let gl_handler = (|| {
            // Try to build a context for each config.
            for context in &contexts {
                if let Ok(gl_context) = unsafe { display.create_context(&gl_config, context) } {
                    return Ok(gl_context);
                }
            }

            // If we couldn't build a context, return an error.
            Err(Box::<dyn Error>::from("Could not create a context"))
        })()?;

        Ok(Self {
            display,
            config: gl_config,
            context: ContextType::NotCurrent(gl_handler),
            window,
            title,
        })
    }

    fn make_current<T>(
        &mut self,
        window_target: &EventLoopWindowTarget<T>,
    ) -> impl FnOnce() -> glow::Context {
        let window = self.window.take().unwrap_or_else(|| {
            let window_builder = make_window_builder(self.title);
            glutin_winit::finalize_window(window_target, window_builder, &self.config).unwrap()
        });

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe {
            self.display
                .create_window_surface(&self.config, &attrs)
                .unwrap()
        };

        // Make it current.
        let gl_context = match mem::take(&mut self.context) {
            ContextType::NotCurrent(context) => context.make_current(&gl_surface).unwrap(),
            _ => panic!("Invalid state!"),
        };

        // Try setting vsync.
        if let Err(res) = gl_surface
            .set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()))
        {
            eprintln!("Error setting vsync: {res:?}");
        }

        self.context = ContextType::Current {
            context: gl_context,
            window,
            surface: gl_surface,
        };

        // Set up the Glow context.
        let display = self.display.clone();
        move || {
            let glow_context = unsafe {
                glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s) as *const _)
            };

            #[cfg(not(target_vendor = "apple"))]
            unsafe {
                use glow::HasContext;

                glow_context.enable(glow::DEBUG_OUTPUT);
                glow_context.debug_message_callback(debug_message_callback);
            }

            glow_context
        }
    }

    fn run<T>(mut self, evl: EventLoop<T>, mesh: Mesh, spin: Spin) -> Result<(), Box<dyn Error>> {
        let mut current_size = None;
        let mut next_render = Instant::now() + Duration::from_millis(16);
        let mut scene: Option<Scene<GlowContext<glow::Context>>> = None;
        let mut last_frame = Instant::now();

        evl.run(move |event, window_target, control_flow| {
            control_flow.set_wait_until(next_render);
            match event {
                Event::Resumed => {
                    let generator = self.make_current(window_target);
                    scene.get_or_insert_with(|| {
                        let context = generator();

                        // SAFETY: We are current.
                        let backend = unsafe { GlowContext::new(context) }.unwrap();

                        Scene::with_spin(backend, mesh.clone(), spin).unwrap()
                    });
                }
                Event::Suspended => {
                    // Only raised on Android, where the backing window for a GL surface
                    // can appear and disappear at any moment. Un-current the context so
                    // the window can be released back to the system.
                    let gl_context = match mem::take(&mut self.context) {
                        ContextType::Current { context, .. } => context,
                        _ => panic!("Invalid state!"),
                    };
                    self.context = ContextType::NotCurrent(gl_context.make_not_current().unwrap());
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if size.width != 0 && size.height != 0 {
                            // Some platforms like EGL require resizing the GL surface to
                            // pick up the new size. Elsewhere it's a no-op.
                            if let ContextType::Current {
                                context, surface, ..
                            } = &self.context
                            {
                                surface.resize(
                                    context,
                                    NonZeroU32::new(size.width).unwrap(),
                                    NonZeroU32::new(size.height).unwrap(),
                                );
                                current_size = Some(size);
                            }
                        }
                    }
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    _ => (),
                },
                Event::RedrawEventsCleared => {
                    if let ContextType::Current {
                        context: gl_context,
                        window,
                        surface: gl_surface,
                    } = &self.context
                    {
                        let scene = scene.as_mut().unwrap();

                        let now = Instant::now();
                        scene.advance(now - last_frame);
                        last_frame = now;

                        // SAFETY: Context is current
                        let size = current_size.unwrap_or_else(|| window.inner_size());
                        scene.render(size.width, size.height);

                        window.request_redraw();

                        gl_surface.swap_buffers(gl_context).unwrap();
                        next_render += Duration::from_millis(17);
                    }
                }
                _ => (),
            }
        })
    }
}

#[cfg(not(target_vendor = "apple"))]
fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
    let source = match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        glow::DEBUG_SOURCE_APPLICATION => "Application",
        glow::DEBUG_SOURCE_OTHER => "Other",
        _ => "Unknown",
    };

    let ty = match ty {
        glow::DEBUG_TYPE_ERROR => "Error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
        glow::DEBUG_TYPE_PORTABILITY => "Portability",
        glow::DEBUG_TYPE_PERFORMANCE => "Performance",
        glow::DEBUG_TYPE_MARKER => "Marker",
        glow::DEBUG_TYPE_OTHER => "Other",
        _ => "Unknown",
    };

    match severity {
        glow::DEBUG_SEVERITY_HIGH => {
            tracing::error!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_MEDIUM => {
            tracing::warn!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_LOW => {
            tracing::info!("{ty}-{id} ({source}): {message}");
        }
        glow::DEBUG_SEVERITY_NOTIFICATION => {
            tracing::debug!("{ty}-{id} ({source}): {message}");
        }
        _ => (),
    };
}
