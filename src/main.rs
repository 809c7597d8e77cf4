use std::time::Instant;

use log::{error, info};
use winit::{
    dpi::LogicalSize,
    event::{Event, KeyboardInput, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    platform::run_return::EventLoopExtRunReturn,
    window::WindowBuilder,
};

use crate::{
    constants::{WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH},
    error::AppError,
    render_loop::RenderLoop,
    renderer::Renderer,
    sphere::SphereParams,
};

#[macro_use]
extern crate lazy_static;

mod constants;
mod error;
mod input;
mod render_loop;
mod renderer;
mod sphere;
mod transform;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(-1);
    }
}

fn run() -> Result<(), AppError> {
    let mesh = sphere::generate(SphereParams::default())?;
    let params = mesh.params();
    info!(
        "Generated sphere r={} with {}x{} grid, {} triangles",
        params.radius,
        params.stacks,
        params.slices,
        mesh.triangle_count()
    );

    let mut event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
        .build(&event_loop)?;

    let mut renderer = Renderer::new(&window, &mesh)?;
    let mut render_loop = RenderLoop::new();
    let start = Instant::now();
    let mut failure = None;

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, window_id } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => render_loop.input.request_close(),
                WindowEvent::Resized(size) => renderer.framebuffer_resized(size),
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            virtual_keycode: Some(key),
                            state,
                            ..
                        },
                    ..
                } => render_loop.input.handle_key(key, state),
                _ => (),
            },
            Event::MainEventsCleared => match render_loop.step(start.elapsed()) {
                Some(transforms) => {
                    if let Err(err) = renderer.draw_frame(&window, &transforms.uniforms()) {
                        failure = Some(err);
                        *control_flow = ControlFlow::Exit;
                    }
                }
                None => *control_flow = ControlFlow::Exit,
            },
            _ => (),
        }
    });

    if let Some(err) = failure {
        return Err(err.into());
    }
    renderer.wait_idle()?;
    info!(
        "Loop {:?} after {} frames in {:.1}s",
        render_loop.state(),
        render_loop.frames(),
        start.elapsed().as_secs_f32()
    );
    Ok(())
}
