use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use tracing::{debug, error, info, warn};

use crate::compile::CompileDiagnostic;
use crate::gpu::{GpuState, PipelineBuilder, ShaderPipeline};
use crate::runtime::{seed_from_clock, Clock, FramePacer, RegenerateLatch, RegenerateTimer};
use crate::types::{ProvidedShader, RendererConfig, ShaderProvider};

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Events posted to the event loop from the shader worker.
pub(crate) enum WindowCommand {
    PipelineReady(Result<ShaderPipeline, ShaderFailure>),
}

#[derive(Debug)]
pub(crate) struct ShaderFailure {
    pub seed: u64,
    pub diagnostic: CompileDiagnostic,
}

/// What a key press asks the window to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Regenerate,
    Exit,
}

fn key_action(event: &KeyEvent) -> Option<KeyAction> {
    match &event.logical_key {
        Key::Named(NamedKey::Space) => Some(KeyAction::Regenerate),
        Key::Character(value) if value.as_str() == " " => Some(KeyAction::Regenerate),
        Key::Named(NamedKey::Escape) => Some(KeyAction::Exit),
        _ => None,
    }
}

/// Generates shaders and compiles their pipelines off the event-loop thread.
///
/// Requests queued while a shader is being built collapse into the newest
/// one, so mashing the regenerate key never builds a backlog.
struct ShaderWorker {
    requests: Option<Sender<u64>>,
    handle: Option<JoinHandle<()>>,
}

impl ShaderWorker {
    fn spawn(
        provider: Arc<dyn ShaderProvider>,
        builder: PipelineBuilder,
        proxy: EventLoopProxy<WindowCommand>,
    ) -> Result<Self> {
        let (requests, rx) = unbounded();
        let handle = thread::Builder::new()
            .name("pollock-shader-worker".into())
            .spawn(move || {
                run_worker(
                    provider.as_ref(),
                    &rx,
                    |shader| builder.build(shader),
                    |outcome| {
                        proxy
                            .send_event(WindowCommand::PipelineReady(outcome))
                            .is_ok()
                    },
                )
            })
            .context("failed to spawn shader worker thread")?;
        Ok(Self {
            requests: Some(requests),
            handle: Some(handle),
        })
    }

    fn request(&self, seed: u64) {
        debug!(seed, "requesting shader");
        if let Some(requests) = self.requests.as_ref() {
            if requests.send(seed).is_err() {
                warn!(seed, "shader worker is gone; request dropped");
            }
        }
    }
}

impl Drop for ShaderWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("shader worker panicked");
            }
        }
    }
}

/// Serves seed requests until the channel closes or `deliver` returns false.
///
/// Only the newest pending seed is built; older ones queued behind it are skipped.
fn run_worker<T>(
    provider: &dyn ShaderProvider,
    requests: &Receiver<u64>,
    build: impl Fn(&ProvidedShader) -> Result<T, CompileDiagnostic>,
    mut deliver: impl FnMut(Result<T, ShaderFailure>) -> bool,
) {
    while let Ok(mut seed) = requests.recv() {
        while let Ok(newer) = requests.try_recv() {
            seed = newer;
        }

        let shader = provider.shader_for(seed);
        let outcome = build(&shader).map_err(|diagnostic| ShaderFailure {
            seed: shader.seed,
            diagnostic,
        });
        if !deliver(outcome) {
            break;
        }
    }
}

/// GPU state together with the window whose raw handles its surface uses.
///
/// Fields drop in declaration order, so the surface goes before the window.
struct PreviewState {
    gpu: GpuState,
    window: Arc<Window>,
}

/// Opens the preview window and blocks until it closes.
pub(crate) fn run_window(config: RendererConfig, provider: Arc<dyn ShaderProvider>) -> Result<()> {
    let event_loop = EventLoopBuilder::<WindowCommand>::with_user_event()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let proxy = event_loop.create_proxy();

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let gpu = GpuState::new(window.as_ref(), window.inner_size())
        .context("failed to initialise window renderer")?;
    let mut state = PreviewState { gpu, window };

    let profile = state.gpu.adapter_profile().clone();
    let target_fps = match config.target_fps {
        None if profile.is_software() => {
            warn!(
                adapter = %profile.name,
                backend = ?profile.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping preview to {} FPS (override with --fps)",
                SOFTWARE_FPS_CAP
            );
            Some(SOFTWARE_FPS_CAP)
        }
        other => other,
    };

    let worker = ShaderWorker::spawn(Arc::clone(&provider), state.gpu.pipeline_builder(), proxy)?;
    let clock = Clock::new();
    let mut pacer = FramePacer::new(target_fps);
    let mut latch = RegenerateLatch::default();
    let mut timer = RegenerateTimer::new(config.regenerate_every, Instant::now());

    worker.request(config.initial_seed.unwrap_or_else(seed_from_clock));
    state.window.request_redraw();

    let title = config.title.clone();
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::UserEvent(WindowCommand::PipelineReady(outcome)) => match outcome {
            Ok(pipeline) => {
                let seed = pipeline.seed;
                state.gpu.install(pipeline);
                info!(seed, "presenting shader");
                state.window.set_title(&format!("{title} (seed {seed})"));
                state.window.request_redraw();
            }
            Err(failure) => {
                error!(
                    seed = failure.seed,
                    diagnostic = %failure.diagnostic,
                    kept = ?state.gpu.current_seed(),
                    "generated shader failed to compile; keeping the previous shader"
                );
            }
        },
        Event::WindowEvent { window_id, event } if window_id == state.window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => match key_action(&event) {
                Some(KeyAction::Regenerate) => match event.state {
                    ElementState::Pressed if !event.repeat && latch.press() => {
                        worker.request(seed_from_clock());
                        timer.restart(Instant::now());
                    }
                    ElementState::Released => latch.release(),
                    _ => {}
                },
                Some(KeyAction::Exit) if event.state == ElementState::Pressed => {
                    elwt.exit();
                }
                _ => {}
            },
            WindowEvent::Focused(focused) => latch.focus_changed(focused),
            WindowEvent::Resized(new_size) => {
                state.gpu.resize(new_size);
            }
            WindowEvent::RedrawRequested => {
                let buf = provider.uniforms(clock.elapsed_seconds());
                match state.gpu.render(buf) {
                    Ok(()) => pacer.mark_rendered(Instant::now()),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.gpu.resize(state.gpu.size());
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; closing preview");
                        elwt.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        debug!("surface timeout; retrying next frame");
                    }
                    Err(other) => {
                        warn!("surface error: {other:?}; retrying next frame");
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if timer.is_due(now) {
                worker.request(seed_from_clock());
                timer.restart(now);
            }

            if pacer.ready_for_frame(now) {
                state.window.request_redraw();
            }
            let deadline = match (pacer.next_deadline(), timer.deadline()) {
                (Some(frame), Some(regen)) => Some(frame.min(regen)),
                (frame, regen) => frame.or(regen),
            };
            match deadline {
                Some(deadline) if deadline > now => {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                }
                _ => elwt.set_control_flow(ControlFlow::Wait),
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::validate_fragment;
    use std::sync::Mutex;

    /// Records requested seeds; odd seeds produce text naga rejects.
    #[derive(Default)]
    struct ScriptedProvider {
        built: Mutex<Vec<u64>>,
    }

    impl ShaderProvider for ScriptedProvider {
        fn shader_for(&self, seed: u64) -> ProvidedShader {
            self.built.lock().unwrap().push(seed);
            let source = if seed % 2 == 0 {
                "#version 450\nlayout(location = 0) out vec4 out_color;\n\
                 void main() { out_color = vec4(1.0); }\n"
                    .to_string()
            } else {
                "#version 450\nvoid main() { out_color = ; }\n".to_string()
            };
            ProvidedShader { seed, source }
        }

        fn uniforms(&self, _elapsed_seconds: f32) -> [f32; 4] {
            [0.0; 4]
        }
    }

    fn drain(provider: &ScriptedProvider, seeds: &[u64]) -> Vec<Result<u64, ShaderFailure>> {
        let (tx, rx) = unbounded();
        for seed in seeds {
            tx.send(*seed).unwrap();
        }
        drop(tx);

        let mut delivered = Vec::new();
        run_worker(
            provider,
            &rx,
            |shader| validate_fragment(&shader.source).map(|()| shader.seed),
            |outcome| {
                delivered.push(outcome);
                true
            },
        );
        delivered
    }

    #[test]
    fn queued_requests_collapse_into_the_newest() {
        let provider = ScriptedProvider::default();
        let delivered = drain(&provider, &[2, 4, 6]);
        assert_eq!(*provider.built.lock().unwrap(), vec![6]);
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].as_ref().ok(), Some(&6));
    }

    #[test]
    fn rejected_shader_reports_its_seed() {
        let provider = ScriptedProvider::default();
        let delivered = drain(&provider, &[7]);
        match delivered.as_slice() {
            [Err(failure)] => {
                assert_eq!(failure.seed, 7);
                assert!(matches!(failure.diagnostic, CompileDiagnostic::Parse(_)));
            }
            other => panic!("expected one failure, got {} outcomes", other.len()),
        }
    }

    #[test]
    fn worker_stops_once_the_window_is_gone() {
        let provider = ScriptedProvider::default();
        let (tx, rx) = unbounded();
        tx.send(2).unwrap();
        let mut deliveries = 0;
        run_worker(
            &provider,
            &rx,
            |shader| Ok::<_, CompileDiagnostic>(shader.seed),
            |_| {
                deliveries += 1;
                false
            },
        );
        tx.send(4).unwrap();
        assert_eq!(deliveries, 1);
        assert_eq!(*provider.built.lock().unwrap(), vec![2]);
    }
}
