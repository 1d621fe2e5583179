//! Interactive frame loop

use crate::globe::Globe;
use crate::render::{BrailleRenderer, Renderer};
use crate::terminal::{MouseCaptureGuard, Terminal};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

const ZOOM_STEP: f32 = 1.1;

/// Shared stop flag for the frame loop
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct FrameLoop {
    globe: Globe,
    renderer: BrailleRenderer,
    cancel: CancelToken,
    frame_time: Duration,
    paused: bool,
}

impl FrameLoop {
    pub fn new(mut globe: Globe, renderer: BrailleRenderer) -> Self {
        let (w, h) = renderer.terminal().size();
        globe.resize(w, h);
        let frame_time = globe.config().frame_duration();
        Self {
            globe,
            renderer,
            cancel: CancelToken::new(),
            frame_time,
            paused: false,
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn globe(&self) -> &Globe {
        &self.globe
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run until cancelled or the user quits. Mouse capture is held for the
    /// whole loop and the globe is torn down before returning.
    pub fn run(&mut self) -> io::Result<()> {
        let _mouse = MouseCaptureGuard::enable()?;
        info!(frame_ms = self.frame_time.as_millis() as u64, "frame loop started");

        let result = self.run_frames();
        self.globe.dispose();
        info!("frame loop finished");
        result
    }

    fn run_frames(&mut self) -> io::Result<()> {
        while !self.cancel.is_cancelled() {
            let frame_start = Instant::now();

            loop {
                let Some(event) = self.renderer.terminal().poll_event(Duration::ZERO)? else {
                    break;
                };
                if self.handle_event(event)? == Control::Quit {
                    self.cancel.cancel();
                }
            }
            if self.cancel.is_cancelled() {
                break;
            }

            self.step(frame_start)?;

            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                self.renderer.terminal().sleep((self.frame_time - elapsed).as_secs_f32());
            }
        }
        Ok(())
    }

    /// Advance (unless paused) and draw one frame
    pub fn step(&mut self, now: Instant) -> io::Result<()> {
        if !self.paused {
            self.globe.update(now);
        }
        self.renderer.render(&self.globe, self.globe.camera())
    }

    pub fn handle_event(&mut self, event: Event) -> io::Result<Control> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => return Ok(self.handle_key(key)),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    let (w, h) = self.renderer.terminal().size();
                    self.globe.pointer_moved(mouse.column, mouse.row, w, h);
                }
                MouseEventKind::ScrollUp => self.zoom(1.0 / ZOOM_STEP),
                MouseEventKind::ScrollDown => self.zoom(ZOOM_STEP),
                _ => {}
            },
            Event::Resize(w, h) => {
                self.renderer.resize(w, h)?;
                self.globe.resize(w, h);
            }
            Event::FocusLost => self.globe.pointer_left(),
            _ => {}
        }
        Ok(Control::Continue)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Control::Quit,
            KeyCode::Char('?') => self.renderer.toggle_help(),
            KeyCode::Char('/') if key.modifiers.contains(KeyModifiers::SHIFT) => self.renderer.toggle_help(),
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(1.0 / ZOOM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(ZOOM_STEP),
            KeyCode::Char('0') => {
                let distance = self.globe.config().camera_distance;
                self.globe.set_camera_distance(distance);
            }
            _ => {}
        }
        Control::Continue
    }

    fn zoom(&mut self, factor: f32) {
        let distance = self.globe.camera().position.z * factor;
        self.globe.set_camera_distance(distance);
    }
}

/// Set up the screen, run the loop, restore the screen
pub fn run_interactive(globe: Globe) -> io::Result<()> {
    let term = Terminal::new(true)?;
    let mut frame_loop = FrameLoop::new(globe, BrailleRenderer::new(term));
    frame_loop.run()
}
