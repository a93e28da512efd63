//! Application loop: serializes input, ticks, and shutdown onto one
//! logical thread and drives the render pipeline.
//!
//! The loop thread owns the component tree, the previous-frame snapshot,
//! the throttler, and the measurement cache. Input parsing runs on a
//! second thread that pushes into a channel; that is the only
//! multi-thread interaction the engine permits. A slow sink
//! backpressures the loop naturally because frame writes are synchronous.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, select, tick, unbounded};

use crate::buffer::Buffer;
use crate::color::ColorSupport;
use crate::component::{EventResult, FocusPath};
use crate::compositor::Compositor;
use crate::config::{Config, OutputMode};
use crate::diff;
use crate::encoder::Encoder;
use crate::error::{Result, WeftCoreError};
use crate::event::{Event, KeyCode, MouseEvent, MouseEventKind};
use crate::geometry::{Position, Size};
use crate::layout::{LayoutNode, MeasureCache, NodeId, place};
use crate::paint;
use crate::recorder::Recorder;
use crate::terminal::Terminal;
use crate::theme::ThemeManager;
use crate::throttle::FrameThrottler;

/// A press and release at most this many cells apart is a click.
const CLICK_SLOP: u16 = 5;

/// Loop lifecycle states observable by subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Created but not yet running.
    Idle,
    /// Inside the event loop.
    Running,
    /// Leaving the event loop.
    Stopping,
    /// Fully shut down; the terminal has been restored.
    Stopped,
}

/// Filter applied to every event before routing; returning false aborts
/// propagation.
pub type EventFilter = Box<dyn Fn(&Event) -> bool + Send>;

/// Construction-time options for [`App`].
#[derive(Debug)]
pub struct AppConfig {
    /// Tick interval for the dirty heartbeat (cursor blink and friends).
    pub tick_rate: Duration,
    /// Initial target frame rate.
    pub target_fps: u32,
    /// Enable adaptive frame-rate control.
    pub adaptive: bool,
    /// Sink color depth.
    pub color_support: ColorSupport,
    /// Environment configuration.
    pub config: Config,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_micros(16_667),
            target_fps: 60,
            adaptive: false,
            color_support: ColorSupport::TrueColor,
            config: Config::default(),
        }
    }
}

/// Sends a quit signal into a running loop from another thread.
#[derive(Clone, Debug)]
pub struct QuitHandle {
    tx: Sender<()>,
}

impl QuitHandle {
    /// Ask the loop to stop after the current iteration.
    pub fn quit(&self) {
        let _ = self.tx.try_send(());
    }
}

/// The application loop.
pub struct App {
    root: LayoutNode,
    size: Size,
    prev_buffer: Option<Buffer>,
    encoder: Encoder,
    throttler: FrameThrottler,
    cache: MeasureCache,
    compositor: Option<Compositor>,
    theme_manager: Arc<ThemeManager>,
    focus: FocusPath,
    filter: Option<EventFilter>,
    recorder: Recorder,
    config: Config,
    dirty: Arc<AtomicBool>,
    state: RunState,
    press_at: Option<Position>,
    tick_rate: Duration,
    quit_tx: Sender<()>,
    quit_rx: Receiver<()>,
}

impl App {
    /// Create a loop around a root node.
    pub fn new(root: LayoutNode, options: AppConfig) -> Self {
        let dirty = Arc::new(AtomicBool::new(true));
        let theme_manager = Arc::new(ThemeManager::with_builtins());
        {
            // A theme switch must repaint everything that consulted it.
            let dirty = Arc::clone(&dirty);
            theme_manager.subscribe(Box::new(move |_| {
                dirty.store(true, Ordering::SeqCst);
            }));
        }

        let recorder = if options.config.debug {
            Recorder::open(&options.config.debug_log_path())
        } else {
            Recorder::disabled()
        };

        let (quit_tx, quit_rx) = bounded(1);
        Self {
            root,
            size: Size::new(0, 0),
            prev_buffer: None,
            encoder: Encoder::new(options.color_support),
            throttler: FrameThrottler::new(options.target_fps).with_adaptive(options.adaptive),
            cache: MeasureCache::new(),
            compositor: None,
            theme_manager,
            focus: FocusPath::new(),
            filter: None,
            recorder,
            config: options.config,
            dirty,
            state: RunState::Idle,
            press_at: None,
            tick_rate: options.tick_rate,
            quit_tx,
            quit_rx,
        }
    }

    /// The loop's lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The theme manager driving style resolution.
    pub fn theme_manager(&self) -> &Arc<ThemeManager> {
        &self.theme_manager
    }

    /// The root node.
    pub fn root(&self) -> &LayoutNode {
        &self.root
    }

    /// The root node, mutably. Mutations should be followed by
    /// [`Self::invalidate_node`] for the affected subtree.
    pub fn root_mut(&mut self) -> &mut LayoutNode {
        &mut self.root
    }

    /// The current focus path.
    pub fn focus(&self) -> &FocusPath {
        &self.focus
    }

    /// Attach an optional compositor for layered output.
    pub fn set_compositor(&mut self, compositor: Compositor) {
        self.compositor = Some(compositor);
    }

    /// Install the event filter. Returning false drops the event.
    pub fn set_event_filter(&mut self, filter: EventFilter) {
        self.filter = Some(filter);
    }

    /// A handle that can stop the loop from another thread.
    pub fn quit_handle(&self) -> QuitHandle {
        QuitHandle {
            tx: self.quit_tx.clone(),
        }
    }

    /// Mark the whole tree dirty and drop cached measurements for the
    /// subtree rooted at `id`.
    pub fn invalidate_node(&mut self, id: &str) {
        if let Some(node) = self.root.find_mut(id) {
            node.mark_dirty();
        }
        self.cache.invalidate_prefix(id);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Route one event through filter, focus, and the tree.
    pub fn handle_event(&mut self, event: &Event) -> EventResult {
        if let Some(filter) = &self.filter
            && !filter(event)
        {
            return EventResult::Ignored;
        }
        self.recorder.record_event(event);

        match event {
            Event::Quit => {
                self.state = RunState::Stopping;
                EventResult::Consumed
            }
            Event::Resize(w, h) => {
                self.handle_resize(Size::new(*w, *h));
                EventResult::Consumed
            }
            Event::Key(key) if key.code == KeyCode::Tab => {
                if key.shift() {
                    self.focus_previous();
                } else {
                    self.focus_next();
                }
                self.dirty.store(true, Ordering::SeqCst);
                EventResult::Consumed
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Key(_) => self.dispatch_to_focused(event),
        }
    }

    /// Apply a new terminal size: resize buffers, drop all cached
    /// measurements, and force a full repaint.
    pub fn handle_resize(&mut self, size: Size) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.cache.invalidate_all();
        self.root.mark_dirty();
        self.prev_buffer = None;
        if let Some(compositor) = &mut self.compositor {
            compositor.resize(size);
        }
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Run one full render pass: measure, layout, paint, diff, encode,
    /// write, swap.
    pub fn render_frame(&mut self, terminal: &mut dyn Terminal) -> Result<()> {
        if self.size.is_empty() {
            self.size = terminal.size();
        }
        if self.size.is_empty() {
            return Err(WeftCoreError::Render("zero-sized viewport".into()));
        }

        place::measure_and_layout(&mut self.root, self.size, &self.cache);

        let mut fresh = Buffer::new(self.size);
        paint::paint_tree(&self.root, &mut fresh, &self.focus);

        let payload = match self.config.output_mode {
            OutputMode::Direct => self.encoder.encode_full(&fresh),
            OutputMode::Diff => {
                let dirty = diff::diff(self.prev_buffer.as_ref(), &fresh);
                let changed = dirty.changed_cells;
                let encoded = self.encoder.encode(&fresh, &dirty);
                self.recorder.record_frame(encoded.len(), changed);
                encoded
            }
        };

        if !payload.is_empty() {
            terminal.write_all(payload.as_bytes())?;
        }

        // Layered surfaces emit after the base frame so they stay on top.
        if let Some(compositor) = &mut self.compositor {
            let layered = compositor.render_dirty();
            if !layered.is_empty() {
                terminal.write_all(layered.as_bytes())?;
            }
        }
        terminal.flush()?;

        self.prev_buffer = Some(fresh);
        Ok(())
    }

    /// Run the loop until quit or shutdown.
    ///
    /// Spawns the input thread, then selects over input, ticks, and the
    /// quit channel; renders when dirty and the throttler allows.
    pub fn run(&mut self, terminal: &mut dyn Terminal) -> Result<()> {
        terminal.setup()?;
        self.size = terminal.size();

        let stop_input = Arc::new(AtomicBool::new(false));
        let (input_rx, input_thread) = spawn_input_thread(Arc::clone(&stop_input))?;
        let ticks = tick(self.tick_rate());
        let quit_rx = self.quit_rx.clone();
        self.state = RunState::Running;

        while self.state == RunState::Running {
            select! {
                recv(input_rx) -> received => match received {
                    Ok(event) => {
                        self.handle_event(&event);
                    }
                    Err(_) => {
                        // Input side closed underneath us; stop cleanly.
                        self.state = RunState::Stopping;
                    }
                },
                recv(ticks) -> _ => {
                    // Ticks keep time-based repaints (cursor blink) alive.
                    self.dirty.store(true, Ordering::SeqCst);
                }
                recv(quit_rx) -> _ => {
                    self.state = RunState::Stopping;
                }
            }

            if self.dirty.load(Ordering::SeqCst) && self.throttler.should_render() {
                let start = Instant::now();
                match self.render_frame(terminal) {
                    Ok(()) => {
                        self.dirty.store(false, Ordering::SeqCst);
                    }
                    Err(err) => {
                        // Degrade: leave the old frame visible and force a
                        // clean repaint on the next tick.
                        tracing::warn!(%err, "render failed; scheduling full repaint");
                        self.encoder.invalidate();
                        self.prev_buffer = None;
                    }
                }
                self.throttler.record_frame_time(start.elapsed());
            }
        }

        stop_input.store(true, Ordering::SeqCst);
        self.shutdown(terminal)?;
        drop(input_rx);
        let _ = input_thread.join();
        Ok(())
    }

    /// Restore the terminal and mark the loop stopped.
    pub fn shutdown(&mut self, terminal: &mut dyn Terminal) -> Result<()> {
        terminal.write_all(b"\x1b[?25h\x1b[?1049l")?;
        terminal.flush()?;
        terminal.teardown()?;
        self.state = RunState::Stopped;
        Ok(())
    }

    fn tick_rate(&self) -> Duration {
        // The throttler owns frame pacing; ticks only need to keep the
        // loop waking up at least that often.
        self.tick_rate.max(Duration::from_millis(1))
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> EventResult {
        match mouse.kind {
            MouseEventKind::Press => {
                self.press_at = Some(Position::new(mouse.x, mouse.y));
                EventResult::Ignored
            }
            MouseEventKind::Release => {
                let pressed = self.press_at.take();
                if let Some(at) = pressed
                    && at.x.abs_diff(mouse.x) <= CLICK_SLOP
                    && at.y.abs_diff(mouse.y) <= CLICK_SLOP
                {
                    return self.click(Position::new(mouse.x, mouse.y));
                }
                EventResult::Ignored
            }
            _ => EventResult::Ignored,
        }
    }

    /// Focus the deepest node under a click.
    fn click(&mut self, at: Position) -> EventResult {
        let mut path = Vec::new();
        hit_path(&self.root, at, &mut path);
        if path.is_empty() {
            return EventResult::Ignored;
        }
        self.set_focus_path(path);
        EventResult::Consumed
    }

    fn dispatch_to_focused(&mut self, event: &Event) -> EventResult {
        let Some(leaf) = self.focus.leaf().cloned() else {
            return EventResult::Ignored;
        };
        let Some(node) = self.root.find_mut(&leaf) else {
            return EventResult::Ignored;
        };
        let Some(component) = node.content.as_mut() else {
            return EventResult::Ignored;
        };
        let result = component.handle_event(event);
        if result == EventResult::Consumed {
            node.dirty = true;
            self.cache.invalidate_prefix(&leaf);
            self.dirty.store(true, Ordering::SeqCst);
        }
        result
    }

    fn set_focus_path(&mut self, path: Vec<NodeId>) {
        let old_leaf = self.focus.leaf().cloned();
        let new_leaf = path.last().cloned();
        if old_leaf == new_leaf {
            return;
        }
        if let Some(id) = old_leaf
            && let Some(node) = self.root.find_mut(&id)
            && let Some(component) = node.content.as_mut()
        {
            component.on_blur();
        }
        if let Some(id) = new_leaf
            && let Some(node) = self.root.find_mut(&id)
            && let Some(component) = node.content.as_mut()
        {
            component.on_focus();
        }
        self.focus.set(path);
        self.dirty.store(true, Ordering::SeqCst);
    }

    fn focus_next(&mut self) {
        self.cycle_focus(1);
    }

    fn focus_previous(&mut self) {
        self.cycle_focus(-1);
    }

    fn cycle_focus(&mut self, step: isize) {
        let mut paths = Vec::new();
        collect_focusable(&self.root, &mut Vec::new(), &mut paths);
        if paths.is_empty() {
            return;
        }
        let current = self
            .focus
            .leaf()
            .and_then(|leaf| paths.iter().position(|p| p.last() == Some(leaf)));
        let next = match current {
            Some(i) => (i as isize + step).rem_euclid(paths.len() as isize) as usize,
            None if step > 0 => 0,
            None => paths.len() - 1,
        };
        self.set_focus_path(paths[next].clone());
    }
}

/// Depth-first hit test: the chain of ids from the root to the deepest
/// node whose rect contains `at`. Later siblings paint on top, so they
/// are tried first.
fn hit_path(node: &LayoutNode, at: Position, out: &mut Vec<NodeId>) -> bool {
    let Some(rect) = node.rect else {
        return false;
    };
    if !rect.contains(at) {
        return false;
    }
    out.push(node.id.clone());
    for child in node.children.iter().rev() {
        if hit_path(child, at, out) {
            return true;
        }
    }
    true
}

/// Collect root-to-leaf id chains for every node with component content.
fn collect_focusable(node: &LayoutNode, prefix: &mut Vec<NodeId>, out: &mut Vec<Vec<NodeId>>) {
    prefix.push(node.id.clone());
    if node.content.is_some() {
        out.push(prefix.clone());
    }
    for child in &node.children {
        collect_focusable(child, prefix, out);
    }
    prefix.pop();
}

/// Spawn the input thread: crossterm events pushed into a channel.
///
/// A failure to spawn is fatal ([`WeftCoreError::InputStart`]); the loop
/// refuses to enter the running state without an input source.
fn spawn_input_thread(
    stop: Arc<AtomicBool>,
) -> Result<(Receiver<Event>, thread::JoinHandle<()>)> {
    let (tx, rx) = unbounded();
    let handle = thread::Builder::new()
        .name("weft-input".into())
        .spawn(move || {
            while !stop.load(Ordering::SeqCst) {
                match crossterm::event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(raw) = crossterm::event::read() else {
                            break;
                        };
                        if let Some(event) = crate::event::from_crossterm(raw)
                            && tx.send(event).is_err()
                        {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        })
        .map_err(|e| WeftCoreError::InputStart(e.to_string()))?;
    Ok((rx, handle))
}

/// Install a panic hook that restores the terminal before the process
/// dies: cooked mode, cursor shown, alternate screen left, and the panic
/// appended to `panic_log`. The previous hook still runs afterwards.
pub fn install_panic_recovery(panic_log: PathBuf) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x1b[?25h\x1b[?1049l");
        let _ = out.flush();
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&panic_log)
        {
            let backtrace = std::backtrace::Backtrace::force_capture();
            let _ = writeln!(file, "panic: {info}\n{backtrace}");
        }
        previous(info);
    }));
}

/// Write a fatal setup error to stderr the way the engine reports them:
/// one red-prefixed line.
pub fn report_fatal(err: &WeftCoreError) {
    eprintln!("\x1b[31merror:\x1b[0m {err}");
}
