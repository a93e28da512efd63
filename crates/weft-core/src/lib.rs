//! weft-core: a terminal cell-grid rendering engine.
//!
//! The engine paints a component tree into a character-cell buffer,
//! reconciles each frame against the previously displayed state, and
//! emits a minimized escape-code stream that refreshes only the cells
//! that changed. Around that core it provides layered compositing,
//! frame throttling with adaptive rate control, and a switchable theme
//! cascade consulted during paint.

pub mod buffer;
pub mod cell;
pub mod color;
pub mod component;
pub mod compositor;
pub mod config;
pub mod diff;
pub mod encoder;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layout;
pub mod paint;
pub mod recorder;
pub mod remote;
pub mod runtime;
pub mod style;
pub mod terminal;
pub mod theme;
pub mod throttle;

pub use buffer::Buffer;
pub use cell::Cell;
pub use color::{Color, ColorSupport, NamedColor};
pub use component::{Component, EventResult, FocusPath, Text};
pub use compositor::{Compositor, Layer, LayerKind};
pub use config::{Config, OutputMode};
pub use diff::{DirtyResult, diff};
pub use encoder::Encoder;
pub use error::{Result, WeftCoreError};
pub use event::{Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use geometry::{Position, Rect, Size};
pub use layout::{
    AlignItems, BorderEdges, BoxConstraints, Dimension, Edges, FlexDirection, Justify, LayoutNode,
    MeasureCache, NodeId, NodeKind, Overflow, measure,
};
pub use paint::{BorderKind, DirtyTracker, PaintContext, draw_border, paint_tree, paint_tree_tracked};
pub use recorder::Recorder;
pub use remote::{RemoteFrame, RemoteOutput};
pub use runtime::{App, AppConfig, QuitHandle, RunState, install_panic_recovery, report_fatal};
pub use style::{Attributes, Style};
pub use terminal::{CrosstermTerminal, Terminal, TestTerminal};
pub use theme::{ColorPalette, SpacingSet, StateStyles, Theme, ThemeManager};
pub use throttle::FrameThrottler;
