//! Theme system: palettes, per-component style config, and the
//! process-wide style lookup consulted during paint.
//!
//! A [`Theme`] bundles a semantic color palette, a spacing scale, a map of
//! named styles, and per-component base/state styles, optionally layering
//! on a parent theme. The [`ThemeManager`] owns the set of themes, tracks
//! the current one, and notifies subscribers synchronously on a switch.
//!
//! Style resolution on the paint path goes through a swappable global
//! lookup with exactly one writer (the manager, on the loop thread) and
//! many readers; the manager's own mutex never overlaps the lookup path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use crate::color::Color;
use crate::error::{Result, WeftCoreError};
use crate::style::Style;

/// Semantic color palette with fixed keys.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorPalette {
    /// Primary brand / interaction color.
    pub primary: Color,
    /// Secondary accent.
    pub secondary: Color,
    /// Accent highlight.
    pub accent: Color,
    /// Success indications.
    pub success: Color,
    /// Warning indications.
    pub warning: Color,
    /// Error indications.
    pub error: Color,
    /// Informational indications.
    pub info: Color,
    /// Surface background.
    pub background: Color,
    /// Default text.
    pub foreground: Color,
    /// De-emphasized text.
    pub muted: Color,
    /// Border lines.
    pub border: Color,
    /// Focus ring / focused element.
    pub focus: Color,
    /// Disabled elements.
    pub disabled: Color,
    /// Hovered elements.
    pub hover: Color,
    /// Activated / pressed elements.
    pub active: Color,
}

impl ColorPalette {
    /// Look up a palette color by its semantic key name.
    pub fn get(&self, key: &str) -> Option<Color> {
        match key {
            "primary" => Some(self.primary),
            "secondary" => Some(self.secondary),
            "accent" => Some(self.accent),
            "success" => Some(self.success),
            "warning" => Some(self.warning),
            "error" => Some(self.error),
            "info" => Some(self.info),
            "background" => Some(self.background),
            "foreground" => Some(self.foreground),
            "muted" => Some(self.muted),
            "border" => Some(self.border),
            "focus" => Some(self.focus),
            "disabled" => Some(self.disabled),
            "hover" => Some(self.hover),
            "active" => Some(self.active),
            _ => None,
        }
    }

    /// Interpolate every key toward `to` at progress `t`.
    ///
    /// Defined per key under the rules of [`Color::lerp`]: non-RGB pairs
    /// snap to the target at `t >= 1.0`.
    #[must_use]
    pub fn lerp(&self, to: &ColorPalette, t: f32) -> ColorPalette {
        ColorPalette {
            primary: self.primary.lerp(to.primary, t),
            secondary: self.secondary.lerp(to.secondary, t),
            accent: self.accent.lerp(to.accent, t),
            success: self.success.lerp(to.success, t),
            warning: self.warning.lerp(to.warning, t),
            error: self.error.lerp(to.error, t),
            info: self.info.lerp(to.info, t),
            background: self.background.lerp(to.background, t),
            foreground: self.foreground.lerp(to.foreground, t),
            muted: self.muted.lerp(to.muted, t),
            border: self.border.lerp(to.border, t),
            focus: self.focus.lerp(to.focus, t),
            disabled: self.disabled.lerp(to.disabled, t),
            hover: self.hover.lerp(to.hover, t),
            active: self.active.lerp(to.active, t),
        }
    }

    /// The built-in dark palette.
    pub fn dark() -> Self {
        Self {
            primary: rgb(137, 180, 250),
            secondary: rgb(166, 227, 161),
            accent: rgb(245, 194, 231),
            success: rgb(166, 227, 161),
            warning: rgb(249, 226, 175),
            error: rgb(243, 139, 168),
            info: rgb(137, 220, 235),
            background: rgb(30, 30, 46),
            foreground: rgb(205, 214, 244),
            muted: rgb(108, 112, 134),
            border: rgb(88, 91, 112),
            focus: rgb(137, 180, 250),
            disabled: rgb(69, 71, 90),
            hover: rgb(49, 50, 68),
            active: rgb(137, 180, 250),
        }
    }

    /// The built-in light palette.
    pub fn light() -> Self {
        Self {
            primary: rgb(30, 102, 245),
            secondary: rgb(64, 160, 43),
            accent: rgb(234, 118, 203),
            success: rgb(64, 160, 43),
            warning: rgb(223, 142, 29),
            error: rgb(210, 15, 57),
            info: rgb(32, 159, 181),
            background: rgb(239, 241, 245),
            foreground: rgb(76, 79, 105),
            muted: rgb(140, 143, 161),
            border: rgb(172, 176, 190),
            focus: rgb(30, 102, 245),
            disabled: rgb(188, 192, 204),
            hover: rgb(204, 208, 218),
            active: rgb(30, 102, 245),
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::dark()
    }
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

/// Spacing scale in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpacingSet {
    /// Extra small.
    pub xs: u16,
    /// Small.
    pub sm: u16,
    /// Medium.
    pub md: u16,
    /// Large.
    pub lg: u16,
    /// Extra large.
    pub xl: u16,
}

impl Default for SpacingSet {
    fn default() -> Self {
        Self {
            xs: 1,
            sm: 2,
            md: 4,
            lg: 6,
            xl: 8,
        }
    }
}

/// Per-component styles: a base plus named state overlays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateStyles {
    /// Style applied in every state.
    pub base: Style,
    /// Overlays keyed by state name (e.g. "focused", "disabled").
    pub states: HashMap<String, Style>,
}

impl StateStyles {
    /// A component config with only a base style.
    pub fn base(style: Style) -> Self {
        Self {
            base: style,
            states: HashMap::new(),
        }
    }

    /// Add a state overlay.
    #[must_use]
    pub fn with_state(mut self, name: impl Into<String>, style: Style) -> Self {
        self.states.insert(name.into(), style);
        self
    }
}

/// A named bundle of palette, spacing, and style configuration.
#[derive(Clone, Debug)]
pub struct Theme {
    /// Theme name (e.g. "dark", "light").
    pub name: String,
    /// Free-form version tag.
    pub version: String,
    /// Optional parent theme to fall back to during resolution.
    pub parent: Option<String>,
    /// Semantic color palette.
    pub palette: ColorPalette,
    /// Spacing scale.
    pub spacing: SpacingSet,
    styles: HashMap<String, Style>,
    components: HashMap<String, StateStyles>,
}

impl Theme {
    /// Create an empty theme with the dark palette and default spacing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1".into(),
            parent: None,
            palette: ColorPalette::dark(),
            spacing: SpacingSet::default(),
            styles: HashMap::new(),
            components: HashMap::new(),
        }
    }

    /// Set the parent theme name.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the palette.
    #[must_use]
    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Insert a named global style.
    pub fn insert_style(&mut self, name: impl Into<String>, style: Style) {
        self.styles.insert(name.into(), style);
    }

    /// Insert a component style config.
    pub fn insert_component(&mut self, id: impl Into<String>, styles: StateStyles) {
        self.components.insert(id.into(), styles);
    }

    /// Look up a named global style.
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    /// Look up a component's style config.
    pub fn component(&self, id: &str) -> Option<&StateStyles> {
        self.components.get(id)
    }

    /// Resolve a `(component, state)` request against this theme only
    /// (no parent-chain recursion): state overlay, then component base,
    /// then the global styles map.
    pub fn resolve_local(&self, component: &str, state: &str) -> Option<Style> {
        if let Some(config) = self.components.get(component) {
            if let Some(style) = config.states.get(state) {
                return Some(*style);
            }
            return Some(config.base);
        }
        self.styles.get(component).copied()
    }

    /// The built-in dark theme.
    pub fn builtin_dark() -> Self {
        let palette = ColorPalette::dark();
        let mut theme = Theme::new("dark").with_palette(palette);
        theme.insert_style(
            "text",
            Style::new()
                .with_foreground(palette.foreground)
                .with_background(palette.background),
        );
        theme.insert_component(
            "border",
            StateStyles::base(Style::new().with_foreground(palette.border))
                .with_state("focused", Style::new().with_foreground(palette.focus)),
        );
        theme
    }

    /// The built-in light theme.
    pub fn builtin_light() -> Self {
        let palette = ColorPalette::light();
        let mut theme = Theme::new("light").with_palette(palette);
        theme.insert_style(
            "text",
            Style::new()
                .with_foreground(palette.foreground)
                .with_background(palette.background),
        );
        theme.insert_component(
            "border",
            StateStyles::base(Style::new().with_foreground(palette.border))
                .with_state("focused", Style::new().with_foreground(palette.focus)),
        );
        theme
    }
}

/// Subscriber invoked synchronously after a theme switch, with the new
/// theme's name.
pub type ThemeSubscriber = Box<dyn Fn(&str) + Send>;

/// The resolver behind the global lookup: a snapshot of the current theme
/// chain, root-most last.
struct LookupChain {
    chain: Vec<Theme>,
}

impl LookupChain {
    fn resolve(&self, component: &str, state: &str) -> Style {
        for theme in &self.chain {
            if let Some(style) = theme.resolve_local(component, state) {
                return style;
            }
        }
        Style::default()
    }
}

/// The process-wide lookup slot. One writer (the manager on the loop
/// thread), many readers; readers clone the `Arc` out and never hold the
/// lock across user code.
fn lookup_slot() -> &'static RwLock<Option<Arc<LookupChain>>> {
    static SLOT: OnceLock<RwLock<Option<Arc<LookupChain>>>> = OnceLock::new();
    SLOT.get_or_init(|| RwLock::new(None))
}

fn read_lookup() -> Option<Arc<LookupChain>> {
    match lookup_slot().read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn install_lookup(chain: Option<Arc<LookupChain>>) {
    match lookup_slot().write() {
        Ok(mut guard) => *guard = chain,
        Err(poisoned) => *poisoned.into_inner() = chain,
    }
}

/// Resolve a `(component, state)` style through the installed theme.
///
/// Falls back to the empty style when no provider is installed; callers
/// needing a hard failure use [`try_resolve`].
pub fn resolve(component: &str, state: &str) -> Style {
    match read_lookup() {
        Some(chain) => chain.resolve(component, state),
        None => Style::default(),
    }
}

/// Resolve with a component-local override, which wins outright.
pub fn resolve_with_override(override_style: Option<Style>, component: &str, state: &str) -> Style {
    match override_style {
        Some(style) => style,
        None => resolve(component, state),
    }
}

/// Like [`resolve`], but errors when no theme provider is installed.
pub fn try_resolve(component: &str, state: &str) -> Result<Style> {
    match read_lookup() {
        Some(chain) => Ok(chain.resolve(component, state)),
        None => Err(WeftCoreError::ThemeNotInstalled),
    }
}

/// The palette of the installed theme, or the embedded dark default when
/// no provider is installed.
pub fn active_palette() -> ColorPalette {
    read_lookup()
        .and_then(|chain| chain.chain.first().map(|t| t.palette))
        .unwrap_or_default()
}

#[derive(Default)]
struct ManagerState {
    themes: HashMap<String, Theme>,
    current: Option<String>,
    subscribers: Vec<ThemeSubscriber>,
}

/// Owns the set of themes and the current selection.
///
/// Switching themes installs a fresh lookup snapshot and then notifies
/// subscribers synchronously, in registration order, so surfaces can mark
/// themselves dirty before the next paint.
#[derive(Default)]
pub struct ThemeManager {
    state: Mutex<ManagerState>,
}

impl ThemeManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager preloaded with the built-in dark and light themes.
    pub fn with_builtins() -> Self {
        let mgr = Self::new();
        mgr.register(Theme::builtin_dark());
        mgr.register(Theme::builtin_light());
        mgr
    }

    /// Register a theme, replacing any previous theme of the same name.
    pub fn register(&self, theme: Theme) {
        let mut state = self.lock();
        state.themes.insert(theme.name.clone(), theme);
    }

    /// Names of all registered themes.
    pub fn theme_names(&self) -> Vec<String> {
        self.lock().themes.keys().cloned().collect()
    }

    /// The current theme name, if one is active.
    pub fn current_name(&self) -> Option<String> {
        self.lock().current.clone()
    }

    /// A clone of the current theme, if one is active.
    pub fn current(&self) -> Option<Theme> {
        let state = self.lock();
        state
            .current
            .as_ref()
            .and_then(|name| state.themes.get(name))
            .cloned()
    }

    /// Switch to a registered theme.
    ///
    /// On an unknown name, returns [`WeftCoreError::ThemeNotFound`] and the
    /// current theme (and installed lookup) are unchanged. On success the
    /// global lookup is swapped before subscribers run, so any paint they
    /// trigger sees the new theme.
    pub fn switch(&self, name: &str) -> Result<()> {
        let chain = {
            let mut state = self.lock();
            if !state.themes.contains_key(name) {
                return Err(WeftCoreError::ThemeNotFound(name.into()));
            }
            state.current = Some(name.into());
            build_chain(&state.themes, name)
        };
        install_lookup(Some(Arc::new(LookupChain { chain })));

        // Subscribers run outside the lock so they may consult the
        // manager; any subscribed during notification are kept.
        let subscribers = {
            let mut state = self.lock();
            std::mem::take(&mut state.subscribers)
        };
        for subscriber in &subscribers {
            subscriber(name);
        }
        let mut state = self.lock();
        let added = std::mem::replace(&mut state.subscribers, subscribers);
        state.subscribers.extend(added);
        Ok(())
    }

    /// Register a subscriber notified on every successful switch.
    pub fn subscribe(&self, subscriber: ThemeSubscriber) {
        self.lock().subscribers.push(subscriber);
    }

    /// Resolve through the manager's current theme chain without touching
    /// the global lookup (diagnostics and tests).
    pub fn resolve(&self, component: &str, state: &str) -> Style {
        let st = self.lock();
        let Some(current) = st.current.as_deref() else {
            return Style::default();
        };
        let chain = build_chain(&st.themes, current);
        LookupChain { chain }.resolve(component, state)
    }

    /// Uninstall the global lookup (used on shutdown and between tests).
    pub fn uninstall(&self) {
        install_lookup(None);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManagerState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Clone the parent chain for `name`, current theme first. Cycles are cut
/// by refusing to revisit a name.
fn build_chain(themes: &HashMap<String, Theme>, name: &str) -> Vec<Theme> {
    let mut chain = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut next = Some(name.to_string());
    while let Some(current) = next {
        if seen.contains(&current) {
            break;
        }
        let Some(theme) = themes.get(&current) else {
            break;
        };
        seen.push(current);
        next = theme.parent.clone();
        chain.push(theme.clone());
    }
    chain
}
