//! Command decorations for shell integration.
//!
//! [`DecorationAddon`] watches the command detection capability and places a
//! status decoration next to every command: a placeholder while the command
//! runs, then a final decoration coloured by its exit code with a context
//! menu and a hover. All collaborator input arrives through subscriptions
//! which the owner pumps with [`DecorationAddon::process_events`]; queued
//! events from every source are handled in the order they were fired.

mod hover_delay;
mod interaction;
mod layout;
mod registry;
mod relative_time;

pub use hover_delay::HoverDelayer;
pub use interaction::{
    CommandAction, CommandStatus, ElementListener, FAILED_EXIT_CODE, ListenerRole,
    attach_interactions, command_actions, hover_content,
};
pub use layout::{
    DEFAULT_DIMENSION, DecorationIcons, DecorationStatus, MARGIN_LEFT, MARGIN_LEFT_FIRST_SPLIT,
    apply_classes, apply_layout, class, decoration_classes, decoration_layout, is_styled,
};
pub use registry::{DecorationRecord, DecorationRegistry, DecorationSnapshot};
pub use relative_time::from_now;

use crate::config::{PlaceholderStrategy, SettingKey, defaults};
use crate::error::DecorationError;
use crate::services::{
    ClipboardService, ContextMenuRequest, ContextMenuService, ContextMenuVisibility, HoverRequest,
    HoverService,
};
use crate::settings::{ConfigChangeEvent, ConfigurationService};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use term_decor_terminal::{
    CapabilityStore, Decoration, DecorationElement, DecorationRenderer, Emitter, MarkerId,
    PointerEvent, Sequenced, Subscription, TerminalCapability, TerminalCommand,
};

/// UI services the addon drives.
#[derive(Clone)]
pub struct AddonServices {
    pub clipboard: Arc<dyn ClipboardService>,
    pub context_menu: Arc<dyn ContextMenuService>,
    pub hover: Arc<dyn HoverService>,
}

/// A decoration waiting for its first render.
#[derive(Debug)]
struct PendingRender {
    decoration: Decoration,
    command: TerminalCommand,
    is_placeholder: bool,
    renders: Subscription<DecorationElement>,
}

impl PendingRender {
    fn is_dead(&self) -> bool {
        self.decoration.is_disposed() || self.decoration.marker().is_disposed()
    }

    fn discard(mut self) {
        self.renders.dispose();
        self.decoration.dispose();
    }
}

/// Hover scheduled by a mouse-enter.
#[derive(Debug, Clone)]
struct PendingHover {
    element: DecorationElement,
    exit_code: i32,
    timestamp: DateTime<Utc>,
}

/// Listeners on the command detection capability.
#[derive(Debug, Default)]
struct CommandListeners {
    started: Option<Subscription<TerminalCommand>>,
    finished: Option<Subscription<TerminalCommand>>,
}

impl CommandListeners {
    fn detach(&mut self) {
        if let Some(mut started) = self.started.take() {
            started.dispose();
        }
        if let Some(mut finished) = self.finished.take() {
            finished.dispose();
        }
    }
}

/// Everything the addon reacts to, merged from its subscriptions.
#[derive(Debug)]
enum AddonEvent {
    CapabilityAdded(TerminalCapability),
    CapabilityRemoved(TerminalCapability),
    ConfigChanged(ConfigChangeEvent),
    MenuVisibility(ContextMenuVisibility),
    CommandStarted(TerminalCommand),
    CommandFinished(TerminalCommand),
    Rendered {
        handle: u64,
        element: DecorationElement,
    },
    Pointer {
        marker_id: MarkerId,
        handle: u64,
        event: PointerEvent,
    },
}

/// Serializable view of the placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderSnapshot {
    pub marker_id: Option<MarkerId>,
    pub line: usize,
    pub rendered: bool,
    pub disposed: bool,
}

/// Serializable view of the addon state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddonSnapshot {
    pub decorations: Vec<DecorationSnapshot>,
    pub placeholder: Option<PlaceholderSnapshot>,
    pub pending_renders: usize,
    pub context_menu_visible: bool,
}

pub struct DecorationAddon {
    capabilities: Arc<CapabilityStore>,
    settings: Arc<ConfigurationService>,
    services: AddonServices,
    renderer: Option<Arc<dyn DecorationRenderer>>,

    capability_added: Subscription<TerminalCapability>,
    capability_removed: Subscription<TerminalCapability>,
    settings_changed: Subscription<ConfigChangeEvent>,
    menu_visibility: Subscription<ContextMenuVisibility>,
    command_listeners: CommandListeners,

    pending_renders: Vec<PendingRender>,
    registry: DecorationRegistry,
    placeholder: Option<Decoration>,
    placeholder_strategy: PlaceholderStrategy,
    icons: DecorationIcons,
    context_menu_visible: bool,
    hover_delayer: HoverDelayer<PendingHover>,
    on_did_request_run_command: Emitter<String>,
    disposed: bool,
}

impl DecorationAddon {
    pub fn new(
        capabilities: Arc<CapabilityStore>,
        settings: Arc<ConfigurationService>,
        services: AddonServices,
    ) -> Self {
        let config = settings.get();
        let capability_added = capabilities.on_did_add_capability();
        let capability_removed = capabilities.on_did_remove_capability();
        let settings_changed = settings.on_did_change_configuration();
        let menu_visibility = services.context_menu.on_did_change_visibility();

        let mut addon = Self {
            capabilities,
            settings,
            services,
            renderer: None,
            capability_added,
            capability_removed,
            settings_changed,
            menu_visibility,
            command_listeners: CommandListeners::default(),
            pending_renders: Vec::new(),
            registry: DecorationRegistry::new(),
            placeholder: None,
            placeholder_strategy: config.placeholder_strategy,
            icons: DecorationIcons::from_config(&config),
            context_menu_visible: false,
            hover_delayer: HoverDelayer::new(Duration::from_millis(config.hover_delay_ms)),
            on_did_request_run_command: Emitter::new(),
            disposed: false,
        };

        // A session that already detected commands only needs the finish
        // listener; the start of the current command has been missed.
        if addon.capabilities.has(TerminalCapability::CommandDetection) {
            addon.attach_command_listeners(false);
        }
        addon
    }

    /// Bind the renderer. Decorations are only registered once activated.
    pub fn activate(&mut self, renderer: Arc<dyn DecorationRenderer>) {
        log::debug!("Decoration addon activated");
        self.renderer = Some(renderer);
    }

    pub fn is_activated(&self) -> bool {
        self.renderer.is_some()
    }

    /// Stream of command lines the user asked to re-run.
    pub fn on_did_request_run_command(&self) -> Subscription<String> {
        self.on_did_request_run_command.subscribe()
    }

    pub fn registry(&self) -> &DecorationRegistry {
        &self.registry
    }

    pub fn placeholder(&self) -> Option<&Decoration> {
        self.placeholder.as_ref()
    }

    pub fn placeholder_strategy(&self) -> PlaceholderStrategy {
        self.placeholder_strategy
    }

    pub fn pending_render_count(&self) -> usize {
        self.pending_renders.len()
    }

    pub fn is_context_menu_visible(&self) -> bool {
        self.context_menu_visible
    }

    pub fn is_hover_pending(&self) -> bool {
        self.hover_delayer.is_pending()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn snapshot(&self) -> AddonSnapshot {
        AddonSnapshot {
            decorations: self.registry.snapshot(),
            placeholder: self.placeholder.as_ref().map(|p| PlaceholderSnapshot {
                marker_id: p.marker().id(),
                line: p.marker().line(),
                rendered: p.is_rendered(),
                disposed: p.is_disposed(),
            }),
            pending_renders: self.pending_renders.len(),
            context_menu_visible: self.context_menu_visible,
        }
    }

    /// Request a decoration for `command`.
    ///
    /// The decoration is tracked once it renders, which the renderer may do
    /// later or never. Returns `Ok(None)` when the addon is not activated,
    /// decorations are disabled, or the renderer declined.
    pub fn register_command_decoration(
        &mut self,
        command: &TerminalCommand,
        is_placeholder: bool,
    ) -> Result<Option<Decoration>, DecorationError> {
        let marker = command
            .marker
            .as_ref()
            .ok_or_else(|| DecorationError::MissingMarker {
                command: command.command.clone(),
            })?;

        let Some(renderer) = self.renderer.as_ref() else {
            log::debug!("Decoration addon not activated, skipping {:?}", command.command);
            return Ok(None);
        };
        if self.disposed || !self.decorations_enabled() {
            return Ok(None);
        }

        let Some(decoration) = renderer.register_decoration(marker) else {
            log::debug!(
                "Renderer declined decoration for marker {} ({:?})",
                marker.raw_id(),
                command.command
            );
            return Ok(None);
        };

        let renders = decoration.on_render();
        self.pending_renders.push(PendingRender {
            decoration: decoration.clone(),
            command: command.clone(),
            is_placeholder,
            renders,
        });
        Ok(Some(decoration))
    }

    /// Re-apply inline sizing to the placeholder and every tracked
    /// decoration.
    pub fn refresh_layouts(&self) {
        let font_size = self.font_size();
        let default_font_size = self.default_font_size();
        for element in self.elements() {
            apply_layout(&element, font_size, default_font_size);
        }
    }

    /// Re-apply status and icon classes to the placeholder and every tracked
    /// decoration.
    pub fn refresh_classes(&self) {
        if let Some(element) = self.placeholder.as_ref().and_then(|p| p.element()) {
            apply_classes(&element, None, &self.icons);
        }
        for (_, record) in self.registry.iter() {
            if let Some(element) = record.decoration.element() {
                apply_classes(&element, record.exit_code, &self.icons);
            }
        }
    }

    /// Run a context menu action picked by the user.
    pub fn run_action(&self, action: &CommandAction) -> Result<(), DecorationError> {
        match action {
            CommandAction::CopyOutput { output } => self
                .services
                .clipboard
                .write_text(output)
                .map_err(|e| DecorationError::Clipboard(format!("{:#}", e))),
            CommandAction::RerunCommand { command } => {
                log::info!("Re-run requested: {:?}", command);
                self.on_did_request_run_command.fire(command.clone());
                Ok(())
            }
        }
    }

    /// Dispose the placeholder, pending renders and every tracked
    /// decoration together with their markers and listeners.
    pub fn clear_decorations(&mut self) {
        if let Some(placeholder) = self.placeholder.take() {
            placeholder.dispose();
            placeholder.marker().dispose();
        }
        for pending in self.pending_renders.drain(..) {
            pending.discard();
        }
        let cleared = self.registry.len();
        self.registry.clear(true);
        self.hover_delayer.cancel();
        if cleared > 0 {
            log::debug!("Cleared {} command decoration(s)", cleared);
        }
    }

    /// Tear down every decoration and detach from all collaborators.
    /// Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.clear_decorations();
        self.command_listeners.detach();
        self.capability_added.dispose();
        self.capability_removed.dispose();
        self.settings_changed.dispose();
        self.menu_visibility.dispose();
        self.on_did_request_run_command.clear();
        self.disposed = true;
        log::debug!("Decoration addon disposed");
    }

    /// Handle every queued event, then fire a due hover. Returns the number
    /// of events handled.
    pub fn process_events(&mut self) -> usize {
        self.process_events_at(Instant::now())
    }

    /// [`process_events`](Self::process_events) with an explicit clock, for
    /// driving hover delays deterministically.
    pub fn process_events_at(&mut self, now: Instant) -> usize {
        if self.disposed {
            return 0;
        }

        let mut handled = 0;
        loop {
            let mut batch = self.collect_events();
            if batch.is_empty() {
                break;
            }
            batch.sort_by_key(|event| event.seq);
            for event in batch {
                self.handle_event(event.value, now);
                handled += 1;
            }
        }

        self.prune_scrolled_out();
        self.poll_hover(now);
        handled
    }

    fn collect_events(&self) -> Vec<Sequenced<AddonEvent>> {
        let mut events = Vec::new();
        events.extend(map_events(&self.capability_added, AddonEvent::CapabilityAdded));
        events.extend(map_events(&self.capability_removed, AddonEvent::CapabilityRemoved));
        events.extend(map_events(&self.settings_changed, AddonEvent::ConfigChanged));
        events.extend(map_events(&self.menu_visibility, AddonEvent::MenuVisibility));
        if let Some(started) = &self.command_listeners.started {
            events.extend(map_events(started, AddonEvent::CommandStarted));
        }
        if let Some(finished) = &self.command_listeners.finished {
            events.extend(map_events(finished, AddonEvent::CommandFinished));
        }
        for pending in &self.pending_renders {
            let handle = pending.decoration.handle();
            events.extend(map_events(&pending.renders, |element| AddonEvent::Rendered {
                handle,
                element,
            }));
        }
        for (&marker_id, record) in self.registry.iter() {
            let handle = record.decoration.handle();
            for listener in &record.disposables {
                events.extend(listener.drain().into_iter().map(|event| Sequenced {
                    seq: event.seq,
                    value: AddonEvent::Pointer {
                        marker_id,
                        handle,
                        event: event.value,
                    },
                }));
            }
        }
        events
    }

    fn handle_event(&mut self, event: AddonEvent, now: Instant) {
        match event {
            AddonEvent::CapabilityAdded(capability) => self.handle_capability_added(capability),
            AddonEvent::CapabilityRemoved(capability) => {
                if capability == TerminalCapability::CommandDetection {
                    log::debug!("Command detection removed, detaching command listeners");
                    self.command_listeners.detach();
                }
            }
            AddonEvent::ConfigChanged(change) => self.handle_config_change(&change),
            AddonEvent::MenuVisibility(visibility) => {
                self.context_menu_visible = visibility == ContextMenuVisibility::Shown;
                if self.context_menu_visible {
                    self.hover_delayer.cancel();
                }
            }
            AddonEvent::CommandStarted(command) => {
                if let Err(e) = self.register_command_decoration(&command, true) {
                    log::error!("Failed to add placeholder decoration: {}", e);
                }
            }
            AddonEvent::CommandFinished(command) => self.handle_command_finished(command),
            AddonEvent::Rendered { handle, element } => self.handle_rendered(handle, element),
            AddonEvent::Pointer {
                marker_id,
                handle,
                event,
            } => self.handle_pointer(marker_id, handle, event, now),
        }
    }

    fn handle_capability_added(&mut self, capability: TerminalCapability) {
        if capability != TerminalCapability::CommandDetection {
            return;
        }
        if !self.decorations_enabled() {
            log::debug!("Command detection added while decorations are disabled");
            return;
        }
        self.attach_command_listeners(true);
    }

    /// Subscribe to command finishes and, when `with_started`, starts.
    /// Already attached listeners are kept.
    fn attach_command_listeners(&mut self, with_started: bool) {
        let Some(detection) = self.capabilities.command_detection() else {
            return;
        };
        if self.command_listeners.finished.is_none() {
            self.command_listeners.finished = Some(detection.on_command_finished());
        }
        if with_started && self.command_listeners.started.is_none() {
            self.command_listeners.started = Some(detection.on_command_started());
        }
    }

    fn handle_command_finished(&mut self, command: TerminalCommand) {
        if let Some(placeholder) = self.placeholder.take() {
            if let Some(id) = placeholder.marker().id()
                && let Some(mut record) = self.registry.remove(id)
            {
                record.dispose(false);
            }
            placeholder.dispose();
        }
        self.discard_pending_placeholders();

        if let Err(e) = self.register_command_decoration(&command, false) {
            log::error!("Failed to add command decoration: {}", e);
        }
    }

    fn discard_pending_placeholders(&mut self) {
        let (placeholders, rest): (Vec<_>, Vec<_>) = self
            .pending_renders
            .drain(..)
            .partition(|pending| pending.is_placeholder);
        self.pending_renders = rest;
        for pending in placeholders {
            pending.discard();
        }
    }

    fn handle_rendered(&mut self, handle: u64, element: DecorationElement) {
        let Some(index) = self
            .pending_renders
            .iter()
            .position(|pending| pending.decoration.handle() == handle)
        else {
            return;
        };
        let mut pending = self.pending_renders.remove(index);
        pending.renders.dispose();
        if pending.is_dead() {
            log::debug!("Dropping render of a disposed decoration");
            return;
        }

        let decoration = pending.decoration;
        let exit_code = pending.command.exit_code;
        if pending.is_placeholder {
            self.set_placeholder(decoration);
        } else {
            let Some(marker_id) = decoration.marker().id() else {
                decoration.dispose();
                return;
            };
            let disposables = if exit_code.is_some() {
                attach_interactions(&element)
            } else {
                Vec::new()
            };
            let record = DecorationRecord::new(decoration, pending.command, disposables);
            if let Err(e) = self.registry.insert(marker_id, record) {
                log::error!("Failed to track command decoration: {}", e);
                return;
            }
        }

        if !is_styled(&element) {
            apply_layout(&element, self.font_size(), self.default_font_size());
            apply_classes(&element, exit_code, &self.icons);
        }
    }

    fn set_placeholder(&mut self, decoration: Decoration) {
        let previous = self.placeholder.replace(decoration);
        let Some(previous) = previous else {
            return;
        };
        match self.placeholder_strategy {
            PlaceholderStrategy::Retain => {}
            PlaceholderStrategy::DisposePrevious => {
                let in_use = self.registry.iter().any(|(_, record)| {
                    record.decoration.marker().same_as(previous.marker())
                });
                previous.dispose();
                if !in_use {
                    previous.marker().dispose();
                }
            }
        }
    }

    fn handle_pointer(
        &mut self,
        marker_id: MarkerId,
        handle: u64,
        event: PointerEvent,
        now: Instant,
    ) {
        let Some(record) = self.registry.get(marker_id) else {
            return;
        };
        if record.decoration.handle() != handle {
            return;
        }
        let Some(element) = record.decoration.element() else {
            return;
        };

        match event {
            PointerEvent::Click => {
                self.hover_delayer.cancel();
                self.services.hover.hide_hover();
                let actions = command_actions(&record.command);
                self.services.context_menu.show_context_menu(ContextMenuRequest {
                    anchor: element,
                    actions,
                });
            }
            PointerEvent::MouseEnter => {
                if self.context_menu_visible {
                    return;
                }
                let Some(exit_code) = record.exit_code else {
                    return;
                };
                let hover = PendingHover {
                    element,
                    exit_code,
                    timestamp: record.command.timestamp,
                };
                self.hover_delayer.trigger(now, hover);
            }
            PointerEvent::MouseLeave | PointerEvent::MouseOut => {
                self.hover_delayer.cancel();
                self.services.hover.hide_hover();
            }
        }
    }

    fn poll_hover(&mut self, now: Instant) {
        let Some(hover) = self.hover_delayer.poll(now) else {
            return;
        };
        if self.context_menu_visible || hover.element.is_removed() {
            return;
        }
        self.services.hover.show_hover(HoverRequest {
            content: hover_content(hover.exit_code, hover.timestamp, Utc::now()),
            target: hover.element,
        });
    }

    fn handle_config_change(&mut self, change: &ConfigChangeEvent) {
        let config = self.settings.get();

        if change.affected_keys.iter().any(|key| key.is_decoration_icon()) {
            self.icons = DecorationIcons::from_config(&config);
            self.refresh_classes();
        }
        if change.affects_configuration(SettingKey::FontSize)
            || change.affects_configuration(SettingKey::LineHeight)
        {
            self.refresh_layouts();
        }
        if change.affects_configuration(SettingKey::HoverDelay) {
            self.hover_delayer
                .set_delay(Duration::from_millis(config.hover_delay_ms));
        }
        if change.affects_configuration(SettingKey::PlaceholderStrategy) {
            self.placeholder_strategy = config.placeholder_strategy;
        }
        if change.affects_configuration(SettingKey::DecorationsEnabled) {
            if config.decorations_enabled {
                log::info!("Command decorations enabled");
                if self.capabilities.has(TerminalCapability::CommandDetection) {
                    self.attach_command_listeners(true);
                }
            } else {
                log::info!("Command decorations disabled");
                self.clear_decorations();
                self.command_listeners.detach();
            }
        }
    }

    /// Forget decorations whose marker scrolled out of the buffer.
    fn prune_scrolled_out(&mut self) {
        let pruned = self.registry.prune_disposed();
        if pruned > 0 {
            log::debug!("Pruned {} scrolled-out decoration(s)", pruned);
        }

        let (dead, live): (Vec<_>, Vec<_>) = self
            .pending_renders
            .drain(..)
            .partition(PendingRender::is_dead);
        self.pending_renders = live;
        for pending in dead {
            pending.discard();
        }

        if let Some(placeholder) = self
            .placeholder
            .take_if(|p| p.is_disposed() || p.marker().is_disposed())
        {
            placeholder.dispose();
        }
    }

    fn elements(&self) -> Vec<DecorationElement> {
        self.placeholder
            .iter()
            .chain(self.registry.iter().map(|(_, record)| &record.decoration))
            .filter_map(Decoration::element)
            .collect()
    }

    fn decorations_enabled(&self) -> bool {
        self.settings
            .value(SettingKey::DecorationsEnabled)
            .as_bool()
            .unwrap_or(true)
    }

    fn font_size(&self) -> f32 {
        self.settings.get().font_size
    }

    fn default_font_size(&self) -> f32 {
        self.settings
            .inspect(SettingKey::FontSize)
            .default_value
            .as_f64()
            .map_or_else(defaults::font_size, |size| size as f32)
    }

    /// Whether command listeners are attached, as `(started, finished)`.
    pub fn command_listeners_attached(&self) -> (bool, bool) {
        (
            self.command_listeners.started.is_some(),
            self.command_listeners.finished.is_some(),
        )
    }
}

fn map_events<T, E>(subscription: &Subscription<T>, wrap: impl Fn(T) -> E) -> Vec<Sequenced<E>> {
    subscription
        .drain()
        .into_iter()
        .map(|event| Sequenced {
            seq: event.seq,
            value: wrap(event.value),
        })
        .collect()
}
