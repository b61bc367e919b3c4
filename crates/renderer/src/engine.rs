// SPDX-License-Identifier: MIT

//!
//! The `chronolane-renderer` engine
//!
//! The engine lays every track out once, against a single shared time axis,
//! and draws the result into a [`Scene`].  From then on pan/zoom gestures only
//! move the scene's root group and rescale the presentation attributes (stroke
//! widths, lengths, offsets, font sizes) of the zoom-sensitive elements.
//! Anchor positions are never recomputed.
//!

mod axis;
mod colours;
mod config;
mod grid;
mod helpers;
mod layout;
mod layout_params;
mod node_arena;
mod pin_store;
mod point;
mod scale_law;
mod scene;
mod transform;

pub(crate) use helpers::*;
pub(crate) use node_arena::NodeArena;

pub use axis::*;
pub use colours::*;
pub use config::*;
pub use grid::*;
pub use layout::*;
pub use layout_params::*;
pub use pin_store::*;
pub use point::*;
pub use scale_law::*;
pub use scene::*;
pub use transform::*;

use chronolane_core::{
    Dataset, DatasetError, ExtentError, PinKey, TimePoint, Track, local_extent,
};
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Rotation of track labels
pub const TRACK_LABEL_ROTATION: f64 = -90.0;

/// Rotation of event date labels
pub const EVENT_DATE_ROTATION: f64 = -90.0;

/// Class marking elements that are rescaled on every zoom change
pub const SCALING_CLASS: &str = "scaling";

/// Errors that can arise while building or driving the [`Engine`]
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Extent(#[from] ExtentError),

    #[error(transparent)]
    Axis(#[from] AxisError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    /// A zoom-sensitive node has lost one of its anchor attributes
    #[error("Node {node:?} has no numeric `{name}` anchor")]
    MissingAnchor { node: NodeId, name: &'static str },

    #[error("Unknown timeline element {0:?}")]
    UnknownElement(ElementId),
}

/// The size of the area being drawn into
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The two observable states of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    /// The transform is the identity
    Idle,

    /// Panned and/or zoomed
    Transformed,
}

/// Identifies an event or period drawn by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElementId(pub(crate) usize);

/// A drawn event.  Geometry is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct EventElement {
    pub id: ElementId,
    pub key: PinKey,
    pub label: String,

    /// The formatted date, when the track shows dates
    pub date_text: Option<String>,

    /// Where the event sits on its track
    pub anchor: Point,

    /// The tick mark, which receives pointer events
    pub tick: NodeId,

    /// Mirror of the pin store's state for `key`
    pub pinned: bool,

    /// Whether the element is rescaled with zoom
    pub scales: bool,
}

/// A drawn period.  Geometry is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodElement {
    pub id: ElementId,
    pub key: PinKey,
    pub label: String,
    pub start: Point,
    pub end: Point,

    /// Anchor of the period's label (the position of the period's midpoint)
    pub mid: Point,

    /// The bar, which receives pointer events
    pub bar: NodeId,
    pub colour: String,

    /// Mirror of the pin store's state for `key`
    pub pinned: bool,

    /// Whether the element is rescaled with zoom
    pub scales: bool,
}

/// Anything the user can hover over or click on
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineElement {
    Event(EventElement),
    Period(PeriodElement),
}

impl TimelineElement {
    pub fn id(&self) -> ElementId {
        match self {
            TimelineElement::Event(event) => event.id,
            TimelineElement::Period(period) => period.id,
        }
    }

    pub fn key(&self) -> &PinKey {
        match self {
            TimelineElement::Event(event) => &event.key,
            TimelineElement::Period(period) => &period.key,
        }
    }

    pub fn pinned(&self) -> bool {
        match self {
            TimelineElement::Event(event) => event.pinned,
            TimelineElement::Period(period) => period.pinned,
        }
    }

    fn set_pinned(&mut self, pinned: bool) {
        match self {
            TimelineElement::Event(event) => event.pinned = pinned,
            TimelineElement::Period(period) => period.pinned = pinned,
        }
    }

    pub fn scales(&self) -> bool {
        match self {
            TimelineElement::Event(event) => event.scales,
            TimelineElement::Period(period) => period.scales,
        }
    }

    /// The node that receives pointer events for the element
    pub fn trigger(&self) -> NodeId {
        match self {
            TimelineElement::Event(event) => event.tick,
            TimelineElement::Period(period) => period.bar,
        }
    }
}

/// The core `chronolane-renderer` engine: the render/rescale controller.
///
/// Generic over the scene being drawn into and the storage pins are persisted
/// to, so that the same engine drives the browser's SVG DOM, the in-memory
/// scene used for snapshots, and tests.
pub struct Engine<S: Scene, P: PinStorage> {
    /// Where everything is drawn
    scene: S,

    /// The single source of truth for pin state
    pins: PinStore<P>,

    config: ViewConfig,
    viewport: Viewport,

    /// The shared time axis (fixed once built)
    axis: AxisMapper,

    /// One per track, in track order
    layouts: Vec<TrackLayout>,

    /// The group the transform is applied to
    main: NodeId,

    /// The group holding the date grid (cleared and redrawn on every change)
    grid: NodeId,

    /// The live pan/zoom state
    transform: Transform,

    /// Every event and period, indexed by `ElementId`
    elements: Vec<TimelineElement>,

    /// Trigger node -> element
    triggers: HashMap<NodeId, ElementId>,

    /// The label currently shown for an element (if any)
    labels: HashMap<ElementId, Option<NodeId>>,
}

impl<S: Scene, P: PinStorage> Engine<S, P> {
    /// Lay out and draw the dataset.  Geometry is computed here, once.
    ///
    /// Keys listed in the dataset's view state are seeded into the pin store
    /// and every pinned element has its label drawn straight away.
    pub fn build(
        dataset: &Dataset,
        viewport: Viewport,
        config: ViewConfig,
        mut scene: S,
        mut pins: PinStore<P>,
    ) -> Result<Self, ControllerError> {
        info!(
            "Building timeline of {} tracks in {}x{}",
            dataset.tracks().len(),
            viewport.width,
            viewport.height
        );

        config.validate()?;
        let axis = AxisMapper::new(
            dataset.global_extent(),
            viewport.width,
            config.left_margin(),
            config.right_margin(),
        )?;
        pins.seed(&dataset.view().pinned_labels);

        let root = scene.root();
        let main = scene.create(root, NodeKind::Group, "main")?;
        scene.set_attr(main, "transform", &Transform::identity().to_svg())?;
        let grid = scene.create(main, NodeKind::Group, "date-grid")?;

        let mut engine = Self {
            scene,
            pins,
            config,
            viewport,
            axis,
            layouts: Vec::with_capacity(dataset.tracks().len()),
            main,
            grid,
            transform: Transform::identity(),
            elements: Vec::new(),
            triggers: HashMap::new(),
            labels: HashMap::new(),
        };

        engine.draw_grid()?;
        for track in dataset.tracks() {
            let extent = local_extent(track)?;
            let layout = TrackLayout::new(&engine.axis, extent, track.settings.v_pos, viewport.height);
            debug!(
                "Track `{}` spans {} to {} (x {} to {})",
                track.id,
                extent.min(),
                extent.max(),
                layout.x_start(),
                layout.x_end()
            );
            engine.draw_track(track, &layout)?;
            engine.layouts.push(layout);
        }

        // Labels for elements pinned in an earlier session
        let pinned: Vec<ElementId> = engine
            .elements
            .iter()
            .filter(|element| element.pinned())
            .map(TimelineElement::id)
            .collect();
        for id in pinned {
            engine.show_label(id)?;
        }

        info!(
            "Drew {} elements ({} pinned)",
            engine.elements.len(),
            engine.labels.values().filter(|label| label.is_some()).count()
        );
        Ok(engine)
    }

    //
    // Drawing
    //

    fn draw_track(
        &mut self,
        track: &Track,
        layout: &TrackLayout,
    ) -> Result<(), ControllerError> {
        let settings = &track.settings;
        let scales = settings.rescales_with_zoom();
        let params = self.config.layout.at(1.0);
        let colours = self.config.colours;

        if settings.line {
            let (start, end) = (layout.start(), layout.end());
            let baseline = self.scene.create(self.main, NodeKind::Line, "timeline-path")?;
            self.scene.set_num(baseline, "x1", start.x)?;
            self.scene.set_num(baseline, "y1", start.y)?;
            self.scene.set_num(baseline, "x2", end.x)?;
            self.scene.set_num(baseline, "y2", end.y)?;
            self.scene
                .set_attr(baseline, "stroke", &colours.baseline.as_hex())?;
            self.scene
                .set_style(baseline, "stroke-width", Some(px(params.baseline_width).as_str()))?;
        }

        if let Some(label) = &settings.label {
            let start = layout.start();
            let x = start.x - self.config.track_label_gap;
            let text = self.scene.create(self.main, NodeKind::Text, "timeline-label")?;
            self.scene.set_num(text, "x", x)?;
            self.scene.set_num(text, "y", start.y)?;
            self.scene
                .set_attr(text, "transform", &rotate(TRACK_LABEL_ROTATION, x, start.y))?;
            self.scene.set_attr(text, "fill", &colours.text.as_hex())?;
            self.scene.set_text(text, label)?;
        }

        for period in &track.periods {
            let start = layout.position_on_line(period.start);
            let end = layout.position_on_line(period.end);
            let mid = layout.position_on_line(period.midpoint());
            let colour = period
                .color
                .clone()
                .unwrap_or_else(|| colours.period.as_hex());

            let bar = self
                .scene
                .create(self.main, NodeKind::Line, &classes("period-bar", scales))?;
            self.scene.set_num(bar, "x1", start.x)?;
            self.scene.set_num(bar, "y1", start.y)?;
            self.scene.set_num(bar, "x2", end.x)?;
            self.scene.set_num(bar, "y2", end.y)?;
            self.scene
                .set_num(bar, "stroke-width", params.period_bar_width())?;
            self.scene.set_attr(bar, "stroke", &colour)?;
            self.scene.set_style(bar, "pointer-events", Some("stroke"))?;
            self.scene.set_style(bar, "cursor", Some("pointer"))?;

            let key = period.pin_key();
            let id = ElementId(self.elements.len());
            trace!("Period `{key}` is {id:?}");
            self.triggers.insert(bar, id);
            self.elements.push(TimelineElement::Period(PeriodElement {
                id,
                pinned: self.pins.is_pinned(&key),
                key,
                label: period.label.clone(),
                start,
                end,
                mid,
                bar,
                colour,
                scales,
            }));
        }

        for event in &track.events {
            let anchor = layout.position_on_line(event.date);
            let half = params.tick_length / 2.0;

            let tick = self
                .scene
                .create(self.main, NodeKind::Line, &classes("event-tick", scales))?;
            self.scene.set_num(tick, "cx", anchor.x)?;
            self.scene.set_num(tick, "cy", anchor.y)?;
            self.scene.set_num(tick, "x1", anchor.x)?;
            self.scene.set_num(tick, "x2", anchor.x)?;
            self.scene.set_num(tick, "y1", anchor.y - half)?;
            self.scene.set_num(tick, "y2", anchor.y + half)?;
            self.scene.set_attr(tick, "stroke", &colours.tick.as_hex())?;
            self.scene
                .set_style(tick, "stroke-width", Some(px(params.tick_width).as_str()))?;
            self.scene.set_style(tick, "cursor", Some("pointer"))?;

            let key = event.pin_key();
            let id = ElementId(self.elements.len());
            trace!("Event `{key}` is {id:?}");
            self.triggers.insert(tick, id);
            self.elements.push(TimelineElement::Event(EventElement {
                id,
                pinned: self.pins.is_pinned(&key),
                key,
                label: event.label.clone(),
                date_text: settings
                    .show_dates
                    .then(|| event.date.format_long(self.config.date_locale)),
                anchor,
                tick,
                scales,
            }));
        }

        Ok(())
    }

    /// Clear the grid group and draw it again for the visible window
    fn draw_grid(&mut self) -> Result<(), ControllerError> {
        let (visible_min, visible_max) = self.visible_window();
        let lines = generate_grid(
            &self.axis,
            visible_min,
            visible_max,
            &self.transform,
            self.viewport.height,
            &self.config,
        );
        trace!(
            "Regenerating {} grid lines for {visible_min} to {visible_max}",
            lines.len()
        );
        let colours = self.config.colours.grid_colours();

        self.scene.clear_children(self.grid)?;
        for line in lines {
            let node = self
                .scene
                .create(self.grid, NodeKind::Line, line.tier.line_class())?;
            self.scene.set_num(node, "x1", line.x)?;
            self.scene.set_num(node, "y1", line.y1)?;
            self.scene.set_num(node, "x2", line.x)?;
            self.scene.set_num(node, "y2", line.y2)?;
            self.scene
                .set_attr(node, "stroke", &line.tier.colour(&colours).as_hex())?;

            if let Some(label) = line.label {
                let text = self
                    .scene
                    .create(self.grid, NodeKind::Text, "grid-label-primary")?;
                self.scene.set_num(text, "x", label.x)?;
                self.scene.set_num(text, "y", label.y)?;
                self.scene.set_attr(text, "text-anchor", "middle")?;
                self.scene.set_attr(
                    text,
                    "transform",
                    &rotate(GRID_LABEL_ROTATION, label.x, label.y),
                )?;
                self.scene.set_text(text, &label.text)?;
            }
        }
        Ok(())
    }

    /// The layout params an element is drawn with right now
    fn params_for(&self, scales: bool) -> ZoomedLayoutParams {
        if scales {
            self.config.layout.at(self.transform.scale)
        } else {
            self.config.layout.at(1.0)
        }
    }

    /// Draw the element's label, unless it's already shown
    fn show_label(&mut self, id: ElementId) -> Result<(), ControllerError> {
        if let Some(Some(_)) = self.labels.get(&id) {
            return Ok(());
        }
        let element = self
            .elements
            .get(id.0)
            .ok_or(ControllerError::UnknownElement(id))?;
        let params = self.params_for(element.scales());
        let label = match element {
            TimelineElement::Event(event) => {
                draw_event_info(&mut self.scene, self.main, &self.config, &params, event)?
            }
            TimelineElement::Period(period) => {
                draw_period_label(&mut self.scene, self.main, &self.config, &params, period)?
            }
        };
        trace!("Showing label of {id:?}");
        self.labels.insert(id, Some(label));
        Ok(())
    }

    /// Remove the element's label, if shown
    fn hide_label(&mut self, id: ElementId) -> Result<(), ControllerError> {
        if let Some(label) = self.labels.insert(id, None).flatten() {
            trace!("Hiding label of {id:?}");
            self.scene.remove(label)?;
        }
        Ok(())
    }

    //
    // Transform transitions
    //

    /// Apply a new transform (clamped to the zoom bounds).  This is the single
    /// transition every gesture goes through.
    pub fn try_set_transform(&mut self, transform: Transform) -> Result<(), ControllerError> {
        // Last write wins, even if rescaling fails part way
        self.transform = transform.clamped(self.config.zoom_bounds);
        trace!("Transform is now {:?}", self.transform);

        self.scene
            .set_attr(self.main, "transform", &self.transform.to_svg())?;
        self.rescale()?;
        self.draw_grid()
    }

    /// Apply a new transform, logging (rather than returning) any failure
    pub fn set_transform(&mut self, transform: Transform) {
        if let Err(error) = self.try_set_transform(transform) {
            warn!("Couldn't apply transform {transform:?}: {error}");
        }
    }

    /// Pan by a viewport delta
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.set_transform(self.transform.panned(dx, dy));
    }

    /// Zoom by `factor` about the viewport point (`x`, `y`)
    pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) {
        self.set_transform(
            self.transform
                .zoomed_at(factor, x, y, self.config.zoom_bounds),
        );
    }

    /// Recompute the presentation attributes of every zoom-sensitive element.
    /// Anchor attributes are read, never written.
    fn rescale(&mut self) -> Result<(), ControllerError> {
        let params = self.config.layout.at(self.transform.scale);

        for bar in self.scene.select(&["period-bar", SCALING_CLASS]) {
            self.scene
                .set_num(bar, "stroke-width", params.period_bar_width())?;
        }

        for label in self.scene.select(&["period-label", SCALING_CLASS]) {
            let my = self.anchor(label, "my")?;
            self.scene.set_attr(label, "font-size", &px(params.font_size))?;
            self.scene
                .set_num(label, "y", my + params.period_label_drop())?;
        }

        for tick in self.scene.select(&["event-tick", SCALING_CLASS]) {
            let cy = self.anchor(tick, "cy")?;
            let half = params.tick_length / 2.0;
            self.scene.set_num(tick, "y1", cy - half)?;
            self.scene.set_num(tick, "y2", cy + half)?;
            self.scene
                .set_style(tick, "stroke-width", Some(px(params.tick_width).as_str()))?;
        }

        for label in self.scene.select(&["event-label", SCALING_CLASS]) {
            let cx = self.anchor(label, "cx")?;
            let cy = self.anchor(label, "cy")?;
            let y = cy - params.label_offset;
            self.scene.set_num(label, "y", y)?;
            self.scene.set_attr(
                label,
                "transform",
                &rotate(self.config.event_label_rotation, cx, y),
            )?;
            self.scene.set_attr(label, "font-size", &px(params.font_size))?;
        }

        for date in self.scene.select(&["event-date", SCALING_CLASS]) {
            let cx = self.anchor(date, "cx")?;
            let cy = self.anchor(date, "cy")?;
            let y = cy + params.date_label_drop();
            self.scene.set_num(date, "y", y)?;
            self.scene.set_attr(
                date,
                "transform",
                &rotate(EVENT_DATE_ROTATION, cx + self.config.event_date_dx, y),
            )?;
            self.scene.set_attr(date, "font-size", &px(params.font_size))?;
        }

        for baseline in self.scene.select(&["timeline-path"]) {
            self.scene
                .set_style(baseline, "stroke-width", Some(px(params.baseline_width).as_str()))?;
        }

        Ok(())
    }

    fn anchor(&self, node: NodeId, name: &'static str) -> Result<f64, ControllerError> {
        self.scene
            .num(node, name)
            .ok_or(ControllerError::MissingAnchor { node, name })
    }

    //
    // Interaction
    //

    fn element(&self, id: ElementId) -> Result<&TimelineElement, ControllerError> {
        self.elements
            .get(id.0)
            .ok_or(ControllerError::UnknownElement(id))
    }

    /// The pointer has moved over an element
    pub fn try_hover(&mut self, id: ElementId) -> Result<(), ControllerError> {
        let element = self.element(id)?;
        debug!("Hover over `{}`", element.key());
        let pinned = self.pins.is_pinned(element.key());
        if let TimelineElement::Period(period) = element {
            let bar = period.bar;
            let width = svg_number(self.config.period_hover_width);
            self.scene
                .set_style(bar, "stroke-width", Some(width.as_str()))?;
        }
        if !pinned {
            self.show_label(id)?;
        }
        Ok(())
    }

    /// The pointer has left an element
    pub fn try_unhover(&mut self, id: ElementId) -> Result<(), ControllerError> {
        let element = self.element(id)?;
        let pinned = self.pins.is_pinned(element.key());
        if let TimelineElement::Period(period) = element {
            let bar = period.bar;
            self.scene.set_style(bar, "stroke-width", None)?;
        }
        if !pinned {
            self.hide_label(id)?;
        }
        Ok(())
    }

    /// Toggle the pin of the clicked element.  Every element sharing its key
    /// follows the new state.  Returns the new state.
    pub fn try_click(&mut self, id: ElementId) -> Result<bool, ControllerError> {
        let key = self.element(id)?.key().clone();
        let pinned = self.pins.toggle(&key);
        info!("`{key}` is now {}", if pinned { "pinned" } else { "unpinned" });

        let sharing: Vec<ElementId> = self
            .elements
            .iter()
            .filter(|element| *element.key() == key)
            .map(TimelineElement::id)
            .collect();
        for other in sharing {
            self.elements[other.0].set_pinned(pinned);
            if pinned {
                self.show_label(other)?;
            } else {
                self.hide_label(other)?;
            }
        }
        Ok(pinned)
    }

    /// As [`Engine::try_hover`], logging any failure
    pub fn hover(&mut self, id: ElementId) {
        if let Err(error) = self.try_hover(id) {
            warn!("Hover over {id:?} failed: {error}");
        }
    }

    /// As [`Engine::try_unhover`], logging any failure
    pub fn unhover(&mut self, id: ElementId) {
        if let Err(error) = self.try_unhover(id) {
            warn!("Unhover of {id:?} failed: {error}");
        }
    }

    /// As [`Engine::try_click`], logging any failure (in which case `None` is
    /// returned)
    pub fn click(&mut self, id: ElementId) -> Option<bool> {
        match self.try_click(id) {
            Ok(pinned) => Some(pinned),
            Err(error) => {
                warn!("Click on {id:?} failed: {error}");
                None
            }
        }
    }

    //
    // Queries
    //

    pub fn state(&self) -> ControllerState {
        if self.transform.is_identity() {
            ControllerState::Idle
        } else {
            ControllerState::Transformed
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// The time window currently visible across the viewport
    pub fn visible_window(&self) -> (TimePoint, TimePoint) {
        visible_window(&self.axis, &self.transform, self.viewport.width)
    }

    pub fn elements(&self) -> &[TimelineElement] {
        &self.elements
    }

    /// The element whose trigger (tick or bar) is `node`
    pub fn element_for_node(&self, node: NodeId) -> Option<ElementId> {
        self.triggers.get(&node).copied()
    }

    /// The label currently shown for the element
    pub fn label_of(&self, id: ElementId) -> Option<NodeId> {
        self.labels.get(&id).copied().flatten()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn pins(&self) -> &PinStore<P> {
        &self.pins
    }

    pub fn axis(&self) -> &AxisMapper {
        &self.axis
    }

    pub fn layouts(&self) -> &[TrackLayout] {
        &self.layouts
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }
}

/// `base`, plus the scaling class when the element rescales with zoom
fn classes(base: &str, scales: bool) -> String {
    if scales {
        format!("{base} {SCALING_CLASS}")
    } else {
        base.to_string()
    }
}

/// Draw an event's label (and date) group
fn draw_event_info<S: Scene>(
    scene: &mut S,
    parent: NodeId,
    config: &ViewConfig,
    params: &ZoomedLayoutParams,
    event: &EventElement,
) -> Result<NodeId, SceneError> {
    let Point { x: cx, y: cy } = event.anchor;
    let fill = config.colours.text.as_hex();

    let group = scene.create(parent, NodeKind::Group, "event-info")?;

    let label = scene.create(group, NodeKind::Text, &classes("event-label", event.scales))?;
    let y = cy - params.label_offset;
    scene.set_num(label, "cx", cx)?;
    scene.set_num(label, "cy", cy)?;
    scene.set_num(label, "x", cx)?;
    scene.set_num(label, "y", y)?;
    scene.set_attr(label, "transform", &rotate(config.event_label_rotation, cx, y))?;
    scene.set_attr(label, "font-size", &px(params.font_size))?;
    scene.set_attr(label, "fill", &fill)?;
    scene.set_text(label, &event.label)?;

    if let Some(date_text) = &event.date_text {
        let date = scene.create(group, NodeKind::Text, &classes("event-date", event.scales))?;
        let y = cy + params.date_label_drop();
        scene.set_num(date, "cx", cx)?;
        scene.set_num(date, "cy", cy)?;
        scene.set_num(date, "x", cx)?;
        scene.set_num(date, "y", y)?;
        scene.set_attr(
            date,
            "transform",
            &rotate(EVENT_DATE_ROTATION, cx + config.event_date_dx, y),
        )?;
        scene.set_attr(date, "font-size", &px(params.font_size))?;
        scene.set_attr(date, "fill", &fill)?;
        scene.set_text(date, date_text)?;
    }

    Ok(group)
}

/// Draw a period's label beneath the middle of its bar
fn draw_period_label<S: Scene>(
    scene: &mut S,
    parent: NodeId,
    config: &ViewConfig,
    params: &ZoomedLayoutParams,
    period: &PeriodElement,
) -> Result<NodeId, SceneError> {
    let Point { x: mx, y: my } = period.mid;
    let label = scene.create(parent, NodeKind::Text, &classes("period-label", period.scales))?;
    scene.set_num(label, "mx", mx)?;
    scene.set_num(label, "my", my)?;
    scene.set_num(label, "x", mx)?;
    scene.set_num(label, "y", my + params.period_label_drop())?;
    scene.set_attr(label, "font-size", &px(params.font_size))?;
    scene.set_attr(label, "fill", &config.colours.text.as_hex())?;
    scene.set_style(label, "pointer-events", Some("none"))?;
    scene.set_text(label, &period.label)?;
    Ok(label)
}

#[cfg(test)]
mod test {
    use super::*;
    use chronolane_core::TrackId;

    const SETTINGS: &str = r#"{
        "early": { "vPos": 0.25, "line": true, "label": "Early", "showDates": true },
        "late": { "vPos": 0.5, "line": true },
        "fixed": { "vPos": 0.75, "scaleLabels": true }
    }"#;

    const EARLY: &str = r#"[
        { "type": "event", "date": "1900.05.01.", "label": "Founding", "focus": true }
    ]"#;

    const LATE: &str = r#"[
        { "type": "period", "dateStart": "1950.01.01.", "dateEnd": "1960.01.01.",
          "label": "Fifties", "focus": true, "color": "steelblue" },
        { "type": "event", "date": "1955.06.01.", "label": "Founding" }
    ]"#;

    const FIXED: &str = r#"[
        { "type": "event", "date": "1930.01.01.", "label": "Crash" },
        { "type": "period", "dateStart": "1920.01.01.", "dateEnd": "1925.01.01.", "label": "Boom" }
    ]"#;

    const WIDTH: f64 = 1000.0;
    const HEIGHT: f64 = 600.0;

    type TestEngine = Engine<MemoryScene, MemoryPinStorage>;

    fn dataset(view: Option<&str>) -> Dataset {
        Dataset::from_json(
            SETTINGS,
            &[
                (TrackId::from("early"), EARLY),
                (TrackId::from("late"), LATE),
                (TrackId::from("fixed"), FIXED),
            ],
            view,
        )
        .unwrap()
    }

    fn build_with(storage: MemoryPinStorage, view: Option<&str>) -> TestEngine {
        Engine::build(
            &dataset(view),
            Viewport::new(WIDTH, HEIGHT),
            ViewConfig::default(),
            MemoryScene::new(),
            PinStore::load(storage),
        )
        .unwrap()
    }

    fn build() -> TestEngine {
        build_with(MemoryPinStorage::new(), None)
    }

    fn find(engine: &TestEngine, label: &str, track: &str) -> ElementId {
        let key = PinKey::new(&TrackId::from(track), label);
        engine
            .elements()
            .iter()
            .find(|element| *element.key() == key)
            .map(TimelineElement::id)
            .unwrap()
    }

    fn num(engine: &TestEngine, node: NodeId, name: &str) -> f64 {
        engine.scene().num(node, name).unwrap()
    }

    #[test]
    fn global_extent_and_left_bound() {
        let engine = build();
        let domain = engine.axis().domain();
        assert_eq!(domain.min(), TimePoint::parse("1900.05.01.").unwrap());
        assert_eq!(domain.max(), TimePoint::parse("1960.01.01.").unwrap());

        // The first track's only event sits on the axis's left bound
        let founding = find(&engine, "Founding", "early");
        let TimelineElement::Event(event) = &engine.elements()[founding.0] else {
            panic!("not an event");
        };
        let left = engine.config().left_margin();
        assert_eq!(event.anchor, Point::new(left, 0.25 * HEIGHT));
        assert_eq!(num(&engine, event.tick, "cx"), left);
        assert_eq!(engine.layouts()[0].x_start(), left);
    }

    #[test]
    fn panning_shifts_the_visible_window() {
        let mut engine = build();
        assert_eq!(engine.state(), ControllerState::Idle);
        let (min, max) = engine.visible_window();
        assert_eq!(min, engine.axis().invert(0.0));
        assert_eq!(max, engine.axis().invert(WIDTH));

        engine.pan_by(WIDTH, 0.0);
        assert_eq!(engine.state(), ControllerState::Transformed);
        let (panned_min, panned_max) = engine.visible_window();
        assert_eq!(panned_min, engine.axis().invert(-WIDTH));
        assert_eq!(panned_max, engine.axis().invert(0.0));
        assert!(panned_max < max);
        assert!(panned_min < min);

        engine.set_transform(Transform::identity());
        assert_eq!(engine.state(), ControllerState::Idle);
    }

    #[test]
    fn zoom_rescales_without_moving_anchors() {
        let mut engine = build();
        let founding = find(&engine, "Founding", "early");
        let tick = engine.elements()[founding.0].trigger();
        let cx = num(&engine, tick, "cx");
        let cy = num(&engine, tick, "cy");

        engine.zoom_at(2.0, 0.0, 0.0);
        assert_eq!(engine.transform().scale, 2.0);
        let main = engine.scene().select(&["main"])[0];
        assert_eq!(
            engine.scene().attr(main, "transform").as_deref(),
            Some("translate(0,0) scale(2)")
        );

        let params = engine.config().layout.at(2.0);
        assert_eq!(num(&engine, tick, "cx"), cx);
        assert_eq!(num(&engine, tick, "cy"), cy);
        assert_eq!(num(&engine, tick, "y1"), cy - params.tick_length / 2.0);
        assert_eq!(num(&engine, tick, "y2"), cy + params.tick_length / 2.0);
        assert_eq!(
            engine.scene().style(tick, "stroke-width"),
            Some(px(params.tick_width).as_str())
        );

        for baseline in engine.scene().select(&["timeline-path"]) {
            assert_eq!(
                engine.scene().style(baseline, "stroke-width"),
                Some(px(params.baseline_width).as_str())
            );
        }
    }

    #[test]
    fn rescaling_is_idempotent() {
        let mut engine = build();
        let transform = Transform {
            translate_x: -40.0,
            translate_y: 12.0,
            scale: 3.0,
        };
        engine.set_transform(transform);
        let first = engine.scene().to_svg(WIDTH, HEIGHT);
        engine.set_transform(transform);
        assert_eq!(engine.scene().to_svg(WIDTH, HEIGHT), first);
    }

    #[test]
    fn fixed_tracks_are_not_rescaled() {
        let mut engine = build();
        let crash = find(&engine, "Crash", "fixed");
        let tick = engine.elements()[crash.0].trigger();
        assert!(!engine.elements()[crash.0].scales());
        let y1 = num(&engine, tick, "y1");

        engine.zoom_at(4.0, 500.0, 300.0);
        assert_eq!(num(&engine, tick, "y1"), y1);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut engine = build();
        engine.zoom_at(100.0, 0.0, 0.0);
        assert_eq!(engine.transform().scale, engine.config().zoom_bounds.max);
        engine.zoom_at(0.0001, 0.0, 0.0);
        assert_eq!(engine.transform().scale, engine.config().zoom_bounds.min);
    }

    #[test]
    fn grid_is_regenerated() {
        let mut engine = build();
        let labels = |engine: &TestEngine| -> Vec<String> {
            engine
                .scene()
                .select(&["grid-label-primary"])
                .into_iter()
                .filter_map(|node| engine.scene().text(node).map(str::to_string))
                .collect()
        };
        let before = labels(&engine);
        assert!(before.contains(&String::from("1900")));

        engine.pan_by(-2.0 * WIDTH, 0.0);
        let after = labels(&engine);
        assert_ne!(before, after);

        // Full replace: one grid group, holding only the latest lines
        let (min, max) = engine.visible_window();
        let expected = generate_grid(
            engine.axis(),
            min,
            max,
            &engine.transform(),
            HEIGHT,
            engine.config(),
        );
        let grid = engine.scene().select(&["date-grid"]);
        assert_eq!(grid.len(), 1);
        let line_count = engine.scene().children(grid[0]).len() - after.len();
        assert_eq!(line_count, expected.len());
    }

    #[test]
    fn hover_shows_and_hides_labels() {
        let mut engine = build();
        let founding = find(&engine, "Founding", "early");
        assert!(engine.label_of(founding).is_none());

        engine.hover(founding);
        let group = engine.label_of(founding).unwrap();
        assert_eq!(engine.scene().select(&["event-label"]).len(), 1);
        // The early track shows dates
        let date = engine.scene().select(&["event-date"])[0];
        assert_eq!(engine.scene().text(date), Some("1900. május 01."));

        engine.unhover(founding);
        assert!(engine.label_of(founding).is_none());
        assert!(!engine.scene().is_live(group));
        assert!(engine.scene().select(&["event-info"]).is_empty());
    }

    #[test]
    fn hover_labels_use_the_current_scale() {
        let mut engine = build();
        engine.zoom_at(2.0, 0.0, 0.0);
        let founding = find(&engine, "Founding", "early");
        engine.hover(founding);
        let label = engine.scene().select(&["event-label"])[0];
        let params = engine.config().layout.at(2.0);
        assert_eq!(
            engine.scene().attr(label, "font-size"),
            Some(px(params.font_size))
        );
    }

    #[test]
    fn period_hover_emphasises_the_bar() {
        let mut engine = build();
        let fifties = find(&engine, "Fifties", "late");
        let bar = engine.elements()[fifties.0].trigger();

        engine.hover(fifties);
        assert_eq!(engine.scene().style(bar, "stroke-width"), Some("6"));
        let label = engine.label_of(fifties).unwrap();
        assert_eq!(engine.scene().text(label), Some("Fifties"));

        engine.unhover(fifties);
        assert_eq!(engine.scene().style(bar, "stroke-width"), None);
        assert!(engine.label_of(fifties).is_none());
        assert_eq!(engine.scene().attr(bar, "stroke").as_deref(), Some("steelblue"));
    }

    #[test]
    fn click_pins_and_persists() {
        let mut engine = build();
        let fifties = find(&engine, "Fifties", "late");

        engine.hover(fifties);
        assert_eq!(engine.click(fifties), Some(true));
        engine.unhover(fifties);
        // Pinned labels survive the pointer leaving
        assert!(engine.label_of(fifties).is_some());
        assert!(engine.elements()[fifties.0].pinned());
        let stored = engine.pins().storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some(r#"{"late::Fifties":true}"#));

        assert_eq!(engine.click(fifties), Some(false));
        assert!(engine.label_of(fifties).is_none());
        let stored = engine.pins().storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some("{}"));
    }

    #[test]
    fn elements_sharing_a_key_follow_each_other() {
        let settings = r#"{ "a": { "vPos": 0.5 } }"#;
        let data = r#"[
            { "type": "event", "date": "1900.01.01.", "label": "Twice", "focus": true },
            { "type": "event", "date": "1910.01.01.", "label": "Twice", "focus": true }
        ]"#;
        let dataset = Dataset::from_json(settings, &[(TrackId::from("a"), data)], None).unwrap();
        let mut engine = Engine::build(
            &dataset,
            Viewport::new(WIDTH, HEIGHT),
            ViewConfig::default(),
            MemoryScene::new(),
            PinStore::load(MemoryPinStorage::new()),
        )
        .unwrap();

        assert_eq!(engine.click(ElementId(0)), Some(true));
        assert!(engine.elements().iter().all(TimelineElement::pinned));
        assert_eq!(engine.scene().select(&["event-info"]).len(), 2);

        assert_eq!(engine.click(ElementId(1)), Some(false));
        assert!(!engine.elements().iter().any(TimelineElement::pinned));
        assert!(engine.scene().select(&["event-info"]).is_empty());
    }

    #[test]
    fn pins_are_restored() {
        let mut storage = MemoryPinStorage::new();
        storage
            .write(PIN_STORAGE_KEY, r#"{"fixed::Crash":true}"#)
            .unwrap();
        let engine = build_with(storage, Some(r#"{ "pinnedLabels": ["late::Fifties"] }"#));

        let crash = find(&engine, "Crash", "fixed");
        let fifties = find(&engine, "Fifties", "late");
        assert!(engine.label_of(crash).is_some());
        assert!(engine.label_of(fifties).is_some());
        assert!(engine.label_of(find(&engine, "Boom", "fixed")).is_none());

        // Seeded keys aren't written back until changed
        let stored = engine.pins().storage().read(PIN_STORAGE_KEY).unwrap();
        assert_eq!(stored.as_deref(), Some(r#"{"fixed::Crash":true}"#));
    }

    #[test]
    fn interaction_errors_are_absorbed() {
        let mut engine = build();
        let missing = ElementId(999);
        assert!(matches!(
            engine.try_hover(missing),
            Err(ControllerError::UnknownElement(_))
        ));
        engine.hover(missing);
        engine.unhover(missing);
        assert_eq!(engine.click(missing), None);

        // Still responsive
        let founding = find(&engine, "Founding", "early");
        assert_eq!(engine.click(founding), Some(true));
    }

    #[test]
    fn triggers_map_back_to_elements() {
        let engine = build();
        for element in engine.elements() {
            assert_eq!(engine.element_for_node(element.trigger()), Some(element.id()));
        }
        assert_eq!(engine.element_for_node(engine.scene().root()), None);
    }

    #[test]
    fn track_labels() {
        let engine = build();
        let labels = engine.scene().select(&["timeline-label"]);
        assert_eq!(labels.len(), 1);
        let x = engine.config().left_margin() - engine.config().track_label_gap;
        assert_eq!(engine.scene().num(labels[0], "x"), Some(x));
        assert_eq!(engine.scene().text(labels[0]), Some("Early"));
        assert_eq!(engine.scene().select(&["timeline-path"]).len(), 2);
    }

    #[test]
    fn too_narrow() {
        let result = Engine::build(
            &dataset(None),
            Viewport::new(100.0, HEIGHT),
            ViewConfig::default(),
            MemoryScene::new(),
            PinStore::load(MemoryPinStorage::new()),
        );
        assert!(matches!(result, Err(ControllerError::Axis(_))));
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = ViewConfig::default();
        config.zoom_bounds = ZoomBounds::new(10.0, 1.0);
        let result = Engine::build(
            &dataset(None),
            Viewport::new(WIDTH, HEIGHT),
            config,
            MemoryScene::new(),
            PinStore::load(MemoryPinStorage::new()),
        );
        assert!(matches!(
            result,
            Err(ControllerError::Config(ConfigError::ZoomBounds { .. }))
        ));
    }
}
