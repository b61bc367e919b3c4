// SPDX-License-Identifier: MIT

//!
//! The browser frontend: drives a live `<svg>` element
//!
//! ```sh
//! wasm-pack build --target web
//! python3 -m http.server 8000 --bind 0.0.0.0
//! ```
//!

use crate::{
    ElementId, Engine, NodeId, NodeKind, PinStorage, PinStore, Scene, SceneError, StorageError,
    Transform, ViewConfig, Viewport, has_classes,
};
use crate::engine::NodeArena;
use chronolane_core::{Dataset, RawItem, SettingsResource, TrackId, ViewState};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::{Closure, wasm_bindgen};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, EventTarget, MouseEvent, SvgElement, WheelEvent};

/// The SVG namespace
const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Wheel deltas are divided by this to slow zooming down
const WHEEL_ZOOM_DIVISOR: f64 = 250.0;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    if let Err(error) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::warn_1(&JsValue::from_str(&error.to_string()));
    }
    info!("Start Chronolane");
    Ok(())
}

/// Describe a JS error
fn js_error(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Convert any displayable error for returning to JS
fn to_js<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

//------------------------------------------------------------------------------
// Scene
//------------------------------------------------------------------------------

/// A [`Scene`] made of real SVG DOM elements
#[derive(Debug)]
pub struct SvgDomScene {
    document: Document,
    nodes: NodeArena<Element>,
}

impl SvgDomScene {
    /// Create an `<svg>` of the given size inside `container`
    pub fn new(container: &Element, width: f64, height: f64) -> Result<Self, SceneError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| SceneError::Backend(String::from("No document")))?;
        let svg = document
            .create_element_ns(Some(SVG_NS), "svg")
            .map_err(|error| SceneError::Backend(js_error(error)))?;
        for (name, value) in [
            ("width", width.to_string()),
            ("height", height.to_string()),
            ("id", String::from("main-svg")),
        ] {
            svg.set_attribute(name, &value)
                .map_err(|error| SceneError::Backend(js_error(error)))?;
        }
        container
            .append_child(&svg)
            .map_err(|error| SceneError::Backend(js_error(error)))?;

        Ok(Self {
            document,
            nodes: NodeArena::new(svg),
        })
    }

    /// The DOM element behind a node
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node).ok()
    }
}

impl Scene for SvgDomScene {
    fn root(&self) -> NodeId {
        self.nodes.root()
    }

    fn create(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        class: &str,
    ) -> Result<NodeId, SceneError> {
        let element = self
            .document
            .create_element_ns(Some(SVG_NS), kind.tag())
            .map_err(|error| SceneError::Backend(js_error(error)))?;
        if !class.is_empty() {
            element
                .set_attribute("class", class)
                .map_err(|error| SceneError::Backend(js_error(error)))?;
        }
        self.nodes
            .get(parent)?
            .append_child(&element)
            .map_err(|error| SceneError::Backend(js_error(error)))?;
        self.nodes.insert(parent, element)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), SceneError> {
        self.nodes
            .get(node)?
            .set_attribute(name, value)
            .map_err(|error| SceneError::Backend(js_error(error)))
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(node).ok()?.get_attribute(name)
    }

    fn set_style(
        &mut self,
        node: NodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), SceneError> {
        let style = self
            .nodes
            .get(node)?
            .dyn_ref::<SvgElement>()
            .ok_or_else(|| SceneError::Backend(format!("{node:?} is not an SVG element")))?
            .style();
        match value {
            Some(value) => style.set_property(name, value),
            None => style.remove_property(name).map(|_| ()),
        }
        .map_err(|error| SceneError::Backend(js_error(error)))
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), SceneError> {
        self.nodes.get(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.nodes.remove(node)?.remove();
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<(), SceneError> {
        for child in self.nodes.clear_children(node)? {
            child.remove();
        }
        Ok(())
    }

    fn select(&self, classes: &[&str]) -> Vec<NodeId> {
        self.nodes
            .walk()
            .into_iter()
            .filter_map(|(id, element)| {
                let class = element.get_attribute("class")?;
                has_classes(&class, classes).then_some(id)
            })
            .collect()
    }
}

//------------------------------------------------------------------------------
// Pin storage
//------------------------------------------------------------------------------

/// Pins persisted in `window.localStorage`
#[derive(Debug, Clone)]
pub struct LocalStoragePins {
    storage: Option<web_sys::Storage>,
}

impl Default for LocalStoragePins {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStoragePins {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            warn!("localStorage is unavailable, pins won't survive a reload");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable(String::from("localStorage")))
    }
}

impl PinStorage for LocalStoragePins {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|error| StorageError::Unavailable(js_error(error)))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|error| StorageError::Write(js_error(error)))
    }
}

//------------------------------------------------------------------------------
// The frontend
//------------------------------------------------------------------------------

type DomEngine = Engine<SvgDomScene, LocalStoragePins>;

/// Pointer state shared by the pan listeners
#[derive(Debug, Default)]
struct DragState {
    mouse_is_down: bool,
}

/// The SVG timeline for use on the web
#[wasm_bindgen]
pub struct ChronolaneSvg {
    /// Where the `<svg>` is placed
    container: Element,

    config: ViewConfig,

    /// The underlying timeline [`Engine`] (once loaded)
    engine: Option<Rc<RefCell<DomEngine>>>,
}

#[wasm_bindgen]
impl ChronolaneSvg {
    /// Create a timeline inside the element matching `container_selector`.
    /// `config` is an optional view config object.
    #[wasm_bindgen(constructor)]
    pub fn new(container_selector: &str, config: JsValue) -> Result<ChronolaneSvg, JsValue> {
        info!("Constructing a new ChronolaneSvg in {container_selector}");
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("No document"))?;
        let container = document
            .query_selector(container_selector)?
            .ok_or_else(|| JsValue::from_str(&format!("Nothing matches {container_selector}")))?;
        let config = if config.is_undefined() || config.is_null() {
            ViewConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate().map_err(to_js)?;
        Ok(Self {
            container,
            config,
            engine: None,
        })
    }

    /// Build the timeline from the loaded resources: the settings object, an
    /// object of item arrays keyed by track ID, and the (optional) view state.
    /// A timeline can only be loaded once; construct a new one to show other
    /// data.
    #[wasm_bindgen]
    pub fn load(&mut self, settings: JsValue, tracks: JsValue, view: JsValue) -> Result<(), JsValue> {
        if self.engine.is_some() {
            return Err(JsValue::from_str("This timeline is already loaded"));
        }
        let settings: SettingsResource = serde_wasm_bindgen::from_value(settings)?;
        let tracks: HashMap<TrackId, Vec<RawItem>> = serde_wasm_bindgen::from_value(tracks)?;
        let view: Option<ViewState> = if view.is_undefined() || view.is_null() {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(view)?)
        };
        let dataset = Dataset::assemble(settings, tracks, view).map_err(to_js)?;

        let viewport = Viewport::new(
            f64::from(self.container.client_width()),
            f64::from(self.container.client_height()),
        );
        let scene =
            SvgDomScene::new(&self.container, viewport.width, viewport.height).map_err(to_js)?;
        let pins = PinStore::load(LocalStoragePins::new());
        let engine = Engine::build(&dataset, viewport, self.config.clone(), scene, pins)
            .map_err(to_js)?;

        let engine = Rc::new(RefCell::new(engine));
        self.engine = Some(engine.clone());
        listen_for_gestures(&engine)?;
        listen_for_element_pointer_events(&engine)?;
        Ok(())
    }

    /// The current transform (`{translateX, translateY, scale}`)
    #[wasm_bindgen]
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        let transform = match &self.engine {
            Some(engine) => engine.try_borrow().map_err(to_js)?.transform(),
            None => Transform::identity(),
        };
        Ok(serde_wasm_bindgen::to_value(&transform)?)
    }

    /// Return to the identity transform
    #[wasm_bindgen]
    pub fn reset(&self) {
        if let Some(engine) = &self.engine {
            with_engine(engine, |engine| engine.set_transform(Transform::identity()));
        }
    }
}

/// Run `f` on the engine, unless it is already borrowed (an event fired while
/// another was being handled)
fn with_engine<F, T>(engine: &Rc<RefCell<DomEngine>>, f: F) -> Option<T>
where
    F: FnOnce(&mut DomEngine) -> T,
{
    match engine.try_borrow_mut() {
        Ok(mut engine) => Some(f(&mut engine)),
        Err(error) => {
            warn!("Engine busy, event dropped: {error}");
            None
        }
    }
}

/// Attach a listener that lives as long as the page.  The closure and
/// everything it captures are leaked.
fn add_listener<E, F>(target: &EventTarget, event_name: &str, mut listener: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            listener(event);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    target.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Wheel zooms about the pointer, dragging pans
fn listen_for_gestures(engine: &Rc<RefCell<DomEngine>>) -> Result<(), JsValue> {
    let svg: EventTarget = {
        let engine = engine.try_borrow().map_err(to_js)?;
        let scene = engine.scene();
        scene
            .element(scene.root())
            .cloned()
            .ok_or_else(|| JsValue::from_str("The svg element is missing"))?
            .into()
    };
    let drag = Rc::new(RefCell::new(DragState::default()));

    let wheel_engine = engine.clone();
    add_listener::<WheelEvent, _>(&svg, "wheel", move |event| {
        event.prevent_default();
        let factor = (event.delta_y().abs() / WHEEL_ZOOM_DIVISOR) + 1.0;
        let factor = if event.delta_y() > 0.0 {
            1.0 / factor
        } else {
            factor
        };
        let (x, y) = (f64::from(event.offset_x()), f64::from(event.offset_y()));
        with_engine(&wheel_engine, |engine| engine.zoom_at(factor, x, y));
    })?;

    let down = drag.clone();
    add_listener::<MouseEvent, _>(&svg, "mousedown", move |_event| {
        down.borrow_mut().mouse_is_down = true;
    })?;

    for event_name in ["mouseup", "mouseleave"] {
        let up = drag.clone();
        add_listener::<MouseEvent, _>(&svg, event_name, move |_event| {
            up.borrow_mut().mouse_is_down = false;
        })?;
    }

    let move_engine = engine.clone();
    add_listener::<MouseEvent, _>(&svg, "mousemove", move |event| {
        if drag.borrow().mouse_is_down {
            let (dx, dy) = (f64::from(event.movement_x()), f64::from(event.movement_y()));
            with_engine(&move_engine, |engine| engine.pan_by(dx, dy));
        }
    })?;

    Ok(())
}

/// Hover and click listeners on every tick and period bar
fn listen_for_element_pointer_events(engine: &Rc<RefCell<DomEngine>>) -> Result<(), JsValue> {
    let triggers: Vec<(ElementId, EventTarget)> = {
        let engine = engine.try_borrow().map_err(to_js)?;
        engine
            .elements()
            .iter()
            .filter_map(|element| {
                let target = engine.scene().element(element.trigger())?.clone();
                Some((element.id(), target.into()))
            })
            .collect()
    };
    debug!("Listening to {} elements", triggers.len());

    for (id, target) in triggers {
        let over = engine.clone();
        add_listener::<MouseEvent, _>(&target, "mouseover", move |_event| {
            with_engine(&over, |engine| engine.hover(id));
        })?;

        let out = engine.clone();
        add_listener::<MouseEvent, _>(&target, "mouseout", move |_event| {
            with_engine(&out, |engine| engine.unhover(id));
        })?;

        let click = engine.clone();
        add_listener::<MouseEvent, _>(&target, "click", move |event| {
            event.stop_propagation();
            with_engine(&click, |engine| engine.click(id));
        })?;
    }
    Ok(())
}
