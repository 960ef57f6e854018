/// Small helpers for touching page elements
use backdrop_core::ElementState;
use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

/// Look up an element by id, `None` if it is missing or not an HTML element
pub fn element_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

/// Every HTML element matching `selector`, in document order
pub fn elements(document: &Document, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

/// Whether the page runs on a touch-capable device
pub fn is_touch_device(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("ontouchstart")).unwrap_or(false)
}

/// Set one inline style property; failures are logged and otherwise ignored
pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        debug!("could not set {} on element: {:?}", property, err);
    }
}

/// Write an animated element's opacity and vertical offset
pub fn apply_state(element: &HtmlElement, state: ElementState) {
    set_style(element, "opacity", &format!("{:.4}", state.opacity));
    set_style(element, "transform", &format!("translateY({:.2}px)", state.offset_y));
}

pub fn toggle_class(element: &Element, class: &str, on: bool) {
    if let Err(err) = element.class_list().toggle_with_force(class, on) {
        debug!("could not toggle class {}: {:?}", class, err);
    }
}

/// Top edge of an element relative to the viewport
pub fn viewport_top(element: &Element) -> f32 {
    element.get_bounding_client_rect().top() as f32
}

/// Count-up targets from the `data-count` attribute of each element.
/// Unreadable values count up to zero.
pub fn counter_targets(elements: &[HtmlElement]) -> Vec<u32> {
    elements
        .iter()
        .enumerate()
        .map(|(i, el)| {
            let raw = el.get_attribute("data-count").unwrap_or_default();
            raw.trim().parse::<u32>().unwrap_or_else(|_| {
                warn!("stat #{} has unreadable data-count {:?}", i, raw);
                0
            })
        })
        .collect()
}
