use std::cell::Cell;
use std::f64::consts::{LN_2, PI};
use std::rc::Rc;

use citymap_shared::{Viewport, ViewportUpdate};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{PointerEvent, WheelEvent};

use crate::config::MAP_STYLE;

const TILE_SIZE: f64 = 256.0;
const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 22.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
const ZOOM_SENSITIVITY: f64 = 0.001;

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.max(0.0).exp2()
}

fn lat_to_mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0
}

fn mercator_y_to_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Center change for a drag of `(dx, dy)` screen pixels. Dragging right moves the
/// center west; dragging down moves it north.
pub fn pan_update(vp: &Viewport, dx: f64, dy: f64) -> ViewportUpdate {
    let world = world_size(vp.zoom);
    let longitude = wrap_longitude(vp.longitude - dx * 360.0 / world);
    let y = (lat_to_mercator_y(vp.latitude) - dy / world).clamp(0.0, 1.0);
    let latitude = mercator_y_to_lat(y).clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    ViewportUpdate::center(latitude, longitude)
}

/// Zoom change for a wheel event with vertical delta `delta_y` (negative zooms in).
pub fn wheel_zoom_update(vp: &Viewport, delta_y: f64) -> ViewportUpdate {
    let zoom = (vp.zoom - delta_y * ZOOM_SENSITIVITY / LN_2).clamp(MIN_ZOOM, MAX_ZOOM);
    ViewportUpdate::zoom(zoom)
}

/// Container the third-party map renderer attaches to.
///
/// The current viewport is published as `data-*` attributes; pan and zoom
/// gestures are fed back through [`crate::app::update_viewport`].
#[component]
pub fn MapView(viewport: RwSignal<Viewport>) -> impl IntoView {
    let is_dragging = Rc::new(Cell::new(false));
    let last_x = Rc::new(Cell::new(0.0f64));
    let last_y = Rc::new(Cell::new(0.0f64));

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let update = wheel_zoom_update(&viewport.get_untracked(), e.delta_y());
        crate::app::update_viewport(&update);
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            is_dragging.set(true);
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_x = last_x.clone();
        let last_y = last_y.clone();
        move |e: PointerEvent| {
            if !is_dragging.get() {
                return;
            }
            let dx = e.client_x() as f64 - last_x.get();
            let dy = e.client_y() as f64 - last_y.get();
            last_x.set(e.client_x() as f64);
            last_y.set(e.client_y() as f64);
            if dx == 0.0 && dy == 0.0 {
                return;
            }
            let update = pan_update(&viewport.get_untracked(), dx, dy);
            crate::app::update_viewport(&update);
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_pointer_leave = move |_: PointerEvent| {
        is_dragging.set(false);
    };

    let container_style = move || {
        let vp = viewport.get();
        format!(
            "position: relative; width: {}px; height: {}px; overflow: hidden; touch-action: none; cursor: grab;",
            vp.width, vp.height
        )
    };

    view! {
        <div
            class="citymap-map"
            style=container_style
            data-map-style=MAP_STYLE
            data-latitude=move || viewport.get().latitude.to_string()
            data-longitude=move || viewport.get().longitude.to_string()
            data-zoom=move || viewport.get().zoom.to_string()
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
        />
    }
}
