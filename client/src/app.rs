use std::cell::{Cell, RefCell};

use citymap_shared::{
    CityRecord, SizeOverrides, Viewport, ViewportController, ViewportUpdate, resolve,
};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::catalog;
use crate::config;
use crate::map_view::MapView;
use crate::surface::WindowSurface;

thread_local! {
    static CONTROLLER: RefCell<Option<ViewportController<WindowSurface>>> = const { RefCell::new(None) };
    static MOUNT_GENERATION: Cell<u64> = const { Cell::new(0) };
}

#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

fn current_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

fn set_document_title(city: &CityRecord) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    document.set_title(&format!("{} · City Map", city.name));
}

/// Build the controller for `city`, mirror its state into `viewport`, and start it.
/// Replaces (and stops) any controller from a previous mount.
fn install_controller(city: &CityRecord, overrides: SizeOverrides, viewport: RwSignal<Viewport>) {
    let controller = ViewportController::new(WindowSurface::new(), city, overrides);
    viewport.set(controller.viewport());
    controller.on_change(move |vp| viewport.set(*vp));
    controller.start();

    CONTROLLER.with(|slot| {
        let _old = slot.borrow_mut().replace(controller);
    });
}

/// Start a mount and return its generation. A catalog fetch only installs its
/// result while its generation is still current.
fn begin_mount() -> u64 {
    MOUNT_GENERATION.with(|generation| {
        let next = generation.get().wrapping_add(1);
        generation.set(next);
        next
    })
}

/// Invalidate the current mount so late fetch completions are dropped.
fn end_mount() {
    MOUNT_GENERATION.with(|generation| generation.set(generation.get().wrapping_add(1)));
}

fn is_current_mount(mount: u64) -> bool {
    MOUNT_GENERATION.with(|generation| generation.get() == mount)
}

fn teardown_controller() {
    CONTROLLER.with(|slot| {
        if let Some(controller) = slot.borrow_mut().take() {
            controller.stop();
        }
    });
}

/// Feed a renderer-side change (pan, zoom) back into the viewport controller.
pub(crate) fn update_viewport(update: &ViewportUpdate) {
    if update.is_empty() {
        return;
    }
    CONTROLLER.with(|slot| {
        if let Some(controller) = slot.borrow().as_ref() {
            controller.update(update);
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let city: RwSignal<Option<CityRecord>> = RwSignal::new(None);
    let load_state: RwSignal<LoadState> = RwSignal::new(LoadState::Loading);

    provide_context(viewport);

    // Resolve the city once per mount, then hand the viewport over to the controller.
    Effect::new(move || {
        let mount = begin_mount();
        spawn_local(async move {
            let fetched = catalog::fetch_catalog().await;
            if !is_current_mount(mount) {
                web_sys::console::info_1(&"Catalog arrived after unmount, ignoring".into());
                return;
            }
            match fetched {
                Ok(catalog) => {
                    let query = current_query();
                    let resolved = resolve(&catalog, &query).clone();
                    let overrides = config::size_overrides_from_query(&query);
                    web_sys::console::info_1(
                        &format!(
                            "city={} catalog_size={}",
                            resolved.internal_id,
                            catalog.len()
                        )
                        .into(),
                    );
                    install_controller(&resolved, overrides, viewport);
                    set_document_title(&resolved);
                    city.set(Some(resolved));
                    load_state.set(LoadState::Ready);
                }
                Err(e) => {
                    web_sys::console::warn_1(&format!("Catalog fetch failed: {e}").into());
                    load_state.set(LoadState::Failed(e));
                }
            }
        });
        on_cleanup(|| {
            end_mount();
            teardown_controller();
        });
    });

    let caption = move || {
        city.get()
            .map(|c| format!("{}, {}", c.name, c.country))
            .unwrap_or_default()
    };

    view! {
        <div style="width: 100vw; height: 100vh; position: relative; overflow: hidden; background: #0c0e17;">
            {move || match load_state.get() {
                LoadState::Loading => view! {
                    <p class="citymap-status">"Loading map..."</p>
                }
                .into_any(),
                LoadState::Failed(e) => view! {
                    <p class="citymap-status citymap-error">{format!("Could not load cities: {e}")}</p>
                }
                .into_any(),
                LoadState::Ready => view! {
                    <MapView viewport=viewport />
                    <div class="citymap-caption" style="position: absolute; left: 12px; bottom: 12px; color: #e6e6e6; font: 14px sans-serif; pointer-events: none;">
                        {caption}
                    </div>
                }
                .into_any(),
            }}
        </div>
    }
}
