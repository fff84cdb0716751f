//! Gallery viewer shell implemented with egui/eframe
//!
//! The viewer is the host of the protection layer: it feeds raw window
//! events into the event bus, polls the loader, uploads composited surfaces
//! as GPU textures (the pixel buffer itself never leaves the process), and
//! draws the protective overlays the orchestrator's state calls for. It is
//! also where the violation callback lands: an audit counter plus a
//! structured log line, nothing else.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use eframe::{egui, CreationContext, NativeOptions};
use tracing::{info, warn};

use crate::config::GalleryManifest;
use crate::constants::viewer::{
    REPAINT_INTERVAL_MS, SECTION_SPACING, WINDOW_HEIGHT, WINDOW_MIN_HEIGHT, WINDOW_MIN_WIDTH,
    WINDOW_WIDTH,
};
use crate::events::{Propagation, UiEvent, UiEventBus};
use crate::font::WatermarkFont;
use crate::loader::ImageLoader;
use crate::protection::{ProtectionController, ProtectionToggles};
use crate::surface::CompositedSurface;
use crate::types::{KeyCode, KeyPress, Platform, ViewState};

/// Map an egui key to the detector's key model.
///
/// The window library does not deliver a dedicated PrintScreen key on every
/// platform, and the Super/Win modifier is folded into the primary command
/// modifier. Detection of those combinations is best-effort by design.
fn translate_key(key: egui::Key) -> Option<KeyCode> {
    match key {
        egui::Key::S => Some(KeyCode::Character('s')),
        egui::Key::Num3 => Some(KeyCode::Character('3')),
        egui::Key::Num4 => Some(KeyCode::Character('4')),
        egui::Key::Num5 => Some(KeyCode::Character('5')),
        _ => None,
    }
}

pub struct ViewerApp {
    manifest: GalleryManifest,
    index: usize,
    bus: UiEventBus,
    controller: ProtectionController,
    loader: ImageLoader,
    font: WatermarkFont,
    surface: Option<CompositedSurface>,
    texture: Option<egui::TextureHandle>,
    obscured_texture: Option<egui::TextureHandle>,
    violations: Rc<Cell<u64>>,
    minimized: bool,
    show_context_menu: bool,
    detached: bool,
}

impl ViewerApp {
    pub fn new(
        _cc: &CreationContext<'_>,
        manifest: GalleryManifest,
        runtime: tokio::runtime::Handle,
    ) -> Result<Self> {
        info!(title = %manifest.title, "Initializing gallery viewer");

        let font = WatermarkFont::from_system_font()
            .context("Failed to load a font for watermark rendering")?;
        let mut loader =
            ImageLoader::new(runtime).context("Failed to initialize image loader")?;

        let mut bus = UiEventBus::new();
        let violations = Rc::new(Cell::new(0u64));
        let counter = violations.clone();
        let controller = ProtectionController::attach(
            &mut bus,
            Platform::detect(),
            ProtectionToggles::from(&manifest.settings),
            Box::new(move || {
                counter.set(counter.get() + 1);
                warn!(target: "audit", "Protection violation detected");
            }),
        );

        if let Some(entry) = manifest.images.first() {
            loader.begin(&entry.url);
        }

        Ok(Self {
            manifest,
            index: 0,
            bus,
            controller,
            loader,
            font,
            surface: None,
            texture: None,
            obscured_texture: None,
            violations,
            minimized: false,
            show_context_menu: false,
            detached: false,
        })
    }

    /// Translate raw window events into bus events, once per frame
    fn forward_events(&mut self, ctx: &egui::Context) {
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            match event {
                egui::Event::WindowFocused(focused) => {
                    self.bus.dispatch(&UiEvent::WindowFocus(focused));
                }
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => {
                    if let Some(code) = translate_key(key) {
                        let press = KeyPress::new(
                            code,
                            modifiers.shift,
                            modifiers.command || modifiers.mac_cmd,
                        );
                        self.bus.dispatch(&UiEvent::Key(press));
                    }
                }
                _ => {}
            }
        }

        let minimized = ctx.input(|i| i.viewport().minimized.unwrap_or(false));
        if minimized != self.minimized {
            self.minimized = minimized;
            self.bus.dispatch(&UiEvent::SurfaceVisibility(!minimized));
        }
    }

    /// Accept a finished load: composite the watermark, upload textures,
    /// and reset the protection state for the fresh image.
    fn ingest_loaded(&mut self, ctx: &egui::Context) {
        let Some(decoded) = self.loader.poll() else {
            return;
        };

        let settings = &self.manifest.settings;
        let surface = CompositedSurface::compose(
            decoded,
            &self.font,
            settings.effective_watermark_text(),
            settings.watermark_opacity,
            settings.watermark_position,
        );

        let dims = surface.dimensions();
        let size = [dims.width as usize, dims.height as usize];
        self.texture = Some(ctx.load_texture(
            "gallery-image",
            egui::ColorImage::from_rgba_unmultiplied(size, surface.pixels()),
            egui::TextureOptions::LINEAR,
        ));
        self.obscured_texture = Some(ctx.load_texture(
            "gallery-image-obscured",
            egui::ColorImage::from_rgba_unmultiplied(size, surface.obscured_pixels()),
            egui::TextureOptions::LINEAR,
        ));
        self.surface = Some(surface);
        self.controller.reset();
    }

    /// Move through the gallery with wraparound. The previous surface stays
    /// visible until the new load completes.
    fn advance(&mut self, delta: isize) {
        let count = self.manifest.images.len();
        if count == 0 {
            return;
        }
        self.index = (self.index as isize + delta).rem_euclid(count as isize) as usize;
        let entry = &self.manifest.images[self.index];
        info!(index = self.index, url = %entry.url, "Navigating gallery");
        self.loader.begin(&entry.url);
    }

    fn show_protected_image(&mut self, ui: &mut egui::Ui) {
        let state = self.controller.state();
        let texture = match state {
            ViewState::Obscured => self.obscured_texture.as_ref(),
            _ => self.texture.as_ref(),
        };

        let Some(texture) = texture else {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
            return;
        };

        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let dims = surface.dimensions();

        // Fit to the available area without upscaling past natural size
        let avail = ui.available_size();
        let scale = (avail.x / dims.width as f32)
            .min(avail.y / dims.height as f32)
            .min(1.0);
        let display = egui::vec2(dims.width as f32 * scale, dims.height as f32 * scale);

        let response = ui
            .with_layout(
                egui::Layout::centered_and_justified(egui::Direction::TopDown),
                |ui| {
                    ui.add(
                        egui::Image::new(texture)
                            .fit_to_exact_size(display)
                            .sense(egui::Sense::click_and_drag()),
                    )
                },
            )
            .inner;

        if response.secondary_clicked() {
            let verdict = self.bus.dispatch(&UiEvent::ContextMenu);
            self.show_context_menu = verdict == Propagation::Continue;
        }
        if response.drag_started() {
            // Suppression verdict is final here: the viewer offers no
            // drag-out affordance of its own
            let _ = self.bus.dispatch(&UiEvent::DragStart);
        }

        if self.show_context_menu {
            let url = self.manifest.images[self.index].url.clone();
            response.context_menu(|ui| {
                if ui.button("Copy image location").clicked() {
                    ui.ctx().copy_text(url.clone());
                    ui.close();
                }
            });
        }

        self.paint_state_overlay(ui, response.rect, state);
    }

    fn paint_state_overlay(&self, ui: &egui::Ui, rect: egui::Rect, state: ViewState) {
        let painter = ui.painter();
        match state {
            ViewState::Normal => {}
            ViewState::Obscured => {
                painter.rect_filled(
                    rect,
                    egui::CornerRadius::ZERO,
                    egui::Color32::from_rgba_unmultiplied(185, 28, 28, 120),
                );
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "\u{1F512} Protected image",
                    egui::FontId::proportional(22.0),
                    egui::Color32::WHITE,
                );
                painter.text(
                    rect.center() + egui::vec2(0.0, 28.0),
                    egui::Align2::CENTER_CENTER,
                    "Return to this window to view",
                    egui::FontId::proportional(14.0),
                    egui::Color32::WHITE,
                );
            }
            ViewState::ViolationFlash => {
                painter.rect_filled(
                    rect,
                    egui::CornerRadius::ZERO,
                    egui::Color32::from_rgba_unmultiplied(185, 28, 28, 180),
                );
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "\u{26D4} Screen capture blocked",
                    egui::FontId::proportional(24.0),
                    egui::Color32::WHITE,
                );
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.forward_events(ctx);
        self.ingest_loaded(ctx);
        self.controller.pump(Instant::now());

        let (prev_pressed, next_pressed) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
            )
        });
        if prev_pressed {
            self.advance(-1);
        }
        if next_pressed {
            self.advance(1);
        }

        egui::TopBottomPanel::top("gallery-header").show(ctx, |ui| {
            ui.add_space(SECTION_SPACING);
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.heading(&self.manifest.title);
                    if !self.manifest.description.is_empty() {
                        ui.label(&self.manifest.description);
                    }
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !self.manifest.images.is_empty() {
                        ui.label(format!(
                            "Image {} of {}",
                            self.index + 1,
                            self.manifest.images.len()
                        ));
                    }
                });
            });
            ui.add_space(SECTION_SPACING);
        });

        egui::TopBottomPanel::bottom("gallery-footer").show(ctx, |ui| {
            ui.add_space(SECTION_SPACING);
            ui.horizontal(|ui| {
                let multiple = self.manifest.images.len() > 1;
                if ui
                    .add_enabled(multiple, egui::Button::new("\u{2039} Previous"))
                    .clicked()
                {
                    self.advance(-1);
                }
                if ui
                    .add_enabled(multiple, egui::Button::new("Next \u{203A}"))
                    .clicked()
                {
                    self.advance(1);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Violations: {}", self.violations.get()));
                    if let Some(entry) = self.manifest.images.get(self.index) {
                        if !entry.alt.is_empty() {
                            ui.separator();
                            ui.label(&entry.alt);
                        }
                    }
                });
            });
            ui.add_space(SECTION_SPACING);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.manifest.images.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("This gallery contains no images.");
                });
            } else {
                self.show_protected_image(ui);
            }
        });

        // Keeps the flash dwell and pending loads moving without input
        ctx.request_repaint_after(Duration::from_millis(REPAINT_INTERVAL_MS));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.detached {
            self.controller.detach(&mut self.bus);
            self.detached = true;
        }
        info!("Viewer exiting");
    }
}

pub fn run(manifest: GalleryManifest, runtime: tokio::runtime::Handle) -> Result<()> {
    let title = format!("Shutterlock - {}", manifest.title);
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title(title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            ViewerApp::new(cc, manifest, runtime)
                .map(|app| Box::new(app) as Box<dyn eframe::App>)
                .map_err(Into::into)
        }),
    )
    .map_err(|err| anyhow!("Failed to launch viewer: {err}"))
}
