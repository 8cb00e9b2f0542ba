use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context as _};
use eframe::egui;
use visual_tagger::{
    Config, ExportKind, FileSink, Mode, Notice, ScreenPoint, Session, TaggerError,
    UnavailableShare,
};

// ── Helpers ────────────────────────────────────────────────────────────────

fn to_screen(p: egui::Pos2) -> ScreenPoint {
    ScreenPoint::new(p.x as f64, p.y as f64)
}

fn to_pos2(p: ScreenPoint) -> egui::Pos2 {
    egui::pos2(p.x as f32, p.y as f32)
}

fn to_color32(c: [f32; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(
        (c[0] * 255.0).round() as u8,
        (c[1] * 255.0).round() as u8,
        (c[2] * 255.0).round() as u8,
    )
}

// ── App ─────────────────────────────────────────────────────────────────────

struct TaggerApp {
    session: Session,
    texture: Option<egui::TextureHandle>,
    title: String,
    export_open: bool,
    notice: Option<Notice>,
}

impl TaggerApp {
    fn new(config: Config, initial: Option<PathBuf>) -> Self {
        let mut app = Self {
            session: Session::new(config),
            texture: None,
            title: String::new(),
            export_open: false,
            notice: None,
        };
        if let Some(path) = initial {
            app.open(&path);
        }
        app
    }

    fn open(&mut self, path: &Path) {
        match self.session.open_image(path) {
            Ok(()) => {
                self.texture = None;
                self.export_open = false;
            }
            Err(e) => {
                log::warn!("{e}");
                self.notice = Some(Notice::from_error(&e));
            }
        }
    }

    fn pick_image(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"])
            .pick_file();
        match picked {
            Some(path) => self.open(&path),
            None => log::debug!("file picker closed without a selection"),
        }
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let Some(rgba) = self.session.surface_mut().take_texture_upload() else {
            return;
        };
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.texture = Some(ctx.load_texture("image", color_image, egui::TextureOptions::LINEAR));
    }

    fn export(&mut self, kind: ExportKind) {
        self.export_open = false;
        let result = self
            .session
            .export(kind, &self.title, &mut FileSink, &mut UnavailableShare);
        self.notice = Some(match result {
            Ok(report) => Notice::from_report(&report),
            Err(e) => Notice::from_error(&e),
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open image…").clicked() {
                self.pick_image();
            }

            let label = match self.session.surface().mode() {
                Mode::Edit => "Edit mode ON",
                Mode::View => "Edit mode OFF",
            };
            if ui
                .selectable_label(self.session.surface().mode() == Mode::Edit, label)
                .clicked()
            {
                self.session.toggle_edit_mode();
            }

            if ui
                .add_enabled(self.session.has_image(), egui::Button::new("Save edit"))
                .clicked()
            {
                self.export_open = true;
            }

            ui.separator();
            ui.add(
                egui::TextEdit::singleline(&mut self.title)
                    .hint_text("Title (optional)")
                    .desired_width(180.0),
            );

            ui.separator();
            let catalog = self.session.surface().store().catalog().clone();
            let current = catalog
                .get(self.session.surface().current_class())
                .map(|c| c.name.as_str())
                .unwrap_or("");
            let mut selected = current;
            egui::ComboBox::from_id_salt("class")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for class in catalog.iter() {
                        ui.selectable_value(&mut selected, class.name.as_str(), &class.name);
                    }
                });
            if selected != current {
                match catalog.index_of(selected) {
                    Some(index) => {
                        if let Err(e) = self.session.surface_mut().set_current_class(index) {
                            log::warn!("{e}");
                        }
                    }
                    None => log::warn!("unknown class {selected}"),
                }
            }

            ui.separator();
            ui.label(format!(
                "Zoom: {:.0}%",
                self.session.surface().transform().scale() * 100.0
            ));
        });
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.session.surface_mut().set_viewport(
            to_screen(canvas_rect.min),
            canvas_rect.width() as f64,
            canvas_rect.height() as f64,
        );

        // Background
        painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

        // Image
        if let (Some(tex), Some((min, max))) = (&self.texture, self.session.surface().image_rect())
        {
            painter.image(
                tex.id(),
                egui::Rect::from_min_max(to_pos2(min), to_pos2(max)),
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        // Markers
        for sprite in self.session.surface().render() {
            painter.circle_filled(
                to_pos2(sprite.center),
                sprite.radius as f32,
                to_color32(sprite.color),
            );
        }

        // Pointer: place a marker or start a pan
        let (pressed, down, released, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
            )
        });
        if pressed && response.hovered() {
            if let Some(pos) = pos {
                match self.session.surface_mut().handle_pointer_down(to_screen(pos)) {
                    Ok(outcome) => log::trace!("pointer down: {outcome:?}"),
                    Err(TaggerError::NoImageLoaded) => log::debug!("tap ignored, no image"),
                    Err(e) => log::warn!("{e}"),
                }
            }
        }
        if self.session.surface().is_panning() {
            if down {
                if let Some(pos) = pos {
                    self.session.surface_mut().handle_pointer_move(to_screen(pos));
                }
            }
            if released || !down {
                self.session.surface_mut().handle_pointer_up();
            }
        }

        // Zoom: scroll wheel and pinch, about the pointer
        if response.hovered() {
            let (scroll, pinch) = ctx.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
            let anchor = response
                .hover_pos()
                .unwrap_or_else(|| canvas_rect.center());
            if scroll != 0.0 {
                let factor = 1.0 + scroll as f64 * 0.002;
                self.session.surface_mut().zoom_at(to_screen(anchor), factor);
            }
            if pinch != 1.0 {
                self.session.surface_mut().zoom_at(to_screen(anchor), pinch as f64);
            }
        }

        if self.session.surface().take_redraw() {
            ctx.request_repaint();
        }
    }

    fn windows(&mut self, ctx: &egui::Context) {
        if self.export_open {
            let mut chosen = None;
            let mut open = true;
            egui::Window::new("Export")
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label("Choose what to export:");
                    for kind in ExportKind::ALL {
                        if ui.button(kind.label()).clicked() {
                            chosen = Some(kind);
                        }
                    }
                });
            if !open {
                self.export_open = false;
            }
            if let Some(kind) = chosen {
                self.export(kind);
            }
        }

        let mut dismissed = false;
        if let Some(notice) = &self.notice {
            egui::Window::new(notice.title.as_str())
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(notice.message.as_str());
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
        }
        if dismissed {
            self.notice = None;
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for TaggerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::TopBottomPanel::bottom("results").show(ctx, |ui| {
            egui::CollapsingHeader::new("Results")
                .default_open(false)
                .show(ui, |ui| {
                    ui.label(self.session.results_text());
                });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| self.canvas(ui, ctx));

        self.windows(ctx);
    }
}

// ── Main ────────────────────────────────────────────────────────────────────

struct Args {
    config: Option<PathBuf>,
    image: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        image: None,
    };
    let mut it = std::env::args_os().skip(1);
    while let Some(arg) = it.next() {
        if arg == "--config" {
            let path = it.next().context("--config needs a path")?;
            args.config = Some(PathBuf::from(path));
        } else if arg == "-h" || arg == "--help" {
            println!("Usage: visual-tagger [--config <file.json>] [image]");
            std::process::exit(0);
        } else if args.image.is_none() {
            args.image = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument {}", arg.to_string_lossy());
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args()?;
    let config = Config::resolve(args.config.as_deref()).context("loading configuration")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Visual Tagger"),
        ..Default::default()
    };

    eframe::run_native(
        "Visual Tagger",
        options,
        Box::new(move |_cc| Ok(Box::new(TaggerApp::new(config, args.image)))),
    )
    .map_err(|e| anyhow!("cannot run the window: {e}"))
}
