use std::path::Path;

use image::{Rgba, RgbaImage};
use visual_tagger::{
    Config, ErrorKind, ExportKind, FileSink, Mode, Notice, PointerOutcome, ScreenPoint, Session,
    UnavailableShare,
};

fn write_photo(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(w, h, Rgba([250, 250, 250, 255]))
        .save(&path)
        .unwrap();
    path
}

fn tap(session: &mut Session, x: f64, y: f64) -> PointerOutcome {
    let outcome = session
        .surface_mut()
        .handle_pointer_down(ScreenPoint::new(x, y))
        .unwrap();
    session.surface_mut().handle_pointer_up();
    outcome
}

#[test]
fn tap_count_and_export_both() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "hoja.png", 120, 80);

    let mut session = Session::new(Config::default());
    session.open_image(&photo).unwrap();
    assert_eq!(session.toggle_edit_mode(), Mode::Edit);

    let taps = [
        (0, 20.0, 20.0),
        (0, 60.0, 40.0),
        (1, 100.0, 60.0),
        (2, 30.0, 70.0),
        (0, 90.0, 10.0),
    ];
    for (class, x, y) in taps {
        session.surface_mut().set_current_class(class).unwrap();
        assert!(matches!(tap(&mut session, x, y), PointerOutcome::MarkerAdded(_)));
    }
    // outside the image: ignored
    assert_eq!(tap(&mut session, 500.0, 10.0), PointerOutcome::GestureStarted);

    let report = session
        .export(ExportKind::Both, "  ", &mut FileSink, &mut UnavailableShare)
        .unwrap();
    assert_eq!(report.circles, 5);
    assert!(!report.title_drawn);
    assert!(!report.title_skipped);

    let png = dir.path().join("hoja_edit.png");
    let txt = dir.path().join("hoja_edit.txt");
    assert_eq!(report.image.as_deref(), Some(png.as_path()));
    assert_eq!(report.results.as_deref(), Some(txt.as_path()));

    let exported = image::open(&png).unwrap().to_rgba8();
    assert_eq!(exported.dimensions(), (120, 80));
    assert_eq!(
        std::fs::read_to_string(&txt).unwrap(),
        "Resultados:\nVerde: 3 (60.00%)\nRojo: 1 (20.00%)\nAzul: 1 (20.00%)\nTotal: 5"
    );

    // the source file is untouched
    let source = image::open(&photo).unwrap().to_rgba8();
    assert!(source.pixels().all(|p| p.0 == [250, 250, 250, 255]));
}

#[test]
fn loading_a_new_image_clears_markers() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_photo(dir.path(), "a.png", 50, 50);
    let second = write_photo(dir.path(), "b.png", 30, 30);

    let mut session = Session::new(Config::default());
    session.open_image(&first).unwrap();
    session.toggle_edit_mode();
    for i in 0..7 {
        tap(&mut session, i as f64 * 5.0, 10.0);
    }
    assert_eq!(session.surface().store().len(), 7);

    session.open_image(&second).unwrap();
    assert_eq!(session.surface().store().len(), 0);
    assert_eq!(session.surface().mode(), Mode::View);
    assert_eq!(session.results_text(), "Resultados:\n0 marcadores");
}

#[test]
fn unreadable_file_reports_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("not-an-image.jpg");
    std::fs::write(&bogus, b"definitely not a jpeg").unwrap();

    let mut session = Session::new(Config::default());
    let err = session.open_image(&bogus).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ImageLoadFailed);
    assert!(!session.has_image());
    assert_eq!(Notice::from_error(&err).title, "Error");
}

#[test]
fn write_failure_is_export_io() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(Config::default());
    // export paths point into a directory that does not exist
    session.load_pixels(
        dir.path().join("missing").join("c.png"),
        RgbaImage::new(10, 10),
    );

    let err = session
        .export(ExportKind::ResultsOnly, "", &mut FileSink, &mut UnavailableShare)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExportIoFailure);
}

#[test]
fn share_failure_is_non_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "s.png", 20, 20);
    let mut session = Session::new(Config::default());
    session.open_image(&photo).unwrap();

    let err = session
        .export(ExportKind::Share, "", &mut FileSink, &mut UnavailableShare)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShareUnavailable);
    assert!(dir.path().join("s_edit.png").exists());

    // the session keeps working afterwards
    session.toggle_edit_mode();
    assert!(matches!(tap(&mut session, 5.0, 5.0), PointerOutcome::MarkerAdded(0)));
}

#[test]
fn title_uses_configured_font() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("title.ttf");
    std::fs::write(&font, epaint_default_fonts::UBUNTU_LIGHT).unwrap();
    let photo = dir.path().join("dark.png");
    RgbaImage::from_pixel(300, 120, Rgba([0, 0, 0, 255]))
        .save(&photo)
        .unwrap();

    let config = Config {
        font_path: Some(font),
        ..Config::default()
    };
    let mut session = Session::new(config);
    session.open_image(&photo).unwrap();

    let report = session
        .export(ExportKind::ImageOnly, " Hola ", &mut FileSink, &mut UnavailableShare)
        .unwrap();
    assert!(report.title_drawn);
    assert!(!report.title_skipped);
    assert!(!Notice::from_report(&report).message.contains("title"));

    let exported = image::open(dir.path().join("dark_edit.png"))
        .unwrap()
        .to_rgba8();
    let accent: Vec<(u32, u32)> = exported
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] > 200 && p.0[1] > 200 && p.0[2] < 60)
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(accent.len() > 40, "only {} accent pixels", accent.len());
    let (min_x, min_y) = accent
        .iter()
        .fold((u32::MAX, u32::MAX), |(mx, my), &(x, y)| (mx.min(x), my.min(y)));
    assert!((20..60).contains(&min_x), "{min_x}");
    assert!((20..60).contains(&min_y), "{min_y}");
}

#[test]
fn unreadable_font_path_still_gets_a_title() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_font = dir.path().join("broken.ttf");
    std::fs::write(&not_a_font, b"not a font").unwrap();
    let photo = write_photo(dir.path(), "f.png", 200, 100);

    let config = Config {
        font_path: Some(not_a_font),
        ..Config::default()
    };
    let mut session = Session::new(config);
    session.open_image(&photo).unwrap();

    let report = session
        .export(ExportKind::ImageOnly, "Hola", &mut FileSink, &mut UnavailableShare)
        .unwrap();
    assert!(report.title_drawn);
    assert!(dir.path().join("f_edit.png").exists());
}

#[test]
fn results_write_failure_mentions_saved_image() {
    let dir = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path(), "p.png", 20, 20);
    // a directory squatting on the results path makes the text write fail
    std::fs::create_dir(dir.path().join("p_edit.txt")).unwrap();

    let mut session = Session::new(Config::default());
    session.open_image(&photo).unwrap();
    let err = session
        .export(ExportKind::Both, "", &mut FileSink, &mut UnavailableShare)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExportIoFailure);
    assert!(dir.path().join("p_edit.png").exists());
    let notice = Notice::from_error(&err);
    assert!(notice.message.contains("Already saved:"));
    assert!(notice.message.contains("p_edit.png"));
}
