use image::{ColorType, ImageBuffer, Rgb, Rgba, RgbaImage};
use inkmark::export::{ItemOutcome, export_batch, export_image};
use inkmark::import::discover;
use inkmark::watermark::{
    Compositor, ExportRule, FontSources, NamingMode, OutputFormat, ResizeMode, WatermarkConfig,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to build a source directory with three images and one stray file
fn create_source_dir(temp_dir: &TempDir) -> PathBuf {
    let src = temp_dir.path().join("photos");
    std::fs::create_dir_all(src.join("day2")).unwrap();

    ImageBuffer::from_pixel(120, 80, Rgb([200u8, 50, 50]))
        .save(src.join("beach.jpg"))
        .unwrap();
    ImageBuffer::from_pixel(90, 90, Rgba([10u8, 200, 10, 180]))
        .save(src.join("forest.png"))
        .unwrap();
    ImageBuffer::from_pixel(64, 48, Rgb([30u8, 30, 220]))
        .save(src.join("day2").join("lake.bmp"))
        .unwrap();
    std::fs::write(src.join("notes.txt"), "not an image").unwrap();

    src
}

fn builtin_compositor() -> Compositor {
    Compositor::new(FontSources::builtin_only())
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[test]
fn test_import_and_export_with_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let src = create_source_dir(&temp_dir);

    // Listing the directory twice must not duplicate entries
    let sources = discover(&[src.clone(), src.join("beach.jpg"), src.clone()]);
    assert_eq!(file_names(&sources), vec!["beach.jpg", "lake.bmp", "forest.png"]);

    let config = WatermarkConfig {
        export: ExportRule {
            mode: NamingMode::Suffix,
            text: "_wm".to_string(),
            out_format: OutputFormat::Png,
            ..ExportRule::default()
        },
        ..WatermarkConfig::default()
    };

    let out = temp_dir.path().join("exported");
    let summary = export_batch(&builtin_compositor(), &sources, &out, &config, |_| {}).unwrap();
    assert_eq!(summary.attempted(), 3);
    assert_eq!(summary.exported().len(), 3);

    let mut written: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    written.sort();
    assert_eq!(written, vec!["beach_wm.png", "forest_wm.png", "lake_wm.png"]);

    // Native resolution is kept when no resize is configured
    let beach = image::open(out.join("beach_wm.png")).unwrap();
    assert_eq!((beach.width(), beach.height()), (120, 80));
}

#[test]
fn test_export_into_source_directory_is_refused_per_item() {
    let temp_dir = TempDir::new().unwrap();
    let src = create_source_dir(&temp_dir);
    let sources = discover(&[src.clone()]);

    let summary = export_batch(
        &builtin_compositor(),
        &sources,
        &src,
        &WatermarkConfig::default(),
        |_| {},
    )
    .unwrap();

    // beach.jpg and forest.png live in the target directory, lake.bmp does not
    assert_eq!(summary.attempted(), 3);
    assert_eq!(summary.refused(), 2);
    assert_eq!(summary.exported(), vec![src.join("lake.png").as_path()]);
    for (source, outcome) in &summary.items {
        if source.parent() == Some(src.as_path()) {
            assert!(matches!(outcome, ItemOutcome::Refused));
        }
    }

    // Originals untouched
    let beach = image::open(src.join("beach.jpg")).unwrap();
    assert_eq!((beach.width(), beach.height()), (120, 80));
}

#[test]
fn test_jpeg_export_of_transparent_image_is_opaque() {
    let temp_dir = TempDir::new().unwrap();
    // Left half untouched overlay area, right half a half-transparent white mark
    let image = RgbaImage::from_fn(40, 20, |x, _| {
        if x < 20 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([255, 255, 255, 128])
        }
    });

    let rule = ExportRule {
        out_format: OutputFormat::Jpeg,
        jpeg_quality: 95,
        ..ExportRule::default()
    };
    let path = export_image(image, Path::new("clear.png"), temp_dir.path(), &rule).unwrap();
    assert_eq!(path.file_name().unwrap(), "clear.jpg");

    let decoded = image::open(&path).unwrap();
    assert_eq!(decoded.color(), ColorType::Rgb8);
    // Alpha is dropped: empty pixels stay black, partial ones keep their color
    let rgb = decoded.to_rgb8();
    assert!(rgb.get_pixel(5, 10).0.iter().all(|c| *c < 8));
    assert!(rgb.get_pixel(35, 10).0.iter().all(|c| *c > 247));
}

#[test]
fn test_png_export_preserves_alpha_and_resizes() {
    let temp_dir = TempDir::new().unwrap();
    let src = create_source_dir(&temp_dir);

    let config = WatermarkConfig {
        use_text: false,
        export: ExportRule {
            mode: NamingMode::Prefix,
            text: "small_".to_string(),
            resize_mode: ResizeMode::ByPercent,
            resize_value: 50,
            ..ExportRule::default()
        },
        ..WatermarkConfig::default()
    };

    let forest = src.join("forest.png");
    let out = temp_dir.path().join("out");
    let summary = export_batch(
        &builtin_compositor(),
        std::slice::from_ref(&forest),
        &out,
        &config,
        |_| {},
    )
    .unwrap();
    assert_eq!(summary.exported(), vec![out.join("small_forest.png").as_path()]);

    let decoded = image::open(out.join("small_forest.png")).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (45, 45));
    assert!(decoded.pixels().all(|p| p[3] == 180));
}

#[test]
fn test_same_config_same_pixels() {
    let temp_dir = TempDir::new().unwrap();
    let src = create_source_dir(&temp_dir);
    let beach = src.join("beach.jpg");

    let config = WatermarkConfig::default();
    let first = builtin_compositor().apply(&beach, &config).unwrap();
    let second = builtin_compositor().apply(&beach, &config.clone()).unwrap();
    assert_eq!(first, second);
}
