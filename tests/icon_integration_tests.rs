//! Integration tests for icon normalization
//!
//! These tests write real images to a temporary project directory and check
//! the resulting `icon.ico` with the `ico` crate.

use camino::Utf8PathBuf;
use pyibuilder::SessionManager;
use pyibuilder::services::{ICON_SIZES, IconAction, IconError, IconService};
use std::fs;
use tempfile::TempDir;

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn write_png(path: &Utf8PathBuf, width: u32, height: u32) {
    let image = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    image.save(path).unwrap();
}

fn entry_sizes(path: &Utf8PathBuf) -> Vec<u32> {
    let file = fs::File::open(path).unwrap();
    let icon_dir = ico::IconDir::read(file).unwrap();
    icon_dir.entries().iter().map(|e| e.width()).collect()
}

#[test]
fn test_png_converted_to_multi_size_icon() {
    let (_temp_dir, root) = temp_root();
    let source = root.join("logo.png");
    write_png(&source, 300, 200);

    let (icon, action) = IconService::new().normalize(&source, &root).unwrap();

    assert_eq!(action, IconAction::Converted);
    assert_eq!(icon, root.join("icon.ico"));
    assert_eq!(entry_sizes(&icon), ICON_SIZES.to_vec());
}

#[test]
fn test_format_detected_from_contents() {
    let (_temp_dir, root) = temp_root();
    let source = root.join("logo.png");
    write_png(&source, 48, 48);

    let misnamed = root.join("logo.jpg");
    fs::copy(&source, &misnamed).unwrap();
    let extensionless = root.join("logo");
    fs::copy(&source, &extensionless).unwrap();

    let service = IconService::new();
    for input in [&misnamed, &extensionless] {
        let (icon, action) = service.normalize(input, &root).unwrap();
        assert_eq!(action, IconAction::Converted);
        assert_eq!(entry_sizes(&icon), ICON_SIZES.to_vec());
    }
}

#[test]
fn test_canonical_icon_is_left_alone() {
    let (_temp_dir, root) = temp_root();
    let source = root.join("logo.png");
    write_png(&source, 64, 64);

    let service = IconService::new();
    let (icon, _) = service.normalize(&source, &root).unwrap();
    let first = fs::read(&icon).unwrap();

    let (again, action) = service.normalize(&icon, &root).unwrap();

    assert_eq!(action, IconAction::AlreadyCanonical);
    assert_eq!(again, icon);
    assert_eq!(fs::read(&icon).unwrap(), first);
}

#[test]
fn test_ico_source_is_copied() {
    let (_temp_dir, root) = temp_root();
    let elsewhere = root.join("art");
    fs::create_dir(&elsewhere).unwrap();
    let source = elsewhere.join("App.ICO");
    fs::write(&source, b"raw ico bytes").unwrap();
    fs::write(root.join("icon.ico"), b"old").unwrap();

    let (icon, action) = IconService::new().normalize(&source, &root).unwrap();

    assert_eq!(action, IconAction::Copied);
    assert_eq!(fs::read(&icon).unwrap(), b"raw ico bytes");
}

#[test]
fn test_taskbar_icon_copied_to_canonical() {
    let (_temp_dir, root) = temp_root();
    let taskbar = root.join("icon1.ico");
    fs::write(&taskbar, b"taskbar icon").unwrap();

    let (icon, action) = IconService::new().normalize(&taskbar, &root).unwrap();

    assert_eq!(action, IconAction::CopiedTaskbarIcon);
    assert_eq!(fs::read(&icon).unwrap(), b"taskbar icon");
    assert!(taskbar.exists());
}

#[test]
fn test_session_apply_icon_uses_script_directory() {
    let (_temp_dir, root) = temp_root();
    let project = root.join("project");
    fs::create_dir(&project).unwrap();
    let script = project.join("main.py");
    fs::write(&script, "").unwrap();
    let source = root.join("logo.bmp");
    let image = image::RgbImage::from_pixel(40, 40, image::Rgb([10, 20, 30]));
    image.save(&source).unwrap();

    let session = SessionManager::new();
    session.set_script(script);

    let icon = session.apply_icon(&source, &IconService::new()).unwrap();

    assert_eq!(icon, project.join("icon.ico"));
    assert_eq!(session.read(|s| s.options.icon.clone()), Some(icon));
}

#[test]
fn test_missing_source_keeps_session_icon() {
    let (_temp_dir, root) = temp_root();
    let existing = root.join("icon.ico");
    fs::write(&existing, b"ico").unwrap();

    let session = SessionManager::new();
    session.set_script(root.join("main.py"));
    session.set_icon_path(existing.clone());

    let result = session.apply_icon(&root.join("gone.png"), &IconService::new());

    assert!(matches!(result, Err(IconError::SourceNotFound(_))));
    assert_eq!(session.read(|s| s.options.icon.clone()), Some(existing));
}
