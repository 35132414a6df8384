use super::*;

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::controller::events::SelectionSource;

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("tryon_desktop_{tag}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn encodes_png_as_data_url() {
    let url = to_data_url(Path::new("model.png"), b"model").expect("data url");
    assert_eq!(url, "data:image/png;base64,bW9kZWw=");
}

#[test]
fn jpeg_extension_maps_to_jpeg_mime() {
    let url = to_data_url(Path::new("photo.JPG"), b"x").expect("data url");
    assert!(url.starts_with("data:image/jpeg;base64,"));
}

#[test]
fn rejects_non_images_and_empty_files() {
    assert!(to_data_url(Path::new("notes.txt"), b"hello").is_err());
    assert!(to_data_url(Path::new("blank.png"), b"").is_err());
}

#[tokio::test]
async fn urls_are_used_as_presets() {
    let selection = load_selection(" https://example.com/presets/shirt.png ")
        .await
        .expect("preset");
    assert_eq!(selection.source, SelectionSource::Preset);
    assert_eq!(selection.data, "https://example.com/presets/shirt.png");
}

#[tokio::test]
async fn local_files_become_uploads() {
    let dir = temp_dir("upload");
    let path = dir.join("cloth.png");
    fs::write(&path, b"cloth").expect("write");

    let selection = load_selection(path.to_string_lossy().as_ref())
        .await
        .expect("upload");
    assert_eq!(selection.source, SelectionSource::Upload);
    assert_eq!(selection.data, "data:image/png;base64,Y2xvdGg=");

    fs::remove_dir_all(dir).expect("cleanup");
}

#[tokio::test]
async fn missing_file_names_the_path() {
    let err = load_selection("/definitely/not/here.png")
        .await
        .expect_err("missing");
    assert!(err.to_string().contains("/definitely/not/here.png"));
}
