use imagebatch::fs_utils::*;
use imagebatch::image_utils::SourceData;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn collect_images_includes_supported_extensions() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let supported = ["image1.png", "photo.jpg", "scan.JPEG", "pic.TiF"]; // mix of cases
    for name in supported {
        fs::write(root.join(name), []).unwrap();
    }
    let unsupported = ["doc.txt", "movie.mp4", "README"]; // should be ignored
    for name in unsupported {
        fs::write(root.join(name), []).unwrap();
    }

    let files = collect_images(root, false).unwrap();

    let mut expected: Vec<_> = supported.iter().map(|n| root.join(n)).collect();
    expected.sort();
    assert_eq!(files, expected);
}

#[test]
fn collect_images_recurses_only_when_asked() {
    let tmp = tempdir().unwrap();
    let nested = tmp.path().join("a/b");
    fs::create_dir_all(&nested).unwrap();
    fs::write(tmp.path().join("top.png"), []).unwrap();
    fs::write(nested.join("deep.png"), []).unwrap();

    assert_eq!(collect_images(tmp.path(), false).unwrap().len(), 1);
    assert_eq!(collect_images(tmp.path(), true).unwrap().len(), 2);
}

#[test]
fn collect_images_errors_for_missing_directory() {
    let missing = Path::new("/does/not/exist");
    let err = collect_images(missing, false).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn collect_sources_keeps_argument_order() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("dir");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("b.png"), []).unwrap();
    fs::write(dir.join("a.png"), []).unwrap();
    let single = tmp.path().join("z.jpg");
    fs::write(&single, []).unwrap();

    let sources = collect_sources(&[single.clone(), dir.clone()], false).unwrap();
    let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["z.jpg", "a.png", "b.png"]);
    assert!(matches!(&sources[0].data, SourceData::Path(p) if p == &single));
    assert_eq!(sources[0].mime.as_deref(), Some("image/jpeg"));
}

#[test]
fn collect_sources_rejects_missing_paths() {
    let tmp = tempdir().unwrap();
    let err = collect_sources(&[tmp.path().join("nope.png")], false).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn is_supported_image_checks_extension_case_insensitively() {
    assert!(is_supported_image(Path::new("a/b/photo.WebP")));
    assert!(!is_supported_image(Path::new("a/b/photo.svg")));
    assert!(!is_supported_image(Path::new("Makefile")));
}
