use approx::assert_relative_eq;
use arcview_core::geometry::NormalSource;
use arcview_core::{Error, MeshLoader};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_pyramid_from_disk() {
    let file = write_temp(
        "# square based pyramid\n\
         v -1 0 -1\n\
         v 1 0 -1\n\
         v 1 0 1\n\
         v -1 0 1\n\
         v 0 2 0\n\
         vt 0.5 0.5\n\
         f 1 2 3 4\n\
         f 1 5 2\n\
         f 2 5 3\n\
         f 3 5 4\n\
         f 4 5 1\n",
    );

    let mesh = MeshLoader::default().load(Some(file.path())).unwrap();

    assert_eq!(mesh.vertices().len(), 5);
    assert_eq!(mesh.faces().len(), 5);
    assert_eq!(mesh.normal_source(), NormalSource::Derived);
    assert_eq!(mesh.draw_buffer().vertex_count(), 4 + 4 * 3);
    assert_relative_eq!(mesh.scale(), 1.0, epsilon = 1e-6);
    for normal in mesh.normals() {
        assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn malformed_file_reports_line() {
    let file = write_temp("v 0 0 0\nv 1 0 0\nv 0 1 x\nf 1 2 3\n");
    let err = MeshLoader::default().load(Some(file.path())).unwrap_err();

    match err {
        Error::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.obj");
    let err = MeshLoader::default().load(Some(&path)).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
