/// Example: Load an OBJ file and print what the viewer would draw
///
/// Usage: cargo run --example load_obj -- path/to/file.obj

use arcview_core::{MeshLoader, RenderCommand, ViewerConfig, ViewerSession};
use std::env;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let path = env::args().nth(1).map(PathBuf::from);
    if path.is_none() {
        eprintln!("Usage: load_obj <obj-file>");
    }

    let mesh = MeshLoader::default().load(path.as_deref())?;
    let bounds = mesh.bounds();
    println!("Vertices: {}", mesh.vertices().len());
    println!("Faces:    {}", mesh.faces().len());
    println!("Normals:  {:?}", mesh.normal_source());
    println!("Bounds:   {:?} .. {:?}", bounds.min, bounds.max);
    println!("Scale:    {:.4}", mesh.scale());

    let mut session = ViewerSession::new(mesh, ViewerConfig::default());
    for command in &session.render() {
        match command {
            RenderCommand::Clear(color) => println!("clear {:?}", color),
            RenderCommand::SetProjection(_) => println!("set projection"),
            RenderCommand::UploadMesh { vertex_count, .. } => println!("upload {} vertices", vertex_count),
            RenderCommand::DrawMesh { color, .. } => println!("draw mesh {:?}", color),
            RenderCommand::DrawShadow { .. } => println!("draw shadow"),
            RenderCommand::DrawPoint { position, .. } => println!("draw point {}", position),
            RenderCommand::DrawLines { segments, .. } => println!("draw {} lines", segments.len()),
            RenderCommand::SwapBuffers => println!("swap"),
        }
    }

    Ok(())
}
