/// ASCII rasterizer that executes frame commands in the terminal
use arcview_core::geometry::DrawRecord;
use arcview_core::projection::project_to_screen;
use arcview_core::{DrawBuffer, RenderCommand, RenderCommands, Rgba};
use crossterm::{
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector3};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

const SHADOW_CHAR: char = '.';
const POINT_CHAR: char = 'O';
const LINE_CHAR: char = '*';

/// Light shining from the viewer, in eye space
const LIGHT_DIR: Vector3<f32> = Vector3::new(0.0, 0.0, 1.0);

/// Keeps faces turned away from the light faintly visible
const AMBIENT: f32 = 0.15;

/// ASCII renderer that turns render commands into terminal cells
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    background: Color,
    projection: Matrix4<f32>,
    uploaded: Option<usize>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            background: Color::Reset,
            projection: Matrix4::identity(),
            uploaded: None,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![Color::Reset; size];
    }

    /// Run one frame of commands. `mesh` is the buffer bound by `UploadMesh`;
    /// the frame is queued on `writer` at `SwapBuffers`.
    pub fn execute<W: Write>(
        &mut self,
        commands: &RenderCommands,
        mesh: Option<&DrawBuffer>,
        writer: &mut W,
    ) -> std::io::Result<()> {
        for command in commands {
            match command {
                RenderCommand::Clear(color) => self.clear(*color),
                RenderCommand::SetProjection(projection) => self.projection = *projection,
                RenderCommand::UploadMesh { vertex_count, .. } => {
                    log::debug!("Mesh bound with {} vertices", vertex_count);
                    self.uploaded = Some(*vertex_count);
                }
                RenderCommand::DrawMesh { model_view, color } => {
                    if let Some(buffer) = self.bound(mesh) {
                        self.render_mesh(buffer, model_view, *color);
                    }
                }
                RenderCommand::DrawShadow { model_view, color } => {
                    if let Some(buffer) = self.bound(mesh) {
                        self.render_shadow(buffer, model_view, *color);
                    }
                }
                RenderCommand::DrawPoint { position, size, color } => {
                    self.render_point(position, *size, *color);
                }
                RenderCommand::DrawLines { segments, color } => {
                    for (start, end) in segments {
                        self.render_line(start, end, *color);
                    }
                }
                RenderCommand::SwapBuffers => self.draw(writer)?,
            }
        }
        Ok(())
    }

    fn bound<'a>(&self, mesh: Option<&'a DrawBuffer>) -> Option<&'a DrawBuffer> {
        match (self.uploaded, mesh) {
            (Some(_), Some(buffer)) => Some(buffer),
            _ => {
                log::warn!("Draw issued without a bound mesh");
                None
            }
        }
    }

    pub fn clear(&mut self, background: Rgba) {
        self.background = to_color(background);
        for i in 0..self.depth_buffer.len() {
            self.depth_buffer[i] = f32::INFINITY;
            self.char_buffer[i] = ' ';
            self.color_buffer[i] = self.background;
        }
    }

    fn render_mesh(&mut self, buffer: &DrawBuffer, model_view: &Matrix4<f32>, color: Rgba) {
        let mvp = self.projection * model_view;
        let normal_matrix: Matrix3<f32> = model_view.fixed_view::<3, 3>(0, 0).into_owned();

        for triangle in buffer.triangles() {
            let Some(coords) = self.project_triangle(&mvp, &triangle) else {
                continue;
            };

            // Flat shading from the averaged corner normals
            let normal = triangle
                .iter()
                .fold(Vector3::zeros(), |acc, r| acc + normal_matrix * r.normal);
            let brightness = match normal.try_normalize(f32::EPSILON) {
                Some(n) => n.dot(&LIGHT_DIR).abs().max(AMBIENT),
                None => AMBIENT,
            };

            // Map brightness to character
            let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
            let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
            let character = LUMINOSITY_RAMP[char_index];

            self.rasterize_triangle(&coords, character, to_color(color.shade(brightness)));
        }
    }

    fn render_shadow(&mut self, buffer: &DrawBuffer, model_view: &Matrix4<f32>, color: Rgba) {
        let mvp = self.projection * model_view;
        let color = to_color(color);
        for triangle in buffer.triangles() {
            if let Some(coords) = self.project_triangle(&mvp, &triangle) {
                self.rasterize_triangle(&coords, SHADOW_CHAR, color);
            }
        }
    }

    fn project_triangle(&self, mvp: &Matrix4<f32>, triangle: &[DrawRecord; 3]) -> Option<[(f32, f32, f32); 3]> {
        let mut coords = [(0.0, 0.0, 0.0); 3];
        for (slot, record) in coords.iter_mut().zip(triangle) {
            // Any clipped corner drops the triangle
            *slot = project_to_screen(mvp, &record.position, self.width as u32, self.height as u32)?;
        }
        Some(coords)
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character, color);
                    }
                }
            }
        }
    }

    fn render_point(&mut self, position: &Point2<f32>, size: f32, color: Rgba) {
        let Some((cx, cy)) = self.screen_point(position) else {
            return;
        };
        let color = to_color(color);

        // size is in viewport units, a cell is one unit wide and two tall
        let rx = (size / 2.0).floor() as i32;
        let ry = (size / 4.0).floor() as i32;
        let (cx, cy) = (cx.floor() as i32, cy.floor() as i32);
        for y in cy - ry..=cy + ry {
            for x in cx - rx..=cx + rx {
                self.plot(x, y, -1.0, POINT_CHAR, color);
            }
        }
    }

    fn render_line(&mut self, start: &Point2<f32>, end: &Point2<f32>, color: Rgba) {
        let (Some(a), Some(b)) = (self.screen_point(start), self.screen_point(end)) else {
            return;
        };
        let color = to_color(color);

        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as i32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            self.plot(x.floor() as i32, y.floor() as i32, 0.0, LINE_CHAR, color);
        }
    }

    fn screen_point(&self, position: &Point2<f32>) -> Option<(f32, f32)> {
        let point = Point3::new(position.x, position.y, 0.0);
        project_to_screen(&self.projection, &point, self.width as u32, self.height as u32)
            .map(|(x, y, _)| (x, y))
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.queue(SetBackgroundColor(self.background))?;
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn to_color(color: Rgba) -> Color {
    let (r, g, b) = color.to_rgb8();
    Color::Rgb { r, g, b }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcview_core::projection::Frustum;

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 0.0)).is_none());
    }

    #[test]
    fn test_clear_then_point_at_center() {
        let mut renderer = AsciiRenderer::new(20, 10);
        let mut commands = RenderCommands::new();
        commands.push(RenderCommand::Clear(Rgba::WHITE));
        commands.push(RenderCommand::SetProjection(
            Frustum::orthographic(-10.0, 10.0, -10.0, 10.0, -1.0, 1.0).matrix(),
        ));
        commands.push(RenderCommand::DrawPoint {
            position: Point2::new(0.0, 0.0),
            size: 1.0,
            color: Rgba::BLUE,
        });

        let mut out = Vec::new();
        renderer.execute(&commands, None, &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(renderer.cell(10, 5), Some(POINT_CHAR));
        assert_eq!(renderer.cell(0, 0), Some(' '));
    }

    #[test]
    fn test_draw_mesh_without_upload_is_skipped() {
        let mut renderer = AsciiRenderer::new(8, 8);
        let mut commands = RenderCommands::new();
        commands.push(RenderCommand::DrawMesh {
            model_view: Matrix4::identity(),
            color: Rgba::RED,
        });
        renderer.execute(&commands, Some(&DrawBuffer::default()), &mut Vec::new()).unwrap();
        assert!((0..8).all(|y| (0..8).all(|x| renderer.cell(x, y) == Some(' '))));
    }

    #[test]
    fn test_swap_writes_frame() {
        let mut renderer = AsciiRenderer::new(4, 2);
        let mut commands = RenderCommands::new();
        commands.push(RenderCommand::Clear(Rgba::BLACK));
        commands.push(RenderCommand::SwapBuffers);
        let mut out = Vec::new();
        renderer.execute(&commands, None, &mut out).unwrap();
        assert!(!out.is_empty());
    }
}
