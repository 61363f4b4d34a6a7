//! DXF input and output.
//!
//! Reading maps drawing entities onto [`LoopSource`]s. Writing puts the
//! fill lines (and optionally the region boundaries) back into a fresh
//! drawing that an old controller can read. The fill is always written as
//! plain LINE entities; native HATCH entities are never produced.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use dxf::entities::{Entity, EntityType, LwPolyline};
use dxf::enums::AcadVersion;
use dxf::{Drawing, DxfError, LwPolylineVertex, Vector};
use thiserror::Error;

use crate::flatten::{LoopSource, PolylineVertex};
use crate::geometry::{Line, Loop, Point};
use crate::pipeline::{DrawingItem, FillResult};
use crate::spline::Spline;

/// Errors raised while reading or writing drawings.
#[derive(Error, Debug)]
pub enum DrawingError {
    #[error("DXF error: {0}")]
    Dxf(#[from] DxfError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("drawing has no usable loop entities ({skipped} skipped)")]
    NoLoopSources { skipped: usize },
}

// ============================================================================
// READING
// ============================================================================

/// An entity that was not turned into a loop source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntity {
    /// Position among the drawing's entities
    pub index: usize,
    pub kind: String,
    pub reason: &'static str,
}

/// Loop sources read from a drawing, in drawing order.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub sources: Vec<LoopSource>,
    /// Drawing entity index of each source
    pub entity_indices: Vec<usize>,
    pub skipped: Vec<SkippedEntity>,
}

impl SourceSet {
    /// Drawing entity index for a source index.
    pub fn entity_index(&self, source: usize) -> Option<usize> {
        self.entity_indices.get(source).copied()
    }
}

/// Orientation of an entity's plane relative to world XY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plane {
    World,
    /// Extrusion (0, 0, -1): x is mirrored
    Mirrored,
}

impl Plane {
    fn of(extrusion: &Vector) -> Option<Plane> {
        const EPS: f64 = 1e-9;
        if extrusion.x.abs() > EPS || extrusion.y.abs() > EPS {
            return None;
        }
        if (extrusion.z - 1.0).abs() <= EPS {
            Some(Plane::World)
        } else if (extrusion.z + 1.0).abs() <= EPS {
            Some(Plane::Mirrored)
        } else {
            None
        }
    }

    /// Object coordinates to world XY.
    fn to_world(self, x: f64, y: f64) -> Point {
        match self {
            Plane::World => Point::new(x, y),
            Plane::Mirrored => Point::new(-x, y),
        }
    }
}

fn world(p: &dxf::Point) -> Point {
    Point::new(p.x, p.y)
}

/// Extract loop sources from every model space entity of `drawing`.
///
/// Unsupported kinds (TEXT, INSERT, ...), paper space entities and
/// entities outside the XY plane are skipped and listed in the result.
/// Fails with `NoLoopSources` if nothing usable is left.
pub fn loop_sources_from_drawing(drawing: &Drawing) -> Result<SourceSet, DrawingError> {
    let mut set = SourceSet::default();

    for (index, entity) in drawing.entities().enumerate() {
        let skip = |reason| SkippedEntity { index, kind: entity_kind(&entity.specific).to_string(), reason };

        if entity.common.is_in_paper_space {
            set.skipped.push(skip("paper space"));
            continue;
        }
        match entity_to_source(&entity.specific) {
            Ok(source) => {
                set.sources.push(source);
                set.entity_indices.push(index);
            }
            Err(reason) => set.skipped.push(skip(reason)),
        }
    }

    for skipped in &set.skipped {
        log::warn!("skipping {} entity #{}: {}", skipped.kind, skipped.index, skipped.reason);
    }
    log::debug!("read {} loop source(s), skipped {}", set.sources.len(), set.skipped.len());

    if set.sources.is_empty() {
        return Err(DrawingError::NoLoopSources { skipped: set.skipped.len() });
    }
    Ok(set)
}

/// Parse a DXF stream and extract its loop sources.
pub fn read_loop_sources<R: Read + ?Sized>(reader: &mut R) -> Result<SourceSet, DrawingError> {
    let drawing = Drawing::load(reader)?;
    loop_sources_from_drawing(&drawing)
}

/// Open a DXF file and extract its loop sources.
pub fn load_loop_sources(path: impl AsRef<Path>) -> Result<SourceSet, DrawingError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_loop_sources(&mut reader)
}

fn entity_to_source(specific: &EntityType) -> Result<LoopSource, &'static str> {
    const OFF_PLANE: &str = "not in the XY plane";
    const UNSUPPORTED: &str = "unsupported entity kind";

    let source = match specific {
        EntityType::Line(line) => {
            if line.p1.z != line.p2.z {
                return Err(OFF_PLANE);
            }
            LoopSource::line(world(&line.p1), world(&line.p2))
        }
        EntityType::Circle(circle) => {
            let plane = Plane::of(&circle.normal).ok_or(OFF_PLANE)?;
            LoopSource::Circle {
                center: plane.to_world(circle.center.x, circle.center.y),
                radius: circle.radius,
            }
        }
        EntityType::Arc(arc) => {
            let plane = Plane::of(&arc.normal).ok_or(OFF_PLANE)?;
            let center = plane.to_world(arc.center.x, arc.center.y);
            // Mirroring turns a counter-clockwise sweep into a clockwise one.
            let (start_angle, end_angle) = match plane {
                Plane::World => (arc.start_angle, arc.end_angle),
                Plane::Mirrored => (180.0 - arc.end_angle, 180.0 - arc.start_angle),
            };
            LoopSource::Arc { center, radius: arc.radius, start_angle, end_angle }
        }
        EntityType::Ellipse(ellipse) => {
            // Center and major axis are already in world coordinates.
            let plane = Plane::of(&ellipse.normal).ok_or(OFF_PLANE)?;
            let (start_param, end_param) = match plane {
                Plane::World => (ellipse.start_parameter, ellipse.end_parameter),
                Plane::Mirrored => (-ellipse.end_parameter, -ellipse.start_parameter),
            };
            LoopSource::Ellipse {
                center: world(&ellipse.center),
                major_axis: Point::new(ellipse.major_axis.x, ellipse.major_axis.y),
                ratio: ellipse.minor_axis_ratio,
                start_param,
                end_param,
            }
        }
        EntityType::LwPolyline(poly) => {
            let plane = Plane::of(&poly.extrusion_direction).ok_or(OFF_PLANE)?;
            LoopSource::Polyline {
                vertices: poly
                    .vertices
                    .iter()
                    .map(|v| polyline_vertex(plane, v.x, v.y, v.bulge))
                    .collect(),
                closed: poly.is_closed(),
            }
        }
        EntityType::Polyline(poly) => {
            if poly.is_polyface_mesh() || poly.is_3d_polygon_mesh() {
                return Err(UNSUPPORTED);
            }
            // 3D polylines carry world coordinates; accept them only when flat.
            let plane = if poly.is_3d_polyline() {
                let mut zs = poly.vertices().map(|v| v.location.z);
                let first = zs.next().unwrap_or(0.0);
                if zs.any(|z| z != first) {
                    return Err(OFF_PLANE);
                }
                Plane::World
            } else {
                Plane::of(&poly.normal).ok_or(OFF_PLANE)?
            };
            LoopSource::Polyline {
                vertices: poly
                    .vertices()
                    .map(|v| polyline_vertex(plane, v.location.x, v.location.y, v.bulge))
                    .collect(),
                closed: poly.is_closed(),
            }
        }
        EntityType::Spline(spline) => {
            // A zero normal marks a non-planar spline; the z check below decides.
            let n = &spline.normal;
            if (n.x != 0.0 || n.y != 0.0 || n.z != 0.0) && Plane::of(n).is_none() {
                return Err(OFF_PLANE);
            }
            let mut zs = spline.control_points.iter().chain(&spline.fit_points).map(|p| p.z);
            let first = zs.next().unwrap_or(0.0);
            if zs.any(|z| z != first) {
                return Err(OFF_PLANE);
            }
            let degree = usize::try_from(spline.degree_of_curve).map_err(|_| "negative spline degree")?;
            LoopSource::Spline(Spline {
                degree,
                control_points: spline.control_points.iter().map(world).collect(),
                knots: spline.knot_values.clone(),
                weights: spline.weight_values.clone(),
                fit_points: spline.fit_points.iter().map(world).collect(),
                closed: spline.is_closed(),
            })
        }
        _ => return Err(UNSUPPORTED),
    };
    Ok(source)
}

fn polyline_vertex(plane: Plane, x: f64, y: f64, bulge: f64) -> PolylineVertex {
    let bulge = match plane {
        Plane::World => bulge,
        Plane::Mirrored => -bulge,
    };
    PolylineVertex::new(plane.to_world(x, y), bulge)
}

/// Entity type name, e.g. "Circle" or "Text".
fn entity_kind(specific: &EntityType) -> &'static str {
    match specific {
        EntityType::Line(_) => "Line",
        EntityType::Circle(_) => "Circle",
        EntityType::Arc(_) => "Arc",
        EntityType::Ellipse(_) => "Ellipse",
        EntityType::LwPolyline(_) => "LwPolyline",
        EntityType::Polyline(_) => "Polyline",
        EntityType::Spline(_) => "Spline",
        EntityType::Text(_) => "Text",
        EntityType::MText(_) => "MText",
        EntityType::Insert(_) => "Insert",
        EntityType::ModelPoint(_) => "Point",
        EntityType::Solid(_) => "Solid",
        EntityType::Face3D(_) => "Face3D",
        EntityType::RotatedDimension(_)
        | EntityType::RadialDimension(_)
        | EntityType::DiameterDimension(_)
        | EntityType::AngularThreePointDimension(_)
        | EntityType::OrdinateDimension(_) => "Dimension",
        _ => "Other",
    }
}

// ============================================================================
// WRITING
// ============================================================================

/// DXF version of the output drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetVersion {
    /// AC1009, what most older laser controllers expect
    #[default]
    R12,
    R2000,
    R2010,
}

/// Entity kinds a target version can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputCapabilities {
    /// LWPOLYLINE is available; otherwise boundaries are exploded into LINEs
    pub polylines: bool,
}

impl TargetVersion {
    pub fn acad_version(&self) -> AcadVersion {
        match self {
            TargetVersion::R12 => AcadVersion::R12,
            TargetVersion::R2000 => AcadVersion::R2000,
            TargetVersion::R2010 => AcadVersion::R2010,
        }
    }

    pub fn capabilities(&self) -> OutputCapabilities {
        OutputCapabilities { polylines: !matches!(self, TargetVersion::R12) }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TargetVersion::R12 => "r12",
            TargetVersion::R2000 => "r2000",
            TargetVersion::R2010 => "r2010",
        }
    }

    pub fn from_name(name: &str) -> Option<TargetVersion> {
        match name.to_lowercase().as_str() {
            "r12" | "ac1009" => Some(TargetVersion::R12),
            "r2000" | "ac1015" => Some(TargetVersion::R2000),
            "r2010" | "ac1024" => Some(TargetVersion::R2010),
            _ => None,
        }
    }
}

/// How to lay out the output drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingOptions {
    pub version: TargetVersion,
    /// Re-draw region boundaries next to the fill
    pub include_boundaries: bool,
    pub boundary_layer: String,
    pub fill_layer: String,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            version: TargetVersion::R12,
            include_boundaries: true,
            boundary_layer: "BOUNDARY".to_string(),
            fill_layer: "HATCH".to_string(),
        }
    }
}

/// Build an output drawing from a fill result.
pub fn build_drawing(result: &FillResult, options: &DrawingOptions) -> Drawing {
    let mut drawing = Drawing::new();
    drawing.header.version = options.version.acad_version();
    let capabilities = options.version.capabilities();

    for item in result.items() {
        match item {
            DrawingItem::Boundary(boundary) if options.include_boundaries => {
                add_boundary(&mut drawing, boundary, capabilities, &options.boundary_layer);
            }
            DrawingItem::Boundary(_) => {}
            DrawingItem::Fill(line) => add_line(&mut drawing, &line, &options.fill_layer),
        }
    }

    drawing
}

/// Write the output drawing as DXF text.
pub fn write_drawing<W: Write + ?Sized>(
    result: &FillResult,
    options: &DrawingOptions,
    writer: &mut W,
) -> Result<(), DrawingError> {
    build_drawing(result, options).save(writer)?;
    Ok(())
}

/// Write the output drawing to a file.
pub fn save_drawing(result: &FillResult, options: &DrawingOptions, path: impl AsRef<Path>) -> Result<(), DrawingError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_drawing(result, options, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn add_line(drawing: &mut Drawing, line: &Line, layer: &str) {
    let entity_line = dxf::entities::Line::new(
        dxf::Point::new(line.x1, line.y1, 0.0),
        dxf::Point::new(line.x2, line.y2, 0.0),
    );
    let mut entity = Entity::new(EntityType::Line(entity_line));
    entity.common.layer = layer.to_string();
    drawing.add_entity(entity);
}

fn add_boundary(drawing: &mut Drawing, boundary: &Loop, capabilities: OutputCapabilities, layer: &str) {
    if !capabilities.polylines {
        for (a, b) in boundary.edges() {
            add_line(drawing, &Line::from_points(a, b), layer);
        }
        return;
    }

    let mut polyline = LwPolyline::default();
    polyline.vertices = boundary
        .vertices()
        .iter()
        .map(|p| LwPolylineVertex { x: p.x, y: p.y, ..Default::default() })
        .collect();
    polyline.set_is_closed(true);

    let mut entity = Entity::new(EntityType::LwPolyline(polyline));
    entity.common.layer = layer.to_string();
    drawing.add_entity(entity);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::pipeline::run;
    use dxf::entities::{Arc, Circle, Polyline, Spline as DxfSpline, Text, Vertex};

    fn circle_entity(x: f64, y: f64, r: f64) -> Entity {
        let mut circle = Circle::default();
        circle.center = dxf::Point::new(x, y, 0.0);
        circle.radius = r;
        Entity::new(EntityType::Circle(circle))
    }

    fn annulus_drawing() -> Drawing {
        let mut drawing = Drawing::new();
        drawing.add_entity(circle_entity(0.0, 0.0, 10.0));
        drawing.add_entity(circle_entity(0.0, 0.0, 5.0));
        drawing
    }

    fn save_to_string(drawing: &Drawing) -> String {
        let mut buf: Vec<u8> = Vec::new();
        drawing.save(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn reads_circles_in_order() {
        let set = loop_sources_from_drawing(&annulus_drawing()).unwrap();
        assert_eq!(set.sources.len(), 2);
        assert!(set.skipped.is_empty());
        assert_eq!(set.sources[1], LoopSource::Circle { center: Point::new(0.0, 0.0), radius: 5.0 });
    }

    #[test]
    fn reads_lwpolyline_with_bulges() {
        let mut poly = LwPolyline::default();
        poly.vertices = vec![
            LwPolylineVertex { x: 0.0, y: 0.0, ..Default::default() },
            LwPolylineVertex { x: 10.0, y: 0.0, bulge: 0.5, ..Default::default() },
            LwPolylineVertex { x: 10.0, y: 10.0, ..Default::default() },
        ];
        poly.set_is_closed(true);
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityType::LwPolyline(poly)));

        let set = loop_sources_from_drawing(&drawing).unwrap();
        match &set.sources[0] {
            LoopSource::Polyline { vertices, closed } => {
                assert!(*closed);
                assert_eq!(vertices.len(), 3);
                assert_eq!(vertices[1].bulge, 0.5);
            }
            other => panic!("expected a polyline, got {:?}", other),
        }
    }

    #[test]
    fn mirrored_extrusion_flips_x() {
        let mut arc = Arc::default();
        arc.center = dxf::Point::new(5.0, 1.0, 0.0);
        arc.radius = 2.0;
        arc.start_angle = 0.0;
        arc.end_angle = 90.0;
        arc.normal = Vector::new(0.0, 0.0, -1.0);
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityType::Arc(arc)));

        let set = loop_sources_from_drawing(&drawing).unwrap();
        assert_eq!(
            set.sources[0],
            LoopSource::Arc { center: Point::new(-5.0, 1.0), radius: 2.0, start_angle: 90.0, end_angle: 180.0 }
        );
    }

    #[test]
    fn tilted_and_unsupported_entities_are_skipped() {
        let mut drawing = annulus_drawing();
        let mut tilted = Circle::default();
        tilted.radius = 3.0;
        tilted.normal = Vector::new(1.0, 0.0, 0.0);
        drawing.add_entity(Entity::new(EntityType::Circle(tilted)));
        drawing.add_entity(Entity::new(EntityType::Text(Text::default())));

        let set = loop_sources_from_drawing(&drawing).unwrap();
        assert_eq!(set.sources.len(), 2);
        assert_eq!(set.skipped.len(), 2);
        assert_eq!(set.skipped[0].reason, "not in the XY plane");
        assert_eq!(set.skipped[1].kind, "Text");
        assert_eq!(set.entity_indices, vec![0, 1]);
    }

    fn square_polyline(drawing: &mut Drawing, zs: [f64; 4]) -> Polyline {
        let mut poly = Polyline::default();
        let corners = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        for ((x, y), z) in corners.into_iter().zip(zs) {
            poly.add_vertex(drawing, Vertex::new(dxf::Point::new(x, y, z)));
        }
        poly.set_is_closed(true);
        poly
    }

    fn read_one(drawing: &mut Drawing, specific: EntityType) -> std::result::Result<LoopSource, &'static str> {
        drawing.add_entity(Entity::new(specific));
        let set = loop_sources_from_drawing(drawing).unwrap();
        let index = set.sources.len() + set.skipped.len() - 1;
        match set.skipped.iter().find(|s| s.index == index) {
            Some(skipped) => Err(skipped.reason),
            None => Ok(set.sources[set.sources.len() - 1].clone()),
        }
    }

    #[test]
    fn flat_3d_polyline_is_read() {
        let mut drawing = annulus_drawing();
        let mut poly = square_polyline(&mut drawing, [2.0; 4]);
        poly.set_is_3d_polyline(true);
        let source = read_one(&mut drawing, EntityType::Polyline(poly)).unwrap();
        assert!(matches!(source, LoopSource::Polyline { ref vertices, closed: true } if vertices.len() == 4));
    }

    #[test]
    fn non_planar_3d_polyline_is_skipped() {
        let mut drawing = annulus_drawing();
        let mut poly = square_polyline(&mut drawing, [0.0, 0.0, 1.0, 0.0]);
        poly.set_is_3d_polyline(true);
        assert_eq!(read_one(&mut drawing, EntityType::Polyline(poly)), Err("not in the XY plane"));
    }

    #[test]
    fn meshes_are_skipped() {
        let mut drawing = annulus_drawing();
        let mut face_mesh = square_polyline(&mut drawing, [0.0; 4]);
        face_mesh.set_is_polyface_mesh(true);
        assert_eq!(read_one(&mut drawing, EntityType::Polyline(face_mesh)), Err("unsupported entity kind"));

        let mut grid_mesh = square_polyline(&mut drawing, [0.0; 4]);
        grid_mesh.set_is_3d_polygon_mesh(true);
        assert_eq!(read_one(&mut drawing, EntityType::Polyline(grid_mesh)), Err("unsupported entity kind"));
    }

    fn spline_entity(zs: [f64; 4]) -> DxfSpline {
        let mut spline = DxfSpline::default();
        spline.degree_of_curve = 3;
        spline.control_points = [(0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0)]
            .into_iter()
            .zip(zs)
            .map(|((x, y), z)| dxf::Point::new(x, y, z))
            .collect();
        spline.knot_values = vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        spline
    }

    #[test]
    fn tilted_or_non_planar_splines_are_skipped() {
        let mut drawing = annulus_drawing();
        assert!(read_one(&mut drawing, EntityType::Spline(spline_entity([0.0; 4]))).is_ok());

        let mut tilted = spline_entity([0.0; 4]);
        tilted.normal = Vector::new(0.0, 1.0, 0.0);
        assert_eq!(read_one(&mut drawing, EntityType::Spline(tilted)), Err("not in the XY plane"));

        let mut warped = spline_entity([0.0, 1.0, 0.0, 0.0]);
        warped.normal = Vector::zero();
        assert_eq!(read_one(&mut drawing, EntityType::Spline(warped)), Err("not in the XY plane"));
    }

    #[test]
    fn skipped_kinds_are_named() {
        assert_eq!(entity_kind(&EntityType::Text(Text::default())), "Text");
        assert_eq!(entity_kind(&EntityType::Polyline(Polyline::default())), "Polyline");
    }

    #[test]
    fn source_indices_map_back_to_entities() {
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityType::Text(Text::default())));
        let mut circle = Circle::default();
        circle.radius = 2.0;
        drawing.add_entity(Entity::new(EntityType::Circle(circle)));

        let set = loop_sources_from_drawing(&drawing).unwrap();
        assert_eq!(set.entity_index(0), Some(1));
        assert_eq!(set.entity_index(1), None);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let mut drawing = Drawing::new();
        drawing.add_entity(Entity::new(EntityType::Text(Text::default())));
        assert!(matches!(
            loop_sources_from_drawing(&drawing),
            Err(DrawingError::NoLoopSources { skipped: 1 })
        ));
    }

    #[test]
    fn garbage_input_is_a_dxf_error() {
        let mut input: &[u8] = b"this is not a drawing";
        assert!(read_loop_sources(&mut input).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_loop_sources("/definitely/not/here.dxf");
        assert!(matches!(result, Err(DrawingError::Io(_))));
    }

    #[test]
    fn r12_output_explodes_boundaries() {
        let set = loop_sources_from_drawing(&annulus_drawing()).unwrap();
        let result = run(&set.sources, &PipelineConfig::default()).unwrap();

        let drawing = build_drawing(&result, &DrawingOptions::default());
        assert!(drawing.entities().all(|e| matches!(e.specific, EntityType::Line(_))));
        let boundary_lines = drawing.entities().filter(|e| e.common.layer == "BOUNDARY").count();
        let boundary_edges: usize = result.boundaries().map(|l| l.vertices().len()).sum();
        assert_eq!(boundary_lines, boundary_edges);

        let text = save_to_string(&drawing);
        assert!(text.contains("AC1009"), "R12 header missing");
        assert!(!text.contains("LWPOLYLINE"));
    }

    #[test]
    fn newer_targets_keep_polylines() {
        let set = loop_sources_from_drawing(&annulus_drawing()).unwrap();
        let result = run(&set.sources, &PipelineConfig::default()).unwrap();
        let options = DrawingOptions { version: TargetVersion::R2010, ..Default::default() };

        let drawing = build_drawing(&result, &options);
        let polylines = drawing.entities().filter(|e| matches!(e.specific, EntityType::LwPolyline(_))).count();
        assert_eq!(polylines, 2);
    }

    #[test]
    fn boundaries_can_be_left_out() {
        let set = loop_sources_from_drawing(&annulus_drawing()).unwrap();
        let result = run(&set.sources, &PipelineConfig::default()).unwrap();
        let options = DrawingOptions { include_boundaries: false, ..Default::default() };

        let drawing = build_drawing(&result, &options);
        assert_eq!(drawing.entities().count(), result.fill_segments.len());
        assert!(drawing.entities().all(|e| e.common.layer == "HATCH"));
    }

    #[test]
    fn written_fill_reads_back() {
        let set = loop_sources_from_drawing(&annulus_drawing()).unwrap();
        let result = run(&set.sources, &PipelineConfig::default()).unwrap();
        let options = DrawingOptions { include_boundaries: false, ..Default::default() };

        let mut buf: Vec<u8> = Vec::new();
        write_drawing(&result, &options, &mut buf).unwrap();
        let back = Drawing::load(&mut buf.as_slice()).unwrap();
        assert_eq!(back.entities().count(), result.fill_segments.len());
    }

    #[test]
    fn version_names_round_trip() {
        for version in [TargetVersion::R12, TargetVersion::R2000, TargetVersion::R2010] {
            assert_eq!(TargetVersion::from_name(version.name()), Some(version));
        }
        assert_eq!(TargetVersion::from_name("AC1009"), Some(TargetVersion::R12));
        assert!(TargetVersion::R2000.capabilities().polylines);
    }
}
