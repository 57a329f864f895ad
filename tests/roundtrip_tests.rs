//! Write-then-read roundtrip tests across every supported shape family and
//! its M/Z variants: identical coordinates, part boundaries and measures
//! must come back, bit for bit.

mod common;

use common::{square_polygon, square_with_hole, test_output_path, zigzag};
use shp_tools_rs::{
    Geometry, Shape, ShapeType, Shapefile, ShpError, Vertex,
};

fn roundtrip(name: &str, shape_type: ShapeType, shapes: Vec<Shape>) -> Shapefile {
    let path = test_output_path(name);
    let mut file = Shapefile::new(shape_type);
    for shape in shapes {
        file.add_shape(shape).unwrap();
    }
    file.save_as(&path, true).unwrap();
    Shapefile::open(&path).unwrap()
}

#[test]
fn point_roundtrip() {
    let coords = [(1.5, 2.5), (-10.0, 40.25), (0.0, 0.0)];
    let shapes = coords
        .iter()
        .map(|&(x, y)| {
            Shape::from_geometry(&Geometry::Point(Vertex::new(x, y)), ShapeType::Point).unwrap()
        })
        .collect();
    let back = roundtrip("point.shp", ShapeType::Point, shapes);
    assert_eq!(back.num_shapes(), 3);
    for (i, &(x, y)) in coords.iter().enumerate() {
        assert_eq!(back.shape(i).unwrap().vertex(0), Vertex::new(x, y));
    }
}

#[test]
fn point_z_and_m_roundtrip() {
    let mut with_both = Shape::from_geometry(
        &Geometry::Point(Vertex::new(3.0, 4.0)),
        ShapeType::PointZ,
    )
    .unwrap();
    with_both.set_z_values(vec![100.5]).unwrap();
    with_both.set_m_values(vec![-2.25]).unwrap();

    let mut z_only =
        Shape::from_geometry(&Geometry::Point(Vertex::new(5.0, 6.0)), ShapeType::PointZ).unwrap();
    z_only.set_z_values(vec![7.0]).unwrap();

    let back = roundtrip("pointz.shp", ShapeType::PointZ, vec![with_both, z_only]);
    let first = back.shape(0).unwrap();
    assert_eq!(first.z.as_deref(), Some(&[100.5][..]));
    assert_eq!(first.m.as_deref(), Some(&[-2.25][..]));
    let second = back.shape(1).unwrap();
    assert_eq!(second.z.as_deref(), Some(&[7.0][..]));
    // The file gained an M arena from the first shape; the second shape's
    // measure comes back as the no-data fill.
    assert!(second.m.as_ref().unwrap()[0] < shp_tools_rs::shapefile::M_NO_DATA_THRESHOLD);
}

#[test]
fn multipoint_roundtrip() {
    let points = vec![
        Vertex::new(0.0, 0.0),
        Vertex::new(1.25, -3.5),
        Vertex::new(1e6, 1e-6),
    ];
    let shape =
        Shape::from_geometry(&Geometry::MultiPoint(points.clone()), ShapeType::MultiPoint).unwrap();
    let back = roundtrip("multipoint.shp", ShapeType::MultiPoint, vec![shape]);
    match back.feature(0).unwrap().geometry {
        Geometry::MultiPoint(pts) => assert_eq!(pts, points),
        other => panic!("expected multipoint, got {other:?}"),
    }
}

#[test]
fn multipoint_m_roundtrip() {
    let mut shape = Shape::from_geometry(
        &Geometry::MultiPoint(vec![Vertex::new(1.0, 1.0), Vertex::new(2.0, 2.0)]),
        ShapeType::MultiPointM,
    )
    .unwrap();
    shape.set_m_values(vec![10.0, 20.0]).unwrap();
    let back = roundtrip("multipointm.shp", ShapeType::MultiPointM, vec![shape]);
    assert_eq!(back.shape(0).unwrap().m.as_deref(), Some(&[10.0, 20.0][..]));
}

#[test]
fn multipoint_z_roundtrip() {
    let points = vec![Vertex::new(1.0, 1.0), Vertex::new(2.0, 2.0), Vertex::new(3.0, 1.5)];

    // With measures.
    let mut with_m = Shape::from_geometry(
        &Geometry::MultiPoint(points.clone()),
        ShapeType::MultiPointZ,
    )
    .unwrap();
    with_m.set_z_values(vec![5.0, 6.0, 7.0]).unwrap();
    with_m.set_m_values(vec![0.1, 0.2, 0.3]).unwrap();
    let back = roundtrip("multipointz_m.shp", ShapeType::MultiPointZ, vec![with_m]);
    let decoded = back.shape(0).unwrap();
    assert_eq!(decoded.z.as_deref(), Some(&[5.0, 6.0, 7.0][..]));
    assert_eq!(decoded.m.as_deref(), Some(&[0.1, 0.2, 0.3][..]));

    // Measures are optional for the Z types.
    let mut without_m = Shape::from_geometry(
        &Geometry::MultiPoint(points),
        ShapeType::MultiPointZ,
    )
    .unwrap();
    without_m.set_z_values(vec![5.0, 6.0, 7.0]).unwrap();
    let back = roundtrip("multipointz.shp", ShapeType::MultiPointZ, vec![without_m]);
    let decoded = back.shape(0).unwrap();
    assert_eq!(decoded.z.as_deref(), Some(&[5.0, 6.0, 7.0][..]));
    assert!(decoded.m.is_none());
}

#[test]
fn polyline_multipart_roundtrip() {
    let lines = vec![zigzag(4), vec![Vertex::new(50.0, 50.0), Vertex::new(60.0, 55.0)]];
    let shape = Shape::from_geometry(
        &Geometry::MultiLineString(lines.clone()),
        ShapeType::PolyLine,
    )
    .unwrap();
    let back = roundtrip("polyline.shp", ShapeType::PolyLine, vec![shape]);
    let decoded = back.shape(0).unwrap();
    assert_eq!(decoded.num_parts(), 2);
    assert_eq!(decoded.part_vertices(0), lines[0]);
    assert_eq!(decoded.part_vertices(1), lines[1]);
    // Single file, two parts: geometry comes back as a multi.
    assert!(matches!(
        back.feature(0).unwrap().geometry,
        Geometry::MultiLineString(_)
    ));
}

#[test]
fn polyline_z_roundtrip() {
    let mut shape = Shape::from_geometry(
        &Geometry::LineString(zigzag(5)),
        ShapeType::PolyLineZ,
    )
    .unwrap();
    shape
        .set_z_values(vec![0.0, 1.5, 3.0, 4.5, 6.0])
        .unwrap();
    let back = roundtrip("polylinez.shp", ShapeType::PolyLineZ, vec![shape.clone()]);
    let decoded = back.shape(0).unwrap();
    assert_eq!(decoded.z, shape.z);
    assert_eq!(decoded.vertices, shape.vertices);
    assert!(decoded.m.is_none() || decoded.m.as_ref().unwrap().is_empty());
}

#[test]
fn polygon_roundtrip() {
    let back = roundtrip(
        "polygon.shp",
        ShapeType::Polygon,
        vec![Shape::from_geometry(&square_with_hole(0.0, 0.0, 8.0), ShapeType::Polygon).unwrap()],
    );
    match back.feature(0).unwrap().geometry {
        Geometry::Polygon(p) => {
            assert_eq!(p.shell.len(), 5);
            assert_eq!(p.holes.len(), 1);
            assert_eq!(p.holes[0].len(), 5);
        }
        other => panic!("expected polygon, got {other:?}"),
    }
}

#[test]
fn polygon_m_roundtrip() {
    let mut shape =
        Shape::from_geometry(&square_polygon(0.0, 0.0, 4.0), ShapeType::PolygonM).unwrap();
    shape.set_m_values(vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    let back = roundtrip("polygonm.shp", ShapeType::PolygonM, vec![shape.clone()]);
    assert_eq!(back.shape(0).unwrap().m, shape.m);
}

#[test]
fn null_shape_written_for_empty_geometry() {
    let empty = Shape::new(ShapeType::Polygon);
    let real = Shape::from_geometry(&square_polygon(0.0, 0.0, 2.0), ShapeType::Polygon).unwrap();
    let back = roundtrip("withnull.shp", ShapeType::Polygon, vec![empty, real]);
    assert_eq!(back.num_shapes(), 2);
    assert_eq!(back.shape(0).unwrap().shape_type, ShapeType::NullShape);
    assert_eq!(back.shape(0).unwrap().num_points(), 0);
    assert!(matches!(back.feature(0).unwrap().geometry, Geometry::Empty));
}

#[test]
fn truncated_file_is_a_hard_error() {
    let path = test_output_path("truncated.shp");
    let mut file = Shapefile::new(ShapeType::Point);
    for i in 0..4 {
        file.add_feature(&Geometry::Point(Vertex::new(i as f64, 0.0)), vec![])
            .unwrap();
    }
    file.save_as(&path, true).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 5);
    std::fs::write(&path, &bytes).unwrap();
    std::fs::remove_file(test_output_path("truncated.shx")).unwrap();

    let err = Shapefile::open(&path).unwrap_err();
    assert!(matches!(err, ShpError::EndOfStream { .. }));
}
