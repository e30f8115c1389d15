//! Property-based tests for binary STL decoding.
//!
//! Random triangle soups are encoded to bytes, decoded, and checked for the
//! bounds, normal and truncation invariants.

use stlmodel_core::{parse_binary_stl, Bounds, Error, Model, ModelData, StlFile, TriangleRecord};

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;

type RawTriangle = ([f32; 3], [[f32; 3]; 3], u16);

fn arb_point() -> impl Strategy<Value = [f32; 3]> {
    prop::array::uniform3(-1000.0..1000.0f32)
}

fn arb_triangle() -> impl Strategy<Value = RawTriangle> {
    (arb_point(), arb_point(), arb_point(), arb_point(), any::<u16>())
        .prop_map(|(normal, a, b, c, attribute)| (normal, [a, b, c], attribute))
}

fn arb_soup(max: usize) -> impl Strategy<Value = Vec<RawTriangle>> {
    prop::collection::vec(arb_triangle(), 0..=max)
}

fn encode(triangles: &[RawTriangle]) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data[..5].copy_from_slice(b"solid");
    data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for (normal, vertices, attribute) in triangles {
        for value in normal.iter().chain(vertices.iter().flatten()) {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&attribute.to_le_bytes());
    }
    data
}

fn record(raw: &RawTriangle) -> TriangleRecord {
    let (normal, [a, b, c], attribute) = *raw;
    TriangleRecord::new(
        Vector3::from(normal),
        [Point3::from(a), Point3::from(b), Point3::from(c)],
        attribute,
    )
}

proptest! {
    #[test]
    fn incremental_bounds_match_full_pass(soup in arb_soup(32)) {
        let file = parse_binary_stl(&encode(&soup)).unwrap();
        prop_assert_eq!(file.bounds(), Bounds::from_vertices(file.vertices()));

        let incremental = file.bounds();
        let rebuilt = Model::new(
            "rebuilt",
            ModelData::new(file.normals().to_vec(), file.vertices().to_vec()),
        )
        .unwrap();
        prop_assert_eq!(*rebuilt.bounds(), incremental);
        prop_assert_eq!(file.to_model().center(), rebuilt.center());
    }

    #[test]
    fn normals_replicated_per_vertex(soup in arb_soup(16)) {
        let file = parse_binary_stl(&encode(&soup)).unwrap();
        prop_assert_eq!(file.normals().len(), 9 * soup.len());
        prop_assert_eq!(file.vertices().len(), 9 * soup.len());

        for (face, (normal, _, _)) in file.normals().chunks_exact(9).zip(&soup) {
            for slot in face.chunks_exact(3) {
                prop_assert_eq!(slot, &normal[..]);
            }
        }
        let attributes: Vec<u16> = soup.iter().map(|t| t.2).collect();
        prop_assert_eq!(file.attributes(), &attributes[..]);
    }

    #[test]
    fn bounds_grow_monotonically(soup in arb_soup(24)) {
        let mut file = StlFile::new("grow", soup.len() as u32);
        let mut previous = file.bounds();
        for raw in &soup {
            file.add_triangle(&record(raw)).unwrap();
            let current = file.bounds();
            for (before, after) in [(previous.x, current.x), (previous.y, current.y), (previous.z, current.z)] {
                prop_assert!(after[0] <= before[0]);
                prop_assert!(after[1] >= before[1]);
            }
            previous = current;
        }
    }

    #[test]
    fn missing_final_byte_is_truncation(soup in arb_soup(8).prop_filter("need a triangle", |s| !s.is_empty())) {
        let mut data = encode(&soup);
        data.pop();
        let result = parse_binary_stl(&data);
        let is_truncated = matches!(result, Err(Error::TruncatedInput { .. }));
        prop_assert!(is_truncated);
    }
}

#[test]
fn zero_triangle_file() {
    let model = parse_binary_stl(&encode(&[])).unwrap().to_model();
    assert!(model.vertices().is_empty());
    assert!(model.normals().is_empty());
    assert_eq!(*model.bounds(), Bounds::ZERO);
    assert_eq!(model.center(), Point3::origin());
}
