use field_derive::{attach_force, ForceArrays, Normalizer, TEXCOORD_T};
use geometry_ops::{GeometryOps, MockGeometry};
use mesh_types::{Mesh, PointArray};

// ── Helper Functions ─────────────────────────────────────────────────────

/// Two triangles sharing an edge, identity strain everywhere.
fn strained_square() -> Mesh {
    let mut mesh = Mesh::from_triangles(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        &[[0, 1, 2], [0, 2, 3]],
    );
    let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    mesh.point_data
        .insert(PointArray::float("Strain", 9, identity.repeat(4)));
    mesh.point_data.insert(PointArray::float(
        "Normals",
        3,
        vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
    ));
    mesh
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[test]
fn identity_strain_yields_normals_as_forces() {
    let geometry = MockGeometry::new();
    let mut mesh = strained_square();

    let non_finite = attach_force(&geometry, &mut mesh, &ForceArrays::default()).unwrap();
    assert_eq!(non_finite, 0);

    let forces = geometry.vector_field(&mesh, "force").unwrap();
    assert_eq!(
        forces.0,
        vec![
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0]
        ]
    );
    let magnitudes = geometry.scalar_field(&mesh, "forceMag").unwrap();
    assert_eq!(magnitudes.0, vec![1.0; 4]);

    let normalized = Normalizer::new(0.0, 2.0)
        .unwrap()
        .normalize_field(&magnitudes);
    assert_eq!(normalized.values, vec![0.5; 4]);
    assert!(normalized.texcoords().0.iter().all(|st| st[1] == TEXCOORD_T));
    assert_eq!(normalized.diagnostic("forceMag"), "forceMag: [1.0, 1.0]");
}

#[test]
fn missing_tensor_array_is_reported_by_name() {
    let geometry = MockGeometry::new();
    let mut mesh = strained_square();
    mesh.point_data.remove("Strain");

    let err = attach_force(&geometry, &mut mesh, &ForceArrays::default()).unwrap_err();
    assert!(err.to_string().contains("Strain"), "{}", err);
    assert!(!mesh.point_data.contains("force"));
}

#[test]
fn custom_array_names() {
    let geometry = MockGeometry::new();
    let mut mesh = strained_square();
    let arrays = ForceArrays {
        force: "traction".to_string(),
        magnitude: "tractionMag".to_string(),
        ..ForceArrays::default()
    };
    attach_force(&geometry, &mut mesh, &arrays).unwrap();
    assert!(mesh.point_data.contains("traction"));
    assert!(mesh.point_data.contains("tractionMag"));
}
