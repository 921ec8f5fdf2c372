//! Every face of a randomized mesh must be found by every index strategy.

use facet_core::{Face, IndexConfig, IndexStrategy, Material, Mesh};
use facet_math::{Aabb, Ray, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STRATEGIES: [IndexStrategy; 3] = [
    IndexStrategy::Clustering,
    IndexStrategy::Octree,
    IndexStrategy::RTree,
];

/// One random triangle per cell of an `n^3` lattice with pitch 2.
///
/// Each triangle stays inside the unit box around its cell centre, so no two
/// triangles share any space.
fn lattice_mesh(n: i32, seed: u64) -> (Vec<Vec3>, Vec<Face>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let centre = Vec3::new(i as f32, j as f32, k as f32) * 2.0;
                let corners = loop {
                    let mut corner = || {
                        centre
                            + Vec3::new(
                                rng.gen_range(-0.5..0.5),
                                rng.gen_range(-0.5..0.5),
                                rng.gen_range(-0.5..0.5),
                            )
                    };
                    let corners = [corner(), corner(), corner()];
                    let area = (corners[1] - corners[0]).cross(corners[2] - corners[0]).length();
                    if area > 0.05 {
                        break corners;
                    }
                };

                let base = vertices.len() as u32;
                vertices.extend(corners);
                faces.push(Face::new(base, base + 1, base + 2));
            }
        }
    }
    (vertices, faces)
}

fn build(strategy: IndexStrategy) -> Mesh {
    let _ = env_logger::builder().is_test(true).try_init();
    let (vertices, faces) = lattice_mesh(6, 0x5eed);
    Mesh::new(vertices, faces, vec![], Material::default(), &IndexConfig::new(strategy))
        .expect("lattice mesh is valid")
}

fn centroid(mesh: &Mesh, face: u32) -> Vec3 {
    let [a, b, c] = mesh.triangles().corners(face);
    (a + b + c) / 3.0
}

#[test]
fn test_every_face_is_hit_along_its_normal() {
    for strategy in STRATEGIES {
        let mesh = build(strategy);

        for face in 0..mesh.face_count() as u32 {
            let normal = mesh.normals()[mesh.faces()[face as usize].normal as usize];
            let target = centroid(&mesh, face);

            // From either side of the face
            for direction in [normal, -normal] {
                let ray = Ray::new(target - direction * 0.25, direction);
                let hit = mesh
                    .raycast(&ray)
                    .unwrap_or_else(|| panic!("{strategy}: face {face} was missed"));
                assert_eq!(hit.face, face, "{strategy}");
                assert!((hit.distance - 0.25).abs() < 1e-4, "{strategy}: {}", hit.distance);
            }
        }
    }
}

#[test]
fn test_rays_between_cells_miss() {
    for strategy in STRATEGIES {
        let mesh = build(strategy);
        // Gaps between lattice cells hold no geometry
        let ray = Ray::new(Vec3::new(1.0, 1.0, -5.0), Vec3::Z);
        assert!(mesh.raycast(&ray).is_none(), "{strategy}");
        let ray = Ray::new(Vec3::new(-1.0, 5.0, 5.0), Vec3::X);
        assert!(mesh.raycast(&ray).is_none(), "{strategy}");
    }
}

#[test]
fn test_leaves_cover_mesh_bounds() {
    for strategy in STRATEGIES {
        let mesh = build(strategy);
        let leaves = mesh.index().leaves();
        let joined = leaves
            .iter()
            .fold(Aabb::EMPTY, |acc, leaf| Aabb::surrounding(&acc, &leaf.bounds));
        assert_eq!(joined, mesh.bounds(), "{strategy}");

        let covered: usize = leaves.iter().map(|leaf| leaf.faces.len()).sum();
        assert!(covered >= mesh.face_count(), "{strategy}");
    }
}

#[test]
fn test_clustering_has_no_empty_leaves() {
    let mesh = build(IndexStrategy::Clustering);
    let stats = mesh.index().stats();
    assert_eq!(stats.empty_leaves, 0);
    assert_eq!(stats.face_refs, mesh.face_count());
}

#[test]
fn test_partitioning_strategies_find_every_point() {
    let mut rng = StdRng::seed_from_u64(7);
    for strategy in [IndexStrategy::Octree, IndexStrategy::RTree] {
        let mesh = build(strategy);
        let bounds = mesh.bounds();

        for _ in 0..500 {
            let point = Vec3::new(
                rng.gen_range(bounds.x.min..=bounds.x.max),
                rng.gen_range(bounds.y.min..=bounds.y.max),
                rng.gen_range(bounds.z.min..=bounds.z.max),
            );
            let leaf = mesh
                .index()
                .find(point)
                .unwrap_or_else(|| panic!("{strategy}: no leaf for {point}"));
            assert!(leaf.is_leaf());
            assert!(leaf.bounds.contains(point));
        }

        let outside = bounds.upper() + Vec3::ONE;
        assert!(mesh.index().find(outside).is_none(), "{strategy}");
    }
}

#[test]
fn test_centroids_resolve_to_leaves_holding_the_face() {
    for strategy in [IndexStrategy::Octree, IndexStrategy::RTree] {
        let mesh = build(strategy);
        for face in 0..mesh.face_count() as u32 {
            let leaf = mesh
                .index()
                .find(centroid(&mesh, face))
                .unwrap_or_else(|| panic!("{strategy}: centroid of {face} not covered"));
            assert!(leaf.faces.contains(&face), "{strategy}: face {face}");
        }
    }
}
