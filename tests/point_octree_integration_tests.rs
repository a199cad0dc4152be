//! Integration tests for `PointOctree` and `IndexedPointOctree`, driven
//! only through the public crate surface.
//!
//! Run with: cargo test --test point_octree_integration_tests

use glam::Vec3;
use octree::{IndexedPointOctree, PointOctree, Ray};

fn tree() -> PointOctree<u32> {
    PointOctree::new(4.0, Vec3::ZERO, 0.5)
}

#[test]
fn insert_and_query_a_cluster_of_points() {
    let mut t = tree();
    for i in 0..20u32 {
        let angle = (i as f32) * 0.3;
        t.add(i, Vec3::new(angle.cos(), 0.0, angle.sin()));
    }
    assert_eq!(t.count(), 20);

    let nearby = t.get_nearby_point(Vec3::ZERO, 1.5);
    assert_eq!(nearby.len(), 20);
}

#[test]
fn growing_past_the_initial_world_size_keeps_everything_queryable() {
    let mut t = tree();
    t.add(1, Vec3::new(0.1, 0.1, 0.1));
    for i in 0..6u32 {
        t.add(10 + i, Vec3::new(1000.0, 0.0, 0.0) * (i as f32 + 1.0));
    }
    assert_eq!(t.count(), 7);

    let mut all = t.get_all();
    all.sort();
    let mut expected: Vec<u32> = (10..16).collect();
    expected.push(1);
    expected.sort();
    assert_eq!(all, expected);
}

#[test]
fn ray_query_only_returns_points_within_distance() {
    let mut t = tree();
    t.add(1, Vec3::new(0.0, 0.0, 2.0));
    t.add(2, Vec3::new(0.0, 5.0, 2.0));

    let ray = Ray::new(Vec3::new(-10.0, 0.0, 2.0), Vec3::X);
    let out = t.get_nearby_ray(&ray, 0.5);
    assert_eq!(out, vec![1]);
}

#[test]
fn remove_and_reinsert_keeps_the_tree_consistent() {
    let mut t = tree();
    let points: Vec<Vec3> = (0..12).map(|i| Vec3::new(0.3, 0.3, 0.3 + (i as f32) * 1e-3)).collect();
    for (i, p) in points.iter().enumerate() {
        t.add(i as u32, *p);
    }
    assert_eq!(t.count(), 12);

    for i in (0..12u32).step_by(2) {
        assert!(t.remove_at(&i, points[i as usize]));
    }
    assert_eq!(t.count(), 6);

    t.add(99, Vec3::new(-0.3, -0.3, -0.3));
    assert_eq!(t.count(), 7);
    assert!(t.get_all().contains(&99));
}

#[test]
fn indexed_tree_tracks_the_same_objects_as_the_plain_tree() {
    let mut indexed = IndexedPointOctree::new(4.0, Vec3::ZERO, 0.5);
    indexed.add("alpha".to_string(), Vec3::new(1.0, 0.0, 0.0));
    indexed.add("beta".to_string(), Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(indexed.count(), 2);

    assert!(indexed.remove(&"alpha".to_string()));
    assert_eq!(indexed.count(), 1);
    assert_eq!(indexed.get_all(), vec!["beta".to_string()]);
}
