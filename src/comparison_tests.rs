//! Comparison tests between QuadTree, HilbertRTree and a brute-force scan

#[cfg(test)]
mod tests {
    use crate::rectangle::{Bounds, Rectangle, RectangleSet};
    use crate::spatial_index::{IndexParams, SpatialIndex};
    use crate::{AdjustOptions, HilbertRTree, QuadTree, adjust_labels_with};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_set(rng: &mut StdRng, count: usize, extent: f64, max_size: f64) -> RectangleSet {
        (0..count)
            .map(|_| {
                Rectangle::new(
                    rng.random::<f64>() * extent,
                    rng.random::<f64>() * extent,
                    rng.random::<f64>() * max_size,
                    rng.random::<f64>() * max_size,
                )
            })
            .collect()
    }

    fn brute_force(set: &RectangleSet, bbox: &Bounds) -> Vec<usize> {
        set.iter()
            .enumerate()
            .filter(|(_, r)| r.bounds().intersects(bbox))
            .map(|(i, _)| i)
            .collect()
    }

    fn assert_backends_agree(set: &RectangleSet, queries: &[Bounds], params: &IndexParams) {
        let quad = QuadTree::bulk_load(set, params);
        let hilbert = HilbertRTree::bulk_load(set, params);
        let mut quad_results = Vec::new();
        let mut hilbert_results = Vec::new();

        for bbox in queries {
            let expected = brute_force(set, bbox);
            quad.query(bbox, &mut quad_results);
            hilbert.query(bbox, &mut hilbert_results);
            assert_eq!(quad_results, expected, "QuadTree differs from brute force for {bbox:?}");
            assert_eq!(hilbert_results, expected, "HilbertRTree differs from brute force for {bbox:?}");
        }
    }

    #[test]
    fn test_random_boxes_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let set = random_set(&mut rng, 500, 100.0, 6.0);
        let queries: Vec<Bounds> = (0..200)
            .map(|_| {
                let x = rng.random::<f64>() * 100.0;
                let y = rng.random::<f64>() * 100.0;
                let w = rng.random::<f64>() * 15.0;
                let h = rng.random::<f64>() * 15.0;
                Bounds::new(x, y, x + w, y + h)
            })
            .collect();

        assert_backends_agree(&set, &queries, &IndexParams::default());
        assert_backends_agree(&set, &queries, &IndexParams { max_items_per_node: 3, max_depth: 6 });
    }

    #[test]
    fn test_self_queries_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = random_set(&mut rng, 300, 40.0, 4.0);
        let queries: Vec<Bounds> = set.iter().map(Rectangle::bounds).collect();
        assert_backends_agree(&set, &queries, &IndexParams::default());
    }

    #[test]
    fn test_clustered_boxes_match_brute_force() {
        // Many identical boxes force the quadtree to its depth limit
        let mut set: RectangleSet = (0..50).map(|_| Rectangle::new(3.0, 3.0, 1.0, 1.0)).collect();
        set.push(Rectangle::new(0.0, 0.0, 10.0, 10.0));
        set.push(Rectangle::new(9.0, 9.0, 0.0, 0.0));
        let queries = vec![
            Bounds::new(3.5, 3.5, 3.5, 3.5),
            Bounds::new(9.0, 9.0, 9.0, 9.0),
            Bounds::new(4.5, 4.5, 8.0, 8.0),
            Bounds::new(-5.0, -5.0, -1.0, -1.0),
        ];
        assert_backends_agree(&set, &queries, &IndexParams { max_items_per_node: 4, max_depth: 10 });
    }

    #[test]
    fn test_simulation_is_backend_independent() {
        let mut rng = StdRng::seed_from_u64(23);
        let set = random_set(&mut rng, 80, 30.0, 5.0);
        let options = AdjustOptions::default().with_seed(5).with_max_iterations(30);

        let quad = adjust_labels_with::<QuadTree>(&set, &options).unwrap();
        let hilbert = adjust_labels_with::<HilbertRTree>(&set, &options).unwrap();

        assert_eq!(quad.rectangles, hilbert.rectangles, "Backends must yield identical layouts");
        assert_eq!(quad.stats, hilbert.stats);
    }
}
