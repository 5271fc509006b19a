#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use test_case::test_case;

    use adaptive_rs::entities::{AdaptiveOutput, MotionType, RunStats};
    use adaptive_rs::geometry::primitives::{PathSet, Point};
    use adaptive_rs::io::ext_repr::ExtResult;
    use adaptive_rs::io::{export, import};
    use adaptive_rs::{Adaptive2d, AdaptiveConfig, OperationType};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point(x, y),
            Point(x + size, y),
            Point(x + size, y + size),
            Point(x, y + size),
        ]
    }

    fn pocket_job() -> (PathSet, PathSet) {
        let stock = vec![square(0.0, 0.0, 100.0)];
        let target = vec![square(30.0, 30.0, 40.0)];
        (stock, target)
    }

    fn base_config() -> AdaptiveConfig {
        AdaptiveConfig {
            tool_diameter: 5.0,
            step_over_factor: 0.2,
            tolerance: 0.2,
            ..AdaptiveConfig::default()
        }
    }

    fn run(
        config: AdaptiveConfig,
        stock: &PathSet,
        target: &PathSet,
    ) -> (Vec<AdaptiveOutput>, RunStats) {
        Adaptive2d::new(config).execute_with_stats(stock, target, |_| true)
    }

    fn n_points(outputs: &[AdaptiveOutput]) -> usize {
        outputs.iter().map(|o| o.n_points()).sum()
    }

    #[test]
    fn clears_pocket_around_island() {
        init_logger();
        let (stock, target) = pocket_job();
        let (outputs, stats) = run(base_config(), &stock, &target);

        assert_eq!(outputs.len(), 1);
        let output = &outputs[0];
        assert_eq!(output.segments[0].motion, MotionType::Cutting);

        let Point(x, y) = output.start_point;
        let in_stock = (0.0..=100.0).contains(&x) && (0.0..=100.0).contains(&y);
        let in_island = (30.0..=70.0).contains(&x) && (30.0..=70.0).contains(&y);
        assert!(in_stock && !in_island, "entry at {:?}", output.start_point);

        let expected = 100.0 * 100.0 - 40.0 * 40.0;
        assert!(
            (stats.cleared_area - expected).abs() < 0.02 * expected,
            "cleared {} of {}",
            stats.cleared_area,
            expected
        );
        assert!(!stats.cancelled);
        assert!(stats.n_passes > 1);
    }

    #[test]
    fn engagement_stays_bounded() {
        init_logger();
        let (stock, target) = pocket_job();
        let (_, stats) = run(base_config(), &stock, &target);
        // acceptance tolerance plus the overload margin, on both sides
        let min_ratio = stats.min_engagement_ratio.unwrap();
        assert!(min_ratio >= 1.0 - 2.0 * 0.05 - 1.0e-6);
        assert!(stats.max_engagement_ratio <= 1.0 + 2.0 * 0.05 + 1.0e-6);
        assert!(stats.n_steps > 100);
    }

    /// Distance from `p` to the axis aligned square at (`x`, `y`), zero inside it
    fn distance_to_square(p: Point, x: f64, y: f64, size: f64) -> f64 {
        let dx = (x - p.0).max(p.0 - (x + size)).max(0.0);
        let dy = (y - p.1).max(p.1 - (y + size)).max(0.0);
        dx.hypot(dy)
    }

    fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
        let (abx, aby) = (b.0 - a.0, b.1 - a.1);
        let len2 = abx * abx + aby * aby;
        let t = match len2 > 0.0 {
            true => (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0),
            false => 0.0,
        };
        (p.0 - a.0 - t * abx).hypot(p.1 - a.1 - t * aby)
    }

    #[test]
    fn leaves_stock_around_the_target() {
        init_logger();
        let (stock, target) = pocket_job();
        let config = AdaptiveConfig {
            stock_to_leave: 1.0,
            ..base_config()
        };
        let r = config.tool_diameter / 2.0;
        let (leave, tolerance) = (config.stock_to_leave, config.tolerance);
        let (outputs, stats) = run(config, &stock, &target);
        assert_eq!(outputs.len(), 1);
        let output = &outputs[0];
        let cuts = output
            .cutting_segments()
            .flat_map(|s| s.path.windows(2).map(|w| (w[0], w[1])))
            .collect::<Vec<_>>();
        assert!(!cuts.is_empty());

        // the tool never reaches into the stock left around the target
        for (a, b) in &cuts {
            let n = (a.distance(b) / 0.05).ceil().max(1.0) as usize;
            for i in 0..=n {
                let t = i as f64 / n as f64;
                let p = Point(a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
                let d = distance_to_square(p, 30.0, 30.0, 40.0);
                assert!(d >= r + leave - tolerance, "tool at {p:?} is {d:.3} from the target");
            }
        }

        // and removes the rest, apart from the corners a round tool cannot reach
        let cell = 0.25;
        let n_cells = (100.0 / cell) as usize;
        let mut cut = vec![false; n_cells * n_cells];
        let center = |i: usize| (i as f64 + 0.5) * cell;
        let mut mark_within = |a: Point, b: Point, reach: f64| {
            let lo = |v: f64| (((v - reach) / cell).floor().max(0.0) as usize).min(n_cells);
            let hi = |v: f64| (((v + reach) / cell).ceil().max(0.0) as usize).min(n_cells);
            for i in lo(a.0.min(b.0))..hi(a.0.max(b.0)) {
                for j in lo(a.1.min(b.1))..hi(a.1.max(b.1)) {
                    if distance_to_segment(Point(center(i), center(j)), a, b) <= reach {
                        cut[i * n_cells + j] = true;
                    }
                }
            }
        };
        for (a, b) in &cuts {
            mark_within(*a, *b, r + tolerance);
        }
        // the helix ramps down around its center
        mark_within(output.helix_center, output.helix_center, r + tolerance);

        let (mut material, mut uncut) = (0.0, 0.0);
        for i in 0..n_cells {
            for j in 0..n_cells {
                let p = Point(center(i), center(j));
                let near_corner = p.0.min(100.0 - p.0) < r && p.1.min(100.0 - p.1) < r;
                if near_corner || distance_to_square(p, 30.0, 30.0, 40.0) <= leave + tolerance {
                    continue;
                }
                material += cell * cell;
                if !cut[i * n_cells + j] {
                    uncut += cell * cell;
                }
            }
        }
        assert!(uncut < 0.01 * material, "{uncut} of {material} left uncut");
        assert!(stats.cleared_area > 0.97 * material);
    }

    #[test]
    fn nothing_to_clear_when_stock_equals_target() {
        init_logger();
        let stock = vec![square(0.0, 0.0, 100.0)];
        let (outputs, stats) = run(base_config(), &stock, &stock.clone());
        assert!(outputs.is_empty());
        assert_eq!(stats.n_passes, 0);
    }

    #[test]
    fn empty_input_produces_nothing() {
        init_logger();
        let (outputs, stats) = run(base_config(), &vec![], &vec![]);
        assert!(outputs.is_empty());
        assert_eq!(stats, RunStats::default());
    }

    #[test]
    fn unreachable_region_is_skipped() {
        init_logger();
        let stock = vec![square(0.0, 0.0, 100.0), square(150.0, 0.0, 3.0)];
        let target = vec![square(45.0, 45.0, 10.0)];
        let (outputs, stats) = run(base_config(), &stock, &target);
        assert!(stats.n_unreachable_regions >= 1);
        assert!(!outputs.is_empty());
        for output in &outputs {
            assert!(output.start_point.0 <= 100.0);
        }
    }

    #[test]
    fn progress_callback_stops_run() {
        init_logger();
        let (stock, target) = pocket_job();
        let (full, _) = run(base_config(), &stock, &target);

        let n_calls = Cell::new(0);
        let (stopped, stats) =
            Adaptive2d::new(base_config()).execute_with_stats(&stock, &target, |segments| {
                assert!(!segments.is_empty());
                n_calls.set(n_calls.get() + 1);
                n_calls.get() < 2
            });
        assert_eq!(n_calls.get(), 2);
        assert!(stats.cancelled);
        assert!(n_points(&stopped) < n_points(&full));
    }

    #[test]
    fn progress_reports_every_point() {
        init_logger();
        let (stock, target) = pocket_job();
        let mut n_reported = 0;
        let outputs = Adaptive2d::new(base_config()).execute(&stock, &target, |segments| {
            n_reported += segments.iter().map(|s| s.path.len()).sum::<usize>();
            true
        });
        assert!(n_reported > 0);
        // reports may repeat the point a previous report ended on
        assert!(n_reported >= n_points(&outputs) / 2);
    }

    #[test]
    fn runs_are_deterministic() {
        init_logger();
        let (stock, target) = pocket_job();
        let (first, first_stats) = run(base_config(), &stock, &target);
        let (second, second_stats) = run(base_config(), &stock, &target);
        assert_eq!(first, second);
        assert_eq!(first_stats, second_stats);
    }

    #[test_case(OperationType::ClearingInside; "clearing_inside")]
    #[test_case(OperationType::ClearingOutside; "clearing_outside")]
    #[test_case(OperationType::ProfilingInside; "profiling_inside")]
    #[test_case(OperationType::ProfilingOutside; "profiling_outside")]
    fn every_operation_produces_toolpaths(op_type: OperationType) {
        init_logger();
        let (stock, target) = pocket_job();
        let config = AdaptiveConfig {
            op_type,
            ..base_config()
        };
        let (outputs, stats) = run(config, &stock, &target);
        assert!(!outputs.is_empty());
        assert!(outputs.iter().any(|o| o.cutting_segments().next().is_some()));
        assert!(stats.cleared_area > 0.0);
        for output in &outputs {
            assert_ne!(output.return_motion, MotionType::Cutting);
        }
    }

    #[test_case(true; "inside_out")]
    #[test_case(false; "from_outside")]
    fn keeps_tool_down_on_clear_links(force_inside_out: bool) {
        init_logger();
        let (stock, target) = pocket_job();
        let config = AdaptiveConfig {
            force_inside_out,
            keep_tool_down: true,
            ..base_config()
        };
        let (outputs, _) = run(config, &stock, &target);
        let motions = outputs
            .iter()
            .flat_map(|o| o.segments.iter().map(|s| s.motion))
            .collect::<Vec<_>>();
        assert!(motions.contains(&MotionType::Cutting));
        // consecutive segments never share a motion type
        assert!(motions.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn parallel_matches_sequential() {
        init_logger();
        let stock = vec![square(0.0, 0.0, 60.0), square(100.0, 0.0, 60.0)];
        let target = vec![square(20.0, 20.0, 20.0), square(120.0, 20.0, 20.0)];
        let (sequential, sequential_stats) = run(base_config(), &stock, &target);
        let (parallel, parallel_stats) =
            Adaptive2d::new(base_config()).execute_parallel(&stock, &target, |_| true);
        assert_eq!(sequential.len(), 2);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential_stats.n_passes, parallel_stats.n_passes);
        assert_eq!(sequential_stats.n_steps, parallel_stats.n_steps);
    }

    #[test]
    fn exported_outputs_import_back() {
        init_logger();
        let (stock, target) = pocket_job();
        let (outputs, stats) = run(base_config(), &stock, &target);
        let ext = export::export_result(&outputs, &stats);
        let imported = ext
            .outputs
            .iter()
            .map(import::import_output)
            .collect::<anyhow::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(imported, outputs);

        let json = serde_json::to_string(&ext).unwrap();
        let parsed = serde_json::from_str::<ExtResult>(&json).unwrap();
        assert_eq!(parsed.outputs.len(), outputs.len());
        assert_eq!(parsed.statistics.n_passes, stats.n_passes);
    }
}
