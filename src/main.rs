use vessel_profiler::{AnalyzerParams, ProfileAnalyzer, Sample, ShapeParams};

fn main() {
    // Demo stub: synthesizes a frustum-over-cylinder vessel and runs the
    // full pipeline on the exact filling curve.
    let frustum = ShapeParams::Frustum {
        r_bottom_mm: 6.5,
        r_top_mm: 5.0,
        height_mm: 30.0,
    };
    let cylinder = ShapeParams::Cylinder { radius_mm: 5.0 };
    let joint_volume = frustum.volume_at(30.0);

    let samples: Vec<Sample> = (0..60)
        .map(|i| {
            let h = i as f64;
            let v = if h <= 30.0 {
                frustum.volume_at(h)
            } else {
                joint_volume + cylinder.volume_at(h - 30.0)
            };
            Sample::new(h, v + 1e-9 * (i + 1) as f64)
        })
        .collect();

    let analyzer = ProfileAnalyzer::new(AnalyzerParams::default());
    match analyzer.analyze(&samples) {
        Ok(report) => {
            println!(
                "{} segments in {:.3} ms",
                report.segments.len(),
                report.timing.total_ms
            );
            for seg in &report.segments {
                println!(
                    "  {:?} {:.1}..{:.1} mm, fit error {:.3}%",
                    seg.kind(),
                    seg.start_height_mm,
                    seg.end_height_mm,
                    seg.fit_error_pct
                );
            }
        }
        Err(e) => eprintln!("analysis failed: {e}"),
    }
}
