use lens_contours::config::clean::load_config;
use lens_contours::contours::ContourPoint;
use lens_contours::diagnostics::CleanReport;
use lens_contours::distortion::check_invertibility;
use lens_contours::edges::{contours_from_edges, detect_edges_nms};
use lens_contours::image::io::{load_grayscale_f32, write_json_file};
use log::info;
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let image = load_grayscale_f32(&config.input)?;
    let edges = detect_edges_nms(&image, config.edge.magnitude_threshold);
    info!(
        "{} edge elements at threshold {} (gradient {:.3} ms, nms {:.3} ms)",
        edges.edges.len(),
        config.edge.magnitude_threshold,
        edges.gradient_ms,
        edges.nms_ms
    );

    let mut contours =
        contours_from_edges(&edges.edges, image.w, image.h).map_err(|e| e.to_string())?;
    let report = contours.clean(&config.clean);
    match &report {
        Some(r) => info!(
            "cleaned contours: {} -> {} points in {:.3} ms",
            r.input_points,
            r.output_points(),
            r.timings.total_ms
        ),
        None => info!("no contour points to clean"),
    }

    let distortion_invertible = config.distortion.as_ref().map(|candidate| {
        let model = candidate.to_model(image.w, image.h);
        let ok = check_invertibility(&model, image.w, image.h);
        info!(
            "candidate {:?} model p1={} p2={} invertible={}",
            candidate.kind, candidate.p1, candidate.p2, ok
        );
        ok
    });

    let summary = CleanSummary {
        width: image.w,
        height: image.h,
        edge_count: edges.edges.len(),
        point_count: contours.len(),
        report,
        distortion_invertible,
        points: contours.points().map(|(_, p)| p).collect(),
    };
    write_json_file(&config.output.contours_json, &summary)?;

    println!(
        "Saved {} contour points to {}",
        summary.point_count,
        config.output.contours_json.display()
    );
    Ok(())
}

fn usage() -> String {
    "Usage: clean_contours <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CleanSummary {
    width: usize,
    height: usize,
    edge_count: usize,
    point_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<CleanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distortion_invertible: Option<bool>,
    points: Vec<ContourPoint>,
}
