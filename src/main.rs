// Copyright @yucwang 2026

use ganache::core::params::ParameterStore;
use ganache::io::appearance_loader::load_appearance;
use ganache::io::exr_utils;
use ganache::math::constants::{Float, Vector3f};
use ganache::math::ray::Ray3f;
use ganache::model::interval::IntervalContextBuilder;
use ganache::model::mirror::VolumetricModelMirror;
use ganache::model::volumetric::VolumetricAppearanceModel;

use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <appearance.xml> <output.exr> [--width N] [--height N] [--steps N]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut width: usize = 512;
    let mut height: usize = 512;
    let mut steps: usize = 256;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                width = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(width);
            }
            "--height" => {
                i += 1;
                height = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(height);
            }
            "--steps" => {
                i += 1;
                steps = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(steps);
            }
            _ => {}
        }
        i += 1;
    }

    let params: ParameterStore = load_appearance(input_path)
        .expect("failed to load appearance description");

    let mut model = VolumetricAppearanceModel::new(IntervalContextBuilder::new(), None);
    model.commit(&params).expect("failed to commit volumetric model");

    let mirror = model.mirror().expect("no mirror after commit");
    let image = render(&mirror, width, height, steps);
    exr_utils::write_exr_to_file(&image, width, height, output_path);
}

/// March the committed snapshot from scoped worker threads, one row at a
/// time. Every thread reads the same immutable mirror.
fn render(
    mirror: &Arc<VolumetricModelMirror>,
    width: usize,
    height: usize,
    steps: usize,
) -> Vec<(Float, Float, Float)> {
    let progress = ProgressBar::new(height as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rows")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let next_row = Arc::new(AtomicUsize::new(0));
    let thread_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let (tx, rx) = mpsc::channel::<(usize, Vec<(Float, Float, Float)>)>();
    let mut output = vec![(0.0, 0.0, 0.0); width * height];

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let next_row = Arc::clone(&next_row);
            let tx = tx.clone();
            let mirror = Arc::clone(mirror);
            scope.spawn(move || loop {
                let row = next_row.fetch_add(1, Ordering::Relaxed);
                if row >= height {
                    break;
                }

                let mut pixels = Vec::with_capacity(width);
                for col in 0..width {
                    pixels.push(march_pixel(&mirror, col, row, width, height, steps));
                }
                if tx.send((row, pixels)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        for (row, pixels) in rx {
            output[row * width..(row + 1) * width].copy_from_slice(&pixels);
            progress.inc(1);
        }
    });

    progress.finish();
    output
}

/// Front-to-back compositing along an orthographic ray through the model's
/// bounding box, skipping samples the interval context marks uninteresting.
fn march_pixel(
    mirror: &VolumetricModelMirror,
    col: usize,
    row: usize,
    width: usize,
    height: usize,
    steps: usize,
) -> (Float, Float, Float) {
    let bbox = mirror.bounding_box;
    if !bbox.is_valid() {
        return (0.0, 0.0, 0.0);
    }

    let diag = bbox.diagonal();
    let u = (col as Float + 0.5) / (width as Float);
    let v = 1.0 - (row as Float + 0.5) / (height as Float);
    let origin = Vector3f::new(
        bbox.p_min.x + u * diag.x,
        bbox.p_min.y + v * diag.y,
        bbox.p_min.z - 1.0,
    );
    let ray = Ray3f::new(origin, Vector3f::new(0.0, 0.0, 1.0), Some(0.0), None);

    let (t0, t1) = match bbox.ray_intersect_range(&ray) {
        Some(range) => range,
        None => return (0.0, 0.0, 0.0),
    };

    let dt = (t1 - t0) / (steps as Float);
    let tf = &mirror.transfer_function;
    let mut color = Vector3f::new(0.0, 0.0, 0.0);
    let mut transmittance: Float = 1.0;

    for step in 0..steps {
        let t = t0 + (step as Float + 0.5) * dt;
        let value = match &mirror.sampler {
            Some(sampler) => sampler.eval(ray.at(t)),
            None => 0.0,
        };

        if let Some(context) = &mirror.interval_context {
            if !context.value_interesting(value) {
                continue;
            }
        }

        let sigma = tf.opacity(value) * mirror.density_scale;
        let alpha = 1.0 - (-sigma * dt).exp();
        color += transmittance * alpha * tf.color(value);
        transmittance *= 1.0 - alpha;
        if transmittance < 1e-4 {
            break;
        }
    }

    (color.x, color.y, color.z)
}
