//! Model inspector: loads a scene fixture, prints its bones and clips,
//! and plays a clip for a few frames.
//!
//! Usage: cargo run --bin inspect_model -- --scene <PATH> [OPTIONS]
//!
//! Options:
//!   --scene <PATH>     Scene JSON to load (required)
//!   --config <PATH>    Animation config JSON (default: built-in defaults)
//!   --clip <NAME>      Clip to play (default: first clip)
//!   --seconds <S>      Playback length in seconds (default: 1.0)
//!   --fps <N>          Ticks per second of the simulated loop (default: 30)

use std::path::PathBuf;
use std::process::ExitCode;

use glam::Mat4;

use bonework::animation::gpu;
use bonework::core::{logging, AnimationConfig, Error};
use bonework::model::{Model, SourceScene};

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(scene_path) = parse_str_arg(&args, "--scene").map(PathBuf::from) else {
        eprintln!("Usage: inspect_model --scene <PATH> [--config <PATH>] [--clip <NAME>] [--seconds <S>] [--fps <N>]");
        return ExitCode::FAILURE;
    };
    let config_path = parse_str_arg(&args, "--config").map(PathBuf::from);
    let clip_name = parse_str_arg(&args, "--clip");
    let seconds = parse_f32_arg(&args, "--seconds").unwrap_or(1.0);
    let fps = parse_u32_arg(&args, "--fps").unwrap_or(30).max(1);

    match run(scene_path, config_path, clip_name, seconds, fps) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(
    scene_path: PathBuf,
    config_path: Option<PathBuf>,
    clip_name: Option<String>,
    seconds: f32,
    fps: u32,
) -> bonework::core::Result<()> {
    let config = match config_path {
        Some(path) => AnimationConfig::load(&path)?,
        None => AnimationConfig::default(),
    };
    let scene = SourceScene::load(&scene_path)?;
    let model = Model::load(&scene, &config)?;

    println!("Bones ({}):", model.catalog().len());
    for (id, name) in model.catalog().iter() {
        let skinned = model.catalog().info(id).is_some_and(|info| info.skinned);
        println!("  {:>3}  {}{}", id, name, if skinned { "" } else { "  (animation only)" });
    }

    println!("Meshes ({}):", model.meshes().len());
    for mesh in model.meshes() {
        println!(
            "  {}: {} vertices, {} indices, {} influences dropped, {} unskinned",
            mesh.name,
            mesh.vertices.len(),
            mesh.indices.len(),
            mesh.weight_stats.dropped,
            mesh.weight_stats.unskinned_vertices
        );
    }

    println!("Clips ({}):", model.clips().len());
    for clip in model.clips() {
        println!(
            "  {}: {} ticks @ {} ticks/s ({:.2}s), {} tracks",
            clip.name(),
            clip.duration(),
            clip.ticks_per_second(),
            clip.duration_seconds(),
            clip.bones().len()
        );
    }

    let clip = match clip_name {
        Some(name) => match model.clip(&name) {
            Some(clip) => Some(clip.clone()),
            None => return Err(Error::Animation(format!("No clip named '{}'", name))),
        },
        None => model.clips().first().cloned(),
    };
    let Some(clip) = clip else {
        log::info!("No clip to play");
        return Ok(());
    };

    let mut animator = model.animator();
    animator.play(clip.clone());

    let dt = 1.0 / fps as f32;
    let frames = (seconds * fps as f32).ceil() as u32;
    for _ in 0..frames {
        animator.update(dt, Mat4::IDENTITY);
    }

    let palette = animator.gpu_matrices();
    log::info!(
        "Palette upload: {} matrices, {} bytes",
        palette.len(),
        gpu::as_bytes(&palette).len()
    );

    println!("After {} frames of '{}' (t = {:.2} ticks):", frames, clip.name(), animator.current_time());
    for (id, name) in model.catalog().iter().take(animator.capacity()) {
        let (_, rotation, translation) = animator.final_bone_matrices()[id].to_scale_rotation_translation();
        let (axis, angle) = rotation.to_axis_angle();
        println!(
            "  {:>3}  {:<24} t=({:.3}, {:.3}, {:.3}) r={:.1}deg about ({:.2}, {:.2}, {:.2})",
            id,
            name,
            translation.x,
            translation.y,
            translation.z,
            angle.to_degrees(),
            axis.x,
            axis.y,
            axis.z
        );
    }

    Ok(())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
