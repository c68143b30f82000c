use anyhow::{Context, Result};
use clap::Parser;
use color_palette_wasm::Palette;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Count the colors of images and print the most used ones.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors to print; all colors when omitted
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Read every k-th row only (about 50 rows per image) instead of every pixel
    #[arg(short, long)]
    sampled: bool,

    /// Print JSON instead of `#RRGGBB count` lines
    #[arg(short, long)]
    json: bool,
}

fn load(path: &Path, sampled: bool) -> Result<Palette> {
    if sampled {
        let img = image::open(path)?;
        Ok(Palette::from_rows(&img)?)
    } else {
        Ok(Palette::from_path(path)?)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut reports = Vec::new();
    for input in &args.inputs {
        let palette = load(input, args.sampled)
            .with_context(|| format!("palette extraction failed for {}", input.display()))?;
        let colors = palette.most_used_colors(args.limit);

        if args.json {
            let entries: Vec<_> = colors
                .iter()
                .map(|(color, count)| json!({ "color": color.to_hex(), "count": count }))
                .collect();
            reports.push(json!({
                "file": input.display().to_string(),
                "distinct": palette.len(),
                "pixels": palette.total_pixels(),
                "colors": entries,
            }));
        } else {
            if args.inputs.len() > 1 {
                println!("{}:", input.display());
            }
            for (color, count) in colors {
                println!("{color} {count}");
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}
