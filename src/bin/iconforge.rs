use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use iconforge::{FontFetcher, ResvgRasterizer, StyleDescription, StyleStore};

#[derive(Parser, Debug)]
#[command(name = "iconforge", version, about = "Parametric icon compositor")]
struct Cli {
    /// Log pipeline progress to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a style document holding the default values.
    Init {
        /// Output JSON path.
        #[arg(long)]
        out: PathBuf,
    },
    /// Render a style to SVG markup.
    Svg(RenderArgs),
    /// Render a style to a single PNG preview.
    Png {
        #[command(flatten)]
        render: RenderArgs,

        /// Edge length in pixels.
        #[arg(long, default_value_t = 256)]
        size: u32,
    },
    /// Export a style as a multi-resolution .ico file.
    Ico(RenderArgs),
    /// Print the JSON schema of style documents.
    #[cfg(feature = "jsonschema")]
    Schema,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Input style JSON. Missing keys take their defaults.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Keep the font import instead of inlining the font files.
    #[arg(long)]
    no_embed_fonts: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Init { out } => cmd_init(&out),
        Command::Svg(args) => cmd_svg(&args),
        Command::Png { render, size } => cmd_png(&render, size),
        Command::Ico(args) => cmd_ico(&args),
        #[cfg(feature = "jsonschema")]
        Command::Schema => cmd_schema(),
    }
}

fn read_style(path: Option<&Path>) -> anyhow::Result<StyleDescription> {
    let mut store = StyleStore::new();
    if let Some(path) = path {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read style '{}'", path.display()))?;
        store
            .load_json(&text)
            .with_context(|| format!("load style '{}'", path.display()))?;
    }
    Ok(store.snapshot())
}

fn font_fetcher(args: &RenderArgs) -> Option<Box<dyn FontFetcher>> {
    if args.no_embed_fonts {
        return None;
    }
    #[cfg(feature = "remote-fonts")]
    let fetcher: Option<Box<dyn FontFetcher>> = Some(Box::new(iconforge::HttpFontFetcher));
    #[cfg(not(feature = "remote-fonts"))]
    let fetcher = {
        tracing::warn!("built without remote-fonts; fonts are not embedded");
        None
    };
    fetcher
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_init(out: &Path) -> anyhow::Result<()> {
    let json = StyleStore::new().save_json()?;
    write_output(out, json.as_bytes())
}

fn cmd_svg(args: &RenderArgs) -> anyhow::Result<()> {
    let style = read_style(args.in_path.as_deref())?;
    let fonts = font_fetcher(args);
    let markup = iconforge::render_markup(&style, fonts.as_deref());
    write_output(&args.out, markup.as_bytes())
}

fn cmd_png(args: &RenderArgs, size: u32) -> anyhow::Result<()> {
    anyhow::ensure!(size > 0, "size must be at least 1 pixel");
    let style = read_style(args.in_path.as_deref())?;
    let fonts = font_fetcher(args);
    let markup = iconforge::render_markup(&style, fonts.as_deref());
    let image = ResvgRasterizer::new().render_rgba(&markup, size)?;
    let png = iconforge::raster::encode_png(&image, size)?;
    write_output(&args.out, &png)
}

fn cmd_ico(args: &RenderArgs) -> anyhow::Result<()> {
    let style = read_style(args.in_path.as_deref())?;
    let fonts = font_fetcher(args);
    let ico = iconforge::export_icon(&style, &ResvgRasterizer::new(), fonts.as_deref())?;
    write_output(&args.out, &ico)
}

#[cfg(feature = "jsonschema")]
fn cmd_schema() -> anyhow::Result<()> {
    let schema = StyleDescription::json_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
