use crate::config::{Config, SortKey, load_config};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::model::Entity;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "memviz", version, about = "Memory-model box diagrams as SVG or PNG")]
pub struct Args {
    /// Input file (JSON or JSON5 entity list) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, metrics, presets)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width; raised when the content needs more
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Order of the object grid
    #[arg(long = "sortBy", value_enum)]
    pub sort_by: Option<SortArg>,

    /// Write the placed entities, with coordinates and sizes, as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Height,
    Id,
    None,
}

impl SortArg {
    fn key(self) -> Option<SortKey> {
        match self {
            SortArg::Height => Some(SortKey::Height),
            SortArg::Id => Some(SortKey::Id),
            SortArg::None => None,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.layout.width = Some(width);
    }
    if let Some(sort) = args.sort_by {
        config.layout.sort_by = sort.key();
    }

    let input = read_input(args.input.as_deref())?;
    let snapshots = parse_snapshots(&input)?;

    if snapshots.len() == 1 {
        let svg = render_snapshot(&snapshots[0], &config, args.dump_layout.as_deref())?;
        match args.output_format {
            OutputFormat::Svg => {
                write_output_svg(&svg, args.output.as_deref())?;
            }
            OutputFormat::Png => {
                let output = ensure_output(&args.output, "png")?;
                write_output_png(&svg, &output, &config.render)?;
            }
        }
        return Ok(());
    }

    // Several snapshots: one numbered output per snapshot
    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, snapshots.len())?;
    for (idx, entities) in snapshots.iter().enumerate() {
        let dump = args
            .dump_layout
            .as_deref()
            .map(|base| numbered_path(base, idx, "json"));
        let svg = render_snapshot(entities, &config, dump.as_deref())?;
        match args.output_format {
            OutputFormat::Svg => {
                write_output_svg(&svg, Some(&outputs[idx]))?;
            }
            OutputFormat::Png => {
                write_output_png(&svg, &outputs[idx], &config.render)?;
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn render_snapshot(entities: &[Entity], config: &Config, dump: Option<&Path>) -> Result<String> {
    let layout = compute_layout(entities, &config.theme, &config.presets, &config.layout)?;
    if let Some(path) = dump {
        write_layout_dump(path, &layout)
            .with_context(|| format!("writing layout dump to {}", path.display()))?;
    }
    Ok(render_svg(&layout, &config.render))
}

/// A top-level array of arrays is a sequence of snapshots; any other array is
/// a single batch.
fn parse_snapshots(input: &str) -> Result<Vec<Vec<Entity>>> {
    let value: Value = json5::from_str(input).context("input is not valid JSON or JSON5")?;
    let Value::Array(items) = value else {
        anyhow::bail!("input must be a list of entities");
    };
    if !items.is_empty() && items.iter().all(Value::is_array) {
        return items
            .into_iter()
            .enumerate()
            .map(|(idx, snapshot)| {
                serde_json::from_value(snapshot)
                    .with_context(|| format!("snapshot {} is not a valid entity list", idx + 1))
            })
            .collect();
    }
    Ok(vec![serde_json::from_value(Value::Array(items))?])
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base =
        output.ok_or_else(|| anyhow::anyhow!("Output path required for multi-snapshot input"))?;
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| base.join(format!("snapshot-{}.{}", idx + 1, ext)))
            .collect());
    }
    Ok((0..count).map(|idx| numbered_path(base, idx, ext)).collect())
}

/// `out/diagram.svg` becomes `out/diagram-{idx + 1}.{ext}`.
fn numbered_path(base: &Path, idx: usize, ext: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("snapshot");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}-{}.{}", stem, idx + 1, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    #[test]
    fn single_batch_is_one_snapshot() {
        let snapshots = parse_snapshots(
            r#"[
                {type: "int", id: 1, value: 5},   // JSON5 comments are fine
                {type: ".frame", name: "main", value: {x: 1}},
            ]"#,
        )
        .unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].len(), 2);
        assert_eq!(snapshots[0][1].kind, EntityKind::Frame);
    }

    #[test]
    fn array_of_arrays_is_several_snapshots() {
        let snapshots = parse_snapshots(
            r#"[[{"type": "int", "id": 1, "value": 5}], [{"type": "str", "id": 2, "value": "a"}]]"#,
        )
        .unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1][0].kind.as_str(), "str");
    }

    #[test]
    fn non_list_input_is_rejected() {
        assert!(parse_snapshots(r#"{"type": "int"}"#).is_err());
        assert!(parse_snapshots("not json").is_err());
    }

    #[test]
    fn numbered_outputs_keep_the_parent() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/model.svg")), OutputFormat::Png, 2).unwrap();
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/model-1.png"), PathBuf::from("out/model-2.png")]
        );
        assert!(resolve_multi_outputs(None, OutputFormat::Svg, 2).is_err());
    }
}
