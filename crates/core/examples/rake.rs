use std::{fs, path::PathBuf};

use clap::Parser;
use code_raker::{
    Options, Preset as PresetInner,
    rake::{RakeOutput, rake_all, render_chunk, transform},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Library,
    Application,
}

impl From<Preset> for PresetInner {
    fn from(value: Preset) -> Self {
        match value {
            Preset::Library => PresetInner::Library,
            Preset::Application => PresetInner::Application,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Pass {
    /// `debugger` statements, `console` calls and comments
    #[default]
    All,
    /// `debugger` statements and `console` calls only
    Module,
    /// Comments only
    Chunk,
}

#[derive(Parser, Debug)]
#[command(name = "rake")]
#[command(about = "Remove debugger statements, console calls and comments from JavaScript", long_about = None)]
struct Args {
    /// Path to the source file to transform
    input: PathBuf,

    /// Output path for transformed source (defaults to stdout)
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Output path for the sourcemap (defaults to <out>.map if --out is provided)
    #[arg(long)]
    out_sourcemap: Option<PathBuf>,

    /// Preset that unset options fall back to (default: remove everything)
    #[arg(long, short)]
    preset: Option<Preset>,

    /// JSON file with raking options; --preset overrides its "preset" field
    #[arg(long)]
    options: Option<PathBuf>,

    /// Which removals to run
    #[arg(long, value_enum, default_value_t)]
    pass: Pass,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let source = fs::read_to_string(&args.input)?;

    let mut options = match &args.options {
        Some(path) => Options::from_json(&fs::read_to_string(path)?)?,
        None => Options::default(),
    };
    if let Some(preset) = args.preset {
        options = options.with_preset(preset.into());
    }
    let config = options.resolve();

    let source_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let rake = match args.pass {
        Pass::All => rake_all,
        Pass::Module => transform,
        Pass::Chunk => render_chunk,
    };
    let output = rake(&source, source_name, &config)?;

    let out_map_path = args.out_sourcemap.clone().or_else(|| {
        args.out
            .as_ref()
            .map(|out| PathBuf::from(format!("{}.map", out.display())))
    });

    let out_code = match output {
        Some(RakeOutput { code, map }) => {
            if let Some(out_map_path) = out_map_path {
                fs::write(out_map_path, map)?;
            }
            code
        }
        None => source,
    };

    match &args.out {
        None => {
            print!("{out_code}");
        }
        Some(out) => {
            fs::write(out, out_code)?;
        }
    }

    Ok(())
}
