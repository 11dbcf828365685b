use serde::Serialize;
use serde_json::Value;
use sketchflow::{
    ClassifyError, ConfigError, ConversionError, DetectorRegistry, Pipeline, PipelineConfig,
};
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Config(ConfigError),
    Conversion(ConversionError),
    Classify(ClassifyError),
    Json(serde_json::Error),
    NoDiagram,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Config(err) => write!(f, "invalid --config: {err}"),
            CliError::Conversion(err) => write!(f, "{} ({})", err, err.kind()),
            CliError::Classify(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoDiagram => write!(f, "No diagram type detected"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ConversionError> for CliError {
    fn from(value: ConversionError) -> Self {
        Self::Conversion(value)
    }
}

impl From<ClassifyError> for CliError {
    fn from(value: ClassifyError) -> Self {
        Self::Classify(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Convert,
    Detect,
    Classify,
    Normalize,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    no_measure: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectOut<'a> {
    diagram_type: &'a str,
    supported: bool,
}

fn usage() -> &'static str {
    "sketchflow-cli\n\
\n\
USAGE:\n\
  sketchflow-cli [convert] [--pretty] [--config <json>] [--no-measure] [<path>|-]\n\
  sketchflow-cli detect [<path>|-]\n\
  sketchflow-cli classify [--pretty] [--config <json>] [--no-measure] [<path>|-]\n\
  sketchflow-cli normalize [--pretty] [--config <json>] [--no-measure] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - convert reads a diagram description and prints the scene with conversion metadata.\n\
  - classify reads a generation payload (scene JSON or description text).\n\
  - normalize reads a JSON array of candidate elements.\n\
  - --config takes a JSON object merged over the default pipeline config.\n\
  - --no-measure estimates text widths from character counts.\n\
  - Set RUST_LOG (e.g. RUST_LOG=debug) to see diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "convert" => args.command = Command::Convert,
            "detect" => args.command = Command::Detect,
            "classify" => args.command = Command::Classify,
            "normalize" => args.command = Command::Normalize,
            "--pretty" => args.pretty = true,
            "--no-measure" => args.no_measure = true,
            "--config" => {
                let Some(config) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(config.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    std::io::Write::write_all(&mut out, b"\n")?;
    Ok(())
}

fn build_pipeline(args: &Args) -> Result<Pipeline, CliError> {
    let config = match args.config.as_deref() {
        Some(raw) => {
            let overrides: Value = serde_json::from_str(raw).map_err(ConfigError::from)?;
            PipelineConfig::default().with_overrides(&overrides)?
        }
        None => PipelineConfig::default(),
    };
    if args.no_measure {
        Ok(Pipeline::with_measurer(config, None))
    } else {
        Ok(Pipeline::new(config))
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber installed by an embedding process wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;

    match args.command {
        Command::Detect => {
            let kind = DetectorRegistry::default()
                .detect(&text)
                .ok_or(CliError::NoDiagram)?;
            write_json(
                &DetectOut {
                    diagram_type: kind.keyword(),
                    supported: kind.is_supported(),
                },
                args.pretty,
            )
        }
        Command::Convert => {
            let pipeline = build_pipeline(&args)?;
            let converted = pipeline.converter().convert_with_metadata(&text)?;
            write_json(&converted, args.pretty)
        }
        Command::Classify => {
            let pipeline = build_pipeline(&args)?;
            let batch = pipeline.classify(&text)?;
            write_json(&batch, args.pretty)
        }
        Command::Normalize => {
            let pipeline = build_pipeline(&args)?;
            let candidates: Value = serde_json::from_str(&text)?;
            let elements = pipeline.normalize(&candidates);
            write_json(&elements, args.pretty)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_logging();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
