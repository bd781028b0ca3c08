use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{debug, info};
use pulse_rs::ast::{Value, ValuePath};
use pulse_rs::environment::Stage;
use pulse_rs::units::Quantity;
use pulse_rs::{Environment, Program, Settings};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::IntoEnumIterator;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Parse a pulse sequence and print its canonical rendering.
    Parse { file: PathBuf },

    /// Compile a pulse sequence and print its waveforms as JSON.
    Compile {
        file: PathBuf,

        /// A TOML settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overrides the sample rate of the settings, e.g. "1.2 GHz".
        #[arg(long, value_parser = Quantity::from_str)]
        sample_rate: Option<Quantity>,

        /// Binds a value after the values stage, e.g. `--set pulse.length="8 ns"`.
        #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_binding)]
        bindings: Vec<(ValuePath, Value)>,

        /// Stops after the given stage.
        #[arg(long, default_value_t = Stage::Waveforms, value_parser = Stage::from_str)]
        until: Stage,

        /// Pretty-prints the JSON output.
        #[arg(long)]
        pretty: bool,
    },
}

fn parse_binding(text: &str) -> anyhow::Result<(ValuePath, Value)> {
    let (path, value) = text
        .split_once('=')
        .with_context(|| format!("expected PATH=VALUE, found {text:?}"))?;
    let path = ValuePath::from_str(path.trim()).context("invalid value path")?;
    let value = match Value::from_str(value.trim()) {
        Ok(value) => value,
        Err(never) => match never {},
    };
    Ok((path, value))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Parse { file } => handle_parse(&file)?,
        Command::Compile {
            file,
            config,
            sample_rate,
            bindings,
            until,
            pretty,
        } => {
            let mut settings = load_settings(config.as_deref())?;
            if let Some(sample_rate) = sample_rate {
                settings = settings.with_sample_rate(sample_rate);
            }
            settings.validate().context("Invalid settings.")?;
            handle_compile(&file, settings, bindings, until, pretty)?
        }
    };

    Ok(())
}

fn read_program(file: &Path) -> anyhow::Result<Program> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}.", file.display()))?;
    Program::from_str(&source).with_context(|| format!("Failed to parse {}.", file.display()))
}

fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(config) = config else {
        return Ok(Settings::default());
    };
    let text = std::fs::read_to_string(config)
        .with_context(|| format!("Failed to read settings from {}.", config.display()))?;
    let settings: Settings = toml::from_str(&text)
        .with_context(|| format!("Failed to parse settings from {}.", config.display()))?;
    debug!("loaded settings from {}: {settings:?}", config.display());
    Ok(settings)
}

fn handle_parse(file: &Path) -> anyhow::Result<()> {
    let program = read_program(file)?;
    print!("{program}");
    Ok(())
}

fn handle_compile(
    file: &Path,
    settings: Settings,
    bindings: Vec<(ValuePath, Value)>,
    until: Stage,
    pretty: bool,
) -> anyhow::Result<()> {
    let env = compile(file, settings, &bindings, until)?;

    if until < Stage::Waveforms {
        for diagnostic in env.errors() {
            eprintln!("{diagnostic}");
        }
        for path in env.missing_values() {
            eprintln!("missing value: {path}");
        }
        return Ok(());
    }

    let json = if pretty {
        serde_json::to_string_pretty(env.waveforms())?
    } else {
        serde_json::to_string(env.waveforms())?
    };
    println!("{json}");
    Ok(())
}

/// Run the stages up to `until`, binding `bindings` once the values stage has run.
fn compile(
    file: &Path,
    settings: Settings,
    bindings: &[(ValuePath, Value)],
    until: Stage,
) -> anyhow::Result<Environment> {
    let program = read_program(file)?;
    let mut env = Environment::new(settings);

    for stage in Stage::iter().take_while(|stage| *stage <= until) {
        if stage == Stage::Waveforms && !env.errors().is_empty() {
            for diagnostic in env.errors() {
                eprintln!("{diagnostic}");
            }
            bail!("{} found in {}.", problems(env.errors().len()), file.display());
        }

        env.run(stage, &program)
            .with_context(|| format!("Failed to compile {}.", file.display()))?;

        if stage == Stage::Values {
            for (path, value) in bindings {
                info!("setting {path} = {value}");
                env.set_value(path.clone(), value.clone())?;
            }
        }
    }

    Ok(env)
}

fn problems(count: usize) -> String {
    match count {
        1 => "1 problem".to_owned(),
        count => format!("{count} problems"),
    }
}
