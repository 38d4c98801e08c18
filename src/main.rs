//! Printworks CLI

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use printworks::{
    config::{LoggingConfig, StoreConfig},
    fixtures::CartFixture,
    materials::MaterialKind,
    observability::init_subscriber,
    session::Session,
};

#[derive(Debug, Parser)]
#[command(name = "printworks", about = "Print quotes and carts", long_about = None)]
struct Cli {
    /// Store settings file (YAML)
    #[arg(short, long, env = "PRINTWORKS_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Quote a single print
    Quote(QuoteArgs),

    /// Build a cart from a fixture file and print its summary
    Cart(CartArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Print material
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = MaterialKind::Pla)]
    material: MaterialKind,

    /// Estimated weight in grams
    #[arg(short, long)]
    weight: f64,
}

#[derive(Debug, Args)]
struct CartArgs {
    /// Cart fixture file (YAML)
    file: PathBuf,

    /// Additional listing URLs to import
    #[arg(short, long = "import")]
    imports: Vec<String>,
}

fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = init_subscriber(&cli.logging) {
        report(&error.to_string());

        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);

            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "CLI error reporting")]
fn report(error: &str) {
    eprintln!("{error}");
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .map_err(|error| format!("failed to load {}: {error}", path.display()))?,
        None => StoreConfig::default(),
    };

    let session = config.session().map_err(|error| error.to_string())?;

    match cli.command {
        Commands::Quote(args) => quote(&session, &args),
        Commands::Cart(args) => cart(session, &args),
    }
}

#[expect(clippy::print_stdout, reason = "CLI output")]
fn quote(session: &Session, args: &QuoteArgs) -> Result<(), String> {
    let quote = session
        .compute_quote(args.material, args.weight)
        .map_err(|error| error.to_string())?;

    println!(
        "Material:   {} ({})",
        quote.material(),
        quote.material().description()
    );
    println!("Weight:     {}g", quote.weight_grams().normalize());
    println!("Rate:       {}/g", quote.material_rate());
    println!("Base fee:   {}", quote.base_fee());
    println!("Estimate:   {}", quote.total());

    Ok(())
}

fn cart(mut session: Session, args: &CartArgs) -> Result<(), String> {
    let fixture = CartFixture::load(&args.file)
        .map_err(|error| format!("failed to load {}: {error}", args.file.display()))?;

    fixture
        .apply(&mut session)
        .map_err(|error| error.to_string())?;

    for url in &args.imports {
        session.import_url(url).map_err(|error| error.to_string())?;
    }

    let summary = session.summary().map_err(|error| error.to_string())?;

    summary
        .write_to(io::stdout().lock())
        .map_err(|error| error.to_string())
}
