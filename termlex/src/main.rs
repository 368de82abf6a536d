use std::env;
use std::path::Path;
use std::process;
use termlex::config::runtime::{BatchPreferences, LoggingPreferences};
use termlex::{batch, logging, LexerSpec, SubstitutionTable};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        print_usage(args.first().map(String::as_str).unwrap_or("termlex"));
        process::exit(1);
    }

    if let Err(message) = init_logging() {
        logging::safe_log_error(logging::codes::system::INITIALIZATION_FAILURE, &message);
        process::exit(1);
    }

    if let Err(error) = run(&args[1], Path::new(&args[2]), Path::new(&args[3])) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}

fn init_logging() -> Result<(), String> {
    logging::config::init_runtime_preferences(LoggingPreferences::from_env())?;
    logging::init_global_logging()?;
    termlex::log_debug!(&logging::config::get_config_summary());
    Ok(())
}

fn run(lexer: &str, input_dir: &Path, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // The table is loaded first: without it nothing can be named
    let table = SubstitutionTable::load_default()?;
    let engine = LexerSpec::parse(lexer).load()?;

    let config = batch::BatchConfig::from(&BatchPreferences::default());
    let results = batch::run(engine.as_ref(), &table, input_dir, output_dir, &config)?;

    termlex::log_info!(&results.summary());
    Ok(())
}

fn print_usage(program_name: &str) {
    eprintln!("termlex v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Tokenize every file of a directory into JSON token lists");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    {} <lexer> <input-dir> <output-dir>", program_name);
    eprintln!();
    eprintln!("ARGUMENTS:");
    eprintln!("    <lexer>         \"python3\" for the built-in lexer, otherwise a grammar file");
    eprintln!("    <input-dir>     Directory whose files are tokenized");
    eprintln!("    <output-dir>    Existing directory receiving one .json file per input");
    eprintln!();
    eprintln!("ENVIRONMENT (stderr diagnostics only, never changes the .json output):");
    eprintln!("    TERMLEX_LOG_LEVEL     error | warning | info | debug (default: warning)");
    eprintln!("    TERMLEX_LOG_FORMAT    text | json (default: text)");
    eprintln!();
    eprintln!("Substitutions are read from resources/name_substitutions.json");
}
