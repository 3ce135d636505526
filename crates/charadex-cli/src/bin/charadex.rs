use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use charadex_cli::commands::{config_ops, default_data_path, query_ops, store_ops};
use charadex_cli::trace_init::init_tracing;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Parser)]
#[command(name = "charadex", about = "Chinese character and vocabulary tracker")]
struct Cli {
    /// Snapshot file (default: storage.data_file from settings)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Custom settings TOML file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Directory for the JSON trace log (requires --features trace)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install the reference vocabulary from a HanziDB NDJSON file
    Seed {
        /// HanziDB NDJSON file
        hanzi: PathBuf,
        /// Number of most frequent characters to keep
        #[arg(long)]
        max: Option<usize>,
    },
    /// Ingest an extraction JSON file ("-" for stdin)
    Ingest {
        /// Extraction JSON file
        input: String,
        /// Source locator (URL) of the text
        #[arg(long)]
        source: String,
    },
    /// Extract raw text with an external program and ingest the result
    Capture {
        /// Raw text file ("-" for stdin)
        input: String,
        /// Source locator (URL) of the text
        #[arg(long)]
        source: String,
        /// Extraction program: reads text on stdin, writes JSON on stdout
        #[arg(long)]
        oracle: String,
        /// Arguments passed to the extraction program
        #[arg(last = true)]
        oracle_args: Vec<String>,
    },
    /// Remove all words and sentences and reset character counts
    Clear,
    /// Show a character with its words
    Char {
        character: char,
        #[arg(long)]
        json: bool,
    },
    /// Show a word with its sentences
    Word {
        word: String,
        #[arg(long)]
        json: bool,
    },
    /// Show a sentence segmented into its words
    Sentence {
        /// Sentence id
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// List characters in frequency order with seen counts
    Characters {
        /// HanziDB NDJSON file defining the order
        #[arg(long)]
        hanzi: Option<PathBuf>,
        /// Maximum number of characters
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only characters seen at least once
        #[arg(long)]
        seen: bool,
        #[arg(long)]
        json: bool,
    },
    /// Segment text against the stored words
    Segment { text: String },
    /// Show entity counts
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.log_dir.as_deref());
    if let Some(path) = &cli.settings {
        let content = die!(
            fs::read_to_string(path),
            "Error reading {}: {}",
            path.display()
        );
        die!(
            charadex_core::settings::init_custom(content),
            "Error in settings: {}"
        );
    }
    let data = cli.data.unwrap_or_else(default_data_path);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Command::Seed { hanzi, max } => store_ops::seed(&mut out, &data, &hanzi, max),
        Command::Ingest { input, source } => store_ops::ingest(&mut out, &data, &input, &source),
        Command::Capture {
            input,
            source,
            oracle,
            oracle_args,
        } => store_ops::capture(&mut out, &data, &oracle, &oracle_args, &input, &source),
        Command::Clear => store_ops::clear(&mut out, &data),
        Command::Char { character, json } => query_ops::char_cmd(&mut out, &data, character, json),
        Command::Word { word, json } => query_ops::word_cmd(&mut out, &data, &word, json),
        Command::Sentence { id, json } => query_ops::sentence_cmd(&mut out, &data, &id, json),
        Command::Characters {
            hanzi,
            limit,
            seen,
            json,
        } => query_ops::characters_cmd(&mut out, &data, hanzi.as_deref(), limit, seen, json),
        Command::Segment { text } => query_ops::segment_cmd(&mut out, &data, &text),
        Command::Stats { json } => store_ops::stats(&mut out, &data, json),
        Command::SettingsExport => config_ops::settings_export(&mut out),
        Command::SettingsValidate { file } => config_ops::settings_validate(&mut out, &file),
    };
    die!(result, "Error: {}");
}
