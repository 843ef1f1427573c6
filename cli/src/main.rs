use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use korpus_backend::logger;
use korpus_backend::nkjp::{SegmentationDocument, SentenceSampleStream, TextDocument};
use korpus_backend::sentence_bank::{SentenceBankDocument, SentenceBankSentenceStream};
use korpus_backend::types::SentenceSample;

#[derive(Parser, Debug)]
#[command(author, version, about = "Korpus CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print sentence samples from a sentence-bank XML file
    #[command(arg_required_else_help = true)]
    SentenceBank {
        /// Path to the sentence-bank XML file
        #[arg(value_name = "FILE_PATH", env = "KORPUS_SENTENCE_BANK")]
        path: PathBuf,

        /// Print samples as JSON lines instead of plain sentences
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Print token samples (text plus token spans) instead of sentences
        #[arg(long, default_value_t = false)]
        tokens: bool,
    },

    /// Assemble and print sentence samples from an NKJP segmentation and
    /// text document pair
    #[command(arg_required_else_help = true)]
    NkjpSentences {
        /// Path to the segmentation layer XML file
        #[arg(long, value_name = "FILE_PATH")]
        segmentation: PathBuf,

        /// Path to the text layer XML file
        #[arg(long, value_name = "FILE_PATH")]
        text: PathBuf,

        /// Print samples as JSON lines instead of plain sentences
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn print_sample(sample: &SentenceSample, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(sample)?);
    } else {
        println!("{}", sample.text);
    }
    Ok(())
}

fn sentence_bank_samples(path: &PathBuf, json: bool, tokens: bool) -> Result<()> {
    let doc = SentenceBankDocument::parse_file(path)
        .with_context(|| format!("Failed to parse sentence bank file {:?}", path))?;

    if tokens {
        for sentence in &doc.sentences {
            let sample = sentence.token_sample();
            if json {
                println!("{}", serde_json::to_string(&sample)?);
            } else {
                println!("{}", sample.text);
            }
        }
        return Ok(());
    }

    let mut stream = SentenceBankSentenceStream::new(&doc);
    while let Some(sample) = stream.read() {
        print_sample(&sample, json)?;
    }
    Ok(())
}

fn nkjp_samples(segmentation_path: &PathBuf, text_path: &PathBuf, json: bool) -> Result<()> {
    let segmentation = SegmentationDocument::parse_file(segmentation_path)
        .with_context(|| format!("Failed to parse segmentation file {:?}", segmentation_path))?;
    let text = TextDocument::parse_file(text_path)
        .with_context(|| format!("Failed to parse text file {:?}", text_path))?;

    let mut stream = SentenceSampleStream::new(&segmentation, &text);
    while let Some(sample) = stream.read()? {
        print_sample(&sample, json)?;
    }
    Ok(())
}

fn main() {
    // A .env file may set KORPUS_SENTENCE_BANK; clap picks it up through
    // the env attribute. Not having one is the normal case.
    dotenv().ok();

    logger::init_tracing();

    let cli = Cli::parse();

    let command_result = match cli.command {
        Commands::SentenceBank { path, json, tokens } => {
            sentence_bank_samples(&path, json, tokens)
        }
        Commands::NkjpSentences {
            segmentation,
            text,
            json,
        } => nkjp_samples(&segmentation, &text, json),
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
