use clap::Parser;
use std::path::PathBuf;
use tazanet_classifiers::ModelBackend;
use tazanet_core::AgeClass;

#[derive(Parser, Debug, Default)]
#[command(name = "tazanet")]
#[command(author, version, about = "TazaNet content-safety gate")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TAZANET_CONFIG", default_value = "tazanet.yaml")]
    pub config: PathBuf,

    /// Toxicity model backend: lexicon or bert
    #[arg(short, long, value_parser = parse_backend)]
    pub backend: Option<ModelBackend>,

    /// Fix the starting age class: adult or child
    #[arg(short, long, value_parser = parse_age)]
    pub age: Option<AgeClass>,

    /// Classify queries as typed, without translating to English
    #[arg(long)]
    pub no_translate: bool,

    /// Replay face detections from a file (one frame per line)
    #[arg(long)]
    pub faces: Option<PathBuf>,

    /// Replay speech transcripts from a file (one utterance per line)
    #[arg(long)]
    pub transcripts: Option<PathBuf>,

    /// Log allowed searches instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

fn parse_backend(s: &str) -> Result<ModelBackend, String> {
    s.parse()
}

fn parse_age(s: &str) -> Result<AgeClass, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "tazanet",
            "--backend",
            "lexicon",
            "--age",
            "child",
            "--no-translate",
            "--no-browser",
            "-v",
        ]);

        assert_eq!(cli.backend, Some(ModelBackend::Lexicon));
        assert_eq!(cli.age, Some(AgeClass::Child));
        assert!(cli.no_translate);
        assert!(cli.no_browser);
        assert!(cli.verbose);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["tazanet", "--backend", "gpt"]).is_err());
    }
}
