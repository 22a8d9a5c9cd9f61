use anyhow::Context;
use argh::FromArgs;
use cribscore_core::{Model, ModelOptions};
use fs_err as fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

pub type Result<T> = anyhow::Result<T>;

const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(FromArgs, PartialEq, Debug)]
/// Train and query character models for ranking candidate plaintexts.
struct Args {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum Commands {
    Train(TrainArgs),
    Score(ScoreArgs),
    Info(InfoArgs),
}

#[derive(FromArgs, PartialEq, Debug)]
/// Trains a model on one or more corpus files.
#[argh(subcommand, name = "train")]
struct TrainArgs {
    /// symbols the model knows about, in code order (default: A-Z)
    #[argh(option)]
    alphabet: Option<String>,
    /// upper-case the alphabet and all input
    #[argh(switch)]
    fold: bool,
    /// free text stored with the model
    #[argh(option)]
    provenance: Option<String>,
    /// continue training this model instead of starting a new one
    #[argh(option)]
    model: Option<String>,
    /// where to write the model (default: <first corpus>.crib)
    #[argh(option)]
    out: Option<String>,
    #[argh(positional)]
    corpus: Vec<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
/// Scores texts, or each line of stdin when no text is given.
#[argh(subcommand, name = "score")]
struct ScoreArgs {
    /// the trained model
    #[argh(option)]
    model: String,
    /// print the average cost per character instead of the total
    #[argh(switch)]
    per_symbol: bool,
    #[argh(positional)]
    text: Vec<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
/// Describes a trained model.
#[argh(subcommand, name = "info")]
struct InfoArgs {
    /// the trained model
    #[argh(option)]
    model: String,
}

fn load(path: &str) -> Result<Model> {
    log::debug!("loading model '{}'", path);
    let file = fs::File::open(path)?;
    Model::load(file).with_context(|| format!("failed to load model '{}'", path))
}

fn execute(args: Args, out: &mut impl Write) -> Result<()> {
    match args.command {
        Commands::Train(args) => {
            anyhow::ensure!(!args.corpus.is_empty(), "no corpus files given");

            let mut model = match &args.model {
                Some(path) => {
                    anyhow::ensure!(
                        args.alphabet.is_none() && !args.fold,
                        "--alphabet and --fold cannot change the existing model '{}'",
                        path
                    );
                    load(path)?
                }
                None => Model::with_options(
                    args.alphabet.as_deref().unwrap_or(DEFAULT_ALPHABET),
                    ModelOptions {
                        case_fold: args.fold,
                        provenance: args.corpus.join(" "),
                        ..ModelOptions::default()
                    },
                )?,
            };
            if let Some(provenance) = &args.provenance {
                model.set_provenance(provenance.as_str());
            }

            for corpus in &args.corpus {
                log::info!("training on '{}'", corpus);
                let input_file = fs::File::open(corpus)?;
                let trained = model.train(BufReader::new(input_file))?;
                writeln!(out, "Trained {} symbols from '{}'", trained, corpus)?;
            }

            let path = args
                .out
                .unwrap_or_else(|| format!("{}.crib", &args.corpus[0]));
            let output_file = fs::File::create(&path)?;
            model.save(output_file)?;
            log::info!("wrote model '{}'", path);

            writeln!(
                out,
                "Wrote '{}' ({} symbols trained, {} rescales)",
                path,
                model.metadata().symbols_trained,
                model.metadata().rescales
            )?;

            Ok(())
        }
        Commands::Score(args) => {
            let model = load(&args.model)?;
            let score = |text: &str| {
                if args.per_symbol {
                    model.score_per_symbol(text)
                } else {
                    model.score(text)
                }
            };

            if args.text.is_empty() {
                for line in io::stdin().lock().lines() {
                    let line = line?;
                    writeln!(out, "{:.4}\t{}", score(&line), line)?;
                }
            } else {
                for text in &args.text {
                    writeln!(out, "{:.4}\t{}", score(text), text)?;
                }
            }

            Ok(())
        }
        Commands::Info(args) => {
            let model = load(&args.model)?;
            let metadata = model.metadata();
            let counts = model.counts();

            writeln!(out, "alphabet:   {:?}", model.alphabet().symbols())?;
            writeln!(
                out,
                "symbols:    {} ({} bits each)",
                model.alphabet().len(),
                model.alphabet().bits()
            )?;
            writeln!(out, "case fold:  {}", metadata.case_fold)?;
            writeln!(out, "created:    {}", metadata.created)?;
            writeln!(out, "provenance: {}", metadata.provenance)?;
            writeln!(out, "trained:    {} symbols", metadata.symbols_trained)?;
            writeln!(out, "rescales:   {}", metadata.rescales)?;
            writeln!(
                out,
                "counters:   {} of {} in use",
                counts.nonzero(),
                counts.len()
            )?;

            Ok(())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    execute(argh::from_env(), &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fs_err as fs;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn run(command: Commands) -> Result<String> {
        let mut out = vec![];
        execute(Args { command }, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn train_score_info() -> Result<()> {
        let corpus_path = PathBuf::from_str(&format!(
            "{}/../tests/corpus.txt",
            env!("CARGO_MANIFEST_DIR")
        ))?;
        let model_path = PathBuf::from_str(&format!(
            "{}/../target/corpus.crib",
            env!("CARGO_MANIFEST_DIR")
        ))?;
        if model_path.exists() {
            fs::remove_file(&model_path)?;
        }
        if let Some(dir) = model_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let model = model_path.to_string_lossy().to_string();

        // Train the model
        let output = run(Commands::Train(TrainArgs {
            alphabet: Some("ABCDEFGHIJKLMNOPQRSTUVWXYZ ".to_string()),
            fold: true,
            provenance: Some("corpus.txt".to_string()),
            model: None,
            out: Some(model.clone()),
            corpus: vec![corpus_path.to_string_lossy().to_string()],
        }))?;
        assert!(output.contains("Wrote"));
        assert!(fs::metadata(&model_path)?.len() > 0);

        // Does it prefer English?
        let output = run(Commands::Score(ScoreArgs {
            model: model.clone(),
            per_symbol: false,
            text: vec!["the keeper".to_string(), "xqzj vkwp".to_string()],
        }))?;
        let scores: Vec<f64> = output
            .lines()
            .map(|line| line.split('\t').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(scores.len(), 2);
        assert!(scores[0] < scores[1]);

        let output = run(Commands::Info(InfoArgs {
            model: model.clone(),
        }))?;
        assert!(output.contains("provenance: corpus.txt"));
        assert!(output.contains("case fold:  true"));

        // Training again continues from the saved counts
        let before = Model::load(fs::File::open(&model_path)?)?;
        run(Commands::Train(TrainArgs {
            alphabet: None,
            fold: false,
            provenance: None,
            model: Some(model.clone()),
            out: Some(model.clone()),
            corpus: vec![corpus_path.to_string_lossy().to_string()],
        }))?;
        let after = Model::load(fs::File::open(&model_path)?)?;
        assert_eq!(
            after.metadata().symbols_trained,
            2 * before.metadata().symbols_trained
        );
        assert_eq!(after.metadata().provenance, "corpus.txt");

        Ok(())
    }

    #[test]
    fn train_needs_a_corpus() {
        let result = run(Commands::Train(TrainArgs {
            alphabet: Some("AB".to_string()),
            fold: false,
            provenance: None,
            model: None,
            out: None,
            corpus: vec![],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn existing_model_keeps_its_alphabet() -> Result<()> {
        let dir = PathBuf::from_str(&format!("{}/../target", env!("CARGO_MANIFEST_DIR")))?;
        fs::create_dir_all(&dir)?;
        let corpus = dir.join("existing_model_keeps_its_alphabet.txt");
        let model = dir.join("existing_model_keeps_its_alphabet.crib");
        fs::write(&corpus, "abba baba")?;
        let corpus = corpus.to_string_lossy().to_string();
        let model = model.to_string_lossy().to_string();

        run(Commands::Train(TrainArgs {
            alphabet: Some("ab ".to_string()),
            fold: false,
            provenance: None,
            model: None,
            out: Some(model.clone()),
            corpus: vec![corpus.clone()],
        }))?;

        let again = |alphabet: Option<&str>, fold: bool| {
            run(Commands::Train(TrainArgs {
                alphabet: alphabet.map(str::to_string),
                fold,
                provenance: None,
                model: Some(model.clone()),
                out: Some(model.clone()),
                corpus: vec![corpus.clone()],
            }))
        };
        let message = format!("{:#}", again(Some("xyz"), false).unwrap_err());
        assert!(message.contains("--alphabet"));
        assert!(again(None, true).is_err());
        // Nothing was written by the rejected runs.
        assert_eq!(Model::load(fs::File::open(&model)?)?.metadata().symbols_trained, 9);

        again(None, false)?;
        assert_eq!(Model::load(fs::File::open(&model)?)?.metadata().symbols_trained, 18);
        Ok(())
    }

    #[test]
    fn missing_model_is_an_error() {
        let result = run(Commands::Info(InfoArgs {
            model: "/nonexistent/model.crib".to_string(),
        }));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("/nonexistent/model.crib"));
    }
}
