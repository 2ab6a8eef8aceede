use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use finnet::{
    train_from_files, Hyperparameters, LocalSink, OutputPaths, OutputSink, RemoteRunSink,
};

const USAGE: &str = "\
finnet — train the fish-species classifier

Usage:
  finnet --images <idx3-file> --labels <idx1-file> [options]

Options:
  --config <file>         hyperparameters JSON (missing fields use defaults)
  --epochs <n>            number of epochs
  --learning-rate <f>     Adam learning rate
  --dropout <f>           dropout probability on hidden layers
  --batch-size <n>        samples per mini-batch
  --seed <n>              seed for split, shuffles, init, dropout
  --output-root <dir>     local artifact root (default: .)
  --remote-run            write artifacts under the remote-run outputs/ root
  --no-save               skip artifact persistence
";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let mut images: Option<PathBuf> = None;
    let mut labels: Option<PathBuf> = None;
    let mut hp = Hyperparameters::default();
    let mut output_root = PathBuf::from(".");

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next().ok_or_else(|| format!("{flag} expects a value\n\n{USAGE}"))
        };
        match arg.as_str() {
            "--images" => images = Some(PathBuf::from(value("--images")?)),
            "--labels" => labels = Some(PathBuf::from(value("--labels")?)),
            "--config" => {
                let path = value("--config")?;
                hp = Hyperparameters::load_json(&path)
                    .map_err(|e| format!("failed to load {path}: {e}"))?;
            }
            "--epochs" => hp.epochs = parse(&value("--epochs")?, "--epochs")?,
            "--learning-rate" => {
                hp.learning_rate = parse(&value("--learning-rate")?, "--learning-rate")?
            }
            "--dropout" => hp.dropout_p = parse(&value("--dropout")?, "--dropout")?,
            "--batch-size" => hp.batch_size = parse(&value("--batch-size")?, "--batch-size")?,
            "--seed" => hp.seed = parse(&value("--seed")?, "--seed")?,
            "--output-root" => output_root = PathBuf::from(value("--output-root")?),
            "--remote-run" => hp.use_remote_run = true,
            "--no-save" => hp.save_training_results = false,
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => return Err(format!("unknown argument: {other}\n\n{USAGE}")),
        }
    }

    let images = images.ok_or_else(|| format!("--images is required\n\n{USAGE}"))?;
    let labels = labels.ok_or_else(|| format!("--labels is required\n\n{USAGE}"))?;

    let sink: Box<dyn OutputSink> = if hp.use_remote_run {
        Box::new(RemoteRunSink::new())
    } else {
        Box::new(LocalSink::new(output_root))
    };
    let paths = OutputPaths::default();

    info!("Training a fish classifier");
    let history = train_from_files(&images, &labels, &hp, &paths, sink.as_ref(), None, None)
        .map_err(|e| e.to_string())?;

    if let Some(last) = history.records().last() {
        info!(
            "Finished after {} epochs; final validation accuracy {:.3}",
            history.len(),
            last.val_accuracy
        );
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value.parse().map_err(|_| format!("invalid value for {flag}: {value}"))
}
