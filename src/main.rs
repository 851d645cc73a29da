use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

// 导入库模块
use qa_enricher::config::Config;
use qa_enricher::dataset::{read_jsonl, write_jsonl};
use qa_enricher::services::{DatasetBuilder, QaEnricher};
use qa_enricher::utils::logging;

#[derive(Parser)]
#[command(version = "0.1.0", author = "GraphDB Contributors")]
enum Cli {
    /// Enrich every configured source and write the question/answer datasets
    Build {
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Enrich a single JSONL file against one database
    Enrich {
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
        #[arg(short, long)]
        database: String,
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write the default configuration to a file
    InitConfig { file: PathBuf },
}

/// 配置文件不存在时使用默认配置
fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path).with_context(|| format!("failed to load {}", path.display()))?
    } else {
        eprintln!("{} not found, using default configuration", path.display());
        Config::default()
    };
    config.apply_env();
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Cli::InitConfig { file } = &cli {
        Config::default()
            .save(file)
            .with_context(|| format!("failed to write {}", file.display()))?;
        println!("Default configuration written to {}", file.display());
        return Ok(());
    }

    let config_path = match &cli {
        Cli::Build { config } | Cli::Enrich { config, .. } => config.clone(),
        Cli::InitConfig { file } => file.clone(),
    };
    let config = load_config(&config_path)?;
    logging::init(&config.log).context("failed to initialize logging")?;

    let outcome = run(cli, config).await;
    logging::shutdown();
    outcome
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli {
        Cli::Build { .. } => {
            let builder = DatasetBuilder::http(config.neo4j, config.dataset);
            let report = builder.build_from_input().await?;
            for source in &report.sources {
                println!(
                    "{:<20} {:>6} rows  {:>6} answered",
                    source.name, source.stats.total, source.filtered
                );
            }
            println!("UNFILTERED DATASET SIZE IS: {}", report.unfiltered_total);
            println!("FILTERED DATASET SIZE IS: {}", report.filtered_total);
        }
        Cli::Enrich {
            database,
            input,
            output,
            ..
        } => {
            let items = read_jsonl(&input)?;
            let enricher = QaEnricher::connect(&config.neo4j, &database).await?;
            let pass = enricher
                .enrich_with_outcomes(items, &config.dataset.query_field, &config.dataset.answer_field)
                .await?;
            enricher.close();
            write_jsonl(&output, &pass.items)?;
            println!(
                "{} rows written to {} ({} answered)",
                pass.stats.total,
                output.display(),
                pass.stats.answered
            );
        }
        Cli::InitConfig { .. } => {}
    }
    Ok(())
}
