use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courtside::chart::{ChartArtifact, ChartSink, VegaLiteChart};
use courtside::config::Config;
use courtside::error::CourtsideError;
use courtside::llm::LlmProvider;
use courtside::models::{StatType, TrendSeries};
use courtside::repository::{MemoryQueryHistory, ProviderPlayerRepository};
use courtside::services::{QueryParser, QueryPipeline, StatsAnalyzer};
use courtside::stats::{HttpStatsProvider, StatsProvider};

const UNEXPECTED_ERROR_MESSAGE: &str = "予期しないエラーが発生しました。しばらくしてから再度お試しください。";

#[derive(Parser)]
#[command(name = "courtside")]
#[command(about = "Ask questions about NBA player statistics")]
struct Args {
    /// Print machine-readable JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer one or more questions, e.g. "2024-25のレブロンのスタッツは?"
    Ask {
        #[arg(required = true)]
        questions: Vec<String>,

        /// Print the last N answered questions afterwards
        #[arg(long)]
        history: Option<usize>,
    },
    /// List players whose name contains TEXT
    Search { text: String },
    /// Plot a player's career trend for one statistic
    Trend {
        player: String,

        #[arg(long, default_value = "PTS")]
        stat: StatType,

        /// Print the chart document instead of saving it
        #[arg(long)]
        stdout: bool,
    },
    /// Compare two players over one season
    Compare {
        first: String,
        second: String,

        #[arg(long)]
        season: Option<String>,
    },
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courtside=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Refusing to start");
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }

    tracing::info!("Initializing stats provider: {}...", config.stats.base_url);
    let provider: Arc<dyn StatsProvider> = Arc::new(HttpStatsProvider::new(&config.stats)?);
    let players = Arc::new(ProviderPlayerRepository::new(provider, &config.stats).await);

    tracing::info!("Initializing LLM provider: {}...", config.llm.model);
    let llm = LlmProvider::new(Some(&config.llm));
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - answers will use fallback text");
    }

    let pipeline = QueryPipeline::new(
        QueryParser::new(llm.clone(), &config.parser),
        StatsAnalyzer::new(llm),
        players,
        Arc::new(MemoryQueryHistory::new(config.pipeline.history_capacity)),
        &config.pipeline,
    );

    if let Err(e) = run(args.command, args.json, &pipeline, &config).await {
        let external = e
            .downcast_ref::<CourtsideError>()
            .is_some_and(CourtsideError::is_external);
        tracing::error!(error = %e, external, "Command failed");
        eprintln!("{UNEXPECTED_ERROR_MESSAGE}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, json: bool, pipeline: &QueryPipeline, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Ask { questions, history } => {
            for question in &questions {
                let result = pipeline.execute(question).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!("{}\n", result.answer);
                }
            }

            if let Some(limit) = history {
                let recent = pipeline.recent_history(limit).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&recent)?);
                } else {
                    for entry in recent {
                        println!(
                            "[{}] {} ({})",
                            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            entry.query.text,
                            entry.data_source
                        );
                    }
                }
            }
        }
        Command::Search { text } => {
            let players = pipeline.search_players(&text).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&players)?);
            } else if players.is_empty() {
                println!("'{text}' に一致するプレイヤーは見つかりませんでした。");
            } else {
                for player in players {
                    println!("{:>8}  {}  {}", player.id, player.name, player.team);
                }
            }
        }
        Command::Trend { player, stat, stdout } => {
            let Some(series) = pipeline.trend(&player, stat).await else {
                println!("プレイヤー '{player}' が見つかりませんでした。");
                return Ok(());
            };
            if series.is_empty() {
                println!("{}のキャリアデータが見つかりませんでした。", series.player_name);
                return Ok(());
            }

            let sink = if stdout {
                VegaLiteChart::in_memory()
            } else {
                VegaLiteChart::to_dir(&config.chart.output_dir)
            };
            let artifact = sink
                .publish(&series)
                .await
                .with_context(|| format!("rendering trend chart for {}", series.player_name))?;

            match artifact {
                ChartArtifact::Inline(document) => {
                    println!("{}", serde_json::to_string_pretty(&document)?);
                }
                ChartArtifact::File(path) => {
                    if json {
                        println!("{}", serde_json::json!({ "series": series, "chart": path }));
                    } else {
                        print_series(&series);
                        println!("グラフを保存しました: {}", path.display());
                    }
                }
            }
        }
        Command::Compare { first, second, season } => {
            let answer = pipeline.compare(&first, &second, season.as_deref()).await;
            if json {
                println!("{}", serde_json::json!({ "answer": answer }));
            } else {
                println!("{answer}");
            }
        }
    }

    Ok(())
}

fn print_series(series: &TrendSeries) {
    println!("{}", series.title());
    for point in &series.points {
        println!("  {}  {}", point.season, series.stat.format_value(point.value));
    }
    if let Some(peak) = series.peak() {
        println!("最高: {} ({})", peak.season, series.stat.format_value(peak.value));
    }
}
