use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use yt_seo_assistant::format;
use yt_seo_assistant::youtube::extract_video_id;
use yt_seo_assistant::{
    create_llm, CategoryTable, Config, ContentOptimizer, GoogleSuggestClient, KeywordVolumeSource,
    KeywordsEverywhereClient, OutputFormat, SuggestionTreeBuilder, TranscriptSelector, VideoResearch,
    YouTubeDataClient, YouTubeTranscriptClient,
};

fn language_arg() -> Arg {
    Arg::new("language")
        .short('l')
        .long("language")
        .value_name("CODE")
        .help("Search/transcript language code (defaults to config)")
}

fn keyword_arg() -> Arg {
    Arg::new("keyword")
        .value_name("KEYWORD")
        .help("Seed keyword")
        .required(true)
}

fn video_arg() -> Arg {
    Arg::new("video")
        .value_name("URL_OR_ID")
        .help("YouTube video URL or 11-character id")
        .required(true)
}

fn fanout_arg() -> Arg {
    Arg::new("fanout")
        .short('f')
        .long("fanout")
        .value_name("NUM")
        .help("Suggestions kept per level")
        .value_parser(clap::value_parser!(usize))
}

fn cli() -> Command {
    Command::new("YouTube SEO Assistant")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Keyword research and SEO optimization for YouTube videos")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print JSON instead of text")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("suggest")
                .about("List autocomplete suggestions for a keyword")
                .arg(keyword_arg())
                .arg(language_arg())
                .arg(
                    Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_name("NUM")
                        .help("Maximum suggestions to print")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("tree")
                .about("Build a two-level suggestion tree")
                .arg(keyword_arg())
                .arg(language_arg())
                .arg(fanout_arg()),
        )
        .subcommand(
            Command::new("volumes")
                .about("Search volumes of every keyword in a suggestion tree")
                .arg(keyword_arg())
                .arg(language_arg())
                .arg(fanout_arg()),
        )
        .subcommand(
            Command::new("videos")
                .about("Research the top videos for a keyword")
                .arg(keyword_arg())
                .arg(language_arg())
                .arg(
                    Arg::new("max-results")
                        .short('n')
                        .long("max-results")
                        .value_name("NUM")
                        .help("Number of videos (1-10)")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
        .subcommand(
            Command::new("optimize")
                .about("Optimize the title and description of one video")
                .arg(video_arg())
                .arg(language_arg()),
        )
        .subcommand(
            Command::new("transcript")
                .about("Print the best transcript of a video")
                .arg(video_arg())
                .arg(language_arg())
                .arg(
                    Arg::new("full")
                        .long("full")
                        .help("Do not truncate the transcript")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("transcripts")
                .about("List every caption track of a video")
                .arg(video_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Show the effective configuration")
                .arg(
                    Arg::new("init")
                        .long("init")
                        .value_name("FILE")
                        .help("Write the default configuration to FILE"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    let level = if matches.get_flag("verbose") {
        "debug".to_string()
    } else {
        config.output.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("yt_seo_assistant={0},yt_seo={0},warn", level))),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate().context("Invalid configuration")?;

    let output = if matches.get_flag("json") {
        OutputFormat::Json
    } else {
        config.output.format
    };

    match matches.subcommand() {
        Some(("suggest", sub)) => run_suggest(&config, sub, output).await,
        Some(("tree", sub)) => run_tree(&config, sub, output).await,
        Some(("volumes", sub)) => run_volumes(&config, sub, output).await,
        Some(("videos", sub)) => run_videos(&config, sub, output).await,
        Some(("optimize", sub)) => run_optimize(&config, sub, output).await,
        Some(("transcript", sub)) => run_transcript(&config, sub, output).await,
        Some(("transcripts", sub)) => run_transcripts(&config, sub, output).await,
        Some(("config", sub)) => run_config(&config, sub),
        _ => Err(anyhow!("Unknown command")),
    }
}

fn emit<T: Serialize>(output: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print!("{}", text()),
    }
    Ok(())
}

fn language<'a>(config: &'a Config, sub: &'a ArgMatches) -> &'a str {
    sub.get_one::<String>("language")
        .map(String::as_str)
        .unwrap_or(&config.youtube.default_language)
}

fn required<'a>(sub: &'a ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing argument: {}", name))
}

fn tree_builder(config: &Config) -> Result<SuggestionTreeBuilder> {
    let source = GoogleSuggestClient::new(&config.suggestions)?;
    Ok(SuggestionTreeBuilder::new(Arc::new(source))
        .with_max_concurrent(config.suggestions.max_concurrent_requests)
        .with_call_timeout(Duration::from_secs(config.suggestions.request_timeout_seconds)))
}

fn transcript_selector(config: &Config) -> Result<TranscriptSelector> {
    let client = YouTubeTranscriptClient::new(&config.youtube)?;
    Ok(TranscriptSelector::new(Arc::new(client))
        .with_translation_languages(config.transcripts.translation_eligible_languages.clone()))
}

async fn video_research(config: &Config) -> Result<VideoResearch> {
    config.require_youtube_api_key()?;
    let videos = YouTubeDataClient::new(&config.youtube)?;
    let llm: Arc<dyn yt_seo_assistant::LLM> = Arc::from(create_llm(&config.llm)?);
    let optimizer = ContentOptimizer::with_prompts(llm, &config.prompts).await;
    Ok(VideoResearch::new(
        Arc::new(videos),
        Arc::new(optimizer),
        transcript_selector(config)?,
    ))
}

fn categories(config: &Config) -> CategoryTable {
    CategoryTable::load_or_builtin(config.youtube.categories_file.as_deref())
}

fn video_id(input: &str) -> Result<String> {
    extract_video_id(input).ok_or_else(|| anyhow!("Not a YouTube video URL or id: {}", input))
}

async fn run_suggest(config: &Config, sub: &ArgMatches, output: OutputFormat) -> Result<()> {
    let keyword = required(sub, "keyword")?;
    let limit = sub
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(config.suggestions.flat_limit);

    let suggestions = tree_builder(config)?
        .suggestions(keyword, language(config, sub), limit)
        .await?;
    emit(output, &suggestions, || format::render_suggestions(keyword, &suggestions))
}

async fn run_tree(config: &Config, sub: &ArgMatches, output: OutputFormat) -> Result<()> {
    let keyword = required(sub, "keyword")?;
    let fanout = config.clamp_fanout(sub.get_one::<usize>("fanout").copied());

    let tree = tree_builder(config)?
        .build_tree(keyword, language(config, sub), fanout)
        .await?;
    emit(output, &tree, || format::render_tree(&tree))
}

async fn run_volumes(config: &Config, sub: &ArgMatches, output: OutputFormat) -> Result<()> {
    let keyword = required(sub, "keyword")?;
    let fanout = config.clamp_fanout(sub.get_one::<usize>("fanout").copied());
    let client = KeywordsEverywhereClient::new(&config.keywords)?;

    let tree = tree_builder(config)?
        .build_tree(keyword, language(config, sub), fanout)
        .await?;
    let keywords = tree.keywords();
    info!("📋 Looking up volumes for {} keywords", keywords.len());

    let volumes = client.keyword_volumes(&keywords).await?;
    emit(output, &volumes, || {
        format!("{}\n{}", format::render_tree(&tree), format::render_volumes(&volumes))
    })
}

async fn run_videos(config: &Config, sub: &ArgMatches, output: OutputFormat) -> Result<()> {
    let keyword = required(sub, "keyword")?;
    let language = language(config, sub);
    let max_results = config.clamp_max_results(sub.get_one::<usize>("max-results").copied());

    let research = video_research(config).await?;
    let reports = research.top_videos(keyword, language, max_results).await?;

    let categories = categories(config);
    let word_limit = config.transcripts.display_word_limit;
    emit(output, &reports, || {
        let mut text = format!("Top {} videos for '{}' ({})\n\n", reports.len(), keyword, language);
        for report in &reports {
            text.push_str(&format::render_video_report(report, &categories, word_limit));
            text.push('\n');
        }
        text
    })
}

async fn run_optimize(config: &Config, sub: &ArgMatches, output: OutputFormat) -> Result<()> {
    let url = required(sub, "video")?;
    let research = video_research(config).await?;
    let result = research.optimize_video(url, language(config, sub)).await?;

    let categories = categories(config);
    emit(output, &result, || format::render_optimization(&result, &categories))
}

async fn run_transcript(config: &Config, sub: &ArgMatches, output: OutputFormat) -> Result<()> {
    let video_id = video_id(required(sub, "video")?)?;
    let word_limit = if sub.get_flag("full") {
        usize::MAX
    } else {
        config.transcripts.display_word_limit
    };

    let transcript = transcript_selector(config)?
        .select_transcript(&video_id, language(config, sub))
        .await?;
    emit(output, &transcript, || format::render_transcript(&transcript, word_limit) + "\n")
}

async fn run_transcripts(config: &Config, sub: &ArgMatches, output: OutputFormat) -> Result<()> {
    let video_id = video_id(required(sub, "video")?)?;
    let catalog = transcript_selector(config)?.catalog(&video_id).await?;
    let inventory = catalog.inventory();
    emit(output, &catalog, || format::render_inventory(&video_id, &inventory))
}

fn run_config(config: &Config, sub: &ArgMatches) -> Result<()> {
    if let Some(path) = sub.get_one::<String>("init") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Err(anyhow!("Refusing to overwrite {}", path.display()));
        }
        Config::default().save(&path)?;
        info!("💾 Default configuration written to {}", path.display());
        return Ok(());
    }

    println!("{}", config.summary());
    Ok(())
}
