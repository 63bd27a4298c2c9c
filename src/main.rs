#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use mailcompat::compat::{
    ComplianceChecker, EmailClient, FeatureCategory, FeatureQuery, LevelBucket, PlatformGroup,
    SupportLevel, SupportQuery, SupportStatistics,
};
use mailcompat::config::{Config, OutputFormat};
use mailcompat::document::load_document;
use mailcompat::error::CompatError;
use nu_ansi_term::Color;
use std::env;
use std::path::Path;
use std::process;
use tracing::Level;

/// Flags shared by every command
#[derive(Debug, Default)]
struct GlobalFlags {
    json: bool,
    no_color: bool,
    verbose: bool,
}

fn main() {
    let raw: Vec<String> = env::args().skip(1).collect();

    let mut flags = GlobalFlags::default();
    let mut args = Vec::new();
    for arg in raw {
        match arg.as_str() {
            "--json" => flags.json = true,
            "--no-color" => flags.no_color = true,
            "-v" | "--verbose" => flags.verbose = true,
            _ => args.push(arg),
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if flags.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .init();

    let json = flags.json;
    match run(&args, flags) {
        Ok(code) => process::exit(code),
        Err(err) => {
            let code = match err.downcast_ref::<CompatError>() {
                Some(compat) if json => {
                    println!("{}", compat.to_json());
                    compat.exit_code()
                }
                Some(compat) => {
                    eprintln!("mailcompat: {:#}", err);
                    compat.exit_code()
                }
                None => {
                    eprintln!("mailcompat: {:#}", err);
                    3
                }
            };
            process::exit(code);
        }
    }
}

/// Commands that must work even with a broken config file
fn run_without_config(command: Option<&str>) -> Option<i32> {
    match command {
        None | Some("-h" | "--help" | "help") => {
            print_help();
            Some(0)
        }
        Some("--version") => {
            println!("mailcompat {}", env!("CARGO_PKG_VERSION"));
            Some(0)
        }
        Some(_) => None,
    }
}

fn run(args: &[String], flags: GlobalFlags) -> Result<i32> {
    if let Some(code) = run_without_config(args.first().map(String::as_str)) {
        return Ok(code);
    }

    let mut config = Config::load()?;
    if flags.json {
        config.format = OutputFormat::Json;
    }
    let use_colors = !flags.no_color && config.use_colors();
    let json = config.format == OutputFormat::Json;
    let query = SupportQuery::builtin();

    let Some(command) = args.first() else {
        return Ok(0);
    };
    let rest = &args[1..];

    match command.as_str() {
        "check" => {
            let path = rest.first().context("check requires a document path")?;
            run_check(Path::new(path), &config, json, use_colors)
        }
        "feature" => {
            let name = rest.first().context("feature requires a feature name")?;
            run_feature(query, name, json, use_colors)
        }
        "list" => run_list(query, rest, json),
        "safe" => {
            let min = parse_score_arg(rest.first(), config.safe_min_score)?;
            print_statistics(&query.safe_features(min), json, use_colors)?;
            Ok(0)
        }
        "problematic" => {
            let max = parse_score_arg(rest.first(), config.problematic_max_score)?;
            print_statistics(&query.problematic_features(max), json, use_colors)?;
            Ok(0)
        }
        "client" => {
            let id = rest.first().context("client requires a client id")?;
            run_client(query, id, json, use_colors)
        }
        "clients" => {
            run_clients(json)?;
            Ok(0)
        }
        "docs" => {
            print!("{}", query.to_markdown());
            Ok(0)
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            Ok(3)
        }
    }
}

fn print_help() {
    println!("mailcompat v{} - email client compatibility checker", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  mailcompat check <document.json>     Check a document against all clients");
    println!("  mailcompat feature <name>            Show support data for one feature");
    println!("  mailcompat list [filters]            List features");
    println!("      --category C  --min-score N  --level high|medium|low|unknown");
    println!("      --client ID   --search TEXT");
    println!("  mailcompat safe [MIN]                Features scoring at least MIN (default 75)");
    println!("  mailcompat problematic [MAX]         Features scoring at most MAX (default 40)");
    println!("  mailcompat client <id>               Support matrix for one client");
    println!("  mailcompat clients                   List client ids");
    println!("  mailcompat docs                      Print the database as Markdown");
    println!();
    println!("Flags:");
    println!("  --json        Machine-readable output");
    println!("  --no-color    Disable colours");
    println!("  -v, --verbose Debug logging on stderr");
    println!();
    println!("Exit codes: 0 clean, 1 warnings only, 2 critical issues (check); 3 usage or data errors, 4 I/O errors");
    println!();
    println!("Config: ~/.mailcompatrc (MAILCOMPAT_* keys, overridden by the environment)");
}

fn run_check(path: &Path, config: &Config, json: bool, use_colors: bool) -> Result<i32> {
    let nodes = load_document(path)?;
    let checker = ComplianceChecker::new().with_config(config.checker.clone());
    let report = checker.check_template(&nodes);

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.format_report(use_colors));
    }
    Ok(report.exit_code())
}

fn run_feature(query: SupportQuery<'_>, name: &str, json: bool, use_colors: bool) -> Result<i32> {
    let (Some(info), Some(stats), Some(summary)) = (
        query.feature_info(name),
        query.compute_statistics(name),
        query.support_summary(name),
    ) else {
        let suggestions = query.closest_features(name, 3);
        if !suggestions.is_empty() {
            eprintln!("Did you mean: {}?", suggestions.join(", "));
        }
        return Err(CompatError::UnknownFeature(name.to_string()).into());
    };
    let workarounds = query.workarounds(name, None);

    if json {
        let value = serde_json::json!({
            "info": info,
            "statistics": stats,
            "summary": summary,
            "workarounds": workarounds,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(0);
    }

    println!("{} ({})", paint(use_colors, Color::Cyan, &info.feature), info.category);
    println!("{}", info.description);
    println!();
    println!(
        "Score: {}/100 ({})  full {} / partial {} / none {} / unknown {}",
        stats.score,
        stats.level_bucket,
        stats.full_count,
        stats.partial_count,
        stats.none_count,
        stats.unknown_count
    );
    println!();
    println!("Worst case by platform:");
    for group in PlatformGroup::ALL {
        if let Some(level) = summary.groups.get(&group) {
            println!("  {:<24} {}", group.label(), paint_level(use_colors, *level));
        }
    }
    if !info.general_notes.is_empty() {
        println!();
        println!("Notes:");
        for note in &info.general_notes {
            println!("  • {}", note);
        }
    }
    if !workarounds.is_empty() {
        println!();
        println!("Workarounds:");
        for workaround in &workarounds {
            println!("  • {}", workaround);
        }
    }
    Ok(0)
}

fn run_list(query: SupportQuery<'_>, args: &[String], json: bool) -> Result<i32> {
    let mut filter = FeatureQuery::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .with_context(|| format!("{} requires a value", flag))?;
        filter = match flag {
            "--category" => filter.category(value.parse::<FeatureCategory>()?),
            "--min-score" => filter.min_score(
                value
                    .parse::<u8>()
                    .with_context(|| format!("invalid score '{}'", value))?,
            ),
            "--level" => filter.level_bucket(value.parse::<LevelBucket>()?),
            "--client" => filter.client(value.parse::<EmailClient>()?),
            "--search" => filter.search(value),
            other => anyhow::bail!("unknown list filter '{}'", other),
        };
        i += 2;
    }

    let matches = query.query_features(&filter);
    if json {
        let names: Vec<&str> = matches.iter().map(|info| info.feature.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for info in &matches {
            println!("{:<24} {:<12} {}", info.feature, info.category, info.description);
        }
        println!();
        println!("{} features", matches.len());
    }
    Ok(0)
}

fn run_client(query: SupportQuery<'_>, id: &str, json: bool, use_colors: bool) -> Result<i32> {
    let client: EmailClient = id.parse()?;
    let records = query.client_supported_features(client);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(0);
    }

    println!("{}", paint(use_colors, Color::Cyan, client.label()));
    for record in &records {
        let mut line = format!(
            "  {:<24} {}",
            record.feature,
            paint_level(use_colors, record.support.level)
        );
        if let Some(note) = record.support.notes.first() {
            line.push_str(&format!("  ({})", note));
        }
        println!("{}", line);
    }
    Ok(0)
}

fn run_clients(json: bool) -> Result<()> {
    if json {
        let clients: Vec<_> = EmailClient::ALL
            .iter()
            .map(|c| serde_json::json!({ "id": c.id(), "label": c.label() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&clients)?);
        return Ok(());
    }
    for group in PlatformGroup::ALL {
        println!("{}:", group.label());
        for client in group.members() {
            println!("  {:<22} {}", client.id(), client.label());
        }
    }
    Ok(())
}

fn print_statistics(stats: &[SupportStatistics], json: bool, use_colors: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
        return Ok(());
    }
    for s in stats {
        let color = if s.score >= 75 {
            Color::Green
        } else if s.score >= 40 {
            Color::Yellow
        } else {
            Color::Red
        };
        println!(
            "  {:<24} {:>3}  {}",
            s.feature,
            paint(use_colors, color, &s.score.to_string()),
            s.level_bucket
        );
    }
    Ok(())
}

fn parse_score_arg(arg: Option<&String>, default: u8) -> Result<u8> {
    match arg {
        Some(value) => value
            .parse::<u8>()
            .ok()
            .filter(|score| *score <= 100)
            .with_context(|| format!("expected a score between 0 and 100, found '{}'", value)),
        None => Ok(default),
    }
}

fn paint(use_colors: bool, color: Color, text: &str) -> String {
    if use_colors {
        color.paint(text).to_string()
    } else {
        text.to_string()
    }
}

fn paint_level(use_colors: bool, level: SupportLevel) -> String {
    let color = match level {
        SupportLevel::Full => Color::Green,
        SupportLevel::Partial => Color::Yellow,
        SupportLevel::None => Color::Red,
        SupportLevel::Unknown => Color::DarkGray,
    };
    paint(use_colors, color, level.as_str())
}
