use serde::Serialize;
use std::{env, fs};
use strainline::{
    about,
    catalog::StrainCatalog,
    engine::{Engine, EventOutcome, LineageEngine, SessionConfig, SessionEvent, SessionScript},
    lineage_svg::export_lineage_svg,
    render::{NullView, summarize_graph},
};

fn usage() {
    eprintln!(
        "Usage:\n  \
  strainline_cli --version\n  \
  strainline_cli [FLAGS] capabilities\n  \
  strainline_cli [FLAGS] catalog-summary\n  \
  strainline_cli [FLAGS] lookup ID\n  \
  strainline_cli [FLAGS] explore ID[,ID...]\n  \
  strainline_cli [FLAGS] session '<script-json>'\n  \
  strainline_cli [FLAGS] render-svg OUTPUT.svg [--select ID[,ID...]]\n\n  \
  Flags:\n  \
  --catalog PATH   load the strain catalog from a JSON file\n  \
  --initial IDS    comma-separated initial view (default: dd,melon,sundae)\n\n  \
  Tip: pass @file.json instead of inline JSON"
    );
}

#[derive(Serialize)]
struct CatalogSummary {
    strain_count: usize,
    strains: Vec<String>,
    lint_findings: Vec<String>,
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

struct GlobalFlags {
    catalog_path: Option<String>,
    initial: Option<Vec<String>>,
}

fn parse_global_flags(args: &[String]) -> Result<(GlobalFlags, usize), String> {
    let mut flags = GlobalFlags {
        catalog_path: None,
        initial: None,
    };
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--catalog" => {
                let value = args
                    .get(idx + 1)
                    .ok_or_else(|| "--catalog requires a path".to_string())?;
                flags.catalog_path = Some(value.clone());
                idx += 2;
            }
            "--initial" => {
                let value = args
                    .get(idx + 1)
                    .ok_or_else(|| "--initial requires a comma-separated id list".to_string())?;
                flags.initial = Some(parse_id_list(value));
                idx += 2;
            }
            _ => break,
        }
    }
    Ok((flags, idx))
}

fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_catalog(flags: &GlobalFlags) -> Result<StrainCatalog, String> {
    match &flags.catalog_path {
        Some(path) => StrainCatalog::from_json_file(path).map_err(|e| e.to_string()),
        None => Ok(strainline::CATALOG.clone()),
    }
}

fn build_engine(flags: &GlobalFlags) -> Result<LineageEngine, String> {
    let catalog = load_catalog(flags)?;
    let mut config = SessionConfig::default();
    if let Some(initial) = &flags.initial {
        config.initial = initial.clone();
    }
    let engine = LineageEngine::new(catalog, config);
    for warning in engine.construction_report() {
        eprintln!("Warning: {warning}");
    }
    Ok(engine)
}

fn report_warnings(outcomes: &[EventOutcome]) {
    for outcome in outcomes {
        for warning in &outcome.warnings {
            eprintln!("Warning: {warning}");
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let (flags, cmd_idx) = parse_global_flags(&args)?;
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }

    let command = &args[cmd_idx];

    match command.as_str() {
        "capabilities" => print_json(&LineageEngine::capabilities()),
        "catalog-summary" => {
            let catalog = load_catalog(&flags)?;
            print_json(&CatalogSummary {
                strain_count: catalog.len(),
                strains: catalog.names_sorted(),
                lint_findings: catalog.lint(),
            })
        }
        "lookup" => {
            let id = args.get(cmd_idx + 1).ok_or_else(|| {
                usage();
                "lookup requires a strain id".to_string()
            })?;
            let catalog = load_catalog(&flags)?;
            let record = catalog
                .lookup(id)
                .ok_or_else(|| format!("Strain '{id}' not found in catalog"))?;
            print_json(record)
        }
        "explore" => {
            let ids = args.get(cmd_idx + 1).ok_or_else(|| {
                usage();
                "explore requires a comma-separated id list".to_string()
            })?;
            let mut engine = build_engine(&flags)?;
            let script = SessionScript {
                session_id: "explore".to_string(),
                events: parse_id_list(ids)
                    .into_iter()
                    .map(|id| SessionEvent::NodeSelected { id })
                    .collect(),
            };
            let outcomes = engine.apply_script(script, &mut NullView);
            report_warnings(&outcomes);
            print_json(&summarize_graph(engine.snapshot(), engine.catalog()))
        }
        "session" => {
            let json = args.get(cmd_idx + 1).ok_or_else(|| {
                usage();
                "Missing session script JSON".to_string()
            })?;
            let json = load_json_arg(json)?;
            let script: SessionScript = serde_json::from_str(&json)
                .map_err(|e| format!("Invalid session script JSON: {e}"))?;
            let mut engine = build_engine(&flags)?;
            let outcomes = engine.apply_script(script, &mut NullView);
            print_json(&outcomes)
        }
        "render-svg" => {
            let output = args.get(cmd_idx + 1).ok_or_else(|| {
                usage();
                "render-svg requires an output path".to_string()
            })?;
            let mut engine = build_engine(&flags)?;
            if args.get(cmd_idx + 2).map(String::as_str) == Some("--select") {
                let ids = args
                    .get(cmd_idx + 3)
                    .ok_or_else(|| "--select requires a comma-separated id list".to_string())?;
                let script = SessionScript {
                    session_id: "render".to_string(),
                    events: parse_id_list(ids)
                        .into_iter()
                        .map(|id| SessionEvent::NodeSelected { id })
                        .collect(),
                };
                let outcomes = engine.apply_script(script, &mut NullView);
                report_warnings(&outcomes);
            }
            let svg = export_lineage_svg(engine.snapshot(), engine.catalog(), engine.layout());
            fs::write(output, svg)
                .map_err(|e| format!("Could not write SVG output '{output}': {e}"))?;
            println!(
                "Wrote lineage SVG ({} strains) to '{output}'",
                engine.snapshot().node_count()
            );
            Ok(())
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
