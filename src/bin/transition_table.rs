use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;
use transition_table::{
    DurationMs, EngineOpts, ExportScope, MemoryHost, RowFilter, TransitionTableEngine,
    handle_request,
};

#[derive(Parser, Debug)]
#[command(name = "transition-table", version)]
struct Cli {
    /// Saved scene collection JSON.
    #[arg(long = "in", global = true, default_value = "scenes.json")]
    in_path: PathBuf,

    /// Name of the main canvas.
    #[arg(long, global = true, default_value = "Main")]
    main_canvas: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the transition used for a scene switch.
    Resolve(PairArgs),
    /// List the rules of a canvas.
    List(ListArgs),
    /// Print the rules of a canvas as a from/to grid.
    Matrix(CanvasArgs),
    /// Add or replace a rule.
    Set(SetArgs),
    /// Remove a rule.
    Erase(PairArgs),
    /// Re-key every rule referencing a scene.
    Rename(RenameArgs),
    /// Write the rules of a canvas to a file.
    Export(ExportArgs),
    /// Merge rules from a file into a canvas.
    Import(ImportArgs),
    /// Rewrite legacy transition data in the current format.
    Migrate,
    /// Manage rule sets.
    #[command(subcommand)]
    Sets(SetsCommand),
    /// Run a remote vendor request and print the response.
    Request(RequestArgs),
}

#[derive(Parser, Debug)]
struct CanvasArgs {
    /// Canvas name (defaults to the main canvas).
    #[arg(long)]
    canvas: Option<String>,
}

#[derive(Parser, Debug)]
struct PairArgs {
    #[command(flatten)]
    canvas: CanvasArgs,
    /// Source scene, or `Any`.
    #[arg(long)]
    from: String,
    /// Destination scene, or `Any`.
    #[arg(long)]
    to: String,
}

#[derive(Parser, Debug)]
struct ListArgs {
    #[command(flatten)]
    canvas: CanvasArgs,
    /// Case-insensitive filter on the source scene.
    #[arg(long, default_value = "")]
    from_filter: String,
    /// Case-insensitive filter on the destination scene.
    #[arg(long, default_value = "")]
    to_filter: String,
}

#[derive(Parser, Debug)]
struct SetArgs {
    #[command(flatten)]
    pair: PairArgs,
    /// Transition name.
    #[arg(long)]
    transition: String,
    /// Duration in milliseconds.
    #[arg(long, default_value_t = 300, allow_negative_numbers = true)]
    duration: i64,
}

#[derive(Parser, Debug)]
struct RenameArgs {
    #[command(flatten)]
    canvas: CanvasArgs,
    /// Current scene name.
    #[arg(long)]
    old: String,
    /// New scene name.
    #[arg(long)]
    new: String,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    canvas: CanvasArgs,
    /// Output file.
    #[arg(long)]
    out: PathBuf,
    /// Only export these `from:to` pairs.
    #[arg(long = "pair")]
    pairs: Vec<String>,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    #[command(flatten)]
    canvas: CanvasArgs,
    /// Rule file to merge.
    #[arg(long)]
    file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum SetsCommand {
    /// List rule sets.
    List,
    /// Create an empty set and make it current.
    New { name: String },
    /// Copy the current set and make the copy current.
    Duplicate,
    /// Rename the current set.
    Rename { name: String },
    /// Delete a set.
    Delete { name: String },
    /// Designate the default set (empty clears it).
    Default {
        name: String,
        /// Ignore the default set when choosing the starting set.
        #[arg(long)]
        ignore: Option<bool>,
    },
    /// Make a set current.
    Switch { name: String },
}

#[derive(Parser, Debug)]
struct RequestArgs {
    /// Request name (`get_transition`, `set_transition`, `get_table`).
    name: String,
    /// Request payload JSON.
    #[arg(long, default_value = "{}")]
    payload: String,
}

struct Session {
    path: PathBuf,
    collection: Map<String, Value>,
    host: MemoryHost,
    engine: TransitionTableEngine,
}

impl Session {
    fn open(path: &Path, main_canvas: &str) -> anyhow::Result<Self> {
        let f = File::open(path)
            .with_context(|| format!("open scene collection '{}'", path.display()))?;
        let collection: Map<String, Value> = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse scene collection '{}'", path.display()))?;
        let host = MemoryHost::from_collection(&collection, main_canvas);
        let engine = TransitionTableEngine::new(Arc::new(host.clone()), EngineOpts::default());
        let modules = collection
            .get("modules")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let report = engine.load(&modules);
        tracing::debug!(?report, "collection loaded");
        Ok(Self {
            path: path.to_path_buf(),
            collection,
            host,
            engine,
        })
    }

    /// Apply pending overrides and write the collection back in place.
    fn commit(mut self) -> anyhow::Result<()> {
        self.engine.run_pending();
        self.host.write_collection(&mut self.collection);
        let modules = self
            .collection
            .entry("modules")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(modules) = modules.as_object_mut() else {
            anyhow::bail!("'modules' of '{}' is not an object", self.path.display());
        };
        self.engine.save_into(modules)?;

        let f = File::create(&self.path)
            .with_context(|| format!("create '{}'", self.path.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &self.collection)
            .with_context(|| format!("write '{}'", self.path.display()))?;
        w.flush()
            .with_context(|| format!("flush '{}'", self.path.display()))?;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = Session::open(&cli.in_path, &cli.main_canvas)?;
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(&session, &args),
        Command::List(args) => cmd_list(&session, &args),
        Command::Matrix(args) => print_json(&session.engine.matrix(args.canvas.as_deref())),
        Command::Set(args) => cmd_set(session, &args),
        Command::Erase(args) => cmd_erase(session, &args),
        Command::Rename(args) => cmd_rename(session, &args),
        Command::Export(args) => cmd_export(&session, &args),
        Command::Import(args) => cmd_import(session, &args),
        Command::Migrate => cmd_migrate(session),
        Command::Sets(cmd) => cmd_sets(session, cmd),
        Command::Request(args) => cmd_request(session, &args),
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_resolve(session: &Session, args: &PairArgs) -> anyhow::Result<()> {
    let rule = session
        .engine
        .resolve(args.canvas.canvas.as_deref(), &args.from, &args.to);
    match rule {
        Some(rule) => println!("{}\t{}", rule.transition, rule.duration.as_i64()),
        None => println!("-"),
    }
    Ok(())
}

fn cmd_list(session: &Session, args: &ListArgs) -> anyhow::Result<()> {
    let filter = RowFilter {
        from: args.from_filter.clone(),
        to: args.to_filter.clone(),
    };
    print_json(&session.engine.rows(args.canvas.canvas.as_deref(), &filter))
}

fn cmd_set(session: Session, args: &SetArgs) -> anyhow::Result<()> {
    session.engine.set_rule(
        args.pair.canvas.canvas.as_deref(),
        &args.pair.from,
        &args.pair.to,
        &args.transition,
        DurationMs::from_i64(args.duration),
    )?;
    session.commit()
}

fn cmd_erase(session: Session, args: &PairArgs) -> anyhow::Result<()> {
    session
        .engine
        .try_erase_rule(args.canvas.canvas.as_deref(), &args.from, &args.to)?;
    session.commit()
}

fn cmd_rename(session: Session, args: &RenameArgs) -> anyhow::Result<()> {
    let canvas = session.engine.canvas_or_main(args.canvas.canvas.as_deref());
    let moved = session.engine.rename_scene(&canvas, &args.old, &args.new);
    eprintln!("moved {moved} rule(s)");
    session.commit()
}

fn cmd_export(session: &Session, args: &ExportArgs) -> anyhow::Result<()> {
    let pairs = args
        .pairs
        .iter()
        .map(|p| {
            p.split_once(':')
                .map(|(f, t)| (f.to_string(), t.to_string()))
                .with_context(|| format!("pair '{p}' is not 'from:to'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let scope = if pairs.is_empty() {
        ExportScope::Whole
    } else {
        ExportScope::Selected(pairs)
    };
    let n = session
        .engine
        .export(args.canvas.canvas.as_deref(), &args.out, &scope)?;
    eprintln!("wrote {n} rule(s) to {}", args.out.display());
    Ok(())
}

fn cmd_import(session: Session, args: &ImportArgs) -> anyhow::Result<()> {
    let n = session
        .engine
        .import(args.canvas.canvas.as_deref(), &args.file)?;
    eprintln!("imported {n} rule(s)");
    session.commit()
}

fn cmd_migrate(session: Session) -> anyhow::Result<()> {
    eprintln!("{} rule(s) in current format", session.engine.len());
    session.commit()
}

fn cmd_sets(session: Session, cmd: SetsCommand) -> anyhow::Result<()> {
    let engine = &session.engine;
    match cmd {
        SetsCommand::List => {
            let current = engine.current_set();
            let default = engine.default_set().unwrap_or_default();
            for name in engine.set_names() {
                let mark = if name == current { "*" } else { " " };
                let tag = if name == default { " (default)" } else { "" };
                println!("{mark} {name}{tag}");
            }
            return Ok(());
        }
        SetsCommand::New { name } => engine.new_set(&name)?,
        SetsCommand::Duplicate => {
            let name = engine.duplicate_set();
            eprintln!("created '{name}'");
        }
        SetsCommand::Rename { name } => engine.rename_set(&name)?,
        SetsCommand::Delete { name } => engine.delete_set(&name)?,
        SetsCommand::Default { name, ignore } => {
            engine.set_default(&name)?;
            if let Some(ignore) = ignore {
                engine.set_ignore_default(ignore);
            }
        }
        SetsCommand::Switch { name } => {
            engine.switch_set(&name)?;
        }
    }
    session.commit()
}

fn cmd_request(session: Session, args: &RequestArgs) -> anyhow::Result<()> {
    let payload: Value =
        serde_json::from_str(&args.payload).with_context(|| "parse request payload JSON")?;
    let response = handle_request(&session.engine, &args.name, &payload);
    print_json(&response)?;
    if args.name == "set_transition" && response["success"] == true {
        session.commit()?;
    }
    Ok(())
}
