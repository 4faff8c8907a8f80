//! predsql: translate predicates to SQL and run them
//!
//! # Usage
//!
//! ```bash
//! # Show the WHERE clause and its parameters
//! predsql translate SomeEntity 'x => x.anInt == 5 && x.aString == "foo"'
//!
//! # Captured variables
//! predsql translate SomeEntity 'x => x.anInt == $limit' --var limit=10
//!
//! # Run against a database
//! predsql fetch SomeEntity 'x => x.aBool' --database-url sqlite://app.db
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use predsql::config::Config;
use predsql::parser::parse_literal;
use predsql::prelude::*;

#[derive(Parser)]
#[command(name = "predsql")]
#[command(author = "predsql Contributors")]
#[command(version)]
#[command(about = "Typed predicates to parameterized SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    predsql translate SomeEntity 'x => x.anInt == 5'
    predsql translate SomeEntity 'x.anInt > $min' 'x.aString == null' --word or --var min=3
    predsql explain SomeEntity 'x => !(x.anInt < 5)'
    predsql count SomeEntity 'x => x.aBool' --database-url sqlite://app.db")]
struct Cli {
    /// Config file (defaults to ./predsql.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQL dialect, overriding the config file
    #[arg(short, long, global = true)]
    dialect: Option<Dialect>,

    /// Membership rendering: expand, native_array, table_valued
    #[arg(short, long, global = true)]
    membership: Option<MembershipStrategy>,

    /// Database connection URL
    #[arg(long, global = true, env = "PREDSQL_DATABASE_URL")]
    database_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(clap::Args)]
struct PredicateArgs {
    /// Entity the predicates range over
    entity: String,

    /// One or more predicates, e.g. 'x => x.anInt == 5'
    #[arg(required = true)]
    predicates: Vec<String>,

    /// Word joining several predicates
    #[arg(short, long, default_value = "and")]
    word: ConjunctionWord,

    /// Captured variable as name=literal, e.g. --var limit=10
    #[arg(long = "var", value_name = "NAME=LITERAL")]
    vars: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the WHERE clause and its parameters
    Translate {
        #[command(flatten)]
        args: PredicateArgs,

        /// Use the dialect's native placeholders instead of @k
        #[arg(short, long)]
        native: bool,
    },
    /// Show the parsed tree and the SQL for every dialect
    Explain {
        #[command(flatten)]
        args: PredicateArgs,
    },
    /// List supported dialects
    Dialects,
    /// Fetch matching rows
    Fetch {
        #[command(flatten)]
        args: PredicateArgs,
    },
    /// Count matching rows
    Count {
        #[command(flatten)]
        args: PredicateArgs,
    },
    /// Check whether any row matches
    Exists {
        #[command(flatten)]
        args: PredicateArgs,
    },
    /// Delete matching rows
    Delete {
        #[command(flatten)]
        args: PredicateArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::discover(cli.config.as_deref()).context("loading config")?;
    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }
    if let Some(membership) = cli.membership {
        config.membership = membership;
    }
    if cli.database_url.is_some() {
        config.database_url = cli.database_url.clone();
    }
    let converters = ConverterRegistry::with_builtins();

    match cli.command {
        Commands::Translate { args, native } => {
            let schema = schema_for(&config, &converters, &args)?;
            let t = compile(&config, config.dialect, &schema, &args)?;
            let sql = if native {
                t.to_native_sql(config.dialect.generator())
            } else {
                t.sql()
            };
            match cli.format {
                OutputFormat::Json => {
                    let out = serde_json::json!({ "sql": sql, "params": t.params() });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                OutputFormat::Table => {
                    println!("{}", sql.cyan());
                    print_params(t.params());
                }
            }
        }
        Commands::Explain { args } => {
            let schema = schema_for(&config, &converters, &args)?;
            println!("{}", "Parsed Structure:".cyan().bold());
            for p in parse_all(&args)? {
                println!("  {}", p.to_string().white());
                println!("{}", format!("{:#?}", p).dimmed());
            }
            println!();
            println!("{}", "Generated SQL:".green().bold());
            for dialect in Dialect::ALL {
                let line = match compile(&config, dialect, &schema, &args) {
                    Ok(t) => t.to_native_sql(dialect.generator()).white().to_string(),
                    Err(e) => e.to_string().red().to_string(),
                };
                println!("  {:<10} {}", dialect.name().yellow(), line);
            }
        }
        Commands::Dialects => {
            for dialect in Dialect::ALL {
                let g = dialect.generator();
                let marker = if dialect == config.dialect { "*" } else { " " };
                println!(
                    "{} {:<10} {}  {}",
                    marker.green(),
                    dialect.name().yellow(),
                    g.quote_identifier("column"),
                    g.placeholder(1).dimmed()
                );
            }
        }
        Commands::Fetch { args } => {
            let db = connect(&config).await?;
            let schema = schema_for(&config, &converters, &args)?;
            let predicates = parse_all(&args)?;
            let rows = Entities::new(&db, &schema)
                .with_membership(config.membership)
                .fetch_any(&args.entity, args.word, &predicates)
                .await?;
            format_output(&rows, &cli.format);
        }
        Commands::Count { args } => {
            let db = connect(&config).await?;
            let schema = schema_for(&config, &converters, &args)?;
            let predicate = single_predicate(&args)?;
            let n = Entities::new(&db, &schema)
                .with_membership(config.membership)
                .count(&args.entity, &predicate)
                .await?;
            println!("{}", n.to_string().cyan());
        }
        Commands::Exists { args } => {
            let db = connect(&config).await?;
            let schema = schema_for(&config, &converters, &args)?;
            let predicate = single_predicate(&args)?;
            let found = Entities::new(&db, &schema)
                .with_membership(config.membership)
                .exists(&args.entity, &predicate)
                .await?;
            println!("{}", if found { "true".green() } else { "false".red() });
        }
        Commands::Delete { args } => {
            let db = connect(&config).await?;
            let schema = schema_for(&config, &converters, &args)?;
            let predicate = single_predicate(&args)?;
            let n = Entities::new(&db, &schema)
                .with_membership(config.membership)
                .delete(&args.entity, &predicate)
                .await?;
            println!("{} row(s) deleted", n.to_string().cyan());
        }
    }

    Ok(())
}

/// The configured schema. An undeclared entity is added with the members
/// its predicates read, each mapped to a column of the same name.
fn schema_for(config: &Config, converters: &ConverterRegistry, args: &PredicateArgs) -> Result<Schema> {
    let schema = config.schema(converters).context("building schema")?;
    if schema.contains_entity(&args.entity) {
        return Ok(schema);
    }
    let mut members = Vec::new();
    for p in parse_all(args)? {
        entity_members(&p, &mut members);
    }
    let def = members
        .iter()
        .fold(EntityDef::new(&args.entity), |def, m| def.member(MemberDef::new(m)));
    let mut config = config.clone();
    config.entities.push(def);
    Ok(config.schema(converters)?)
}

/// Single-segment entity members read anywhere in `p`, without duplicates.
fn entity_members(p: &Predicate, out: &mut Vec<String>) {
    let mut add = |o: &Operand| {
        if let Some(member) = o.entity_path().and_then(|path| path.single())
            && !out.iter().any(|m| m == member)
        {
            out.push(member.to_string());
        }
    };
    match p {
        Predicate::Compare { left, right, .. } => {
            add(left);
            add(right);
        }
        Predicate::IsNull(o) | Predicate::IsNotNull(o) | Predicate::Truth(o) => add(o),
        Predicate::Membership { item, .. } => add(item),
        Predicate::Not(inner) => entity_members(inner, out),
        Predicate::And(l, r) | Predicate::Or(l, r) => {
            entity_members(l, out);
            entity_members(r, out);
        }
    }
}

fn variables(args: &PredicateArgs) -> Result<Variables> {
    let mut vars = Variables::new();
    for raw in &args.vars {
        let Some((name, literal)) = raw.split_once('=') else {
            bail!("invalid --var '{}': expected NAME=LITERAL", raw);
        };
        let name = name.trim().trim_start_matches('$');
        let value = parse_literal(literal).with_context(|| format!("value of ${}", name))?;
        vars.insert(name, value);
    }
    Ok(vars)
}

fn parse_all(args: &PredicateArgs) -> Result<Vec<Predicate>> {
    let vars = variables(args)?;
    args.predicates
        .iter()
        .map(|text| parse_predicate(text, &vars).with_context(|| format!("parsing '{}'", text)))
        .collect()
}

/// The predicates folded with `--word` into one tree.
fn single_predicate(args: &PredicateArgs) -> Result<Predicate> {
    let predicates = parse_all(args)?;
    let folded = match args.word {
        ConjunctionWord::And => all(predicates),
        ConjunctionWord::Or => any(predicates),
    };
    folded.context("no predicate given")
}

fn compile(
    config: &Config,
    dialect: Dialect,
    schema: &Schema,
    args: &PredicateArgs,
) -> Result<Translation> {
    let predicates = parse_all(args)?;
    let translator = Translator::for_schema(dialect.generator(), schema)
        .with_membership(config.membership);
    Ok(translator.compile_all(&args.entity, args.word, &predicates)?)
}

async fn connect(config: &Config) -> Result<PredDB> {
    let Some(url) = config.database_url.as_deref() else {
        bail!("no database URL: pass --database-url, set PREDSQL_DATABASE_URL or add database_url to the config");
    };
    Ok(PredDB::connect(url).await?)
}

fn print_params(params: &[Value]) {
    if params.is_empty() {
        println!("{}", "(no parameters)".dimmed());
        return;
    }
    for (i, p) in params.iter().enumerate() {
        println!("  {} {} {}", format!("@{}", i).yellow(), p, format!("({})", p.value_type()).dimmed());
    }
}

fn format_output(results: &[Row], format: &OutputFormat) {
    if results.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(results).unwrap_or_default());
        }
        OutputFormat::Table => {
            let mut columns: Vec<&String> = results[0].keys().collect();
            columns.sort();

            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in results {
                for (w, col) in widths.iter_mut().zip(&columns) {
                    let len = row.get(*col).map(val_to_string).unwrap_or_default().len();
                    *w = (*w).max(len);
                }
            }

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:width$}", c, width = w))
                .collect();
            println!("{}", header.join(" │ ").white().bold());

            let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
            println!("{}", sep.join("─┼─").dimmed());

            for row in results {
                let cells: Vec<String> = columns
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| {
                        let val = row.get(*c).map(val_to_string).unwrap_or_default();
                        format!("{:width$}", val, width = w)
                    })
                    .collect();
                println!("{}", cells.join(" │ "));
            }

            println!();
            println!("{} row(s) returned", results.len().to_string().cyan());
        }
    }
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
