// SPDX-License-Identifier: MPL-2.0
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use ts_catalog::catalog::{self, Catalog, DuplicatePolicy};
use ts_catalog::config::{self, Config};
use ts_catalog::export::{self, ExportFormat};
use ts_catalog::i18n::I18n;
use ts_catalog::lint::{self, LintOptions};
use ts_catalog::{diff, paths, Translator};

const HELP: &str = "\
tscat - inspect and convert Qt Linguist translation catalogs

USAGE:
    tscat [OPTIONS] <COMMAND> [ARGS]

COMMANDS:
    lookup <file.ts> <context> <source>   Translate one string from a catalog
    tr <context> <source>                 Translate using bundled and configured catalogs
    check <file.ts>...                    Lint catalogs; exits 1 on errors
    export <file.ts>                      Write a catalog as ts, json or ftl
    diff <old.ts> <new.ts>                Compare catalogs ignoring line drift; exits 1 on changes
    merge <out.ts> <file.ts>...           Merge catalogs into one file
    stats <file.ts>...                    Print message counts

OPTIONS:
    --lang <LOCALE>          Locale for `tr` (default: config, then OS locale)
    --config-dir <DIR>       Override the config directory
    --policy <first|last>    Duplicate resolution (default: config, then last)
    --comment <TEXT>         Disambiguation comment for `lookup`
    -n <COUNT>               Pick a plural form for `lookup`
    --format <ts|json|ftl>   Output format for `export` (default: ts)
    -o, --output <FILE>      Output file for `export` (default: stdout)
    --missing-location       `check` also reports entries without <location>
    --json                   `stats` prints JSON
    -v, --verbose            Debug logging (RUST_LOG overrides)
    -h, --help               Print this help
";

struct Options {
    lang: Option<String>,
    policy: Option<DuplicatePolicy>,
    comment: Option<String>,
    count: Option<u64>,
    format: ExportFormat,
    output: Option<PathBuf>,
    missing_location: bool,
    json: bool,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return ExitCode::SUCCESS;
    }
    init_logging(args.contains(["-v", "--verbose"]));

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(mut args: pico_args::Arguments) -> CliResult<ExitCode> {
    paths::init_cli_overrides(args.opt_value_from_str("--config-dir")?);

    let options = Options {
        lang: args.opt_value_from_str("--lang")?,
        policy: args.opt_value_from_str("--policy")?,
        comment: args.opt_value_from_str("--comment")?,
        count: args.opt_value_from_str("-n")?,
        format: args
            .opt_value_from_str("--format")?
            .unwrap_or(ExportFormat::Ts),
        output: args.opt_value_from_str(["-o", "--output"])?,
        missing_location: args.contains("--missing-location"),
        json: args.contains("--json"),
    };

    let mut free = args.finish().into_iter();
    let Some(command) = free.next().and_then(|s| s.into_string().ok()) else {
        print!("{HELP}");
        return Ok(ExitCode::FAILURE);
    };
    let rest: Vec<OsString> = free.collect();
    let config = config::load().unwrap_or_else(|err| {
        log::warn!("using default config: {err}");
        Config::default()
    });
    let policy = options.policy.unwrap_or_else(|| config.duplicate_policy());

    match command.as_str() {
        "lookup" => {
            let [file, context, source] = positional::<3>(&rest, "lookup <file.ts> <context> <source>")?;
            let catalog = catalog::read_file(file)?;
            let translator = Translator::from_catalog(&catalog, policy);
            let context = context.to_string_lossy();
            let source = source.to_string_lossy();
            let text = match options.count {
                Some(n) => translator.translate_plural(&context, &source, n),
                None => translator.translate_disambiguated(&context, &source, options.comment.as_deref()),
            };
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        "tr" => {
            let [context, source] = positional::<2>(&rest, "tr <context> <source>")?;
            let i18n = I18n::with_catalog_dirs(options.lang, &config)?;
            let context = context.to_string_lossy();
            let source = source.to_string_lossy();
            println!("{}", i18n.tr(&context, &source));
            Ok(ExitCode::SUCCESS)
        }
        "check" => {
            require_some(&rest, "check <file.ts>...")?;
            let lint_options = LintOptions {
                missing_location: options.missing_location || config.lint_missing_location(),
            };
            let mut failed = false;
            for file in &rest {
                let path = PathBuf::from(file);
                match catalog::read_file(&path) {
                    Ok(catalog) => {
                        let findings = lint::lint(&catalog, lint_options);
                        for finding in &findings {
                            println!("{}: {finding}", path.display());
                        }
                        failed |= lint::has_errors(&findings);
                    }
                    Err(err) => {
                        println!("{err}");
                        failed = true;
                    }
                }
            }
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }
        "export" => {
            let [file] = positional::<1>(&rest, "export <file.ts>")?;
            let catalog = catalog::read_file(file)?;
            let rendered = export::render(&catalog, options.format)?;
            match options.output {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, rendered)?;
                }
                None => print!("{rendered}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        "diff" => {
            let [old, new] = positional::<2>(&rest, "diff <old.ts> <new.ts>")?;
            let result = diff::diff(&catalog::read_file(old)?, &catalog::read_file(new)?);
            println!("{result}");
            Ok(if result.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        "merge" => {
            if rest.len() < 2 {
                return Err("usage: tscat merge <out.ts> <file.ts>...".into());
            }
            let mut merged = Catalog::new();
            for file in &rest[1..] {
                let report = merged.merge(&catalog::read_file(file)?, policy);
                log::info!(
                    "{}: {} added, {} replaced, {} kept",
                    PathBuf::from(file).display(),
                    report.added,
                    report.replaced,
                    report.kept
                );
            }
            catalog::write_file(&merged, &rest[0])?;
            println!("{}", merged.stats());
            Ok(ExitCode::SUCCESS)
        }
        "stats" => {
            require_some(&rest, "stats <file.ts>...")?;
            let mut all = std::collections::BTreeMap::new();
            for file in &rest {
                let path = PathBuf::from(file);
                let stats = catalog::read_file(&path)?.stats();
                if !options.json {
                    println!("{}: {stats}", path.display());
                }
                all.insert(path.display().to_string(), stats);
            }
            if options.json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        other => Err(format!("unknown command '{other}', see --help").into()),
    }
}

fn positional<'a, const N: usize>(
    rest: &'a [OsString],
    usage: &str,
) -> CliResult<[&'a OsString; N]> {
    if rest.len() != N {
        return Err(format!("usage: tscat {usage}").into());
    }
    Ok(std::array::from_fn(|i| &rest[i]))
}

fn require_some(rest: &[OsString], usage: &str) -> CliResult<()> {
    if rest.is_empty() {
        return Err(format!("usage: tscat {usage}").into());
    }
    Ok(())
}
