use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;

use quire_diff::{diff, unified};
use quire_merge::{merge, MergeOptions};
use quire_server::{QuireServer, ServerConfig};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Diff(args) => cmd_diff(args, &cli.format),
        Command::MergeFile(args) => cmd_merge_file(args, &cli.format),
        Command::Config(args) => cmd_config(args, &cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!("Quire server on {}", config.bind_addr.to_string().bold());
    QuireServer::new(config).serve().await?;
    Ok(())
}

fn cmd_diff(args: DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let base = read(&args.base)?;
    let other = read(&args.other)?;
    let result = diff(&base, &other);

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if result.is_identical() {
        println!("No changes.");
        return Ok(());
    }
    if !args.stat {
        print!("{}", colorize(&unified(&base, &other, args.context)));
    }
    println!("{}", result.stats().to_string().bold());
    Ok(())
}

/// Color a unified diff for the terminal.
fn colorize(patch: &str) -> String {
    patch
        .split_inclusive('\n')
        .map(|line| {
            if line.starts_with("+++") || line.starts_with("---") {
                line.bold().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else {
                line.to_string()
            }
        })
        .collect()
}

fn merge_options(args: &MergeFileArgs) -> anyhow::Result<MergeOptions> {
    let mut options = load_config(args.config.as_deref())?.engine.merge;
    if let Some(label) = &args.fork_label {
        options.fork_label = label.clone();
    }
    if let Some(label) = &args.upstream_label {
        options.upstream_label = label.clone();
    }
    options.show_base |= args.show_base;
    Ok(options)
}

fn cmd_merge_file(args: MergeFileArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let options = merge_options(&args)?;
    let base = read(&args.base)?;
    let fork = read(&args.fork)?;
    let upstream = read(&args.upstream)?;

    let outcome = merge(&base, &fork, &upstream, &options);
    match (&args.output, format) {
        (Some(path), _) => fs::write(path, &outcome.content)
            .with_context(|| format!("writing {}", path.display()))?,
        (None, OutputFormat::Json) => println!("{}", serde_json::to_string_pretty(&outcome)?),
        (None, OutputFormat::Text) => print!("{}", outcome.content),
    }

    if !outcome.is_clean() {
        eprintln!(
            "{} {} conflicting region(s)",
            "✗".red().bold(),
            outcome.conflicts.len()
        );
        bail!("merge has {} conflict(s)", outcome.conflicts.len());
    }
    if args.output.is_some() {
        println!("{} Merged cleanly.", "✓".green().bold());
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn merge_args(base: PathBuf, fork: PathBuf, upstream: PathBuf, output: PathBuf) -> MergeFileArgs {
        MergeFileArgs {
            base,
            fork,
            upstream,
            output: Some(output),
            config: None,
            fork_label: None,
            upstream_label: None,
            show_base: false,
        }
    }

    #[test]
    fn colorize_keeps_text() {
        colored::control::set_override(false);
        let patch = "--- base\n+++ other\n@@ -1 +1 @@\n-a\n+b\n";
        assert_eq!(colorize(patch), patch);
    }

    #[test]
    fn merge_file_writes_clean_result() {
        let dir = tempfile::tempdir().unwrap();
        let base = write(dir.path(), "base", "a\nb\nc\n");
        let fork = write(dir.path(), "fork", "A\nb\nc\n");
        let upstream = write(dir.path(), "upstream", "a\nb\nC\n");
        let out = dir.path().join("out");

        cmd_merge_file(merge_args(base, fork, upstream, out.clone()), &OutputFormat::Text).unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), "A\nb\nC\n");
    }

    #[test]
    fn merge_file_fails_on_conflict_but_writes_markers() {
        let dir = tempfile::tempdir().unwrap();
        let base = write(dir.path(), "base", "a\n");
        let fork = write(dir.path(), "fork", "b\n");
        let upstream = write(dir.path(), "upstream", "c\n");
        let out = dir.path().join("out");

        let err = cmd_merge_file(merge_args(base, fork, upstream, out.clone()), &OutputFormat::Text)
            .unwrap_err();
        assert!(err.to_string().contains("1 conflict"));
        assert!(fs::read_to_string(out).unwrap().contains("<<<<<<< fork"));
    }

    #[test]
    fn labels_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "quire.toml", "[engine.merge]\nfork_label = \"mine\"\nupstream_label = \"theirs\"\n");
        let mut args = merge_args(PathBuf::new(), PathBuf::new(), PathBuf::new(), PathBuf::new());
        args.config = Some(config);
        args.upstream_label = Some("sim".into());

        let options = merge_options(&args).unwrap();
        assert_eq!(options.fork_label, "mine");
        assert_eq!(options.upstream_label, "sim");
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let args = DiffArgs {
            base: dir.path().join("nope"),
            other: dir.path().join("nope2"),
            context: 3,
            stat: false,
        };
        let err = cmd_diff(args, &OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
