use clap::{Parser, Subcommand};
use dojo_docs::{config, generate, locale, output, scan};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dojo-docs")]
#[command(about = "Static documentation site generator")]
#[command(long_about = "\
Static documentation site generator

Markdown and MDX files become pages. The file path decides the URL; the
frontmatter decides the title and the position in the sidebar.

Project structure:

  project/
  ├── config.toml                  # Site config: locales, sidebar, head, consent
  ├── public/                      # Copied verbatim to the output root
  └── src/content/docs/
      ├── index.mdx                # → /
      ├── xrpl/whats.mdx           # → /xrpl/whats/
      ├── basics/
      │   ├── index.mdx            # → /basics/ (listed first in its group)
      │   └── fees.mdx             # order: 1 in frontmatter sorts it next
      └── en/                      # English locale → /en/...
          └── xrpl/whats.mdx

Logging goes to stderr; set RUST_LOG=debug to see every indexed entry.

Run 'dojo-docs gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Project directory (contains config.toml)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".dojo-docs-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index content and build sidebars into a manifest
    Scan,
    /// Produce the HTML site from the manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate config and content without writing anything
    Check,
    /// Show which locale and entry a URL path resolves to
    Route {
        /// Request path, e.g. /en/xrpl/whats
        path: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            let manifest_path = write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
            info!("manifest written to {}", manifest_path.display());
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let report = generate::generate(&manifest_path, &cli.source, &cli.output)?;
            let manifest_content = std::fs::read_to_string(&manifest_path)?;
            let manifest: scan::Manifest = serde_json::from_str(&manifest_content)?;
            output::print_generate_output(&report, &manifest);
        }
        Command::Build => {
            info!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            info!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate_site(&manifest, &cli.source, &cli.output)?;
            output::print_generate_output(&report, &manifest);

            info!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            info!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            info!("==> Content is valid");
        }
        Command::Route { path } => {
            let manifest = scan::scan(&cli.source)?;
            let locales = manifest.locales()?;
            let collection = manifest.collection()?;
            let route = locales.route(&path);
            let entry = locale::resolve(&path, &locales, &collection);
            output::print_route(&path, &route, entry);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn write_manifest(
    manifest: &scan::Manifest,
    temp_dir: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&manifest_path, json)?;
    Ok(manifest_path)
}
