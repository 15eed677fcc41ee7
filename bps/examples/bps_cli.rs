#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use bps::{apply_file, ApplyConfig, PatchFile, PatchInfo, TargetCheck};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "BPS CLI - Inspect and apply BPS binary patches")]
struct Cli {
    /// Read inputs into memory instead of memory-mapping them
    #[arg(long, global = true)]
    no_mmap: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Show sizes, checksums, metadata and an action summary
    Info {
        /// Patch file
        patch: std::path::PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every action in the stream
    Actions {
        /// Patch file
        patch: std::path::PathBuf,
    },
    /// Apply a patch to a source file
    Apply {
        /// Patch file
        patch: std::path::PathBuf,

        /// Source file the patch was made against
        source: std::path::PathBuf,

        /// Where to write the target
        output: std::path::PathBuf,

        /// Write the target even if its checksum does not match
        #[arg(long)]
        advisory: bool,

        /// Largest target to allocate, in MiB
        #[arg(long, default_value_t = 256)]
        max_target_mib: u64,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start_time = std::time::Instant::now();
    let config = ApplyConfig::default().with_mmap(!cli.no_mmap);

    match &cli.command {
        Commands::Info { patch, json } => {
            let file = PatchFile::open_with(patch, &config)?;
            let info = PatchInfo::collect(&file)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print!("{info}");
            }
        }
        Commands::Actions { patch } => {
            let file = PatchFile::open_with(patch, &config)?;
            let mut output_offset = 0u64;
            for (index, action) in file.patch()?.actions().enumerate() {
                let action = action?;
                println!(
                    "{index:>8}  @{output_offset:<10} {:<10} len {:<8} {}",
                    action.kind(),
                    action.length(),
                    describe(&action)
                );
                output_offset = output_offset.saturating_add(action.length());
            }
        }
        Commands::Apply {
            patch,
            source,
            output,
            advisory,
            max_target_mib,
        } => {
            let check = if *advisory {
                TargetCheck::Advisory
            } else {
                TargetCheck::Strict
            };
            let config = config
                .with_target_check(check)
                .with_max_target_size(mib_to_bytes(*max_target_mib));
            let result = apply_file(patch, source, output, &config)?;
            println!(
                "Wrote {} bytes to {}{}",
                result.target.len(),
                output.display(),
                if result.verified { "" } else { " (target checksum mismatch)" }
            );
        }
    }

    let elapsed = start_time.elapsed();
    eprintln!("Completed in {elapsed:.2?}");

    Ok(())
}

#[cfg(feature = "cli")]
fn mib_to_bytes(mib: u64) -> u64 {
    mib.saturating_mul(1024 * 1024)
}

#[cfg(feature = "cli")]
fn describe(action: &bps::Action<'_>) -> String {
    match action {
        bps::Action::SourceRead { .. } => String::new(),
        bps::Action::TargetRead { data } => {
            let preview: Vec<String> = data.iter().take(8).map(|b| format!("{b:02x}")).collect();
            let ellipsis = if data.len() > 8 { " .." } else { "" };
            format!("[{}{ellipsis}]", preview.join(" "))
        }
        bps::Action::SourceCopy { displacement, .. } | bps::Action::TargetCopy { displacement, .. } => {
            format!("seek {displacement:+}")
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_mib_to_bytes_saturates() {
        assert_eq!(mib_to_bytes(256), 256 * 1024 * 1024);
        assert_eq!(mib_to_bytes(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_apply_arguments() {
        let cli = Cli::try_parse_from([
            "bps_cli",
            "apply",
            "hack.bps",
            "base.sfc",
            "out.sfc",
            "--advisory",
            "--max-target-mib",
            "18446744073709551615",
        ])
        .unwrap();
        match cli.command {
            Commands::Apply {
                advisory,
                max_target_mib,
                ..
            } => {
                assert!(advisory);
                assert_eq!(mib_to_bytes(max_target_mib), u64::MAX);
            }
            _ => panic!("expected the apply command"),
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This example requires the 'cli' feature to be enabled.");
    eprintln!("Run with: cargo run --features cli --example bps_cli -- info patch.bps");
    std::process::exit(1);
}
