use clap::Parser;
use arbitrary_css::logging::init_logging;
use arbitrary_css::{handle_pipe_command, inject, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inject(args) => {
            init_logging(args.verbose);

            let dry_run = args.dry_run;
            match inject(args).await {
                Ok(result) => {
                    if dry_run {
                        println!("Dry run complete!");
                    } else {
                        println!("Injection successful!");
                    }
                    println!("  - Processed {} files", result.total_files_processed);
                    println!("  - Styled {} documents", result.documents_styled);
                    println!("  - Generated {} rules", result.total_rules);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Pipe(args) => {
            init_logging(false);
            handle_pipe_command(args).await?;
            Ok(())
        }
    }
}
