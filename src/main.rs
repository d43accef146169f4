use clap::Parser;
use spicedb_harness::utils::error::ErrorSeverity;
use spicedb_harness::utils::{logger, validation::Validate};
use spicedb_harness::{run_suite, CliConfig, SuiteReport};

fn print_report(report: &SuiteReport) {
    println!("SpiceDB at {}", report.endpoint);
    for scenario in &report.scenarios {
        let mark = if scenario.passed { "✅" } else { "❌" };
        println!(
            "{} {} ({}ms): {}",
            mark, scenario.name, scenario.duration_ms, scenario.detail
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_ci_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting spicedb-harness");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(3);
    }

    let settings = config.load()?.to_settings()?;

    match run_suite(&settings).await {
        Ok(report) => {
            if config.json {
                println!("{}", report.to_json()?);
            } else {
                print_report(&report);
            }

            if !report.all_passed() {
                tracing::error!("❌ {} scenario(s) failed", report.failed().len());
                std::process::exit(1);
            }
            tracing::info!("✅ All {} scenarios passed", report.scenarios.len());
        }
        Err(e) => {
            tracing::error!(
                "❌ Suite aborted: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2, // retryable: readiness or transport
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
