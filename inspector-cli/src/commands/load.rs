//! `inspector load`: probe a load balancer and tabulate the backends

use crate::error::CliResult;
use crate::warn;
use inspector_config::LoadTestSettings;
use inspector_loadtest::{ERROR_LABEL, LoadTestRunner};

pub async fn run(settings: LoadTestSettings, json: bool) -> CliResult<()> {
    let config = settings.loadtest_config()?;
    let runner = LoadTestRunner::new(config)?;

    if !json {
        println!(
            "Starting load test with {} requests (concurrency: {})...",
            runner.config().total_requests,
            runner.config().worker_count()
        );
    }

    let report = runner.run().await?;

    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!();
    print!("{}", report.render());

    let failed = report.count(ERROR_LABEL);
    if failed > 0 {
        println!();
        warn(&format!(
            "{} of {} requests failed or timed out",
            failed, report.total_requests
        ));
    }
    Ok(())
}
