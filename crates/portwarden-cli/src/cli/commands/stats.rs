use crate::cli::args::StatsArgs;
use crate::exit_codes::SUCCESS;
use crate::render;
use portwarden_core::snapshot_stats;

pub fn run(args: StatsArgs) -> anyhow::Result<i32> {
    let records = super::scanner().snapshot();
    let stats = snapshot_stats(&records);

    let rendered = match args.out.format.as_str() {
        "table" => render::stats_table(&stats),
        "json" => serde_json::to_string_pretty(&stats)?,
        "yaml" => serde_yaml::to_string(&stats)?,
        "csv" => render::stats_csv(&stats),
        other => anyhow::bail!("unknown --format: {other}"),
    };
    render::emit(&rendered, args.out.output.as_deref())?;
    Ok(SUCCESS)
}
