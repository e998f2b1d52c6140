use crate::cli::args::PortsArgs;
use crate::exit_codes::SUCCESS;
use crate::render;
use portwarden_core::{filter_records, SocketFilter};

pub fn run(args: PortsArgs) -> anyhow::Result<i32> {
    let records = super::scanner().snapshot();

    let filter = SocketFilter {
        port: args.port,
        protocol: args.protocol,
        process: args.process,
        state: args.state,
    };
    let records = if filter.is_empty() {
        records
    } else {
        filter_records(&records, &filter)
    };

    let rendered = match args.out.format.as_str() {
        "table" => render::records_table(&records),
        "json" => serde_json::to_string_pretty(&records)?,
        "yaml" => serde_yaml::to_string(&records)?,
        "csv" => render::records_csv(&records),
        other => anyhow::bail!("unknown --format: {other}"),
    };
    render::emit(&rendered, args.out.output.as_deref())?;
    Ok(SUCCESS)
}
