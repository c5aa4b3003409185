use xferprims_peer::{fetch, FetchOptions, TransferConfig};

use crate::cmd::{parse_duration, parse_optional_duration, FetchArgs};
use crate::exit::{transfer_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat};

pub fn run(args: FetchArgs, format: OutputFormat) -> CliResult<i32> {
    let options = FetchOptions {
        config: TransferConfig {
            read_timeout: parse_optional_duration(args.read_timeout.as_deref())?,
            ..TransferConfig::default()
        },
        connect_timeout: Some(parse_duration(&args.connect_timeout)?),
        atomic: args.atomic,
    };

    let report = fetch(&args.addr, &args.dest, &options)
        .map_err(|err| transfer_error("fetch failed", err))?;
    print_report(&report, format);

    Ok(SUCCESS)
}
