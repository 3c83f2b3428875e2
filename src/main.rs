use clap::Parser;
use dehost::{
    cli::{init_verbose, Cli, FULL_VERSION},
    errors::Result,
    manifest, pipeline,
    tools::{self, ToolParameters},
    utils::handle_error_and_exit,
};
use std::path::Path;

/// Parameter file picked up from the working directory when -p is not
/// given.
const DEFAULT_PARAMS_FILE: &str = "parameters.json";

fn load_parameters(cli: &Cli) -> Result<ToolParameters> {
    match &cli.tool_params_path {
        Some(path) => tools::load_tool_parameters(path),
        None => {
            let default = Path::new(DEFAULT_PARAMS_FILE);
            if default.is_file() {
                tools::load_tool_parameters(default)
            } else {
                log::debug!("No {DEFAULT_PARAMS_FILE} found, tools get empty parameter maps");
                Ok(ToolParameters::new())
            }
        }
    }
}

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    log::info!("Running {}-{}", env!("CARGO_PKG_NAME"), *FULL_VERSION);

    let tool_names = manifest::load_tool_names(&cli.tools_path)?;
    let parameters = load_parameters(&cli)?;
    let tools = tools::create_tools(&tool_names, &parameters)?;
    let samples = manifest::load_samples(&cli.samples_path)?;

    pipeline::run(&samples, &tools, &cli.out_dir, &cli.output_name)?;
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
