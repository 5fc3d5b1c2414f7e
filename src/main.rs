use std::{error::Error, path::PathBuf};

use clap::Parser;
use gas_plot::{self as plt, chart, logger::setup_logger, GasUsage};
use tracing::info;

/// Bar chart of the gas used by `claim_rewards` against the number of
/// assets.
#[derive(Parser)]
#[command(name = "gas-plot", version)]
struct Args {
    /// Output of the measurement harness to plot instead of the
    /// built-in measurements.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Save the chart to this file (format from the extension) instead
    /// of opening a window.
    #[arg(long, short, env = "GAS_PLOT_OUTPUT")]
    output: Option<PathBuf>,

    /// Resolution of the saved chart.
    #[arg(long, requires = "output")]
    dpi: Option<f64>,

    #[arg(long)]
    title: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    setup_logger();
    let args = Args::parse();

    let usage = match &args.input {
        Some(path) => GasUsage::read(path)?,
        None => GasUsage::claim_rewards(),
    };
    for (n, g) in usage.points() {
        info!("assets: {}, gas used: {}", n, g);
    }

    let (fig, mut ax) = chart::claim_rewards_chart(&usage)?;
    if let Some(title) = &args.title {
        ax.set_title(title)?;
    }
    match &args.output {
        Some(path) => {
            let mut save = fig.save();
            if let Some(dpi) = args.dpi {
                save.dpi(dpi);
            }
            save.to_file(path)?;
            info!("chart saved to {}", path.display());
        }
        None => plt::show()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn dpi_needs_output() {
        std::env::remove_var("GAS_PLOT_OUTPUT");
        assert!(Args::try_parse_from(["gas-plot", "--dpi", "100"]).is_err());
        let args = Args::try_parse_from(
            ["gas-plot", "-o", "chart.png", "--dpi", "100"]).unwrap();
        assert_eq!(args.dpi, Some(100.));
        assert_eq!(args.output, Some(PathBuf::from("chart.png")));
    }
}
