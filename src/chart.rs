//! The `claim_rewards` gas usage bar chart.

use tracing::debug;
use crate::{Axes, Error, Figure, GasUsage};

pub const X_LABEL: &str = "n_assets";
pub const Y_LABEL: &str = "gas_used";

/// Draw one bar per measurement of `usage` on `ax`: bars at the number
/// of assets, as high as the gas used.  The y-axis starts at 0.
pub fn draw(ax: &mut Axes, usage: &GasUsage) -> Result<(), Error> {
    debug!(n = usage.len(), "drawing gas usage bars");
    let x = usage.x();
    let y = usage.y();
    ax.bar(&x, &y).plot()?;
    ax.set_xlabel(X_LABEL)?
        .set_ylabel(Y_LABEL)?
        .set_ylim(Some(0.), None)?;
    Ok(())
}

/// Same as `fig, ax = plt.subplots()` followed by [`draw`].  The figure
/// is managed by pyplot, so [`crate::show`] displays it.
pub fn claim_rewards_chart(usage: &GasUsage) -> Result<(Figure, Axes), Error> {
    let (fig, mut ax) = crate::subplots()?;
    draw(&mut ax, usage)?;
    Ok((fig, ax))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas::{CLAIM_REWARDS_GAS_USED, CLAIM_REWARDS_N_ASSETS};

    #[test]
    fn six_bars_from_zero() -> Result<(), Error> {
        let fig = Figure::new()?;
        let mut ax = fig.subplots()?;
        draw(&mut ax, &GasUsage::claim_rewards())?;
        let bars = ax.bars()?;
        assert_eq!(bars.len(), 6);
        for ((b, &n), &g) in bars.iter()
            .zip(&CLAIM_REWARDS_N_ASSETS).zip(&CLAIM_REWARDS_GAS_USED) {
            assert!((b.center() - n as f64).abs() < 1e-9);
            assert_eq!(b.y, 0.);
            assert_eq!(b.height, g as f64);
        }
        Ok(())
    }

    #[test]
    fn labels_and_y_origin() -> Result<(), Error> {
        let fig = Figure::new()?;
        let mut ax = fig.subplots()?;
        draw(&mut ax, &GasUsage::claim_rewards())?;
        assert_eq!(ax.xlabel()?, "n_assets");
        assert_eq!(ax.ylabel()?, "gas_used");
        let (bottom, top) = ax.ylim()?;
        assert_eq!(bottom, 0.);
        assert!(top >= 3437730.);
        Ok(())
    }

    #[test]
    fn claim_rewards_svg() -> Result<(), Error> {
        let fig = Figure::new()?;
        let mut ax = fig.subplots()?;
        draw(&mut ax, &GasUsage::claim_rewards())?;
        fig.save().to_file("target/claim_rewards_gas_usage.svg")?;
        Ok(())
    }

    #[test]
    fn pyplot_chart() -> Result<(), Error> {
        let usage = GasUsage::new(vec![1, 2, 3], vec![30, 20, 10])?;
        let (fig, ax) = claim_rewards_chart(&usage)?;
        assert_eq!(ax.bars()?.len(), 3);
        assert_eq!(ax.ylim()?.0, 0.);
        fig.save().dpi(72.).to_file("target/pyplot_chart.png")?;
        Ok(())
    }
}
