//! Gas used by `claim_rewards` for a growing number of assets.
//!
//! The measurements come from the integration harness which, after
//! each batch of assets is set up, calls `claim_rewards` and prints
//!
//! ```text
//! assets: 10, gas used: 1101096
//! ```
//!
//! and, once done, a summary
//!
//! ```text
//! x = [1,10,20,30,40,50]
//! y = [517925,1101096,1685687,2269758,2854112,3437730]
//! ```

use std::{fs, path::Path};
use ndarray::Array1;
use tracing::debug;
use crate::Error;

/// Number of assets of each `claim_rewards` measurement.
pub const CLAIM_REWARDS_N_ASSETS: [u64; 6] = [1, 10, 20, 30, 40, 50];

/// Gas used by `claim_rewards`, index-aligned with
/// [`CLAIM_REWARDS_N_ASSETS`].
pub const CLAIM_REWARDS_GAS_USED: [u64; 6] =
    [517925, 1101096, 1685687, 2269758, 2854112, 3437730];

/// Gas used as a function of the number of assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasUsage {
    n_assets: Vec<u64>,
    gas_used: Vec<u64>,
}

impl GasUsage {
    /// The `claim_rewards` measurements shipped with the crate.
    pub fn claim_rewards() -> Self {
        GasUsage { n_assets: CLAIM_REWARDS_N_ASSETS.to_vec(),
                   gas_used: CLAIM_REWARDS_GAS_USED.to_vec() }
    }

    /// Return the measurements `gas_used[i]` for `n_assets[i]` assets.
    ///
    /// Both sequences must have the same non-zero length, contain no
    /// zero, and `n_assets` must be strictly increasing.
    ///
    /// # Example
    ///
    /// ```
    /// use gas_plot::{Error, GasUsage};
    /// assert!(GasUsage::new(vec![1, 2], vec![10, 20]).is_ok());
    /// assert!(matches!(GasUsage::new(vec![2, 1], vec![10, 20]),
    ///                  Err(Error::NotIncreasing { index: 1 })));
    /// ```
    pub fn new(n_assets: Vec<u64>, gas_used: Vec<u64>) -> Result<Self, Error> {
        if n_assets.len() != gas_used.len() {
            return Err(Error::LengthMismatch { x: n_assets.len(),
                                               y: gas_used.len() })
        }
        if n_assets.is_empty() {
            return Err(Error::Empty)
        }
        let zero = n_assets.iter().zip(&gas_used)
            .position(|(&n, &g)| n == 0 || g == 0);
        if let Some(index) = zero {
            return Err(Error::NonPositive { index })
        }
        if let Some(i) = n_assets.windows(2).position(|w| w[0] >= w[1]) {
            return Err(Error::NotIncreasing { index: i + 1 })
        }
        Ok(GasUsage { n_assets, gas_used })
    }

    /// Parse the output of the measurement harness.
    ///
    /// The summary lines `x = [...]` and `y = [...]` are used when both
    /// are present.  Otherwise the measurements are collected from the
    /// `assets: N, gas used: G` progress lines.  Any other line is
    /// ignored.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut summary_x = None;
        let mut summary_y = None;
        let mut n_assets = Vec::new();
        let mut gas_used = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = line.trim();
            if let Some(v) = summary(line, "x") {
                summary_x = Some(json_array(v, line_no)?);
            } else if let Some(v) = summary(line, "y") {
                summary_y = Some(json_array(v, line_no)?);
            } else if let Some(rest) = line.strip_prefix("assets:") {
                let (n, g) = progress(rest, line_no)?;
                n_assets.push(n);
                gas_used.push(g);
            }
        }
        match (summary_x, summary_y) {
            (Some(x), Some(y)) => {
                debug!(n = x.len(), "measurements read from the summary");
                GasUsage::new(x, y)
            }
            _ => {
                debug!(n = n_assets.len(),
                       "measurements read from the progress lines");
                GasUsage::new(n_assets, gas_used)
            }
        }
    }

    /// Read and [`parse`][GasUsage::parse] the harness output saved
    /// in `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading measurements");
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.n_assets.len()
    }

    /// Always `false`: a `GasUsage` holds at least one measurement.
    pub fn is_empty(&self) -> bool {
        self.n_assets.is_empty()
    }

    pub fn n_assets(&self) -> &[u64] {
        &self.n_assets
    }

    pub fn gas_used(&self) -> &[u64] {
        &self.gas_used
    }

    /// Iterate over the `(n_assets, gas_used)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.n_assets.iter().copied().zip(self.gas_used.iter().copied())
    }

    /// Number of assets as floats, ready to be plotted.
    pub fn x(&self) -> Array1<f64> {
        self.n_assets.iter().map(|&n| n as f64).collect()
    }

    /// Gas used as floats, ready to be plotted.
    pub fn y(&self) -> Array1<f64> {
        self.gas_used.iter().map(|&g| g as f64).collect()
    }

    /// Extra gas per extra asset between consecutive measurements.
    pub fn gas_per_asset(&self) -> Vec<f64> {
        self.points().zip(self.points().skip(1))
            .map(|((n0, g0), (n1, g1))| {
                (g1 as f64 - g0 as f64) / (n1 - n0) as f64 })
            .collect()
    }
}

/// If `line` reads `name = ...`, return what follows `=`.
fn summary<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?.trim_start();
    rest.strip_prefix('=').map(str::trim)
}

fn json_array(v: &str, line: usize) -> Result<Vec<u64>, Error> {
    serde_json::from_str(v).map_err(|e| Error::Parse {
        line, msg: format!("expected an array of integers: {}", e) })
}

/// Parse the remainder of `assets: N, gas used: G`.
fn progress(rest: &str, line: usize) -> Result<(u64, u64), Error> {
    let err = |msg: &str| Error::Parse { line, msg: msg.to_string() };
    let (n, g) = rest.split_once(',')
        .ok_or_else(|| err("expected `assets: N, gas used: G`"))?;
    let g = g.trim().strip_prefix("gas used:")
        .ok_or_else(|| err("expected `gas used:` after the number of assets"))?;
    let n = n.trim().parse()
        .map_err(|_| err("the number of assets is not an integer"))?;
    let g = g.trim().parse()
        .map_err(|_| err("the gas used is not an integer"))?;
    Ok((n, g))
}


#[cfg(test)]
mod tests {
    use super::*;

    const HARNESS_OUTPUT: &str = "\
upload contracts
setup assets
claim rewards
assets: 1, gas used: 517925
setup assets
claim rewards
assets: 10, gas used: 1101096
setup assets
claim rewards
assets: 20, gas used: 1685687
";

    #[test]
    fn literals_are_aligned() {
        assert_eq!(CLAIM_REWARDS_N_ASSETS.len(), 6);
        assert_eq!(CLAIM_REWARDS_GAS_USED.len(), 6);
        assert_eq!(GasUsage::claim_rewards().len(), 6);
    }

    #[test]
    fn literals_are_strictly_increasing() {
        assert!(CLAIM_REWARDS_N_ASSETS.windows(2).all(|w| w[0] < w[1]));
        assert!(CLAIM_REWARDS_GAS_USED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn literals_are_positive() {
        assert!(CLAIM_REWARDS_N_ASSETS.iter().all(|&n| n > 0));
        assert!(CLAIM_REWARDS_GAS_USED.iter().all(|&g| g > 0));
    }

    #[test]
    fn builtin_passes_validation() -> Result<(), Error> {
        let u = GasUsage::new(CLAIM_REWARDS_N_ASSETS.to_vec(),
                              CLAIM_REWARDS_GAS_USED.to_vec())?;
        assert_eq!(u, GasUsage::claim_rewards());
        assert_eq!(u.points().next(), Some((1, 517925)));
        assert_eq!(u.x()[5], 50.);
        assert_eq!(u.y()[5], 3437730.);
        Ok(())
    }

    #[test]
    fn validation_errors() {
        assert!(matches!(GasUsage::new(vec![1, 2], vec![3]),
                         Err(Error::LengthMismatch { x: 2, y: 1 })));
        assert!(matches!(GasUsage::new(vec![], vec![]), Err(Error::Empty)));
        assert!(matches!(GasUsage::new(vec![1, 2], vec![5, 0]),
                         Err(Error::NonPositive { index: 1 })));
        assert!(matches!(GasUsage::new(vec![0, 2], vec![5, 6]),
                         Err(Error::NonPositive { index: 0 })));
        assert!(matches!(GasUsage::new(vec![1, 5, 5], vec![1, 2, 3]),
                         Err(Error::NotIncreasing { index: 2 })));
    }

    #[test]
    fn gas_per_asset() {
        let u = GasUsage::claim_rewards();
        let marginal = u.gas_per_asset();
        assert_eq!(marginal.len(), 5);
        assert_eq!(marginal[0], (1101096. - 517925.) / 9.);
        assert_eq!(marginal[4], (3437730. - 2854112.) / 10.);
    }

    #[test]
    fn parse_progress_lines() -> Result<(), Error> {
        let u = GasUsage::parse(HARNESS_OUTPUT)?;
        assert_eq!(u.n_assets(), &[1, 10, 20]);
        assert_eq!(u.gas_used(), &[517925, 1101096, 1685687]);
        Ok(())
    }

    #[test]
    fn summary_wins_over_progress() -> Result<(), Error> {
        let text = format!("{}\nx = [1,10,20,30,40,50]\n\
                            y = [517925,1101096,1685687,2269758,2854112,3437730]\n\nOK\n",
                           HARNESS_OUTPUT);
        assert_eq!(GasUsage::parse(&text)?, GasUsage::claim_rewards());
        Ok(())
    }

    #[test]
    fn lone_summary_line_is_not_enough() -> Result<(), Error> {
        let text = format!("{}x = [1,10,20,30,40,50]\n", HARNESS_OUTPUT);
        assert_eq!(GasUsage::parse(&text)?.len(), 3);
        Ok(())
    }

    #[test]
    fn parse_errors() {
        let r = GasUsage::parse("setup assets\nassets: ten, gas used: 3\n");
        assert!(matches!(r, Err(Error::Parse { line: 2, .. })));
        let r = GasUsage::parse("assets: 1 gas used: 3\n");
        assert!(matches!(r, Err(Error::Parse { line: 1, .. })));
        let r = GasUsage::parse("assets: 1, gas: 3\n");
        assert!(matches!(r, Err(Error::Parse { line: 1, .. })));
        let r = GasUsage::parse("x = [1, 2\ny = [3, 4]\n");
        assert!(matches!(r, Err(Error::Parse { line: 1, .. })));
        assert!(matches!(GasUsage::parse("OK\n"), Err(Error::Empty)));
    }

    #[test]
    fn read_missing_file() {
        let r = GasUsage::read("target/no/such/harness.log");
        assert!(matches!(r, Err(Error::Io(_))));
    }
}
