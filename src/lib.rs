//! Bar chart of the gas consumed by `claim_rewards` as the number of
//! incentivised assets grows, drawn with [Matplotlib][].
//!
//! Usage
//! -----
//!
//! The plotting layer follows [Matplotlib][]'s explicit "figure /
//! axes" interface while keeping a Rust flavor:
//!
//! ```
//! use gas_plot::{chart, Figure, GasUsage};
//! let fig = Figure::new()?;
//! let mut ax = fig.subplots()?;
//! chart::draw(&mut ax, &GasUsage::claim_rewards())?;
//! fig.save().to_file("target/claim_rewards_doc.png")?;
//! # Ok::<(), gas_plot::Error>(())
//! ```
//!
//! [Matplotlib]: https://matplotlib.org/

use std::{
    fmt::{Display, Formatter},
    io,
    path::Path,
};
use lazy_static::lazy_static;
use ndarray::{ArrayBase, Ix1};
use numpy::{PyArray1, ToPyArray};
use pyo3::{
    prelude::*,
    intern,
    exceptions::{PyFileNotFoundError, PyPermissionError},
    types::PyDict,
};

pub mod chart;
pub mod gas;
pub mod logger;

pub use gas::GasUsage;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

/// Call the method `$m` of the Python object `$obj`, discarding the
/// returned value.
macro_rules! meth {
    ($obj: expr, $m: ident) => {
        Python::with_gil(|py| {
            $obj.bind(py).call_method0(intern!(py, stringify!($m)))
                .map(|_| ())
        })
    };
    ($obj: expr, $m: ident, $args: expr) => {
        Python::with_gil(|py| {
            $obj.bind(py).call_method1(intern!(py, stringify!($m)), $args)
                .map(|_| ())
        })
    };
}

/// Call the getter `$m` of `$obj` and convert its result to `$t`.
macro_rules! get {
    ($obj: expr, $m: ident -> $t: ty) => {
        Python::with_gil(|py| -> Result<$t, Error> {
            let v = $obj.bind(py).call_method0(intern!(py, stringify!($m)))?;
            Ok(v.extract::<$t>()?)
        })
    };
}

/// Possible errors of this crate.
#[derive(Debug)]
pub enum Error {
    /// The Python library "matplotlib" was not found.
    NoMatplotlib,
    /// The path contains an elelement that is not a directory or does
    /// not exist.
    FileNotFoundError,
    /// Permission denied to access or create the filesystem path.
    PermissionError,
    /// Other Python errors.
    Python(PyErr),
    /// Two sequences that must be index-aligned have different lengths.
    LengthMismatch { x: usize, y: usize },
    /// No measurement at all.
    Empty,
    /// The value at `index` is zero.
    NonPositive { index: usize },
    /// The number of assets at `index` is not larger than the previous one.
    NotIncreasing { index: usize },
    /// Malformed harness output at the given (1-based) line.
    Parse { line: usize, msg: String },
    /// Reading the measurements failed.
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::NoMatplotlib =>
                write!(f, "The matplotlib library has not been found.\n\
Please install it.  See https://matplotlib.org/\n\
If you use Anaconda, see https://github.com/PyO3/pyo3/issues/1554"),
            Error::FileNotFoundError =>
                write!(f, "A path contains an element that is not a \
                           directory or does not exist"),
            Error::PermissionError =>
                write!(f, "Permission denied to access or create the \
                           filesystem path"),
            Error::Python(e) =>
                write!(f, "Python error: {}", e),
            Error::LengthMismatch { x, y } =>
                write!(f, "{} x values but {} y values", x, y),
            Error::Empty =>
                write!(f, "no measurement to plot"),
            Error::NonPositive { index } =>
                write!(f, "measurement {} contains a zero value", index),
            Error::NotIncreasing { index } =>
                write!(f, "n_assets is not strictly increasing at \
                           measurement {}", index),
            Error::Parse { line, msg } =>
                write!(f, "line {}: {}", line, msg),
            Error::Io(e) =>
                write!(f, "cannot read the measurements: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Python(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PyErr> for Error {
    fn from(e: PyErr) -> Self { Error::Python(e) }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self { Error::Io(e) }
}

/// Import and return a handle to the module `$m`.
macro_rules! pyimport { ($m: literal) => {
    Python::with_gil(|py|
        PyModule::import_bound(py, $m).map(|m| m.unbind()))
}}

lazy_static! {
    // Import matplotlib modules.
    static ref FIGURE: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.figure")
    };
    static ref PYPLOT: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.pyplot")
    };
}

/// Return a handle to the module `$m`.
/// ⚠ This may try to lock Python's GIL.  Make sure it is executed
/// outside a call to `Python::with_gil`.
macro_rules! pymod { ($m: ident) => {
    $m.as_ref().map_err(|_| Error::NoMatplotlib)
}}


/// One dimensional data that can be handed to numpy.
pub trait Data {
    fn len(&self) -> usize;
    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>>;
}

impl Data for [f64] {
    fn len(&self) -> usize { <[f64]>::len(self) }

    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice_bound(py, self)
    }
}

impl Data for Vec<f64> {
    fn len(&self) -> usize { self.as_slice().len() }

    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice_bound(py, self)
    }
}

impl<const N: usize> Data for [f64; N] {
    fn len(&self) -> usize { N }

    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        PyArray1::from_slice_bound(py, self)
    }
}

impl<S> Data for ArrayBase<S, Ix1>
where S: ndarray::Data<Elem = f64> {
    fn len(&self) -> usize { ArrayBase::len(self) }

    fn to_numpy<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.to_pyarray_bound(py)
    }
}

/// A set of axes of a [`Figure`].
#[derive(Debug, Clone)]
pub struct Axes {
    ax: PyObject,
}

/// The top level container for all the plot elements.
#[derive(Debug)]
pub struct Figure {
    fig: PyObject, // instance of matplotlib.figure.Figure
}

impl Figure {
    /// Return a new `Figure` that is not managed by pyplot.  It does
    /// not need a GUI backend, so it can be used to render charts to
    /// files on headless machines.
    pub fn new() -> Result<Figure, Error> {
        let figure = pymod!(FIGURE)?;
        Python::with_gil(|py| {
            let fig = figure.bind(py)
                .getattr(intern!(py, "Figure"))?
                .call0()?;
            Ok(Self { fig: fig.unbind() })
        })
    }

    /// Add a single set of axes covering the figure.
    pub fn subplots(&self) -> Result<Axes, Error> {
        Python::with_gil(|py| {
            let ax = self.fig.bind(py)
                .call_method0(intern!(py, "subplots"))?;
            Ok(Axes { ax: ax.unbind() })
        })
    }

    pub fn save(&self) -> Savefig<'_> {
        Savefig { fig: self, dpi: None }
    }
}

pub struct Savefig<'a> {
    fig: &'a Figure,
    dpi: Option<f64>,
}

impl<'a> Savefig<'a> {
    /// Set the resolution in dots per inch.  A non-positive value
    /// restores Matplotlib's default.
    pub fn dpi(&mut self, dpi: f64) -> &mut Self {
        if dpi > 0. {
            self.dpi = Some(dpi);
        } else {
            self.dpi = None;
        }
        self
    }

    /// Save the figure to `path`.  The format is deduced from the
    /// extension of `path`.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        Python::with_gil(|py| -> Result<(), Error> {
            let kwargs = PyDict::new_bound(py);
            if let Some(dpi) = self.dpi {
                kwargs.set_item("dpi", dpi)?;
            }
            self.fig.fig.bind(py).call_method(
                intern!(py, "savefig"),
                (path.as_ref(),), Some(&kwargs)
            ).map_err(|e| {
                if e.is_instance_of::<PyFileNotFoundError>(py) {
                    Error::FileNotFoundError
                } else if e.is_instance_of::<PyPermissionError>(py) {
                    Error::PermissionError
                } else {
                    Error::Python(e)
                }
            })?;
            Ok(())
        })
    }
}


/// Return a new figure managed by pyplot, so that [`show`] displays it.
pub fn figure() -> Result<Figure, Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        let fig = pyplot.bind(py).call_method0(intern!(py, "figure"))?;
        Ok(Figure { fig: fig.unbind() })
    })
}

/// Equivalent of `fig, ax = plt.subplots()`.
pub fn subplots() -> Result<(Figure, Axes), Error> {
    let fig = figure()?;
    let ax = fig.subplots()?;
    Ok((fig, ax))
}

/// Display all open pyplot figures and block until they are closed.
pub fn show() -> Result<(), Error> {
    let pyplot = pymod!(PYPLOT)?;
    meth!(pyplot, show)?;
    Ok(())
}


/// A rectangle drawn on an [`Axes`], e.g. one bar of a bar chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Horizontal position of the middle of the rectangle.
    pub fn center(&self) -> f64 {
        self.x + self.width / 2.
    }
}

impl Axes {
    /// Make a bar plot with bars at positions `x` and of heights
    /// `height`.
    ///
    /// # Example
    ///
    /// ```
    /// use gas_plot::Figure;
    /// let fig = Figure::new()?;
    /// let mut ax = fig.subplots()?;
    /// ax.bar(&[1., 2., 3.], &[3., 1., 2.]).width(0.5).plot()?;
    /// assert_eq!(ax.bars()?.len(), 3);
    /// # Ok::<(), gas_plot::Error>(())
    /// ```
    #[must_use]
    pub fn bar<'a, D>(&'a mut self, x: &'a D, height: &'a D) -> Bar<'a, D>
    where D: Data + ?Sized {
        // `self` is mutably borrowed to reflect that the final
        // `.plot()` mutates the underlying Python object.
        Bar { axes: self,
              options: BarOptions::new(),
              x, height }
    }

    pub fn set_title(&mut self, v: &str) -> Result<&mut Self, Error> {
        meth!(self.ax, set_title, (v,))?;
        Ok(self)
    }

    pub fn set_xlabel(&mut self, label: &str) -> Result<&mut Self, Error> {
        meth!(self.ax, set_xlabel, (label,))?;
        Ok(self)
    }

    pub fn set_ylabel(&mut self, label: &str) -> Result<&mut Self, Error> {
        meth!(self.ax, set_ylabel, (label,))?;
        Ok(self)
    }

    /// Set the y-axis view limits.  A `None` bound is left unchanged
    /// (and keeps being autoscaled).
    pub fn set_ylim(&mut self, bottom: Option<f64>, top: Option<f64>
    ) -> Result<&mut Self, Error> {
        Python::with_gil(|py| -> Result<(), Error> {
            let kwargs = PyDict::new_bound(py);
            if let Some(b) = bottom {
                kwargs.set_item("bottom", b)?;
            }
            if let Some(t) = top {
                kwargs.set_item("top", t)?;
            }
            self.ax.bind(py)
                .call_method(intern!(py, "set_ylim"), (), Some(&kwargs))?;
            Ok(())
        })?;
        Ok(self)
    }

    pub fn grid(&mut self) -> Result<&mut Self, Error> {
        meth!(self.ax, grid, (true,))?;
        Ok(self)
    }

    pub fn title(&self) -> Result<String, Error> {
        get!(self.ax, get_title -> String)
    }

    pub fn xlabel(&self) -> Result<String, Error> {
        get!(self.ax, get_xlabel -> String)
    }

    pub fn ylabel(&self) -> Result<String, Error> {
        get!(self.ax, get_ylabel -> String)
    }

    /// Return the y-axis view limits `(bottom, top)`.
    pub fn ylim(&self) -> Result<(f64, f64), Error> {
        get!(self.ax, get_ylim -> (f64, f64))
    }

    /// Return the rectangles drawn on the axes, in drawing order.
    pub fn bars(&self) -> Result<Vec<Rectangle>, Error> {
        Python::with_gil(|py| {
            let patches = self.ax.bind(py).getattr(intern!(py, "patches"))?;
            let mut bars = Vec::new();
            for p in patches.iter()? {
                let p = p?;
                let coord = |m: &Bound<'_, pyo3::types::PyString>| {
                    p.call_method0(m).and_then(|v| v.extract::<f64>())
                };
                bars.push(Rectangle {
                    x: coord(intern!(py, "get_x"))?,
                    y: coord(intern!(py, "get_y"))?,
                    width: coord(intern!(py, "get_width"))?,
                    height: coord(intern!(py, "get_height"))?,
                });
            }
            Ok(bars)
        })
    }
}

#[derive(Clone)]
struct BarOptions<'a> {
    width: Option<f64>,
    color: &'a str,
    edgecolor: &'a str,
    label: &'a str,
    align_edge: bool,
}

impl<'a> BarOptions<'a> {
    fn new() -> BarOptions<'static> {
        BarOptions { width: None, color: "", edgecolor: "", label: "",
                     align_edge: false }
    }

    fn kwargs<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let kwargs = PyDict::new_bound(py);
        if let Some(w) = self.width {
            kwargs.set_item("width", w)?
        }
        if !self.color.is_empty() {
            kwargs.set_item("color", self.color)?
        }
        if !self.edgecolor.is_empty() {
            kwargs.set_item("edgecolor", self.edgecolor)?
        }
        if !self.label.is_empty() {
            kwargs.set_item("label", self.label)?
        }
        if self.align_edge {
            kwargs.set_item("align", "edge")?
        }
        Ok(kwargs)
    }
}

/// Bar plot under construction, see [`Axes::bar`].
#[must_use]
pub struct Bar<'a, D>
where D: ?Sized {
    axes: &'a Axes,
    options: BarOptions<'a>,
    x: &'a D,
    height: &'a D,
}

impl<'a, D> Bar<'a, D>
where D: Data + ?Sized {
    /// Width of the bars (Matplotlib's default is 0.8).
    pub fn width(mut self, w: f64) -> Self {
        self.options.width = Some(w);
        self
    }

    pub fn color(mut self, color: &'a str) -> Self {
        self.options.color = color;
        self
    }

    pub fn edgecolor(mut self, color: &'a str) -> Self {
        self.options.edgecolor = color;
        self
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.options.label = label;
        self
    }

    /// Align the left edge of the bars (instead of their center) on
    /// the `x` positions.
    pub fn align_edge(mut self) -> Self {
        self.options.align_edge = true;
        self
    }

    /// Draw the bars with the options specified in [`Bar`].
    pub fn plot(self) -> Result<(), Error> {
        let (nx, nh) = (self.x.len(), self.height.len());
        if nx != nh {
            return Err(Error::LengthMismatch { x: nx, y: nh })
        }
        Python::with_gil(|py| {
            let x = self.x.to_numpy(py);
            let h = self.height.to_numpy(py);
            let kwargs = self.options.kwargs(py)?;
            self.axes.ax.bind(py)
                .call_method(intern!(py, "bar"), (x, h), Some(&kwargs))?;
            Ok(())
        })
    }
}
