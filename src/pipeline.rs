//! Textual transform chains.
//!
//! The CLI describes a chain as a list of short op strings, applied left to
//! right to one [`ImageHandle`]:
//!
//! | Op | Meaning |
//! |---|---|
//! | `resize:300x200` | [`ImageHandle::resize`] |
//! | `crop:100x100` / `crop:100x100+20+10` / `crop:100x100-10+5` | [`ImageHandle::crop`], offsets default to 0 |
//! | `rotate:90` | [`ImageHandle::rotate`], degrees counter-clockwise |
//! | `overlay:logo.png` / `overlay:logo.png@10,-4` | [`ImageHandle::overlay`] |
//! | `mask:mask.png@0,0` | [`ImageHandle::mask`] |
//! | `percent:0.5` | [`ImageHandle::percent`], 1.0 = 100% |
//! | `fit:300x300` | [`ImageHandle::fit`] |
//! | `fill:300x300` | [`ImageHandle::fill`] |
//! | `reset` | [`ImageHandle::reset`] |

use crate::imaging::{Codec, ImageError, ImageHandle, Storage};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid op '{op}': {reason}")]
    Parse { op: String, reason: String },
    #[error(transparent)]
    Image(#[from] ImageError),
}

fn parse_error(op: &str, reason: impl Into<String>) -> PipelineError {
    PipelineError::Parse {
        op: op.to_string(),
        reason: reason.into(),
    }
}

/// One step of a transform chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Resize { width: u32, height: u32 },
    Crop { width: u32, height: u32, x: i64, y: i64 },
    Rotate(f64),
    Overlay { source: String, x: i64, y: i64 },
    Mask { source: String, x: i64, y: i64 },
    Percent(f64),
    Fit { width: u32, height: u32 },
    Fill { width: u32, height: u32 },
    Reset,
}

impl Op {
    /// Apply this op to `handle`.
    pub fn apply<C: Codec, S: Storage>(&self, handle: &mut ImageHandle<C, S>) -> Result<(), ImageError> {
        match self {
            Op::Resize { width, height } => handle.resize(*width, *height)?,
            Op::Crop { width, height, x, y } => handle.crop(*width, *height, *x, *y)?,
            Op::Rotate(angle) => handle.rotate(*angle)?,
            Op::Overlay { source, x, y } => handle.overlay(source.as_str(), *x, *y)?,
            Op::Mask { source, x, y } => handle.mask(source.as_str(), *x, *y)?,
            Op::Percent(factor) => handle.percent(*factor)?,
            Op::Fit { width, height } => handle.fit(*width, *height)?,
            Op::Fill { width, height } => handle.fill(*width, *height)?,
            Op::Reset => handle.reset()?,
        };
        Ok(())
    }
}

impl FromStr for Op {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, args) = s.split_once(':').unwrap_or((s, ""));

        match name {
            "reset" if args.is_empty() => Ok(Op::Reset),
            "reset" => Err(parse_error(s, "reset takes no arguments")),
            "resize" => {
                let (width, height) = parse_size(s, args)?;
                Ok(Op::Resize { width, height })
            }
            "fit" => {
                let (width, height) = parse_size(s, args)?;
                Ok(Op::Fit { width, height })
            }
            "fill" => {
                let (width, height) = parse_size(s, args)?;
                Ok(Op::Fill { width, height })
            }
            "crop" => {
                let split = args.find(['+', '-']).unwrap_or(args.len());
                let (size, offsets) = args.split_at(split);
                let (width, height) = parse_size(s, size)?;
                let (x, y) = if offsets.is_empty() {
                    (0, 0)
                } else {
                    parse_signed_pair(s, offsets)?
                };
                Ok(Op::Crop { width, height, x, y })
            }
            "rotate" => Ok(Op::Rotate(parse_float(s, args)?)),
            "percent" => Ok(Op::Percent(parse_float(s, args)?)),
            "overlay" | "mask" => {
                let (source, x, y) = parse_placed_source(s, args)?;
                Ok(if name == "overlay" {
                    Op::Overlay { source, x, y }
                } else {
                    Op::Mask { source, x, y }
                })
            }
            _ => Err(parse_error(s, format!("unknown op '{name}'"))),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Resize { width, height } => write!(f, "resize:{width}x{height}"),
            Op::Crop { width, height, x, y } => write!(f, "crop:{width}x{height}{x:+}{y:+}"),
            Op::Rotate(angle) => write!(f, "rotate:{angle}"),
            Op::Overlay { source, x, y } => write!(f, "overlay:{source}@{x},{y}"),
            Op::Mask { source, x, y } => write!(f, "mask:{source}@{x},{y}"),
            Op::Percent(factor) => write!(f, "percent:{factor}"),
            Op::Fit { width, height } => write!(f, "fit:{width}x{height}"),
            Op::Fill { width, height } => write!(f, "fill:{width}x{height}"),
            Op::Reset => write!(f, "reset"),
        }
    }
}

fn parse_size(op: &str, s: &str) -> Result<(u32, u32), PipelineError> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| parse_error(op, "expected WIDTHxHEIGHT"))?;
    let width = w
        .parse()
        .map_err(|_| parse_error(op, format!("bad width '{w}'")))?;
    let height = h
        .parse()
        .map_err(|_| parse_error(op, format!("bad height '{h}'")))?;
    Ok((width, height))
}

fn parse_float(op: &str, s: &str) -> Result<f64, PipelineError> {
    s.parse()
        .map_err(|_| parse_error(op, format!("bad number '{s}'")))
}

/// `+20-5` → `(20, -5)`. Both signs are mandatory.
fn parse_signed_pair(op: &str, s: &str) -> Result<(i64, i64), PipelineError> {
    let second = s
        .get(1..)
        .and_then(|rest| rest.find(['+', '-']))
        .map(|i| i + 1)
        .ok_or_else(|| parse_error(op, "expected offsets as +X+Y"))?;
    let (x, y) = s.split_at(second);
    let parse = |v: &str| {
        v.parse::<i64>()
            .map_err(|_| parse_error(op, format!("bad offset '{v}'")))
    };
    Ok((parse(x)?, parse(y)?))
}

/// `path@x,y` → `(path, x, y)`; without `@x,y` the position is the origin.
fn parse_placed_source(op: &str, s: &str) -> Result<(String, i64, i64), PipelineError> {
    if let Some((path, at)) = s.rsplit_once('@') {
        if let Some((x, y)) = at.split_once(',') {
            if let (Ok(x), Ok(y)) = (x.trim().parse(), y.trim().parse()) {
                if path.is_empty() {
                    return Err(parse_error(op, "missing source path"));
                }
                return Ok((path.to_string(), x, y));
            }
        }
    }
    if s.is_empty() {
        return Err(parse_error(op, "missing source path"));
    }
    Ok((s.to_string(), 0, 0))
}

/// Parse every op, failing on the first bad one.
pub fn parse_ops<I, T>(ops: I) -> Result<Vec<Op>, PipelineError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    ops.into_iter().map(|s| s.as_ref().parse()).collect()
}

/// Apply `ops` in order, stopping at the first failure.
///
/// A failing op leaves the handle as the previous op left it.
pub fn run<C: Codec, S: Storage>(
    handle: &mut ImageHandle<C, S>,
    ops: &[Op],
) -> Result<(), PipelineError> {
    for op in ops {
        log::debug!("applying {op}");
        op.apply(handle)?;
    }
    Ok(())
}
