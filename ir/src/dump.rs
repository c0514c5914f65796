//! Text dumps of a scheduled loop nest.
//!
//! Two line-oriented files let a search result be persisted and loaded again
//! without searching:
//!
//! - [`TilingDump`]: on-chip then parallel [`Variables`], one `Label: value` per line.
//! - [`StructureDump`]: off-chip then on-chip [`Structure`], one `Position: Axis` per line.
//!
//! Readers split on whitespace, so line breaks are not significant.

use std::fmt;
use std::str::FromStr;

use snafu::ensure;

use crate::cnn_loop::CnnLoop;
use crate::error::{Error, MalformedDumpSnafu, Result};
use crate::structure::Structure;
use crate::variables::Variables;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilingDump {
    pub on: Variables,
    pub parallel: Variables,
}

impl TilingDump {
    pub fn from_loop(cnn_loop: &CnnLoop) -> Self {
        let varset = cnn_loop.variable_set();
        Self { on: *varset.on(), parallel: *varset.parallel() }
    }
}

impl fmt::Display for TilingDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.on, self.parallel)
    }
}

impl FromStr for TilingDump {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let on = Variables::parse_tokens(&mut tokens)?;
        let parallel = Variables::parse_tokens(&mut tokens)?;
        ensure!(tokens.next().is_none(), MalformedDumpSnafu { reason: "trailing tokens after tiling dump" });
        Ok(Self { on, parallel })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDump {
    pub off: Structure,
    pub on: Structure,
}

impl StructureDump {
    pub fn from_loop(cnn_loop: &CnnLoop) -> Self {
        Self { off: cnn_loop.off_structure().clone(), on: cnn_loop.on_structure().clone() }
    }
}

impl fmt::Display for StructureDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.off, self.on)
    }
}

impl FromStr for StructureDump {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let off = Structure::parse_tokens(&mut tokens)?;
        let on = Structure::parse_tokens(&mut tokens)?;
        ensure!(tokens.next().is_none(), MalformedDumpSnafu { reason: "trailing tokens after structure dump" });
        Ok(Self { off, on })
    }
}
