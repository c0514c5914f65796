//! Loop order of one nest level.
//!
//! A [`Structure`] is a bijection between the four [`Axis`] values and the four
//! [`Position`] values. Both directions are stored in arrays indexed by ordinal,
//! and [`Structure::bind`] keeps them in sync.
//!
//! # Presets
//!
//! Each stationary dataflow has one canonical order (inner-most first):
//!
//! | dataflow | inner | 2nd | 3rd | outer |
//! |----------|-------|-----|-----|-------|
//! | weight   | output map | kernel map | input channel | output channel |
//! | output   | kernel map | input channel | output map | output channel |
//! | input    | output channel | kernel map | input channel | output map |

use std::fmt;
use std::str::FromStr;

use enumset::EnumSet;
use snafu::{OptionExt, ensure};
use strum::{EnumCount, VariantArray};
use tracing::trace;

use crate::error::{AxisConflictSnafu, Error, MalformedDumpSnafu, PositionConflictSnafu, Result};
use crate::types::{Axis, Position, Stationary};
use crate::variables::Variables;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Structure {
    /// Indexed by [`Axis::ordinal`].
    position_of: [Position; Axis::COUNT],
    /// Indexed by [`Position::ordinal`].
    axis_at: [Axis; Position::COUNT],
    /// Indexed by [`Axis::ordinal`].
    fully_tiled: [bool; Axis::COUNT],
    stationary: EnumSet<Stationary>,
}

impl Default for Structure {
    /// Axes in declaration order from inner-most outward, no flags set.
    fn default() -> Self {
        Self {
            position_of: [Position::InnerMost, Position::SecondInnerMost, Position::ThirdInnerMost, Position::OuterMost],
            axis_at: [Axis::KernelMap, Axis::InputChannel, Axis::OutputMap, Axis::OutputChannel],
            fully_tiled: [false; Axis::COUNT],
            stationary: EnumSet::empty(),
        }
    }
}

impl Structure {
    /// A structure in the canonical order of `stationary`, with that flag set.
    pub fn preset(stationary: Stationary) -> Self {
        let mut structure = Self::default();
        structure.set_stationary(stationary);
        structure
    }

    /// Bind `axis` to `position`, both directions.
    ///
    /// The axis previously at `position` keeps pointing there until it is
    /// rebound; call [`check_valid`](Self::check_valid) once the edit is complete.
    pub fn bind(&mut self, axis: Axis, position: Position) {
        self.position_of[axis.ordinal()] = position;
        self.axis_at[position.ordinal()] = axis;
    }

    /// [`bind`](Self::bind) from raw ordinals.
    pub fn bind_ordinal(&mut self, axis: usize, position: usize) -> Result<()> {
        let axis = Axis::from_ordinal(axis)?;
        let position = Position::from_ordinal(position)?;
        self.bind(axis, position);
        Ok(())
    }

    pub fn position_of(&self, axis: Axis) -> Position {
        self.position_of[axis.ordinal()]
    }

    pub fn axis_at(&self, position: Position) -> Axis {
        self.axis_at[position.ordinal()]
    }

    /// Axes from inner-most to outer-most.
    pub fn axes(&self) -> [Axis; Position::COUNT] {
        self.axis_at
    }

    pub fn is_fully_tiled(&self, axis: Axis) -> bool {
        self.fully_tiled[axis.ordinal()]
    }

    pub fn set_fully_tiled(&mut self, axis: Axis) {
        self.fully_tiled[axis.ordinal()] = true;
    }

    pub fn stationary(&self) -> EnumSet<Stationary> {
        self.stationary
    }

    pub fn is_stationary(&self, stationary: Stationary) -> bool {
        self.stationary.contains(stationary)
    }

    fn bind_order(&mut self, inner_to_outer: [Axis; Position::COUNT]) {
        for (&position, axis) in Position::VARIANTS.iter().zip(inner_to_outer) {
            self.bind(axis, position);
        }
        debug_assert!(self.check_valid().is_ok());
    }

    pub fn set_weight_stationary(&mut self) {
        self.bind_order([Axis::OutputMap, Axis::KernelMap, Axis::InputChannel, Axis::OutputChannel]);
        self.stationary.insert(Stationary::Weight);
    }

    pub fn set_output_stationary(&mut self) {
        self.bind_order([Axis::KernelMap, Axis::InputChannel, Axis::OutputMap, Axis::OutputChannel]);
        self.stationary.insert(Stationary::Output);
    }

    pub fn set_input_stationary(&mut self) {
        self.bind_order([Axis::OutputChannel, Axis::KernelMap, Axis::InputChannel, Axis::OutputMap]);
        self.stationary.insert(Stationary::Input);
    }

    pub fn set_stationary(&mut self, stationary: Stationary) {
        match stationary {
            Stationary::Input => self.set_input_stationary(),
            Stationary::Weight => self.set_weight_stationary(),
            Stationary::Output => self.set_output_stationary(),
        }
    }

    /// Exchange the axes held by two positions.
    pub fn swap(&mut self, a: Position, b: Position) -> Result<()> {
        let (axis_a, axis_b) = (self.axis_at(a), self.axis_at(b));
        self.bind(axis_a, b);
        self.bind(axis_b, a);
        self.check_valid()
    }

    /// Bubble `axis` to the inner-most position, one adjacent swap at a time.
    ///
    /// Axes it passes shift outward by one position.
    pub fn move_to_inner_most(&mut self, axis: Axis) -> Result<()> {
        let mut position = self.position_of(axis);
        while let Some(inner) = position.inner() {
            self.swap(position, inner)?;
            position = inner;
        }
        Ok(())
    }

    /// Derive fully-tiled and stationary flags from a pair of adjacent levels.
    ///
    /// Flags are only ever added. When no fully-tiled rule decides a dataflow,
    /// the inner-most axis that is not fully tiled picks one. Between the kernel
    /// map and the input channel, output stationary is chosen only if the other
    /// one of the pair is fully tiled or sits directly outside it.
    pub fn tag_stationary(&mut self, upper: &Variables, lower: &Variables) {
        for &axis in Axis::VARIANTS {
            if axis.dims().iter().all(|&dim| upper.get(dim) == lower.get(dim)) {
                self.set_fully_tiled(axis);
            }
        }

        let km = self.is_fully_tiled(Axis::KernelMap);
        let ic = self.is_fully_tiled(Axis::InputChannel);
        let om = self.is_fully_tiled(Axis::OutputMap);
        let oc = self.is_fully_tiled(Axis::OutputChannel);

        let mut inferred = EnumSet::empty();
        if km && oc {
            inferred.insert(Stationary::Input);
        }
        if om {
            inferred.insert(Stationary::Weight);
        }
        if km && ic {
            inferred.insert(Stationary::Output);
        }

        if inferred.is_empty() {
            let mut inner = self.axis_at(Position::InnerMost);
            for &position in &Position::VARIANTS[1..] {
                if self.is_fully_tiled(inner) {
                    inner = self.axis_at(position);
                }
            }
            let km_pos = self.position_of(Axis::KernelMap).ordinal();
            let ic_pos = self.position_of(Axis::InputChannel).ordinal();
            match inner {
                Axis::OutputChannel => {
                    inferred.insert(Stationary::Input);
                }
                Axis::OutputMap => {
                    inferred.insert(Stationary::Weight);
                }
                Axis::KernelMap => {
                    if ic || km_pos + 1 == ic_pos {
                        inferred.insert(Stationary::Output);
                    }
                }
                Axis::InputChannel => {
                    if km || ic_pos + 1 == km_pos {
                        inferred.insert(Stationary::Output);
                    }
                }
            }
        }

        trace!(fully_tiled = ?self.fully_tiled, ?inferred, "tagged stationary");
        self.stationary |= inferred;
    }

    /// Every position must point at an axis that points back to it.
    pub fn check_position_valid(&self) -> Result<()> {
        for &position in Position::VARIANTS {
            let axis = self.axis_at(position);
            let back = self.position_of(axis);
            ensure!(back == position, PositionConflictSnafu { position, axis, back });
        }
        Ok(())
    }

    /// Every axis must point at a position that points back to it.
    pub fn check_axis_valid(&self) -> Result<()> {
        for &axis in Axis::VARIANTS {
            let position = self.position_of(axis);
            let back = self.axis_at(position);
            ensure!(back == axis, AxisConflictSnafu { axis, position, back });
        }
        Ok(())
    }

    pub fn check_valid(&self) -> Result<()> {
        self.check_position_valid()?;
        self.check_axis_valid()
    }

    /// Read four `<position>: <axis>` pairs, inner-most first.
    pub fn parse_tokens<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<Self> {
        let mut structure = Self::default();
        for &expected in Position::VARIANTS {
            let label = tokens.next().context(MalformedDumpSnafu { reason: format!("missing {expected} label") })?;
            let position = Position::from_label(label)?;
            ensure!(
                position == expected,
                MalformedDumpSnafu { reason: format!("expected {expected}, found {position}") }
            );
            let axis = tokens.next().context(MalformedDumpSnafu { reason: format!("missing axis for {expected}") })?;
            structure.bind(Axis::from_label(axis)?, position);
        }
        structure.check_valid()?;
        Ok(structure)
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &position in Position::VARIANTS {
            writeln!(f, "{position}: {}", self.axis_at(position))?;
        }
        Ok(())
    }
}

impl FromStr for Structure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let structure = Self::parse_tokens(&mut tokens)?;
        ensure!(tokens.next().is_none(), MalformedDumpSnafu { reason: "trailing tokens after structure" });
        Ok(structure)
    }
}
