use crate::error::Result;
use crate::layer::ConvLayer;
use crate::structure::Structure;
use crate::types::Axis;
use crate::variable_set::VariableSet;

/// A complete convolution loop nest.
///
/// Owns its [`VariableSet`] and the two level-interface orders: `off`
/// (off-chip to on-chip) and `on` (on-chip to register). Cloning is a deep
/// copy, so candidates never alias each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CnnLoop {
    variable_set: VariableSet,
    off_structure: Structure,
    on_structure: Structure,
}

impl CnnLoop {
    pub fn new(variable_set: VariableSet, off_structure: Structure, on_structure: Structure) -> Self {
        Self { variable_set, off_structure, on_structure }
    }

    /// Untiled loop for `layer`: every level equals the full layer.
    pub fn from_layer(layer: &ConvLayer) -> Result<Self> {
        Ok(Self { variable_set: VariableSet::from_layer(layer)?, ..Default::default() })
    }

    pub fn variable_set(&self) -> &VariableSet {
        &self.variable_set
    }

    pub fn variable_set_mut(&mut self) -> &mut VariableSet {
        &mut self.variable_set
    }

    pub fn off_structure(&self) -> &Structure {
        &self.off_structure
    }

    pub fn off_structure_mut(&mut self) -> &mut Structure {
        &mut self.off_structure
    }

    pub fn on_structure(&self) -> &Structure {
        &self.on_structure
    }

    pub fn set_variable_set(&mut self, variable_set: VariableSet) {
        self.variable_set = variable_set;
    }

    pub fn set_off_structure(&mut self, structure: Structure) {
        self.off_structure = structure;
    }

    pub fn set_on_structure(&mut self, structure: Structure) {
        self.on_structure = structure;
    }

    /// Rotate every fully tiled axis to the inner-most off-chip position.
    ///
    /// Axes are visited as output channel, input channel, output map, kernel
    /// map, so when several are fully tiled the kernel map ends up inner-most.
    pub fn move_fully_tiled_to_inner_most(&mut self) -> Result<()> {
        for axis in [Axis::OutputChannel, Axis::InputChannel, Axis::OutputMap, Axis::KernelMap] {
            if self.variable_set.is_fully_tiled(axis) {
                self.off_structure.move_to_inner_most(axis)?;
                self.off_structure.set_fully_tiled(axis);
            }
        }
        Ok(())
    }

    pub fn check_valid(&self) -> Result<()> {
        self.variable_set.check_valid()?;
        self.off_structure.check_valid()?;
        self.on_structure.check_valid()
    }
}
