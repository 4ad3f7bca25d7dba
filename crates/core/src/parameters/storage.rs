//! Named parameter storage
//!
//! The line follower's tuning surface lives in a fixed-capacity map of
//! short names to typed values. Component configurations are derived from
//! it (see [`LineFollowerParams`](super::LineFollowerParams)); the dirty flag
//! tells the owner when to derive them again.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Maximum parameter name length
pub const PARAM_NAME_LEN: usize = 16;

/// Maximum number of parameters
pub const MAX_PARAMS: usize = 32;

bitflags! {
    /// Parameter flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Left out of diagnostic listings
        const HIDDEN = 0b01;
        /// Fixed by the hardware build
        const READ_ONLY = 0b10;
    }
}

/// Typed parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    /// Boolean switch
    Bool(bool),
    /// Counts, durations and periods
    Int(i32),
    /// Thresholds, gains and rates
    Float(f32),
}

impl ParamValue {
    /// Type discriminant (1 = bool, 2 = int, 3 = float)
    pub fn type_id(&self) -> u8 {
        match self {
            ParamValue::Bool(_) => 1,
            ParamValue::Int(_) => 2,
            ParamValue::Float(_) => 3,
        }
    }
}

/// Registration-time information about a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamMetadata {
    /// Parameter flags
    pub flags: ParamFlags,
    /// Value the parameter was registered with
    pub default: ParamValue,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    value: ParamValue,
    metadata: ParamMetadata,
}

type Name = String<PARAM_NAME_LEN>;

fn name_key(name: &str) -> Result<Name, ParameterError> {
    let mut key = Name::new();
    key.push_str(name)
        .map_err(|_| ParameterError::InvalidConfig)?;
    Ok(key)
}

/// Fixed-capacity store of named parameters
pub struct ParameterStore {
    entries: FnvIndexMap<Name, Entry, MAX_PARAMS>,
    dirty: bool,
}

impl ParameterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: FnvIndexMap::new(),
            dirty: false,
        }
    }

    /// Register a parameter with its default value
    ///
    /// Registering an existing name keeps the current value.
    ///
    /// # Errors
    ///
    /// - `ParameterError::InvalidConfig` if the name is too long
    /// - `ParameterError::StoreFull` if every slot is taken
    pub fn register(
        &mut self,
        name: &str,
        default: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = name_key(name)?;
        if self.entries.contains_key(&key) {
            return Ok(());
        }

        let entry = Entry {
            value: default,
            metadata: ParamMetadata { flags, default },
        };
        self.entries
            .insert(key, entry)
            .map_err(|_| ParameterError::StoreFull)?;
        self.dirty = true;
        Ok(())
    }

    /// Current value of a parameter
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entry(name).map(|entry| &entry.value)
    }

    /// Change a registered parameter and mark the store dirty
    ///
    /// # Errors
    ///
    /// - `ParameterError::InvalidConfig` if the name is unknown
    /// - `ParameterError::ReadOnly` if the parameter is fixed
    /// - `ParameterError::TypeMismatch` if `value` has a different type
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = name_key(name)?;
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(ParameterError::InvalidConfig)?;

        if entry.metadata.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        if entry.value.type_id() != value.type_id() {
            return Err(ParameterError::TypeMismatch);
        }

        entry.value = value;
        self.dirty = true;
        Ok(())
    }

    /// Put a parameter back to its registered default
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn reset(&mut self, name: &str) -> Result<(), ParameterError> {
        let default = self
            .get_metadata(name)
            .ok_or(ParameterError::InvalidConfig)?
            .default;
        self.set(name, default)
    }

    /// Registration-time information about a parameter
    pub fn get_metadata(&self, name: &str) -> Option<&ParamMetadata> {
        self.entry(name).map(|entry| &entry.metadata)
    }

    /// True if the parameter is left out of listings
    pub fn is_hidden(&self, name: &str) -> bool {
        self.get_metadata(name)
            .is_some_and(|meta| meta.flags.contains(ParamFlags::HIDDEN))
    }

    /// Names of visible parameters, in registration order
    pub fn iter_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.metadata.flags.contains(ParamFlags::HIDDEN))
            .map(|(name, _)| name.as_str())
    }

    /// Number of visible parameters
    pub fn count(&self) -> usize {
        self.iter_names().count()
    }

    /// Number of parameters, hidden ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if anything changed since the last [`clear_dirty`](Self::clear_dirty)
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge all changes so far
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(&name_key(name).ok()?)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
