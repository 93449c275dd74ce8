//! Formation parameter codec.
//!
//! A process's `(count, cpu, memory)` is stored in the app's stack
//! parameters under one of two schemes:
//!
//! ```text
//! Combined     WebFormation    = "2,256,512"
//! Individual   WebDesiredCount = "2"
//!              WebCpu          = "256"      (absent on older stacks)
//!              WebMemory       = "512"
//! ```
//!
//! The scheme is chosen by the presence of the `<Prefix>Formation` key and
//! is never switched by an encode.

use std::collections::HashMap;

use formation_core::{ParameterPatch, upper_name};

use crate::error::{FormatError, FormationField};

/// Encoding used for one process's formation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Single `<Prefix>Formation` key holding `count,cpu,memory`.
    Combined,
    /// `<Prefix>DesiredCount`, `<Prefix>Cpu` and `<Prefix>Memory`.
    Individual,
}

impl Scheme {
    /// Resolve the scheme a process currently uses.
    pub fn detect(parameters: &HashMap<String, String>, keys: &FormationKeys) -> Self {
        if parameters.contains_key(&keys.formation()) {
            Scheme::Combined
        } else {
            Scheme::Individual
        }
    }
}

/// Parameter key names for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationKeys {
    prefix: String,
}

impl FormationKeys {
    pub fn for_process(process: &str) -> Self {
        Self {
            prefix: upper_name(process),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn formation(&self) -> String {
        format!("{}Formation", self.prefix)
    }

    pub fn desired_count(&self) -> String {
        format!("{}DesiredCount", self.prefix)
    }

    pub fn cpu(&self) -> String {
        format!("{}Cpu", self.prefix)
    }

    pub fn memory(&self) -> String {
        format!("{}Memory", self.prefix)
    }
}

/// The scaling triple carried by the formation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScaleSettings {
    pub count: i64,
    pub cpu: i64,
    pub memory: i64,
}

/// Decode a process's settings using whichever scheme the parameters hold.
pub fn decode(
    parameters: &HashMap<String, String>,
    process: &str,
) -> Result<ScaleSettings, FormatError> {
    let keys = FormationKeys::for_process(process);
    let scheme = Scheme::detect(parameters, &keys);
    decode_with(scheme, parameters, process, &keys)
}

/// Decode with an already-resolved scheme.
pub fn decode_with(
    scheme: Scheme,
    parameters: &HashMap<String, String>,
    process: &str,
    keys: &FormationKeys,
) -> Result<ScaleSettings, FormatError> {
    match scheme {
        Scheme::Combined => decode_combined(parameters, process, keys),
        Scheme::Individual => decode_individual(parameters, process, keys),
    }
}

/// Encode settings into a patch, keeping the scheme the app already uses.
pub fn encode(
    parameters: &HashMap<String, String>,
    process: &str,
    settings: ScaleSettings,
) -> ParameterPatch {
    let keys = FormationKeys::for_process(process);
    let scheme = Scheme::detect(parameters, &keys);
    encode_with(scheme, &keys, settings)
}

/// Encode with an explicit scheme.
pub fn encode_with(scheme: Scheme, keys: &FormationKeys, settings: ScaleSettings) -> ParameterPatch {
    let mut patch = ParameterPatch::new();
    match scheme {
        Scheme::Combined => {
            patch.insert(
                keys.formation(),
                format!("{},{},{}", settings.count, settings.cpu, settings.memory),
            );
        }
        Scheme::Individual => {
            patch.insert(keys.desired_count(), settings.count.to_string());
            patch.insert(keys.cpu(), settings.cpu.to_string());
            patch.insert(keys.memory(), settings.memory.to_string());
        }
    }
    patch
}

fn decode_combined(
    parameters: &HashMap<String, String>,
    process: &str,
    keys: &FormationKeys,
) -> Result<ScaleSettings, FormatError> {
    let key = keys.formation();
    let value = parameters.get(&key).ok_or_else(|| FormatError::Missing {
        process: process.to_string(),
        field: FormationField::Count,
        key,
    })?;

    let parts: Vec<&str> = value.split(',').collect();
    let [count, cpu, memory] = parts.as_slice() else {
        return Err(FormatError::FieldCount {
            process: process.to_string(),
            found: parts.len(),
        });
    };

    Ok(ScaleSettings {
        count: parse_field(process, FormationField::Count, count)?,
        cpu: parse_field(process, FormationField::Cpu, cpu)?,
        memory: parse_field(process, FormationField::Memory, memory)?,
    })
}

fn decode_individual(
    parameters: &HashMap<String, String>,
    process: &str,
    keys: &FormationKeys,
) -> Result<ScaleSettings, FormatError> {
    let count = required_field(parameters, process, FormationField::Count, keys.desired_count())?;

    // Stacks created before cpu limits existed have no Cpu parameter.
    let cpu = match parameters.get(&keys.cpu()) {
        Some(value) => parse_field(process, FormationField::Cpu, value)?,
        None => 0,
    };

    let memory = required_field(parameters, process, FormationField::Memory, keys.memory())?;

    Ok(ScaleSettings { count, cpu, memory })
}

fn required_field(
    parameters: &HashMap<String, String>,
    process: &str,
    field: FormationField,
    key: String,
) -> Result<i64, FormatError> {
    match parameters.get(&key) {
        Some(value) => parse_field(process, field, value),
        None => Err(FormatError::Missing {
            process: process.to_string(),
            field,
            key,
        }),
    }
}

fn parse_field(process: &str, field: FormationField, value: &str) -> Result<i64, FormatError> {
    value.parse::<i64>().map_err(|_| FormatError::NotNumeric {
        process: process.to_string(),
        field,
        value: value.to_string(),
    })
}
