// src/commands/spec.rs - Loosely typed command descriptions from program files
use super::{Circ, Command, Gripper, Lin, Ptp, Sequence};
use crate::error::MoveError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A command as written in a program file: a `type` tag plus its parameters.
///
/// The tag is resolved only when the command is about to be moved, so a
/// program can be loaded and inspected even if it names a type this build
/// does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: toml::Table,
}

impl CommandSpec {
    pub fn new(kind: impl Into<String>, params: toml::Table) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }

    /// Builds the concrete command named by `kind`.
    pub fn to_command(&self) -> Result<Box<dyn Command>, MoveError> {
        let cmd: Box<dyn Command> = match self.kind.to_ascii_lowercase().as_str() {
            "ptp" => Box::new(self.parse::<Ptp>("Ptp")?),
            "lin" => Box::new(self.parse::<Lin>("Lin")?),
            "circ" => Box::new(self.parse::<Circ>("Circ")?),
            "sequence" => Box::new(self.parse::<Sequence>("Sequence")?),
            "gripper" => Box::new(self.parse::<Gripper>("Gripper")?),
            _ => {
                tracing::error!("Unknown command type.");
                return Err(MoveError::UnknownCommandType(self.kind.clone()));
            }
        };
        Ok(cmd)
    }

    fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<T, MoveError> {
        toml::Value::Table(self.params.clone())
            .try_into()
            .map_err(|e: toml::de::Error| MoveError::InvalidCommand {
                command: name.to_string(),
                reason: e.message().to_string(),
            })
    }
}
